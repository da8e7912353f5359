// End-to-end tests for the careflow binary.
// Each test runs in an empty directory so no stray careflow.toml is picked up.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn careflow(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("careflow").unwrap();
    cmd.current_dir(dir.path()).env("RUST_LOG", "error");
    cmd
}

#[test]
fn test_no_subcommand_shows_usage_guide() {
    let dir = TempDir::new().unwrap();

    careflow(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("careflow - Appointment booking and emergency dispatch"))
        .stdout(predicate::str::contains("careflow emergency"));
}

#[test]
fn test_catalog_lists_departments() {
    let dir = TempDir::new().unwrap();

    careflow(&dir)
        .args(["catalog", "departments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[d2] Cardiology"))
        .stdout(predicate::str::contains("[d8] Neurology"));
}

#[test]
fn test_catalog_facilities_as_json() {
    let dir = TempDir::new().unwrap();

    let output = careflow(&dir)
        .args(["catalog", "facilities", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let facilities: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let facilities = facilities.as_array().unwrap();
    assert_eq!(facilities.len(), 5);
    assert_eq!(facilities[0]["id"], "h1");
    assert_eq!(facilities[0]["name"], "City General Hospital");
}

#[test]
fn test_catalog_facilities_sorted_by_distance_and_beds() {
    let dir = TempDir::new().unwrap();

    let by_distance = careflow(&dir)
        .args(["catalog", "facilities", "--sort", "distance", "--json"])
        .output()
        .unwrap();
    assert!(by_distance.status.success());
    let facilities: serde_json::Value = serde_json::from_slice(&by_distance.stdout).unwrap();
    assert_eq!(facilities[0]["id"], "h3");
    assert_eq!(facilities[4]["id"], "h5");

    let by_beds = careflow(&dir)
        .args(["catalog", "facilities", "--sort", "availability", "--json"])
        .output()
        .unwrap();
    assert!(by_beds.status.success());
    let facilities: serde_json::Value = serde_json::from_slice(&by_beds.stdout).unwrap();
    assert_eq!(facilities[0]["id"], "h2");
    assert_eq!(facilities[4]["id"], "h4");
}

#[test]
fn test_profile_shows_emergency_contact() {
    let dir = TempDir::new().unwrap();

    careflow(&dir)
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("Asha Verma"))
        .stdout(predicate::str::contains("Ravi Verma (Spouse)"));
}

#[test]
fn test_config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".careflow-rc"), "[dispatch]\nauto_timeout_seconds = 5\n").unwrap();

    careflow(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("auto_timeout_seconds = 5"))
        .stdout(predicate::str::contains("eta_high_minutes = 12"));
}

#[test]
fn test_env_file_is_applied_and_logged() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env"), "CAREFLOW__DISPATCH__AUTO_TIMEOUT_SECONDS=7\n").unwrap();

    careflow(&dir)
        .env("RUST_LOG", "info")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("auto_timeout_seconds = 7"))
        .stderr(predicate::str::contains("Loaded environment variables from .env file"));
}

#[test]
fn test_book_weekday_appointment_as_json() {
    let dir = TempDir::new().unwrap();

    let output = careflow(&dir)
        .args([
            "book",
            "--facility",
            "h1",
            "--department",
            "d2",
            "--date",
            "2030-01-07",
            "--slot",
            "t3",
            "--json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let booking: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(booking["facility_id"], "h1");
    assert_eq!(booking["department_id"], "d2");
    assert_eq!(booking["date"], "2030-01-07");
    assert_eq!(booking["slot_id"], "t3");
}

#[test]
fn test_book_weekend_is_refused() {
    let dir = TempDir::new().unwrap();

    careflow(&dir)
        .args(["book", "--facility", "h1", "--department", "d2", "--date", "2030-01-05"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not selectable"));
}

#[test]
fn test_emergency_cancel_sends_nothing() {
    let dir = TempDir::new().unwrap();

    careflow(&dir)
        .args(["emergency", "--cancel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cancelled"));
}

#[test]
fn test_emergency_close_after_confirm() {
    let dir = TempDir::new().unwrap();

    careflow(&dir)
        .args(["emergency", "--close-after", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ambulance ETA: 8-12 minutes"))
        .stdout(predicate::str::contains("Emergency contact notified"))
        .stdout(predicate::str::contains("Emergency alert closed"));
}

#[test]
fn test_emergency_json_is_a_single_document() {
    let dir = TempDir::new().unwrap();

    let output = careflow(&dir)
        .args(["emergency", "--json", "--close-after", "0"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["state"], "Idle");
    assert_eq!(report["activated"]["state"], "Active");
    assert_eq!(report["activated"]["eta_range"]["low_minutes"], 8);
    assert_eq!(report["activated"]["nearest_facility_id"], "h1");
    assert_eq!(report["resolved"]["resolution"], "Closed");
    assert_eq!(report["resolved"]["contact_notified"], true);
}

#[test]
fn test_emergency_cancel_as_json() {
    let dir = TempDir::new().unwrap();

    let output = careflow(&dir)
        .args(["emergency", "--cancel", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["state"], "Idle");
    assert!(report["activated"].is_null());
}
