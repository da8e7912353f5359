use anyhow::Result;
use serde::Serialize;

use crate::workflows::TransitionResult;

pub mod book;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod emergency;
pub mod profile;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Turn a rejected transition into a command error.
pub fn require_success<S: Copy>(result: TransitionResult<S>, step: &str) -> Result<S> {
    match result {
        TransitionResult::Success { new_state, .. } => Ok(new_state),
        TransitionResult::Rejected { reason, .. } => {
            println!("❌ {}: {}", step, reason);
            Err(anyhow::anyhow!("{} rejected: {}", step, reason))
        }
    }
}

pub fn show_how_to_get_started() -> Result<()> {
    println!("🏥 careflow - Appointment booking and emergency dispatch");
    println!();
    println!("To get started:");
    println!("  🏨 careflow catalog            # Nearby hospitals");
    println!("  📅 careflow calendar           # Dates open for appointments");
    println!("  📝 careflow book --facility h1 --department d1");
    println!("  👤 careflow profile            # Your medical profile");
    println!();
    println!("Emergency:");
    println!("  🚨 careflow emergency          # Alert services and your emergency contact");
    println!();
    println!("Admin commands:");
    println!("  ⚙️  careflow config             # Effective configuration");
    println!();
    println!("💡 Start with 'careflow catalog' to pick a hospital!");
    Ok(())
}
