//! Static Catalog Module
//!
//! Read-only reference data the workflows consume: facilities, departments and
//! appointment time slots. Records are loaded once and looked up by id only.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! catalog_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

catalog_id!(FacilityId);
catalog_id!(DepartmentId);
catalog_id!(SlotId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedCapacity {
    pub total: u32,
    pub available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub distance_km: f64,
    pub address: String,
    pub phone: String,
    pub beds: BedCapacity,
    /// Accepts emergency admissions
    pub emergency: bool,
    pub specialties: Vec<String>,
    pub open_hours: String,
}

impl Facility {
    pub fn can_admit_emergency(&self) -> bool {
        self.emergency && self.beds.available > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub label: String,
    pub starts_at: NaiveTime,
}

/// Read-only catalog contract. Listings are ordered, finite and stable.
pub trait Catalog: Send + Sync {
    fn list_facilities(&self) -> &[Facility];
    fn list_departments(&self) -> &[Department];
    fn list_time_slots(&self) -> &[TimeSlot];

    fn facility(&self, id: &FacilityId) -> Option<&Facility> {
        self.list_facilities().iter().find(|f| &f.id == id)
    }

    fn department(&self, id: &DepartmentId) -> Option<&Department> {
        self.list_departments().iter().find(|d| &d.id == id)
    }

    fn time_slot(&self, id: &SlotId) -> Option<&TimeSlot> {
        self.list_time_slots().iter().find(|s| &s.id == id)
    }

    /// Closest facility that takes emergency admissions and has a free bed.
    /// Ties keep catalog order.
    fn nearest_emergency_facility(&self) -> Option<&Facility> {
        self.list_facilities()
            .iter()
            .filter(|f| f.can_admit_emergency())
            .fold(None, |best: Option<&Facility>, candidate| match best {
                Some(current) if current.distance_km <= candidate.distance_km => Some(current),
                _ => Some(candidate),
            })
    }
}

/// Catalog backed by the seed tables the dashboard ships with.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    facilities: Vec<Facility>,
    departments: Vec<Department>,
    time_slots: Vec<TimeSlot>,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl StaticCatalog {
    pub fn new(facilities: Vec<Facility>, departments: Vec<Department>, time_slots: Vec<TimeSlot>) -> Self {
        Self {
            facilities,
            departments,
            time_slots,
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed_facilities(), seed_departments(), seed_time_slots())
    }
}

impl Catalog for StaticCatalog {
    fn list_facilities(&self) -> &[Facility] {
        &self.facilities
    }

    fn list_departments(&self) -> &[Department] {
        &self.departments
    }

    fn list_time_slots(&self) -> &[TimeSlot] {
        &self.time_slots
    }
}

#[allow(clippy::too_many_arguments)]
fn facility(
    id: &str,
    name: &str,
    distance_km: f64,
    address: &str,
    phone: &str,
    beds: (u32, u32),
    emergency: bool,
    specialties: &[&str],
    open_hours: &str,
) -> Facility {
    Facility {
        id: FacilityId::from(id),
        name: name.to_string(),
        distance_km,
        address: address.to_string(),
        phone: phone.to_string(),
        beds: BedCapacity {
            total: beds.0,
            available: beds.1,
        },
        emergency,
        specialties: specialties.iter().map(|s| s.to_string()).collect(),
        open_hours: open_hours.to_string(),
    }
}

fn seed_facilities() -> Vec<Facility> {
    vec![
        facility(
            "h1",
            "City General Hospital",
            1.2,
            "123 Main Street, City Center",
            "+91 9876543210",
            (120, 15),
            true,
            &["Cardiology", "Neurology", "Orthopedics"],
            "24/7",
        ),
        facility(
            "h2",
            "Metro Medical Center",
            2.5,
            "456 Park Avenue, Downtown",
            "+91 9876543211",
            (200, 32),
            true,
            &["Pediatrics", "Obstetrics", "Surgery"],
            "24/7",
        ),
        facility(
            "h3",
            "Health First Clinic",
            0.8,
            "789 Garden Road, Suburb",
            "+91 9876543212",
            (50, 8),
            false,
            &["General Medicine", "Dermatology"],
            "8:00 AM - 8:00 PM",
        ),
        facility(
            "h4",
            "Community Care Hospital",
            3.7,
            "101 River View, East Side",
            "+91 9876543213",
            (80, 0),
            true,
            &["Cardiology", "Pulmonology", "Geriatrics"],
            "24/7",
        ),
        facility(
            "h5",
            "Wellness Medical Center",
            4.2,
            "202 Hill Top, North District",
            "+91 9876543214",
            (150, 25),
            true,
            &["Oncology", "Radiology", "Pathology"],
            "24/7",
        ),
    ]
}

fn seed_departments() -> Vec<Department> {
    [
        ("d1", "General Medicine"),
        ("d2", "Cardiology"),
        ("d3", "Orthopedics"),
        ("d4", "Pediatrics"),
        ("d5", "Dermatology"),
        ("d6", "ENT"),
        ("d7", "Ophthalmology"),
        ("d8", "Neurology"),
    ]
    .into_iter()
    .map(|(id, name)| Department {
        id: DepartmentId::from(id),
        name: name.to_string(),
    })
    .collect()
}

fn seed_time_slots() -> Vec<TimeSlot> {
    [
        ("t1", 9, 0),
        ("t2", 9, 30),
        ("t3", 10, 0),
        ("t4", 10, 30),
        ("t5", 11, 0),
        ("t6", 11, 30),
        ("t7", 12, 0),
        ("t8", 14, 0),
        ("t9", 14, 30),
        ("t10", 15, 0),
        ("t11", 15, 30),
        ("t12", 16, 0),
        ("t13", 16, 30),
        ("t14", 17, 0),
    ]
    .into_iter()
    .filter_map(|(id, hour, minute)| {
        let starts_at = NaiveTime::from_hms_opt(hour, minute, 0)?;
        Some(TimeSlot {
            id: SlotId::from(id),
            label: starts_at.format("%I:%M %p").to_string(),
            starts_at,
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog_is_ordered_and_complete() {
        let catalog = StaticCatalog::seeded();

        let facility_ids: Vec<&str> = catalog.list_facilities().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(facility_ids, vec!["h1", "h2", "h3", "h4", "h5"]);
        assert_eq!(catalog.list_departments().len(), 8);
        assert_eq!(catalog.list_time_slots().len(), 14);
        assert_eq!(catalog.list_time_slots()[0].label, "09:00 AM");
        assert_eq!(catalog.list_time_slots()[7].label, "02:00 PM");
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = StaticCatalog::seeded();

        assert_eq!(
            catalog.facility(&FacilityId::from("h3")).map(|f| f.name.as_str()),
            Some("Health First Clinic")
        );
        assert_eq!(
            catalog.department(&DepartmentId::from("d2")).map(|d| d.name.as_str()),
            Some("Cardiology")
        );
        assert!(catalog.time_slot(&SlotId::from("t99")).is_none());
    }

    #[test]
    fn test_nearest_emergency_facility_skips_clinics_and_full_hospitals() {
        let catalog = StaticCatalog::seeded();

        // h3 is closer but takes no emergencies
        let nearest = catalog.nearest_emergency_facility().unwrap();
        assert_eq!(nearest.id.as_str(), "h1");
    }

    #[test]
    fn test_nearest_emergency_facility_none_when_nothing_admits() {
        let catalog = StaticCatalog::new(Vec::new(), seed_departments(), seed_time_slots());
        assert!(catalog.nearest_emergency_facility().is_none());
    }
}
