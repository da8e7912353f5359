// Core types for the emergency dispatch workflow

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::catalog::{Facility, FacilityId};
use crate::profile::{EmergencyContact, UserProfile};

/// Dispatch cycle states. Idle is both the start and the end of a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DispatchState {
    #[default]
    Idle,
    PendingConfirmation,
    Active,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DispatchState::Idle => "idle",
            DispatchState::PendingConfirmation => "pending confirmation",
            DispatchState::Active => "active",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EtaRange {
    pub low_minutes: u32,
    pub high_minutes: u32,
}

impl fmt::Display for EtaRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} minutes", self.low_minutes, self.high_minutes)
    }
}

/// How an active dispatch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resolution {
    Closed,
    Expired,
}

/// One confirmed dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchSession {
    /// Identifies the cycle; a timer armed for another generation is stale
    pub generation: u64,
    pub activated_at: DateTime<Utc>,
    pub eta: EtaRange,
    pub nearest_facility_id: Option<FacilityId>,
    pub contact: EmergencyContact,
    pub contact_notified: bool,
    pub notification_error: Option<String>,
    pub resolution: Option<Resolution>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl DispatchSession {
    pub fn new(
        generation: u64,
        eta: EtaRange,
        nearest_facility_id: Option<FacilityId>,
        contact: EmergencyContact,
    ) -> Self {
        Self {
            generation,
            activated_at: Utc::now(),
            eta,
            nearest_facility_id,
            contact,
            contact_notified: false,
            notification_error: None,
            resolution: None,
            resolved_at: None,
        }
    }
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchStatus {
    pub state: DispatchState,
    pub eta_range: Option<EtaRange>,
    pub nearest_facility_id: Option<FacilityId>,
    pub contact_notified: bool,
    pub activated_at: Option<DateTime<Utc>>,
    pub notification_error: Option<String>,
}

impl DispatchStatus {
    pub fn from_session(state: DispatchState, session: Option<&DispatchSession>) -> Self {
        Self {
            state,
            eta_range: session.map(|s| s.eta),
            nearest_facility_id: session.and_then(|s| s.nearest_facility_id.clone()),
            contact_notified: session.is_some_and(|s| s.contact_notified),
            activated_at: session.map(|s| s.activated_at),
            notification_error: session.and_then(|s| s.notification_error.clone()),
        }
    }
}

/// Payload sent to the patient's emergency contact and the responding facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyAlert {
    pub generation: u64,
    pub patient_id: String,
    pub patient_name: String,
    pub blood_group: String,
    pub medical_conditions: Vec<String>,
    pub contact: EmergencyContact,
    pub facility_name: Option<String>,
    pub facility_phone: Option<String>,
    pub eta: EtaRange,
    pub raised_at: DateTime<Utc>,
}

impl EmergencyAlert {
    pub fn new(patient: &UserProfile, session: &DispatchSession, facility: Option<&Facility>) -> Self {
        Self {
            generation: session.generation,
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            blood_group: patient.blood_group.clone(),
            medical_conditions: patient.medical_conditions.clone(),
            contact: session.contact.clone(),
            facility_name: facility.map(|f| f.name.clone()),
            facility_phone: facility.map(|f| f.phone.clone()),
            eta: session.eta,
            raised_at: session.activated_at,
        }
    }

    pub fn message(&self) -> String {
        let responder = self.facility_name.as_deref().unwrap_or("emergency services");
        format!(
            "Emergency alert for {} (blood group {}). {} has been notified; ambulance ETA {}.",
            self.patient_name, self.blood_group, responder, self.eta
        )
    }
}
