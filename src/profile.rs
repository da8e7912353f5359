// Session profile provider - owns the authenticated patient record

use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::info;

use crate::workflows::WorkflowError;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub blood_group: String,
    pub medical_conditions: Vec<String>,
    pub emergency_contact: EmergencyContact,
}

impl UserProfile {
    /// Patient record used by the CLI when no other profile is configured.
    pub fn demo() -> Self {
        Self {
            id: "p-1001".to_string(),
            name: "Asha Verma".to_string(),
            blood_group: "O+".to_string(),
            medical_conditions: vec!["Hypertension".to_string(), "Asthma".to_string()],
            emergency_contact: EmergencyContact {
                name: "Ravi Verma".to_string(),
                phone: "+91 9812345678".to_string(),
                relation: "Spouse".to_string(),
            },
        }
    }
}

#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait ProfileProvider: Send + Sync {
    fn current_user(&self) -> Option<UserProfile>;

    fn require_user(&self) -> Result<UserProfile, WorkflowError> {
        self.current_user().ok_or(WorkflowError::NotAuthenticated)
    }
}

/// In-memory sign-in state for one session.
#[derive(Debug, Default)]
pub struct SessionProfile {
    user: RwLock<Option<UserProfile>>,
}

impl SessionProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: UserProfile) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: UserProfile) {
        info!(user_id = %user.id, "Patient signed in");
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user);
    }

    pub fn sign_out(&self) -> Option<UserProfile> {
        let previous = self.user.write().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(user) = &previous {
            info!(user_id = %user.id, "Patient signed out");
        }
        previous
    }
}

impl ProfileProvider for SessionProfile {
    fn current_user(&self) -> Option<UserProfile> {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
