// Core types for the booking wizard

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use super::calendar::SelectableDate;
use crate::catalog::{DepartmentId, FacilityId, SlotId};

/// Wizard step, without the draft data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BookingPhase {
    /// Step 1: facility and department
    SelectingResource,
    /// Step 2: date and time slot
    SelectingSchedule,
    /// Booking emitted; only restart is possible
    Submitted,
}

impl fmt::Display for BookingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BookingPhase::SelectingResource => "selecting resource",
            BookingPhase::SelectingSchedule => "selecting schedule",
            BookingPhase::Submitted => "submitted",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDraft {
    pub facility: Option<FacilityId>,
    pub department: Option<DepartmentId>,
}

impl ResourceDraft {
    pub fn complete(&self) -> Result<ResourceSelection, Vec<&'static str>> {
        match (&self.facility, &self.department) {
            (Some(facility), Some(department)) => Ok(ResourceSelection {
                facility: facility.clone(),
                department: department.clone(),
            }),
            (facility, department) => {
                let mut missing = Vec::new();
                if facility.is_none() {
                    missing.push("facility");
                }
                if department.is_none() {
                    missing.push("department");
                }
                Err(missing)
            }
        }
    }
}

/// Step 1 output; both fields are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceSelection {
    pub facility: FacilityId,
    pub department: DepartmentId,
}

impl From<ResourceSelection> for ResourceDraft {
    fn from(selection: ResourceSelection) -> Self {
        Self {
            facility: Some(selection.facility),
            department: Some(selection.department),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub date: Option<SelectableDate>,
    pub slot: Option<SlotId>,
}

impl ScheduleDraft {
    pub fn complete(&self) -> Result<(SelectableDate, SlotId), Vec<&'static str>> {
        match (self.date, &self.slot) {
            (Some(date), Some(slot)) => Ok((date, slot.clone())),
            (date, slot) => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push("date");
                }
                if slot.is_none() {
                    missing.push("time slot");
                }
                Err(missing)
            }
        }
    }
}

/// Draft data per step. Step 2 cannot exist without a complete step 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingStep {
    SelectingResource {
        resource: ResourceDraft,
        /// Schedule choices kept across `back()`
        schedule: ScheduleDraft,
    },
    SelectingSchedule {
        resource: ResourceSelection,
        schedule: ScheduleDraft,
    },
    Submitted {
        booking: ConfirmedBooking,
    },
}

impl Default for BookingStep {
    fn default() -> Self {
        BookingStep::SelectingResource {
            resource: ResourceDraft::default(),
            schedule: ScheduleDraft::default(),
        }
    }
}

impl BookingStep {
    pub fn phase(&self) -> BookingPhase {
        match self {
            BookingStep::SelectingResource { .. } => BookingPhase::SelectingResource,
            BookingStep::SelectingSchedule { .. } => BookingPhase::SelectingSchedule,
            BookingStep::Submitted { .. } => BookingPhase::Submitted,
        }
    }
}

/// Immutable record of a committed booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmedBooking {
    pub reference: Uuid,
    pub facility_id: FacilityId,
    pub department_id: DepartmentId,
    pub date: NaiveDate,
    pub slot_id: SlotId,
    pub created_at: DateTime<Utc>,
}

impl ConfirmedBooking {
    pub(crate) fn from_draft(resource: ResourceSelection, date: SelectableDate, slot: SlotId) -> Self {
        Self {
            reference: Uuid::new_v4(),
            facility_id: resource.facility,
            department_id: resource.department,
            date: date.date(),
            slot_id: slot,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_draft_reports_missing_fields() {
        let draft = ResourceDraft {
            facility: Some(FacilityId::from("h1")),
            department: None,
        };
        assert_eq!(draft.complete(), Err(vec!["department"]));
        assert_eq!(ResourceDraft::default().complete(), Err(vec!["facility", "department"]));
    }

    #[test]
    fn test_resource_selection_round_trips_through_draft() {
        let selection = ResourceSelection {
            facility: FacilityId::from("h2"),
            department: DepartmentId::from("d4"),
        };
        let draft = ResourceDraft::from(selection.clone());

        assert_eq!(draft.complete(), Ok(selection));
    }

    #[test]
    fn test_schedule_draft_reports_missing_fields() {
        let draft = ScheduleDraft {
            date: None,
            slot: Some(SlotId::from("t1")),
        };
        assert_eq!(draft.complete(), Err(vec!["date"]));
    }
}
