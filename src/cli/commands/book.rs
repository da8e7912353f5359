use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;

use super::{print_json, require_success};
use crate::catalog::SlotId;
use crate::session::PatientSession;

pub struct BookCommand {
    pub facility: String,
    pub department: String,
    pub date: Option<NaiveDate>,
    pub slot: Option<String>,
    pub json: bool,
}

impl BookCommand {
    pub fn new(facility: String, department: String) -> Self {
        Self {
            facility,
            department,
            date: None,
            slot: None,
            json: false,
        }
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    pub fn with_slot(mut self, slot: Option<String>) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn execute(&self, session: &mut PatientSession) -> Result<()> {
        let catalog = Arc::clone(session.catalog());
        let horizon = session.config().booking.horizon_days;
        let workflow = session.begin_booking()?;

        if !self.json {
            println!("📝 Booking appointment...");
        }

        require_success(workflow.select_facility(self.facility.as_str()), "Facility")?;
        require_success(workflow.select_department(self.department.as_str()), "Department")?;
        require_success(workflow.advance(), "Continue")?;

        let date = match self.date {
            Some(date) => date,
            None => workflow
                .selectable_dates(horizon)
                .first()
                .map(|d| d.date())
                .with_context(|| format!("no selectable dates in the next {} days", horizon))?,
        };
        require_success(workflow.select_date(date), "Date")?;

        let slot = match &self.slot {
            Some(slot) => SlotId::new(slot.as_str()),
            None => workflow
                .available_slots()
                .first()
                .map(|s| s.id.clone())
                .context("catalog offers no time slots")?,
        };
        require_success(workflow.select_slot(slot), "Time slot")?;
        require_success(workflow.submit(), "Submit")?;

        let booking = workflow
            .confirmed_booking()
            .context("booking was submitted without a confirmation")?;

        if self.json {
            return print_json(booking);
        }

        let facility = catalog
            .facility(&booking.facility_id)
            .map(|f| f.name.as_str())
            .unwrap_or("unknown facility");
        let department = catalog
            .department(&booking.department_id)
            .map(|d| d.name.as_str())
            .unwrap_or("unknown department");
        let slot = catalog
            .time_slot(&booking.slot_id)
            .map(|s| s.label.as_str())
            .unwrap_or("unknown slot");

        println!("✅ APPOINTMENT BOOKED:");
        println!("   🏨 {}", facility);
        println!("   🩺 {}", department);
        println!("   📅 {}", booking.date.format("%A, %B %-d, %Y"));
        println!("   🕒 {}", slot);
        println!("   🔖 Reference: {}", booking.reference);
        println!();
        println!("💡 Run 'careflow book' again to book another appointment");
        Ok(())
    }
}
