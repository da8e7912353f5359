use anyhow::Result;
use chrono::Weekday;

use crate::booking::SchedulePolicy;
use crate::config::BookingConfig;

pub struct CalendarCommand {
    pub days: Option<u32>,
}

impl CalendarCommand {
    pub fn new(days: Option<u32>) -> Self {
        Self { days }
    }

    pub fn execute(&self, config: &BookingConfig) -> Result<()> {
        let policy = SchedulePolicy::from_local_clock(config);
        let horizon = self.days.unwrap_or(config.horizon_days);

        println!("📅 Appointment calendar from {}", policy.today().format("%A, %B %-d, %Y"));
        println!("   🚫 Closed on: {}", closed_days(policy.non_business_days()));
        println!();

        let dates: Vec<_> = policy.selectable_dates(horizon).collect();
        if dates.is_empty() {
            println!("📋 No selectable dates in the next {} days", horizon);
            return Ok(());
        }

        for date in &dates {
            println!("   ✅ {}", date);
        }
        println!();
        println!("📈 {} selectable dates in the next {} days", dates.len(), horizon);
        Ok(())
    }
}

fn closed_days(days: &[Weekday]) -> String {
    if days.is_empty() {
        return "none".to_string();
    }
    days.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
}
