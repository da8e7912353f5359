//! Appointment calendar policy
//!
//! Dates before the current day and dates on non-business weekdays are never
//! offered. A [`SelectableDate`] can only be minted by [`SchedulePolicy::check`],
//! and the draft date is checked again on submit because "today" moves.

use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::config::BookingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DateRejection {
    #[error("it is before {today}")]
    InPast { today: NaiveDate },
    #[error("{weekday} is not a business day")]
    NonBusinessDay { weekday: Weekday },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SelectableDate(NaiveDate);

impl SelectableDate {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for SelectableDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%A, %B %-d, %Y"))
    }
}

/// Source of the current calendar day.
pub type DayClock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Clone)]
enum Today {
    Fixed(NaiveDate),
    Clock(DayClock),
}

#[derive(Clone)]
pub struct SchedulePolicy {
    today: Today,
    non_business_days: Vec<Weekday>,
}

impl fmt::Debug for SchedulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulePolicy")
            .field("today", &self.today())
            .field("fixed", &matches!(self.today, Today::Fixed(_)))
            .field("non_business_days", &self.non_business_days)
            .finish()
    }
}

impl SchedulePolicy {
    /// Calendar pinned to one day.
    pub fn new(today: NaiveDate, non_business_days: Vec<Weekday>) -> Self {
        Self {
            today: Today::Fixed(today),
            non_business_days,
        }
    }

    /// Calendar that asks `clock` for the current day on every check.
    pub fn with_clock(clock: DayClock, non_business_days: Vec<Weekday>) -> Self {
        Self {
            today: Today::Clock(clock),
            non_business_days,
        }
    }

    /// Monday-to-Friday calendar anchored at `today`.
    pub fn weekdays_from(today: NaiveDate) -> Self {
        Self::new(today, vec![Weekday::Sat, Weekday::Sun])
    }

    pub fn from_config(config: &BookingConfig, today: NaiveDate) -> Self {
        Self::new(today, config.non_business_days.clone())
    }

    /// Follows the local date, so a wizard left open past midnight stops offering yesterday.
    pub fn from_local_clock(config: &BookingConfig) -> Self {
        Self::with_clock(Arc::new(|| Local::now().date_naive()), config.non_business_days.clone())
    }

    pub fn today(&self) -> NaiveDate {
        match &self.today {
            Today::Fixed(day) => *day,
            Today::Clock(clock) => clock(),
        }
    }

    pub fn non_business_days(&self) -> &[Weekday] {
        &self.non_business_days
    }

    pub fn check(&self, date: NaiveDate) -> Result<SelectableDate, DateRejection> {
        self.check_against(date, self.today())
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        self.check(date).is_ok()
    }

    /// Dates the calendar offers within `horizon_days` of today, in order.
    pub fn selectable_dates(&self, horizon_days: u32) -> impl Iterator<Item = SelectableDate> + '_ {
        let today = self.today();
        today
            .iter_days()
            .take(horizon_days as usize)
            .filter_map(move |date| self.check_against(date, today).ok())
    }

    pub fn first_selectable(&self, horizon_days: u32) -> Option<SelectableDate> {
        self.selectable_dates(horizon_days).next()
    }

    fn check_against(&self, date: NaiveDate, today: NaiveDate) -> Result<SelectableDate, DateRejection> {
        if date < today {
            return Err(DateRejection::InPast { today });
        }
        let weekday = date.weekday();
        if self.non_business_days.contains(&weekday) {
            return Err(DateRejection::NonBusinessDay { weekday });
        }
        Ok(SelectableDate(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
    }

    #[test]
    fn test_past_dates_are_rejected() {
        let policy = SchedulePolicy::weekdays_from(wednesday());
        let yesterday = wednesday().pred_opt().unwrap();

        assert_eq!(
            policy.check(yesterday),
            Err(DateRejection::InPast { today: wednesday() })
        );
        assert!(policy.is_selectable(wednesday()));
    }

    #[test]
    fn test_weekends_are_rejected() {
        let policy = SchedulePolicy::weekdays_from(wednesday());
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();

        assert_eq!(
            policy.check(saturday),
            Err(DateRejection::NonBusinessDay { weekday: Weekday::Sat })
        );
        assert!(!policy.is_selectable(sunday));
    }

    #[test]
    fn test_selectable_dates_never_offer_rejected_days() {
        let policy = SchedulePolicy::weekdays_from(wednesday());
        let offered: Vec<NaiveDate> = policy.selectable_dates(60).map(|d| d.date()).collect();

        assert!(!offered.is_empty());
        for date in &offered {
            assert!(*date >= wednesday());
            assert!(!matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
        }
        // Wed, Thu, Fri, then Mon
        assert_eq!(offered[3], NaiveDate::from_ymd_opt(2026, 10, 26).unwrap());
    }

    #[test]
    fn test_configured_non_business_days() {
        let policy = SchedulePolicy::new(wednesday(), vec![Weekday::Fri, Weekday::Sat]);
        let friday = NaiveDate::from_ymd_opt(2026, 10, 23).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2026, 10, 25).unwrap();

        assert!(!policy.is_selectable(friday));
        assert!(policy.is_selectable(sunday));
    }

    #[test]
    fn test_clock_is_consulted_on_every_check() {
        let day = Arc::new(Mutex::new(wednesday()));
        let clock_day = Arc::clone(&day);
        let policy = SchedulePolicy::with_clock(
            Arc::new(move || *clock_day.lock().unwrap()),
            vec![Weekday::Sat, Weekday::Sun],
        );
        assert!(policy.is_selectable(wednesday()));

        let thursday = wednesday().succ_opt().unwrap();
        *day.lock().unwrap() = thursday;

        assert_eq!(policy.today(), thursday);
        assert_eq!(
            policy.check(wednesday()),
            Err(DateRejection::InPast { today: thursday })
        );
        assert_eq!(policy.first_selectable(7).map(|d| d.date()), Some(thursday));
    }

    #[test]
    fn test_display_format() {
        let policy = SchedulePolicy::weekdays_from(wednesday());
        let date = policy.check(wednesday()).unwrap();

        assert_eq!(date.to_string(), "Wednesday, October 21, 2026");
    }
}
