use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::calendar::{SchedulePolicy, SelectableDate};
use super::types::*;
use crate::catalog::{Catalog, DepartmentId, FacilityId, SlotId, TimeSlot};
use crate::observability::workflow_metrics;
use crate::telemetry::{create_workflow_span, generate_correlation_id};
use crate::workflows::{TransitionRecord, TransitionResult, WorkflowError, WorkflowKind};

/// Two-step appointment wizard that emits one [`ConfirmedBooking`] per cycle.
pub struct BookingWorkflow {
    catalog: Arc<dyn Catalog>,
    policy: SchedulePolicy,
    step: BookingStep,
    correlation_id: String,
    span: tracing::Span,
    state_history: Vec<TransitionRecord<BookingPhase>>,
}

impl std::fmt::Debug for BookingWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingWorkflow")
            .field("policy", &self.policy)
            .field("step", &self.step)
            .field("correlation_id", &self.correlation_id)
            .field("state_history", &self.state_history)
            .finish()
    }
}

impl BookingWorkflow {
    pub fn new(catalog: Arc<dyn Catalog>, policy: SchedulePolicy) -> Self {
        let correlation_id = generate_correlation_id();
        let span = create_workflow_span("booking", &correlation_id, None);
        Self {
            catalog,
            policy,
            step: BookingStep::default(),
            correlation_id,
            span,
            state_history: Vec::new(),
        }
    }

    pub fn for_user(catalog: Arc<dyn Catalog>, policy: SchedulePolicy, user_id: &str) -> Self {
        let mut workflow = Self::new(catalog, policy);
        workflow.span = create_workflow_span("booking", &workflow.correlation_id, Some(user_id));
        workflow
    }

    pub fn phase(&self) -> BookingPhase {
        self.step.phase()
    }

    pub fn step(&self) -> &BookingStep {
        &self.step
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn state_history(&self) -> &[TransitionRecord<BookingPhase>] {
        &self.state_history
    }

    pub fn facility(&self) -> Option<&FacilityId> {
        match &self.step {
            BookingStep::SelectingResource { resource, .. } => resource.facility.as_ref(),
            BookingStep::SelectingSchedule { resource, .. } => Some(&resource.facility),
            BookingStep::Submitted { booking } => Some(&booking.facility_id),
        }
    }

    pub fn department(&self) -> Option<&DepartmentId> {
        match &self.step {
            BookingStep::SelectingResource { resource, .. } => resource.department.as_ref(),
            BookingStep::SelectingSchedule { resource, .. } => Some(&resource.department),
            BookingStep::Submitted { booking } => Some(&booking.department_id),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match &self.step {
            BookingStep::SelectingResource { schedule, .. } | BookingStep::SelectingSchedule { schedule, .. } => {
                schedule.date.map(|d| d.date())
            }
            BookingStep::Submitted { booking } => Some(booking.date),
        }
    }

    pub fn slot(&self) -> Option<&SlotId> {
        match &self.step {
            BookingStep::SelectingResource { schedule, .. } | BookingStep::SelectingSchedule { schedule, .. } => {
                schedule.slot.as_ref()
            }
            BookingStep::Submitted { booking } => Some(&booking.slot_id),
        }
    }

    pub fn confirmed_booking(&self) -> Option<&ConfirmedBooking> {
        match &self.step {
            BookingStep::Submitted { booking } => Some(booking),
            _ => None,
        }
    }

    /// Whether the "Continue" action is enabled.
    pub fn can_advance(&self) -> bool {
        matches!(&self.step, BookingStep::SelectingResource { resource, .. } if resource.complete().is_ok())
    }

    /// Whether the "Book Appointment" action is enabled.
    pub fn can_submit(&self) -> bool {
        matches!(&self.step, BookingStep::SelectingSchedule { schedule, .. } if schedule.complete().is_ok())
    }

    /// Dates the calendar offers, within `horizon_days` of the wizard's start day.
    pub fn selectable_dates(&self, horizon_days: u32) -> Vec<SelectableDate> {
        self.policy.selectable_dates(horizon_days).collect()
    }

    /// Every catalog slot is offered; existing bookings are not consulted.
    pub fn available_slots(&self) -> &[TimeSlot] {
        self.catalog.list_time_slots()
    }

    pub fn select_facility(&mut self, id: impl Into<FacilityId>) -> TransitionResult<BookingPhase> {
        let id = id.into();
        if self.phase() != BookingPhase::SelectingResource {
            return self.reject(WorkflowError::invalid(WorkflowKind::Booking, "select a facility", self.phase()));
        }
        if self.catalog.facility(&id).is_none() {
            return self.reject(WorkflowError::UnknownReference {
                kind: "facility",
                id: id.0,
            });
        }
        if let BookingStep::SelectingResource { resource, .. } = &mut self.step {
            resource.facility = Some(id);
        }
        self.unchanged_phase("select_facility")
    }

    pub fn select_department(&mut self, id: impl Into<DepartmentId>) -> TransitionResult<BookingPhase> {
        let id = id.into();
        if self.phase() != BookingPhase::SelectingResource {
            return self.reject(WorkflowError::invalid(WorkflowKind::Booking, "select a department", self.phase()));
        }
        if self.catalog.department(&id).is_none() {
            return self.reject(WorkflowError::UnknownReference {
                kind: "department",
                id: id.0,
            });
        }
        if let BookingStep::SelectingResource { resource, .. } = &mut self.step {
            resource.department = Some(id);
        }
        self.unchanged_phase("select_department")
    }

    pub fn select_date(&mut self, date: NaiveDate) -> TransitionResult<BookingPhase> {
        if self.phase() != BookingPhase::SelectingSchedule {
            return self.reject(WorkflowError::invalid(WorkflowKind::Booking, "select a date", self.phase()));
        }
        let selectable = match self.policy.check(date) {
            Ok(selectable) => selectable,
            Err(reason) => return self.reject(WorkflowError::DateNotSelectable { date, reason }),
        };
        if let BookingStep::SelectingSchedule { schedule, .. } = &mut self.step {
            schedule.date = Some(selectable);
        }
        self.unchanged_phase("select_date")
    }

    pub fn select_slot(&mut self, id: impl Into<SlotId>) -> TransitionResult<BookingPhase> {
        let id = id.into();
        if self.phase() != BookingPhase::SelectingSchedule {
            return self.reject(WorkflowError::invalid(WorkflowKind::Booking, "select a time slot", self.phase()));
        }
        if self.catalog.time_slot(&id).is_none() {
            return self.reject(WorkflowError::UnknownReference {
                kind: "time slot",
                id: id.0,
            });
        }
        if let BookingStep::SelectingSchedule { schedule, .. } = &mut self.step {
            schedule.slot = Some(id);
        }
        self.unchanged_phase("select_slot")
    }

    pub fn advance(&mut self) -> TransitionResult<BookingPhase> {
        let next = match &self.step {
            BookingStep::SelectingResource { resource, schedule } => match resource.complete() {
                Ok(selection) => BookingStep::SelectingSchedule {
                    resource: selection,
                    schedule: schedule.clone(),
                },
                Err(missing) => return self.reject(WorkflowError::IncompleteInput { missing }),
            },
            _ => return self.reject(WorkflowError::invalid(WorkflowKind::Booking, "advance", self.phase())),
        };
        self.apply(next, "advance")
    }

    pub fn back(&mut self) -> TransitionResult<BookingPhase> {
        let next = match &self.step {
            BookingStep::SelectingSchedule { resource, schedule } => BookingStep::SelectingResource {
                resource: ResourceDraft::from(resource.clone()),
                schedule: schedule.clone(),
            },
            _ => return self.reject(WorkflowError::invalid(WorkflowKind::Booking, "go back", self.phase())),
        };
        self.apply(next, "back")
    }

    pub fn submit(&mut self) -> TransitionResult<BookingPhase> {
        let booking = match &self.step {
            BookingStep::SelectingSchedule { resource, schedule } => match schedule.complete() {
                Ok((date, slot)) => {
                    // the day may have rolled over since the date was picked
                    if let Err(reason) = self.policy.check(date.date()) {
                        return self.reject(WorkflowError::DateNotSelectable {
                            date: date.date(),
                            reason,
                        });
                    }
                    ConfirmedBooking::from_draft(resource.clone(), date, slot)
                }
                Err(missing) => return self.reject(WorkflowError::IncompleteInput { missing }),
            },
            _ => return self.reject(WorkflowError::invalid(WorkflowKind::Booking, "submit", self.phase())),
        };

        {
            let _guard = self.span.enter();
            info!(
                reference = %booking.reference,
                facility = %booking.facility_id,
                department = %booking.department_id,
                date = %booking.date,
                slot = %booking.slot_id,
                "Appointment booked"
            );
        }
        workflow_metrics().record_booking_confirmed();

        self.apply(BookingStep::Submitted { booking }, "submit")
    }

    /// "Book another": clears the draft after a submission.
    pub fn restart(&mut self) -> TransitionResult<BookingPhase> {
        if self.phase() != BookingPhase::Submitted {
            return self.reject(WorkflowError::invalid(WorkflowKind::Booking, "restart", self.phase()));
        }
        self.apply(BookingStep::default(), "restart")
    }

    fn apply(&mut self, next: BookingStep, action: &'static str) -> TransitionResult<BookingPhase> {
        let previous_state = self.phase();
        let new_state = next.phase();
        self.step = next;

        let record = TransitionRecord::now(previous_state, new_state, action);
        let _guard = self.span.enter();
        info!(
            from_state = %record.from_state,
            to_state = %record.to_state,
            action = record.action,
            "Booking workflow transition"
        );
        self.state_history.push(record);

        TransitionResult::Success {
            previous_state,
            new_state,
        }
    }

    fn unchanged_phase(&self, action: &'static str) -> TransitionResult<BookingPhase> {
        let _guard = self.span.enter();
        debug!(action, phase = %self.phase(), "Booking draft updated");
        TransitionResult::Success {
            previous_state: self.phase(),
            new_state: self.phase(),
        }
    }

    fn reject(&self, reason: WorkflowError) -> TransitionResult<BookingPhase> {
        let _guard = self.span.enter();
        warn!(phase = %self.phase(), reason = %reason, "Booking action rejected");
        workflow_metrics().record_rejected_transition();
        TransitionResult::Rejected {
            reason,
            state_preserved: self.phase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::DateRejection;
    use crate::catalog::StaticCatalog;
    use chrono::{Datelike, Weekday};
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        // a Wednesday
        NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
    }

    fn next_monday() -> NaiveDate {
        today()
            .iter_days()
            .skip(1)
            .find(|d| d.weekday() == Weekday::Mon)
            .unwrap()
    }

    fn workflow() -> BookingWorkflow {
        BookingWorkflow::new(Arc::new(StaticCatalog::seeded()), SchedulePolicy::weekdays_from(today()))
    }

    fn workflow_at_schedule() -> BookingWorkflow {
        let mut wf = workflow();
        wf.select_facility("h1");
        wf.select_department("d1");
        assert!(wf.advance().is_success());
        wf
    }

    #[test]
    fn test_books_appointment_end_to_end() {
        let mut wf = workflow();

        assert!(wf.select_facility("h3").is_success());
        assert!(wf.select_department("d2").is_success());
        assert!(wf.can_advance());
        assert_eq!(wf.advance().state(), BookingPhase::SelectingSchedule);

        assert!(wf.select_date(next_monday()).is_success());
        assert!(wf.select_slot("t5").is_success());
        let result = wf.submit();

        assert_eq!(
            result,
            TransitionResult::Success {
                previous_state: BookingPhase::SelectingSchedule,
                new_state: BookingPhase::Submitted,
            }
        );
        let booking = wf.confirmed_booking().unwrap();
        assert_eq!(booking.facility_id.as_str(), "h3");
        assert_eq!(booking.department_id.as_str(), "d2");
        assert_eq!(booking.date, NaiveDate::from_ymd_opt(2026, 10, 26).unwrap());
        assert_eq!(booking.slot_id.as_str(), "t5");
    }

    #[test]
    fn test_advance_with_only_facility_is_inert() {
        let mut wf = workflow();
        wf.select_facility("h3");

        let result = wf.advance();

        assert_eq!(result.state(), BookingPhase::SelectingResource);
        assert_eq!(
            result.reason(),
            Some(&WorkflowError::IncompleteInput {
                missing: vec!["department"]
            })
        );
        assert_eq!(wf.facility().map(|f| f.as_str()), Some("h3"));
        assert!(wf.state_history().is_empty());
        assert!(wf.confirmed_booking().is_none());
    }

    #[test]
    fn test_advance_gate_over_all_field_combinations() {
        for (facility, department) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut wf = workflow();
            if facility {
                wf.select_facility("h2");
            }
            if department {
                wf.select_department("d5");
            }

            let advanced = wf.advance().is_success();
            assert_eq!(advanced, facility && department);
            let expected = if advanced {
                BookingPhase::SelectingSchedule
            } else {
                BookingPhase::SelectingResource
            };
            assert_eq!(wf.phase(), expected);
        }
    }

    #[test]
    fn test_submit_gate_over_all_field_combinations() {
        for (date, slot) in [(false, false), (true, false), (false, true), (true, true)] {
            let mut wf = workflow_at_schedule();
            if date {
                wf.select_date(next_monday());
            }
            if slot {
                wf.select_slot("t1");
            }

            let submitted = wf.submit().is_success();
            assert_eq!(submitted, date && slot);
            assert_eq!(wf.confirmed_booking().is_some(), submitted);
        }
    }

    #[test]
    fn test_back_restores_resource_selection() {
        let mut wf = workflow();
        wf.select_facility("h4");
        wf.select_department("d7");
        let before = (wf.facility().cloned(), wf.department().cloned());

        wf.advance();
        wf.select_slot("t3");
        assert!(wf.back().is_success());

        assert_eq!(wf.phase(), BookingPhase::SelectingResource);
        assert_eq!((wf.facility().cloned(), wf.department().cloned()), before);
        // schedule choices survive the round trip
        assert_eq!(wf.slot().map(|s| s.as_str()), Some("t3"));
        assert!(wf.advance().is_success());
        assert_eq!(wf.slot().map(|s| s.as_str()), Some("t3"));
    }

    #[test]
    fn test_past_and_weekend_dates_never_enter_draft() {
        let mut wf = workflow_at_schedule();
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        let yesterday = today().pred_opt().unwrap();

        let result = wf.select_date(saturday);
        assert_eq!(
            result.reason(),
            Some(&WorkflowError::DateNotSelectable {
                date: saturday,
                reason: DateRejection::NonBusinessDay { weekday: Weekday::Sat },
            })
        );
        assert!(!wf.select_date(yesterday).is_success());
        assert_eq!(wf.date(), None);

        for offered in wf.selectable_dates(30) {
            assert!(offered.date() >= today());
            assert!(!matches!(offered.date().weekday(), Weekday::Sat | Weekday::Sun));
        }
    }

    #[test]
    fn test_submit_rejects_date_that_passed_while_drafting() {
        let day = Arc::new(Mutex::new(today()));
        let clock_day = Arc::clone(&day);
        let policy = SchedulePolicy::with_clock(
            Arc::new(move || *clock_day.lock().unwrap()),
            vec![Weekday::Sat, Weekday::Sun],
        );
        let mut wf = BookingWorkflow::new(Arc::new(StaticCatalog::seeded()), policy);
        wf.select_facility("h1");
        wf.select_department("d1");
        assert!(wf.advance().is_success());
        assert!(wf.select_date(today()).is_success());
        assert!(wf.select_slot("t1").is_success());

        let tomorrow = today().succ_opt().unwrap();
        *day.lock().unwrap() = tomorrow;
        let result = wf.submit();

        assert_eq!(
            result.reason(),
            Some(&WorkflowError::DateNotSelectable {
                date: today(),
                reason: DateRejection::InPast { today: tomorrow },
            })
        );
        assert_eq!(wf.phase(), BookingPhase::SelectingSchedule);
        assert!(wf.confirmed_booking().is_none());

        assert!(wf.select_date(tomorrow).is_success());
        assert!(wf.submit().is_success());
    }

    #[test]
    fn test_unknown_references_are_rejected() {
        let mut wf = workflow();

        let result = wf.select_facility("h42");
        assert_eq!(
            result.reason(),
            Some(&WorkflowError::UnknownReference {
                kind: "facility",
                id: "h42".to_string()
            })
        );
        assert!(wf.facility().is_none());

        let mut wf = workflow_at_schedule();
        assert!(!wf.select_slot("t0").is_success());
        assert!(wf.slot().is_none());
    }

    #[test]
    fn test_transitions_from_wrong_step_are_inert() {
        let mut wf = workflow();

        assert!(!wf.back().is_success());
        assert!(!wf.submit().is_success());
        assert!(!wf.restart().is_success());
        assert!(!wf.select_date(next_monday()).is_success());
        assert_eq!(wf.phase(), BookingPhase::SelectingResource);

        let mut wf = workflow_at_schedule();
        assert!(!wf.select_facility("h2").is_success());
        assert_eq!(wf.facility().map(|f| f.as_str()), Some("h1"));
    }

    #[test]
    fn test_confirmed_booking_is_not_affected_by_later_calls() {
        let mut wf = workflow_at_schedule();
        wf.select_date(next_monday());
        wf.select_slot("t9");
        wf.submit();
        let snapshot = wf.confirmed_booking().cloned().unwrap();

        assert!(!wf.select_slot("t10").is_success());
        assert!(!wf.submit().is_success());
        assert_eq!(wf.confirmed_booking(), Some(&snapshot));
    }

    #[test]
    fn test_restart_clears_draft() {
        let mut wf = workflow_at_schedule();
        wf.select_date(next_monday());
        wf.select_slot("t2");
        wf.submit();

        assert!(wf.restart().is_success());
        assert_eq!(wf.phase(), BookingPhase::SelectingResource);
        assert!(wf.facility().is_none());
        assert!(wf.slot().is_none());
        assert!(wf.date().is_none());

        let actions: Vec<&str> = wf.state_history().iter().map(|r| r.action).collect();
        assert_eq!(actions, vec!["advance", "submit", "restart"]);
    }

    #[test]
    fn test_every_catalog_slot_is_offered() {
        let wf = workflow_at_schedule();
        assert_eq!(wf.available_slots().len(), 14);
    }
}
