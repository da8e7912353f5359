// Appointment booking wizard
//
// Resource selection -> schedule selection -> submit, with the draft modeled
// per step so a schedule step never exists without a complete resource step.

pub mod calendar;
pub mod types;
pub mod workflow;

pub use calendar::{DateRejection, DayClock, SchedulePolicy, SelectableDate};
pub use types::{BookingPhase, BookingStep, ConfirmedBooking, ResourceDraft, ResourceSelection, ScheduleDraft};
pub use workflow::BookingWorkflow;
