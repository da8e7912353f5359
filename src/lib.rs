// careflow library - patient appointment booking and emergency dispatch workflows
// This exposes the core components for testing and integration

pub mod booking;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod observability;
pub mod profile;
pub mod session;
pub mod shutdown;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use booking::{BookingPhase, BookingWorkflow, ConfirmedBooking, DateRejection, SchedulePolicy, SelectableDate};
pub use catalog::{Catalog, Department, DepartmentId, Facility, FacilityId, SlotId, StaticCatalog, TimeSlot};
pub use config::CareflowConfig;
pub use dispatch::{
    DeliveryPolicy, DispatchController, DispatchState, DispatchStatus, EmergencyAlert, EtaRange,
    NotificationChannel, NotificationError, NotificationReceipt, SimulatedNotificationChannel,
};
pub use observability::{workflow_metrics, WorkflowMetrics, WorkflowStats};
pub use profile::{EmergencyContact, ProfileProvider, SessionProfile, UserProfile};
pub use session::PatientSession;
pub use shutdown::ShutdownCoordinator;
pub use telemetry::{create_workflow_span, generate_correlation_id, init_telemetry};
pub use workflows::{TransitionRecord, TransitionResult, WorkflowError, WorkflowKind};
