// Workflow plumbing shared by booking and dispatch

pub mod state_machine;

pub use state_machine::{TransitionRecord, TransitionResult, WorkflowError, WorkflowKind};
