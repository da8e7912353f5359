// Transition vocabulary shared by the booking and dispatch workflows.
// A rejected transition is inert: the caller gets the unchanged state back.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::booking::DateRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowKind {
    Booking,
    Dispatch,
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowKind::Booking => "booking",
            WorkflowKind::Dispatch => "dispatch",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{workflow} workflow cannot {action} while {state}")]
    InvalidTransition {
        workflow: WorkflowKind,
        action: &'static str,
        state: String,
    },
    #[error("missing required input: {}", .missing.join(", "))]
    IncompleteInput { missing: Vec<&'static str> },
    #[error("unknown {kind} reference: {id}")]
    UnknownReference { kind: &'static str, id: String },
    #[error("date {date} is not selectable: {reason}")]
    DateNotSelectable { date: NaiveDate, reason: DateRejection },
    #[error("no authenticated user in this session")]
    NotAuthenticated,
}

impl WorkflowError {
    pub(crate) fn invalid(workflow: WorkflowKind, action: &'static str, state: impl fmt::Display) -> Self {
        WorkflowError::InvalidTransition {
            workflow,
            action,
            state: state.to_string(),
        }
    }

    /// Boundary precondition failures propagate; everything else is a rejected input sequence.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, WorkflowError::NotAuthenticated)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionResult<S> {
    Success { previous_state: S, new_state: S },
    Rejected { reason: WorkflowError, state_preserved: S },
}

impl<S: Copy> TransitionResult<S> {
    pub fn is_success(&self) -> bool {
        matches!(self, TransitionResult::Success { .. })
    }

    /// State the workflow is in after the call.
    pub fn state(&self) -> S {
        match self {
            TransitionResult::Success { new_state, .. } => *new_state,
            TransitionResult::Rejected { state_preserved, .. } => *state_preserved,
        }
    }

    pub fn reason(&self) -> Option<&WorkflowError> {
        match self {
            TransitionResult::Success { .. } => None,
            TransitionResult::Rejected { reason, .. } => Some(reason),
        }
    }
}

/// Audit entry for one applied transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRecord<S> {
    pub from_state: S,
    pub to_state: S,
    pub action: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl<S> TransitionRecord<S> {
    pub fn now(from_state: S, to_state: S, action: &'static str) -> Self {
        Self {
            from_state,
            to_state,
            action,
            timestamp: Utc::now(),
        }
    }
}
