use chrono::Utc;
use statig::prelude::*;
use tracing::{debug, info, warn};

use super::types::{DispatchSession, DispatchState, Resolution};
use crate::observability::workflow_metrics;
use crate::workflows::TransitionRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    Trigger,
    Confirm { session: DispatchSession },
    Cancel,
    Close,
    Expire { generation: u64 },
    NotificationDelivered { generation: u64 },
    NotificationFailed { generation: u64, error: String },
}

impl DispatchEvent {
    pub fn action(&self) -> &'static str {
        match self {
            DispatchEvent::Trigger => "trigger",
            DispatchEvent::Confirm { .. } => "confirm",
            DispatchEvent::Cancel => "cancel",
            DispatchEvent::Close => "close",
            DispatchEvent::Expire { .. } => "expire",
            DispatchEvent::NotificationDelivered { .. } => "notification_delivered",
            DispatchEvent::NotificationFailed { .. } => "notification_failed",
        }
    }
}

/// Context of the dispatch state machine. Mutated only through events.
#[derive(Debug, Default)]
pub struct DispatchMachine {
    state: DispatchState,
    generation: u64,
    active: Option<DispatchSession>,
    last_session: Option<DispatchSession>,
    state_history: Vec<TransitionRecord<DispatchState>>,
}

impl DispatchMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Generation of the most recently confirmed cycle; 0 before the first one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_session(&self) -> Option<&DispatchSession> {
        self.active.as_ref()
    }

    pub fn last_session(&self) -> Option<&DispatchSession> {
        self.last_session.as_ref()
    }

    pub fn state_history(&self) -> &[TransitionRecord<DispatchState>] {
        &self.state_history
    }

    fn move_to(&mut self, to: DispatchState, action: &'static str) {
        let record = TransitionRecord::now(self.state, to, action);
        info!(
            from_state = %record.from_state,
            to_state = %record.to_state,
            action = record.action,
            generation = self.generation,
            "Dispatch workflow transition"
        );
        self.state = to;
        self.state_history.push(record);
    }

    fn retire(&mut self, resolution: Resolution) {
        if let Some(mut session) = self.active.take() {
            session.resolution = Some(resolution);
            session.resolved_at = Some(Utc::now());
            self.last_session = Some(session);
        }
        match resolution {
            Resolution::Closed => workflow_metrics().record_dispatch_closed(),
            Resolution::Expired => workflow_metrics().record_dispatch_expired(),
        }
    }

    /// Delivery results may arrive after the cycle ended; they still belong to it.
    fn session_for(&mut self, generation: u64) -> Option<&mut DispatchSession> {
        if self.active.as_ref().is_some_and(|s| s.generation == generation) {
            return self.active.as_mut();
        }
        self.last_session.as_mut().filter(|s| s.generation == generation)
    }

    fn record_delivery(&mut self, event: &DispatchEvent) {
        match event {
            DispatchEvent::NotificationDelivered { generation } => {
                if let Some(session) = self.session_for(*generation) {
                    session.contact_notified = true;
                    session.notification_error = None;
                    info!(generation, contact = %session.contact.name, "Emergency contact notified");
                }
            }
            DispatchEvent::NotificationFailed { generation, error } => {
                if let Some(session) = self.session_for(*generation) {
                    session.notification_error = Some(error.clone());
                    warn!(generation, error = %error, "Emergency contact could not be notified");
                }
            }
            _ => {}
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl DispatchMachine {
    #[state]
    fn idle(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Trigger => {
                self.move_to(DispatchState::PendingConfirmation, "trigger");
                Transition(State::pending_confirmation())
            }
            DispatchEvent::NotificationDelivered { .. } | DispatchEvent::NotificationFailed { .. } => {
                self.record_delivery(event);
                Handled
            }
            DispatchEvent::Expire { generation } => {
                debug!(generation, "Ignoring stale dispatch timeout");
                Handled
            }
            _ => Handled,
        }
    }

    #[state]
    fn pending_confirmation(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Confirm { session } => {
                self.generation = session.generation;
                self.active = Some(session.clone());
                self.move_to(DispatchState::Active, "confirm");
                Transition(State::active())
            }
            DispatchEvent::Cancel => {
                self.move_to(DispatchState::Idle, "cancel");
                Transition(State::idle())
            }
            DispatchEvent::NotificationDelivered { .. } | DispatchEvent::NotificationFailed { .. } => {
                self.record_delivery(event);
                Handled
            }
            _ => Handled,
        }
    }

    #[state]
    fn active(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Close => {
                self.retire(Resolution::Closed);
                self.move_to(DispatchState::Idle, "close");
                Transition(State::idle())
            }
            DispatchEvent::Expire { generation } if *generation == self.generation => {
                self.retire(Resolution::Expired);
                self.move_to(DispatchState::Idle, "expire");
                Transition(State::idle())
            }
            DispatchEvent::Expire { generation } => {
                debug!(generation, active = self.generation, "Ignoring stale dispatch timeout");
                Handled
            }
            DispatchEvent::NotificationDelivered { .. } | DispatchEvent::NotificationFailed { .. } => {
                self.record_delivery(event);
                Handled
            }
            _ => Handled,
        }
    }
}
