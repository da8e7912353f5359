use statig::prelude::*;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::notification::{deliver_with_retry, DeliveryPolicy, NotificationChannel};
use super::state_machine::{DispatchEvent, DispatchMachine};
use super::types::*;
use crate::catalog::{Catalog, Facility, FacilityId};
use crate::config::{CareflowConfig, DispatchConfig};
use crate::observability::workflow_metrics;
use crate::profile::ProfileProvider;
use crate::workflows::{TransitionRecord, TransitionResult, WorkflowError, WorkflowKind};

struct DispatchShared {
    machine: StateMachine<DispatchMachine>,
    /// Cancellation handle for the auto-timeout of the active cycle
    expiry: Option<JoinHandle<()>>,
}

/// Handle to one session's dispatch workflow. Clones share the same cycle.
#[derive(Clone)]
pub struct DispatchController {
    shared: Arc<Mutex<DispatchShared>>,
    catalog: Arc<dyn Catalog>,
    profiles: Arc<dyn ProfileProvider>,
    channel: Arc<dyn NotificationChannel>,
    config: DispatchConfig,
    delivery: DeliveryPolicy,
}

impl std::fmt::Debug for DispatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchController")
            .field("state", &self.state())
            .field("config", &self.config)
            .field("delivery", &self.delivery)
            .finish()
    }
}

impl DispatchController {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        profiles: Arc<dyn ProfileProvider>,
        channel: Arc<dyn NotificationChannel>,
        config: DispatchConfig,
        delivery: DeliveryPolicy,
    ) -> Self {
        Self {
            shared: Arc::new(Mutex::new(DispatchShared {
                machine: DispatchMachine::new().state_machine(),
                expiry: None,
            })),
            catalog,
            profiles,
            channel,
            config,
            delivery,
        }
    }

    pub fn from_config(
        catalog: Arc<dyn Catalog>,
        profiles: Arc<dyn ProfileProvider>,
        channel: Arc<dyn NotificationChannel>,
        config: &CareflowConfig,
    ) -> Self {
        Self::new(
            catalog,
            profiles,
            channel,
            config.dispatch.clone(),
            DeliveryPolicy::from(&config.notification),
        )
    }

    pub fn state(&self) -> DispatchState {
        self.lock().machine.inner().state()
    }

    pub fn status(&self) -> DispatchStatus {
        let shared = self.lock();
        let machine = shared.machine.inner();
        DispatchStatus::from_session(machine.state(), machine.active_session())
    }

    /// Most recent finished cycle, kept readable after returning to idle.
    pub fn last_session(&self) -> Option<DispatchSession> {
        self.lock().machine.inner().last_session().cloned()
    }

    pub fn active_session(&self) -> Option<DispatchSession> {
        self.lock().machine.inner().active_session().cloned()
    }

    pub fn state_history(&self) -> Vec<TransitionRecord<DispatchState>> {
        self.lock().machine.inner().state_history().to_vec()
    }

    pub fn auto_timeout(&self) -> std::time::Duration {
        self.config.auto_timeout()
    }

    /// Emergency button pressed: ask for confirmation.
    pub fn trigger(&self) -> Result<TransitionResult<DispatchState>, WorkflowError> {
        let patient = self.profiles.require_user()?;
        info!(user_id = %patient.id, "Emergency button pressed");
        Ok(self.transition(DispatchEvent::Trigger, DispatchState::Idle))
    }

    pub fn cancel(&self) -> TransitionResult<DispatchState> {
        self.transition(DispatchEvent::Cancel, DispatchState::PendingConfirmation)
    }

    /// Activate the dispatch, arm the auto-timeout, then notify the emergency contact.
    ///
    /// The returned result reflects the state transition only; delivery
    /// problems show up in [`DispatchStatus::notification_error`].
    pub async fn confirm(&self) -> Result<TransitionResult<DispatchState>, WorkflowError> {
        let patient = self.profiles.require_user()?;
        let facility = self.responding_facility().cloned();

        let (result, alert) = {
            let mut shared = self.lock();
            let current = shared.machine.inner().state();
            if current != DispatchState::PendingConfirmation {
                return Ok(self.rejected("confirm", current));
            }

            let generation = shared.machine.inner().generation() + 1;
            let session = DispatchSession::new(
                generation,
                EtaRange {
                    low_minutes: self.config.eta_low_minutes,
                    high_minutes: self.config.eta_high_minutes,
                },
                facility.as_ref().map(|f| f.id.clone()),
                patient.emergency_contact.clone(),
            );
            let alert = EmergencyAlert::new(&patient, &session, facility.as_ref());

            shared.machine.handle(&DispatchEvent::Confirm { session });
            if let Some(stale) = shared.expiry.replace(self.arm_expiry(generation)) {
                stale.abort();
            }

            (
                TransitionResult::Success {
                    previous_state: current,
                    new_state: shared.machine.inner().state(),
                },
                alert,
            )
        };
        workflow_metrics().record_dispatch_confirmed();

        let event = match deliver_with_retry(self.channel.as_ref(), &alert, &self.delivery).await {
            Ok(receipt) => {
                info!(receipt = %receipt.reference, generation = alert.generation, "Emergency alert delivered");
                DispatchEvent::NotificationDelivered {
                    generation: alert.generation,
                }
            }
            Err(error) => {
                workflow_metrics().record_notification_failure();
                warn!(error = %error, generation = alert.generation, "Emergency alert delivery failed");
                DispatchEvent::NotificationFailed {
                    generation: alert.generation,
                    error: error.to_string(),
                }
            }
        };
        self.lock().machine.handle(&event);

        Ok(result)
    }

    /// Resolve the active dispatch. Safe to call repeatedly or after the timeout fired.
    pub fn close(&self) -> TransitionResult<DispatchState> {
        let mut shared = self.lock();
        let current = shared.machine.inner().state();
        if current != DispatchState::Active {
            return self.rejected("close", current);
        }
        if let Some(handle) = shared.expiry.take() {
            handle.abort();
        }
        shared.machine.handle(&DispatchEvent::Close);
        TransitionResult::Success {
            previous_state: current,
            new_state: shared.machine.inner().state(),
        }
    }

    /// Back to idle from any state; used when the session ends.
    pub fn reset(&self) {
        match self.state() {
            DispatchState::PendingConfirmation => {
                self.cancel();
            }
            DispatchState::Active => {
                self.close();
            }
            DispatchState::Idle => {}
        }
    }

    fn responding_facility(&self) -> Option<&Facility> {
        if let Some(id) = &self.config.responding_facility_id {
            let configured = self.catalog.facility(&FacilityId::new(id.as_str()));
            if configured.is_some() {
                return configured;
            }
            warn!(facility = %id, "Configured responding facility not in catalog, using nearest");
        }
        self.catalog.nearest_emergency_facility()
    }

    fn arm_expiry(&self, generation: u64) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        let timeout = self.config.auto_timeout();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut shared = shared.lock().unwrap_or_else(|e| e.into_inner());
            let before = shared.machine.inner().state();
            shared.machine.handle(&DispatchEvent::Expire { generation });
            if shared.machine.inner().state() != before {
                info!(generation, "Emergency dispatch auto-closed after timeout");
                shared.expiry = None;
            }
        })
    }

    fn transition(&self, event: DispatchEvent, required: DispatchState) -> TransitionResult<DispatchState> {
        let mut shared = self.lock();
        let current = shared.machine.inner().state();
        if current != required {
            return self.rejected(event.action(), current);
        }
        shared.machine.handle(&event);
        TransitionResult::Success {
            previous_state: current,
            new_state: shared.machine.inner().state(),
        }
    }

    fn rejected(&self, action: &'static str, current: DispatchState) -> TransitionResult<DispatchState> {
        let reason = WorkflowError::invalid(WorkflowKind::Dispatch, action, current);
        warn!(state = %current, reason = %reason, "Dispatch action rejected");
        workflow_metrics().record_rejected_transition();
        TransitionResult::Rejected {
            reason,
            state_preserved: current,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DispatchShared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}
