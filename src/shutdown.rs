use anyhow::Result;
use std::future::Future;
use tracing::{info, warn};

use crate::dispatch::{DispatchController, DispatchState};
use crate::observability::workflow_metrics;

/// Graceful shutdown coordinator for careflow
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    dispatch: Option<DispatchController>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch cycle to resolve before the process exits
    pub fn with_dispatch(dispatch: DispatchController) -> Self {
        Self {
            dispatch: Some(dispatch),
        }
    }

    /// Run `work` to completion unless Ctrl-C arrives first.
    /// Returns `None` when interrupted; shutdown has run either way.
    pub async fn run_until_shutdown<F, T>(self, work: F) -> Result<Option<T>>
    where
        F: Future<Output = Result<T>>,
    {
        let outcome = tokio::select! {
            result = work => Some(result),
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("Interrupt received, shutting down"),
                    Err(e) => warn!("Failed to listen for interrupt: {}", e),
                }
                None
            }
        };

        self.shutdown_all_services();

        match outcome {
            Some(result) => result.map(Some),
            None => Ok(None),
        }
    }

    /// Resolve outstanding workflows and log final counters
    pub fn shutdown_all_services(&self) {
        if let Some(dispatch) = &self.dispatch {
            let state = dispatch.state();
            if state != DispatchState::Idle {
                info!(state = %state, "Resolving emergency dispatch before exit");
                dispatch.reset();
            }
        }

        workflow_metrics().log_stats();
        info!("Graceful shutdown completed successfully");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::config::DispatchConfig;
    use crate::dispatch::{DeliveryPolicy, SimulatedNotificationChannel};
    use crate::profile::{SessionProfile, UserProfile};
    use std::sync::Arc;

    fn dispatch() -> DispatchController {
        DispatchController::new(
            Arc::new(StaticCatalog::seeded()),
            Arc::new(SessionProfile::signed_in(UserProfile::demo())),
            Arc::new(SimulatedNotificationChannel::new()),
            DispatchConfig::default(),
            DeliveryPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_completed_work_is_returned() {
        let coordinator = ShutdownCoordinator::new();

        let result = coordinator.run_until_shutdown(async { Ok::<_, anyhow::Error>(42) }).await.unwrap();

        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn test_work_error_propagates() {
        let coordinator = ShutdownCoordinator::new();

        let result = coordinator
            .run_until_shutdown(async { Err::<(), _>(anyhow::anyhow!("boom")) })
            .await;

        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_resolves_active_dispatch() {
        let dispatch = dispatch();
        assert!(dispatch.trigger().unwrap().is_success());
        assert!(dispatch.confirm().await.unwrap().is_success());
        assert_eq!(dispatch.state(), DispatchState::Active);

        ShutdownCoordinator::with_dispatch(dispatch.clone()).shutdown_all_services();

        assert_eq!(dispatch.state(), DispatchState::Idle);
        assert_eq!(dispatch.state_history().last().map(|r| r.action), Some("close"));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_dispatch() {
        let dispatch = dispatch();
        assert!(dispatch.trigger().unwrap().is_success());
        assert_eq!(dispatch.state(), DispatchState::PendingConfirmation);

        ShutdownCoordinator::with_dispatch(dispatch.clone()).shutdown_all_services();

        assert_eq!(dispatch.state(), DispatchState::Idle);
        assert_eq!(dispatch.state_history().last().map(|r| r.action), Some("cancel"));
        assert!(dispatch.last_session().is_none());
    }
}
