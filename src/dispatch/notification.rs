// Emergency contact notification boundary
//
// The state machine never waits on delivery: a failed or slow notification is
// reported in the dispatch status, the transition itself has already happened.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use super::types::EmergencyAlert;
use crate::config::NotificationConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("notification gateway unreachable: {0}")]
    Unreachable(String),
    #[error("notification rejected: {0}")]
    Rejected(String),
    #[error("notification attempt timed out after {0:?}")]
    TimedOut(Duration),
}

impl NotificationError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, NotificationError::Rejected(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationReceipt {
    pub reference: Uuid,
    pub delivered_at: DateTime<Utc>,
}

impl NotificationReceipt {
    pub fn now() -> Self {
        Self {
            reference: Uuid::new_v4(),
            delivered_at: Utc::now(),
        }
    }
}

/// Channel that reaches the patient's emergency contact.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn notify(&self, alert: &EmergencyAlert) -> Result<NotificationReceipt, NotificationError>;
}

/// Stand-in gateway: logs the SMS and call, then reports success.
#[derive(Debug, Clone, Default)]
pub struct SimulatedNotificationChannel {
    latency: Duration,
}

impl SimulatedNotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl NotificationChannel for SimulatedNotificationChannel {
    async fn notify(&self, alert: &EmergencyAlert) -> Result<NotificationReceipt, NotificationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        info!(
            contact = %alert.contact.name,
            relation = %alert.contact.relation,
            phone = %alert.contact.phone,
            "SMS and call placed: {}",
            alert.message()
        );
        Ok(NotificationReceipt::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

impl From<&NotificationConfig> for DeliveryPolicy {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            attempt_timeout: config.attempt_timeout(),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

/// Deliver an alert with a per-attempt timeout and bounded exponential backoff.
/// Non-retryable errors end the loop immediately.
pub async fn deliver_with_retry(
    channel: &dyn NotificationChannel,
    alert: &EmergencyAlert,
    policy: &DeliveryPolicy,
) -> Result<NotificationReceipt, NotificationError> {
    // first delay is 2 * factor = base_delay
    let factor = (policy.base_delay.as_millis() as u64 / 2).max(1);
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(factor)
        .max_delay(policy.max_delay)
        .map(jitter)
        .take(policy.max_attempts.saturating_sub(1) as usize);

    let attempt_timeout = policy.attempt_timeout;
    let counter = AtomicU32::new(0);
    let attempts = &counter;

    let result = RetryIf::spawn(
        strategy,
        move || async move {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(attempt, generation = alert.generation, "Sending emergency notification");
            match tokio::time::timeout(attempt_timeout, channel.notify(alert)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(NotificationError::TimedOut(attempt_timeout)),
            }
        },
        |error: &NotificationError| {
            let retry = error.is_retryable();
            warn!(error = %error, retry, "Emergency notification attempt failed");
            retry
        },
    )
    .await;

    debug!(
        attempts = counter.load(Ordering::Relaxed),
        success = result.is_ok(),
        "Emergency notification finished"
    );
    result
}
