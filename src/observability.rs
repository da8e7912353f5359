use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Workflow activity counters
#[derive(Debug, Default)]
pub struct WorkflowMetrics {
    pub bookings_confirmed: AtomicU64,
    pub dispatches_confirmed: AtomicU64,
    pub dispatches_closed: AtomicU64,
    pub dispatches_expired: AtomicU64,
    pub notification_failures: AtomicU64,
    pub rejected_transitions: AtomicU64,
}

impl WorkflowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_booking_confirmed(&self) {
        self.bookings_confirmed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_confirmed(&self) {
        self.dispatches_confirmed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_closed(&self) {
        self.dispatches_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_expired(&self) {
        self.dispatches_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_failure(&self) {
        self.notification_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_transition(&self) {
        self.rejected_transitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> WorkflowStats {
        WorkflowStats {
            bookings_confirmed: self.bookings_confirmed.load(Ordering::Relaxed),
            dispatches_confirmed: self.dispatches_confirmed.load(Ordering::Relaxed),
            dispatches_closed: self.dispatches_closed.load(Ordering::Relaxed),
            dispatches_expired: self.dispatches_expired.load(Ordering::Relaxed),
            notification_failures: self.notification_failures.load(Ordering::Relaxed),
            rejected_transitions: self.rejected_transitions.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            bookings_confirmed = stats.bookings_confirmed,
            dispatches_confirmed = stats.dispatches_confirmed,
            dispatches_closed = stats.dispatches_closed,
            dispatches_expired = stats.dispatches_expired,
            notification_failures = stats.notification_failures,
            rejected_transitions = stats.rejected_transitions,
            "Workflow metrics"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowStats {
    pub bookings_confirmed: u64,
    pub dispatches_confirmed: u64,
    pub dispatches_closed: u64,
    pub dispatches_expired: u64,
    pub notification_failures: u64,
    pub rejected_transitions: u64,
}

/// Global metrics instance
static WORKFLOW_METRICS: std::sync::LazyLock<WorkflowMetrics> = std::sync::LazyLock::new(WorkflowMetrics::new);

pub fn workflow_metrics() -> &'static WorkflowMetrics {
    &WORKFLOW_METRICS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = WorkflowMetrics::new();
        metrics.record_booking_confirmed();
        metrics.record_rejected_transition();
        metrics.record_rejected_transition();

        let stats = metrics.get_stats();
        assert_eq!(stats.bookings_confirmed, 1);
        assert_eq!(stats.rejected_transitions, 2);
        assert_eq!(stats.dispatches_expired, 0);
    }
}
