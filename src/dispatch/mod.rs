// Emergency Dispatch Module
//
// Trigger -> confirm -> active (ETA, contact notification, auto-timeout) -> idle.
// The state machine lives behind a cloneable controller so the timeout task
// can resolve the cycle it was armed for, and only that cycle.

pub mod controller;
pub mod notification;
pub mod state_machine;
pub mod types;


pub use controller::DispatchController;
pub use notification::{
    deliver_with_retry, DeliveryPolicy, NotificationChannel, NotificationError, NotificationReceipt,
    SimulatedNotificationChannel,
};
#[cfg(any(test, feature = "testing"))]
pub use notification::MockNotificationChannel;
pub use state_machine::{DispatchEvent, DispatchMachine};
pub use types::{DispatchSession, DispatchState, DispatchStatus, EmergencyAlert, EtaRange, Resolution};
