// Patient session - one signed-in patient, their booking draft and their dispatch cycle

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use crate::booking::{BookingWorkflow, SchedulePolicy};
use crate::catalog::{Catalog, StaticCatalog};
use crate::config::CareflowConfig;
use crate::dispatch::{DispatchController, NotificationChannel, SimulatedNotificationChannel};
use crate::profile::{ProfileProvider, SessionProfile, UserProfile};
use crate::workflows::WorkflowError;

/// Owns the workflows of one patient. Nothing here is process-wide.
pub struct PatientSession {
    profile: Arc<SessionProfile>,
    catalog: Arc<dyn Catalog>,
    config: CareflowConfig,
    booking: Option<BookingWorkflow>,
    dispatch: DispatchController,
}

impl std::fmt::Debug for PatientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientSession")
            .field("user", &self.profile.current_user().map(|u| u.id))
            .field("booking", &self.booking)
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

impl PatientSession {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        profile: Arc<SessionProfile>,
        channel: Arc<dyn NotificationChannel>,
        config: CareflowConfig,
    ) -> Self {
        let dispatch = DispatchController::from_config(
            Arc::clone(&catalog),
            Arc::clone(&profile) as Arc<dyn ProfileProvider>,
            channel,
            &config,
        );
        Self {
            profile,
            catalog,
            config,
            booking: None,
            dispatch,
        }
    }

    /// Seeded catalog, simulated notification gateway, demo patient signed in.
    pub fn demo(config: CareflowConfig) -> Self {
        let channel = SimulatedNotificationChannel::with_latency(config.notification.simulated_latency());
        Self::new(
            Arc::new(StaticCatalog::seeded()),
            Arc::new(SessionProfile::signed_in(UserProfile::demo())),
            Arc::new(channel),
            config,
        )
    }

    pub fn profile(&self) -> &SessionProfile {
        &self.profile
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.profile.current_user()
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &CareflowConfig {
        &self.config
    }

    pub fn sign_in(&self, user: UserProfile) {
        self.profile.sign_in(user);
    }

    /// Resolves any dispatch in progress and drops the booking draft.
    pub fn sign_out(&mut self) -> Option<UserProfile> {
        self.dispatch.reset();
        if self.booking.take().is_some() {
            debug!("Discarded booking draft on sign-out");
        }
        self.profile.sign_out()
    }

    /// Open a fresh booking wizard; an unfinished draft is discarded.
    pub fn begin_booking(&mut self) -> Result<&mut BookingWorkflow, WorkflowError> {
        let policy = SchedulePolicy::from_local_clock(&self.config.booking);
        self.open_booking(policy)
    }

    /// Same as [`begin_booking`](Self::begin_booking) with the calendar pinned to `today`.
    pub fn begin_booking_on(&mut self, today: NaiveDate) -> Result<&mut BookingWorkflow, WorkflowError> {
        let policy = SchedulePolicy::from_config(&self.config.booking, today);
        self.open_booking(policy)
    }

    fn open_booking(&mut self, policy: SchedulePolicy) -> Result<&mut BookingWorkflow, WorkflowError> {
        let user = self.profile.require_user()?;
        if let Some(previous) = self.booking.take() {
            debug!(correlation_id = previous.correlation_id(), phase = %previous.phase(), "Discarding booking draft");
        }

        let workflow = BookingWorkflow::for_user(Arc::clone(&self.catalog), policy, &user.id);
        info!(user_id = %user.id, correlation_id = workflow.correlation_id(), "Booking started");
        Ok(self.booking.insert(workflow))
    }

    pub fn booking(&self) -> Option<&BookingWorkflow> {
        self.booking.as_ref()
    }

    pub fn booking_mut(&mut self) -> Option<&mut BookingWorkflow> {
        self.booking.as_mut()
    }

    pub fn end_booking(&mut self) -> Option<BookingWorkflow> {
        self.booking.take()
    }

    pub fn dispatch(&self) -> &DispatchController {
        &self.dispatch
    }
}
