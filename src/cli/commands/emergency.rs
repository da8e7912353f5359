use anyhow::Result;
use serde::Serialize;
use std::time::Duration;

use super::{print_json, require_success};
use crate::catalog::Catalog;
use crate::dispatch::{DispatchSession, DispatchState, DispatchStatus, Resolution};
use crate::session::PatientSession;
use crate::shutdown::ShutdownCoordinator;

/// Single JSON document printed for `--json`.
#[derive(Debug, Serialize)]
struct EmergencyReport {
    state: DispatchState,
    activated: Option<DispatchStatus>,
    resolved: Option<DispatchSession>,
}

pub struct EmergencyCommand {
    pub cancel: bool,
    pub close_after: Option<u64>,
    pub json: bool,
}

impl EmergencyCommand {
    pub fn new() -> Self {
        Self {
            cancel: false,
            close_after: None,
            json: false,
        }
    }

    pub fn with_cancel(mut self, cancel: bool) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_close_after(mut self, close_after: Option<u64>) -> Self {
        self.close_after = close_after;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub async fn execute(&self, session: &PatientSession) -> Result<()> {
        let dispatch = session.dispatch().clone();

        require_success(dispatch.trigger()?, "Emergency")?;
        if !self.json {
            println!("🚨 EMERGENCY SOS - this will alert emergency services and your emergency contact");
        }

        if self.cancel {
            require_success(dispatch.cancel(), "Cancel")?;
            if self.json {
                return print_json(&EmergencyReport {
                    state: dispatch.state(),
                    activated: None,
                    resolved: None,
                });
            }
            println!("↩️  Emergency alert cancelled, nothing was sent");
            return Ok(());
        }

        require_success(dispatch.confirm().await?, "Confirm")?;
        let activated = dispatch.status();
        if !self.json {
            self.show_status(session.catalog().as_ref(), &activated);
        }

        let timeout = dispatch.auto_timeout();
        let waiter = dispatch.clone();
        let close_after = self.close_after;
        let announce = !self.json;
        let wait = async move {
            match close_after {
                Some(seconds) => {
                    tokio::time::sleep(Duration::from_secs(seconds)).await;
                    waiter.close();
                }
                None => {
                    if announce {
                        println!("⏳ Alert closes automatically in {}s (Ctrl-C to close now)", timeout.as_secs());
                    }
                    // let the expiry task run first
                    tokio::time::sleep(timeout + Duration::from_millis(100)).await;
                }
            }
            Ok::<(), anyhow::Error>(())
        };
        ShutdownCoordinator::with_dispatch(dispatch.clone())
            .run_until_shutdown(wait)
            .await?;

        let resolved = dispatch.last_session();
        if self.json {
            return print_json(&EmergencyReport {
                state: dispatch.state(),
                activated: Some(activated),
                resolved,
            });
        }

        match resolved.and_then(|s| s.resolution) {
            Some(Resolution::Closed) => println!("✅ Emergency alert closed"),
            Some(Resolution::Expired) => println!("⌛ Emergency alert closed automatically"),
            None => println!("⚠️  Emergency alert still {}", dispatch.state()),
        }
        Ok(())
    }

    fn show_status(&self, catalog: &dyn Catalog, status: &DispatchStatus) {
        println!("🚑 EMERGENCY SERVICES ALERTED:");
        if let Some(facility) = status.nearest_facility_id.as_ref().and_then(|id| catalog.facility(id)) {
            println!("   🏨 {} ({:.1} km)", facility.name, facility.distance_km);
            println!("   📞 {}", facility.phone);
        }
        if let Some(eta) = status.eta_range {
            println!("   ⏱️  Ambulance ETA: {}", eta);
        }
        if status.contact_notified {
            println!("   📱 Emergency contact notified by SMS and call");
        } else if let Some(error) = &status.notification_error {
            println!("   ⚠️  Emergency contact not reached: {}", error);
        }
    }
}

impl Default for EmergencyCommand {
    fn default() -> Self {
        Self::new()
    }
}
