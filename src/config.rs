use anyhow::Result;
use chrono::Weekday;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for careflow
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CareflowConfig {
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Appointment booking settings
    pub booking: BookingConfig,
    /// Emergency dispatch settings
    pub dispatch: DispatchConfig,
    /// Emergency contact notification settings
    pub notification: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable output
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Weekdays on which no appointments are offered
    pub non_business_days: Vec<Weekday>,
    /// How many days ahead the calendar offers dates
    pub horizon_days: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// An active alert resolves itself after this many seconds
    pub auto_timeout_seconds: u64,
    /// Lower bound of the simulated ambulance ETA
    pub eta_low_minutes: u32,
    /// Upper bound of the simulated ambulance ETA
    pub eta_high_minutes: u32,
    /// Fixed responding facility; nearest emergency-capable facility when unset
    pub responding_facility_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Delivery attempts before the failure is reported
    pub max_attempts: u32,
    /// Timeout for a single delivery attempt
    pub attempt_timeout_ms: u64,
    /// Initial backoff between attempts
    pub base_delay_ms: u64,
    /// Backoff ceiling
    pub max_delay_ms: u64,
    /// Latency of the simulated SMS/call gateway
    pub simulated_latency_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            non_business_days: vec![Weekday::Sat, Weekday::Sun],
            horizon_days: 60,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            auto_timeout_seconds: 30,
            eta_low_minutes: 8,
            eta_high_minutes: 12,
            responding_facility_id: None,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout_ms: 5_000,
            base_delay_ms: 500,
            max_delay_ms: 5_000,
            simulated_latency_ms: 0,
        }
    }
}

impl DispatchConfig {
    pub fn auto_timeout(&self) -> Duration {
        Duration::from_secs(self.auto_timeout_seconds)
    }
}

impl NotificationConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl CareflowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (careflow.toml, .careflow-rc)
    /// 3. Environment variables (CAREFLOW__SECTION__KEY)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&CareflowConfig::default())?);

        if Path::new("careflow.toml").exists() {
            builder = builder.add_source(File::with_name("careflow"));
        }

        if Path::new(".careflow-rc").exists() {
            builder = builder.add_source(File::with_name(".careflow-rc").format(config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("CAREFLOW")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let careflow_config: CareflowConfig = config.try_deserialize()?;
        careflow_config.validate()?;

        Ok(careflow_config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dispatch.eta_low_minutes > self.dispatch.eta_high_minutes {
            anyhow::bail!(
                "dispatch ETA range is inverted: {} > {}",
                self.dispatch.eta_low_minutes,
                self.dispatch.eta_high_minutes
            );
        }
        if self.booking.non_business_days.len() >= 7 {
            anyhow::bail!("booking calendar has no business days");
        }
        if self.notification.max_attempts == 0 {
            anyhow::bail!("notification.max_attempts must be at least 1");
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load .env file if it exists
    /// Returns whether a `.env` file was found and applied.
    pub fn load_env_file() -> Result<bool> {
        if !Path::new(".env").exists() {
            return Ok(false);
        }
        dotenvy::dotenv()?;
        Ok(true)
    }
}
