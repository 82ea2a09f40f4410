//! Panel settings
//!
//! Timing and capacity knobs for the control surface. Every field has a
//! default, so a settings file only needs to name what it overrides:
//!
//! ```toml
//! status_interval_secs = 2
//! notification_ttl_secs = 8
//! ```
//!
//! The activity log never holds more than [`MAX_ACTIVITY_LOG_CAPACITY`]
//! entries; smaller capacities are allowed.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default status poll interval
pub const DEFAULT_STATUS_INTERVAL_SECS: u64 = 5;

/// Default credentials poll interval
pub const DEFAULT_CREDENTIALS_INTERVAL_SECS: u64 = 10;

/// How long a notification stays visible
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 5;

/// Upper bound on activity log entries
pub const MAX_ACTIVITY_LOG_CAPACITY: usize = 10;

/// Number of activity log entries kept
pub const DEFAULT_ACTIVITY_LOG_CAPACITY: usize = MAX_ACTIVITY_LOG_CAPACITY;

/// Request timeout for native HTTP clients
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings for a control surface instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Seconds between `GET /api/status` polls
    pub status_interval_secs: u64,

    /// Seconds between `GET /api/credentials/status` polls
    pub credentials_interval_secs: u64,

    /// Seconds a notification stays visible
    pub notification_ttl_secs: u64,

    /// Activity log entries kept before the oldest is evicted
    pub activity_log_capacity: usize,

    /// Per-request timeout (native clients only)
    pub request_timeout_secs: u64,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            status_interval_secs: DEFAULT_STATUS_INTERVAL_SECS,
            credentials_interval_secs: DEFAULT_CREDENTIALS_INTERVAL_SECS,
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            activity_log_capacity: DEFAULT_ACTIVITY_LOG_CAPACITY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl PanelSettings {
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs)
    }

    pub fn credentials_interval(&self) -> Duration {
        Duration::from_secs(self.credentials_interval_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse settings from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Reject values that would stall the polling loops or disable the log
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.status_interval_secs == 0 {
            return Err(SettingsError::Invalid("status_interval_secs must be at least 1".to_string()));
        }
        if self.credentials_interval_secs == 0 {
            return Err(SettingsError::Invalid("credentials_interval_secs must be at least 1".to_string()));
        }
        if self.notification_ttl_secs == 0 {
            return Err(SettingsError::Invalid("notification_ttl_secs must be at least 1".to_string()));
        }
        if self.activity_log_capacity == 0 || self.activity_log_capacity > MAX_ACTIVITY_LOG_CAPACITY {
            return Err(SettingsError::Invalid(format!(
                "activity_log_capacity must be between 1 and {}",
                MAX_ACTIVITY_LOG_CAPACITY
            )));
        }
        Ok(())
    }
}

/// Errors raised while loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}
