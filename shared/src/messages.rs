//! API message types for communication between the panel and the sync agent
//!
//! These types mirror the agent's REST surface:
//! - `/api/config` (read and replace the sync configuration)
//! - `/api/status` (engine state snapshot)
//! - `/api/start`, `/api/stop`, `/api/sync` (engine control)
//! - `/api/credentials/*` (drive credentials upload and check)

use serde::{Deserialize, Deserializer, Serialize};

/// Decode an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sync configuration as submitted to `POST /api/config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Local folder watched by the agent
    pub local_folder: String,

    /// Drive folder mirrored into the local folder
    pub drive_folder: String,

    /// Glob patterns the agent skips, in submission order
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

/// Body of `GET /api/config`
///
/// Every field is optional because the agent answers with a bare
/// `{"error": ...}` when its configuration file cannot be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_folder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_folder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_patterns: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Engine state reported by `GET /api/status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// The sync engine is running
    Running,
    /// The sync engine is stopped (also used for any unrecognized value)
    #[serde(other)]
    Stopped,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::Stopped
    }
}

impl SyncState {
    pub fn is_running(self) -> bool {
        self == SyncState::Running
    }

    pub fn label(self) -> &'static str {
        match self {
            SyncState::Running => "Running",
            SyncState::Stopped => "Stopped",
        }
    }
}

/// Body of `GET /api/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatusSnapshot {
    /// Engine state
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: SyncState,

    /// Local folder in use by the running engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_folder: Option<String>,

    /// Drive folder in use by the running engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_folder: Option<String>,

    /// Free-form detail (e.g. "Sync engine not started")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `GET /api/credentials/status`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsStatus {
    /// A credentials file is present on the agent
    #[serde(default, deserialize_with = "null_as_default")]
    pub exists: bool,

    /// The file has the expected OAuth client structure
    #[serde(default, deserialize_with = "null_as_default")]
    pub valid: bool,
}

/// Acknowledgement returned by every mutating endpoint
///
/// The agent signals application-level failures with an `error` field,
/// usually alongside a 4xx/5xx status code. Success bodies may carry a
/// human-readable `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiAck {
    /// Successful acknowledgement with a message
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: None,
            message: Some(message.into()),
        }
    }

    /// Failed acknowledgement carrying the agent's error text
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            message: None,
        }
    }
}
