//! Sync agent client abstraction
//!
//! The panel talks to the agent through [`AgentApi`]. The browser build
//! implements it on top of `fetch`, the command line build on top of
//! `reqwest`; the [`Controller`](crate::controller::Controller) only sees
//! the trait.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::messages::{ApiAck, ConfigResponse, CredentialsStatus, SyncConfig, SyncStatusSnapshot};

/// REST paths exposed by the sync agent
pub mod endpoints {
    pub const CONFIG: &str = "/api/config";
    pub const STATUS: &str = "/api/status";
    pub const START: &str = "/api/start";
    pub const STOP: &str = "/api/stop";
    pub const SYNC: &str = "/api/sync";
    pub const CREDENTIALS_UPLOAD: &str = "/api/credentials/upload";
    pub const CREDENTIALS_STATUS: &str = "/api/credentials/status";

    /// Multipart field carrying the credentials file
    pub const CREDENTIALS_FIELD: &str = "credentials";
}

/// Error types for agent client operations
///
/// Only transport and decoding failures end up here. Application errors
/// reported by the agent arrive as `{"error": ...}` bodies and are part of
/// the successful result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Trait for sync agent client implementations
#[async_trait(?Send)]
pub trait AgentApi {
    /// Credentials file handle accepted by [`AgentApi::upload_credentials`]
    type Upload;

    /// `GET /api/config`
    async fn get_config(&self) -> Result<ConfigResponse, AgentClientError>;

    /// `POST /api/config`
    async fn save_config(&self, config: &SyncConfig) -> Result<ApiAck, AgentClientError>;

    /// `GET /api/status`
    async fn status(&self) -> Result<SyncStatusSnapshot, AgentClientError>;

    /// `POST /api/start`
    async fn start(&self) -> Result<ApiAck, AgentClientError>;

    /// `POST /api/stop`
    async fn stop(&self) -> Result<ApiAck, AgentClientError>;

    /// `POST /api/sync`
    async fn sync(&self) -> Result<ApiAck, AgentClientError>;

    /// `POST /api/credentials/upload` (multipart)
    async fn upload_credentials(&self, file: Self::Upload) -> Result<ApiAck, AgentClientError>;

    /// `GET /api/credentials/status`
    async fn credentials_status(&self) -> Result<CredentialsStatus, AgentClientError>;
}

/// Join an agent base URL and an endpoint path
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Decode a response body as JSON, whatever the HTTP status was
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, AgentClientError> {
    serde_json::from_str(body).map_err(|e| {
        AgentClientError::InvalidResponse(format!("HTTP {}: {}", status, e))
    })
}
