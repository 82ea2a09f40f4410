//! Sync Agent Client
//!
//! Native client for the sync agent's REST API, used by every command:
//! - Reads configuration, status and credentials state
//! - Starts, stops and triggers the sync engine
//! - Submits configuration and uploads credentials files

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use syncpanel_shared::{
    decode_body, endpoint_url, endpoints, AgentApi, AgentClientError, ApiAck, ConfigResponse,
    CredentialsStatus, SyncConfig, SyncStatusSnapshot,
};
use tracing::debug;

/// A credentials file read into memory for upload
#[derive(Debug, Clone)]
pub struct CredentialsFile {
    /// File name sent in the multipart part
    pub file_name: String,
    /// Raw file contents
    pub contents: Vec<u8>,
}

impl CredentialsFile {
    /// Read a credentials file from disk
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "credentials.json".to_string());
        Ok(Self {
            file_name,
            contents,
        })
    }
}

/// Client for a sync agent
#[derive(Debug, Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        endpoint_url(&self.base_url, path)
    }

    /// Send a request and decode the JSON body whatever the status code
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AgentClientError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AgentClientError::RequestFailed(format!("Request timed out: {}", e))
            } else {
                AgentClientError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AgentClientError::InvalidResponse(e.to_string()))?;
        debug!("Agent responded with HTTP {}", status);

        decode_body(status, &body)
    }

    /// Empty JSON POST used by the engine control endpoints
    async fn post_command(&self, path: &str) -> Result<ApiAck, AgentClientError> {
        let request = self
            .client
            .post(self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        self.send(request).await
    }
}

#[async_trait::async_trait(?Send)]
impl AgentApi for AgentClient {
    type Upload = CredentialsFile;

    async fn get_config(&self) -> Result<ConfigResponse, AgentClientError> {
        self.send(self.client.get(self.url(endpoints::CONFIG))).await
    }

    async fn save_config(&self, config: &SyncConfig) -> Result<ApiAck, AgentClientError> {
        self.send(self.client.post(self.url(endpoints::CONFIG)).json(config))
            .await
    }

    async fn status(&self) -> Result<SyncStatusSnapshot, AgentClientError> {
        self.send(self.client.get(self.url(endpoints::STATUS))).await
    }

    async fn start(&self) -> Result<ApiAck, AgentClientError> {
        self.post_command(endpoints::START).await
    }

    async fn stop(&self) -> Result<ApiAck, AgentClientError> {
        self.post_command(endpoints::STOP).await
    }

    async fn sync(&self) -> Result<ApiAck, AgentClientError> {
        self.post_command(endpoints::SYNC).await
    }

    async fn upload_credentials(&self, file: CredentialsFile) -> Result<ApiAck, AgentClientError> {
        let part = Part::bytes(file.contents)
            .file_name(file.file_name)
            .mime_str("application/json")
            .map_err(|e| AgentClientError::RequestFailed(e.to_string()))?;
        let form = Form::new().part(endpoints::CREDENTIALS_FIELD, part);

        self.send(
            self.client
                .post(self.url(endpoints::CREDENTIALS_UPLOAD))
                .multipart(form),
        )
        .await
    }

    async fn credentials_status(&self) -> Result<CredentialsStatus, AgentClientError> {
        self.send(self.client.get(self.url(endpoints::CREDENTIALS_STATUS)))
            .await
    }
}
