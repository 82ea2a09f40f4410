//! Direct Agent Client
//!
//! Talks to the sync agent's REST API from the browser. The agent usually
//! serves the panel itself, so the base URL defaults to the page origin.

use gloo_net::http::{Request, RequestBuilder};
use serde::de::DeserializeOwned;
use syncpanel_shared::{
    decode_body, endpoint_url, endpoints, ApiAck, ConfigResponse, CredentialsStatus, SyncConfig,
    SyncStatusSnapshot,
};
use web_sys::{File, FormData};

use super::{AgentApi, AgentClientError};

/// Client for a sync agent reachable from the page
#[derive(Debug, Clone)]
pub struct DirectClient {
    /// Agent base URL
    base_url: String,
}

impl DirectClient {
    /// Create a new client
    pub fn new(url: &str) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Client for the agent that served this page
    pub fn same_origin() -> Self {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default();
        Self::new(&origin)
    }

    fn url(&self, path: &str) -> String {
        endpoint_url(&self.base_url, path)
    }

    /// Send a request and decode the JSON body regardless of status
    async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, AgentClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| AgentClientError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentClientError::InvalidResponse(e.to_string()))?;

        decode_body(status, &body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AgentClientError> {
        let request = Request::get(&self.url(path))
            .build()
            .map_err(|e| AgentClientError::RequestFailed(e.to_string()))?;
        self.send(request).await
    }

    /// Empty-bodied POST used by the engine control endpoints
    async fn post_command(&self, path: &str) -> Result<ApiAck, AgentClientError> {
        let request = json_post(&self.url(path))
            .build()
            .map_err(|e| AgentClientError::RequestFailed(e.to_string()))?;
        self.send(request).await
    }
}

fn json_post(url: &str) -> RequestBuilder {
    Request::post(url).header("Content-Type", "application/json")
}

#[async_trait::async_trait(?Send)]
impl AgentApi for DirectClient {
    type Upload = File;

    async fn get_config(&self) -> Result<ConfigResponse, AgentClientError> {
        self.get(endpoints::CONFIG).await
    }

    async fn save_config(&self, config: &SyncConfig) -> Result<ApiAck, AgentClientError> {
        let request = json_post(&self.url(endpoints::CONFIG))
            .json(config)
            .map_err(|e| AgentClientError::RequestFailed(e.to_string()))?;
        self.send(request).await
    }

    async fn status(&self) -> Result<SyncStatusSnapshot, AgentClientError> {
        self.get(endpoints::STATUS).await
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

    async fn upload_credentials(&self, file: File) -> Result<ApiAck, AgentClientError> {
        let form = FormData::new()
            .map_err(|e| AgentClientError::RequestFailed(format!("{:?}", e)))?;
        form.append_with_blob_and_filename(endpoints::CREDENTIALS_FIELD, &file, &file.name())
            .map_err(|e| AgentClientError::RequestFailed(format!("{:?}", e)))?;

        // No explicit content type: the browser adds the multipart boundary
        let request = Request::post(&self.url(endpoints::CREDENTIALS_UPLOAD))
            .body(form)
            .map_err(|e| AgentClientError::RequestFailed(e.to_string()))?;
        self.send(request).await
    }

    async fn credentials_status(&self) -> Result<CredentialsStatus, AgentClientError> {
        self.get(endpoints::CREDENTIALS_STATUS).await
    }
}
