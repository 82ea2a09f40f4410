//! Web Server for the browser panel
//!
//! Serves the built UI from disk and proxies `/api/*` to the sync agent, so
//! the panel always talks to its own origin.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, Response, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Server state shared across all handlers
#[derive(Clone)]
pub struct ServerState {
    pub agent_url: String,
    pub http_client: reqwest::Client,
}

/// Options for [`start_server`]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (port 0 picks a free port)
    pub bind: SocketAddr,
    /// Sync agent base URL
    pub agent_url: String,
    /// Directory holding the built UI (`index.html` and assets)
    pub ui_dir: PathBuf,
}

/// Build the router without binding a socket
pub fn create_router(agent_url: &str, ui_dir: PathBuf) -> Router {
    let state = Arc::new(ServerState {
        agent_url: agent_url.trim_end_matches('/').to_string(),
        http_client: reqwest::Client::new(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let index = ui_dir.join("index.html");
    let assets = ServeDir::new(ui_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/*path", any(proxy_api))
        .fallback_service(assets)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
///
/// Returns the bound address and the task serving requests.
pub async fn start_server(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<anyhow::Result<()>>)> {
    if !config.ui_dir.join("index.html").exists() {
        tracing::warn!(
            "No index.html in {}; build the UI first (trunk build)",
            config.ui_dir.display()
        );
    }

    let app = create_router(&config.agent_url, config.ui_dir);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    let addr = listener.local_addr()?;

    info!("Panel server listening on {}", addr);
    info!("Proxying /api to {}", config.agent_url);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))
    });

    Ok((addr, handle))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Forward any `/api/*` request to the agent, keeping path and query
async fn proxy_api(State(state): State<Arc<ServerState>>, req: Request<Body>) -> impl IntoResponse {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let url = format!("{}{}", state.agent_url, path_and_query);
    proxy_request(&state.http_client, &url, req).await
}

async fn proxy_request(client: &reqwest::Client, url: &str, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let headers = req.headers().clone();

    let body_bytes = match axum::body::to_bytes(req.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read request body: {}", e),
            )
                .into_response();
        }
    };

    let mut proxy_req = client.request(method, url);
    for (name, value) in headers.iter() {
        if name != header::HOST {
            proxy_req = proxy_req.header(name, value);
        }
    }
    proxy_req = proxy_req.body(body_bytes);

    let response = match proxy_req.send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to reach sync agent at {}: {}", url, e);
            return (
                StatusCode::BAD_GATEWAY,
                format!("Failed to proxy request to sync agent: {}", e),
            )
                .into_response();
        }
    };

    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let headers = response.headers().clone();
    let body = response.bytes().await.unwrap_or_default();

    let mut res = Response::builder().status(status);
    for (name, value) in headers.iter() {
        if name != header::TRANSFER_ENCODING && name != header::CONNECTION {
            res = res.header(name, value);
        }
    }
    res.body(Body::from(body)).unwrap_or_else(|e| {
        (
            StatusCode::BAD_GATEWAY,
            format!("Invalid response from sync agent: {}", e),
        )
            .into_response()
    })
}
