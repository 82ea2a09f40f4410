//! Sync Panel Library
//!
//! Native side of the sync agent control panel: the HTTP client, the
//! terminal renderer and live view, and the server hosting the browser UI.

pub mod agent;
pub mod cli;
pub mod render;
pub mod server;
pub mod watch;

pub use agent::{AgentClient, CredentialsFile};
pub use server::{start_server, ServerConfig};
