//! Sync Agent Client Layer
//!
//! The browser panel reaches the agent over `fetch`. [`DirectClient`]
//! implements the shared [`AgentApi`] trait so the controller works the
//! same here as on the command line.

mod direct;

pub use direct::DirectClient;
pub use syncpanel_shared::{AgentApi, AgentClientError};
