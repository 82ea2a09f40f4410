//! Sync Panel UI Library
//!
//! This crate provides the browser control panel for a file-sync agent:
//! it polls the agent's status, renders sync state and forwards user
//! actions to the agent's REST API.
//!
//! # Modules
//!
//! - [`app`]: Root application component
//! - [`client`]: `fetch`-based agent client
//! - [`components`]: UI components (status, configuration, credentials, log)
//! - [`state`]: Global state, notification timer and polling

pub mod app;
pub mod client;
pub mod components;
pub mod state;

pub use app::App;
