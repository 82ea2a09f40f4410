//! Shared types for the sync panel
//!
//! This crate contains everything the browser panel and the command line
//! have in common:
//! - API message types for the sync agent's REST surface
//! - Panel settings
//! - The panel view-model and its transitions
//! - The agent client trait and the controller that drives it

pub mod client;
pub mod config;
pub mod controller;
pub mod messages;
pub mod panel;

pub use client::*;
pub use config::*;
pub use controller::*;
pub use messages::*;
pub use panel::*;
