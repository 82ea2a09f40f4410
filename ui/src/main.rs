//! Sync Panel UI Entry Point
//!
//! This is the main entry point for the panel WASM application.
//! It initializes logging and mounts the Leptos app to the DOM.

use leptos::*;
use syncpanel_ui::App;
use tracing_wasm::WASMLayerConfigBuilder;

fn main() {
    // Initialize WASM tracing
    let config = WASMLayerConfigBuilder::default()
        .set_max_level(tracing::Level::DEBUG)
        .build();
    tracing_wasm::set_as_global_default_with_config(config);

    tracing::info!("Starting sync panel");

    // Mount the app
    mount_to_body(|| view! { <App /> });
}
