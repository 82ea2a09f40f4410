//! Root Application Component
//!
//! This module contains the main App component that sets up:
//! - Global state provider
//! - Initial load and the polling loops
//! - Page layout

use leptos::*;
use leptos_meta::*;

use crate::components::{ActivityLog, ConfigForm, CredentialsCard, NotificationToast, StatusCard};
use crate::state::{AppState, Poller};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    // Initialize global state
    let app_state = AppState::new();
    provide_context(app_state.clone());

    // Initial load, then poll for the lifetime of the component
    app_state.dispatch(|controller| async move { controller.initialize().await });
    let poller = Poller::start(&app_state);
    on_cleanup(move || poller.stop());

    view! {
        <Title text="Drive Sync" />
        <div class="app">
            <div class="app-container">
                <div class="app-header">
                    <h1 class="app-title">"Drive Sync"</h1>
                    <p class="app-subtitle">"Keep a local folder in sync with Google Drive"</p>
                </div>

                <div class="panel-grid">
                    <StatusCard />
                    <CredentialsCard />
                </div>

                <div class="panel-grid">
                    <ConfigForm />
                    <ActivityLog />
                </div>
            </div>
            <NotificationToast />
        </div>
    }
}
