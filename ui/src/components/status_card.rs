//! Status Card Component
//!
//! Engine indicator, Start/Stop/Sync controls and the folder summary.

use leptos::*;

use super::{FolderIcon, PlayIcon, RefreshIcon, StopIcon};
use crate::state::AppState;

/// Sync engine status and controls
#[component]
pub fn StatusCard() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let panel = app_state.panel;

    let running = move || panel.with(|p| p.sync_state().is_running());
    let controls = move || panel.with(|p| p.controls());

    let on_start = {
        let app_state = app_state.clone();
        move |_| app_state.dispatch(|controller| async move { controller.start().await })
    };
    let on_stop = {
        let app_state = app_state.clone();
        move |_| app_state.dispatch(|controller| async move { controller.stop().await })
    };
    let on_sync = {
        let app_state = app_state.clone();
        move |_| app_state.dispatch(|controller| async move { controller.sync().await })
    };

    view! {
        <div class="card">
            <div class="card-header">
                <h2 class="card-title">"Sync Status"</h2>
                <div class="status-indicator">
                    <span
                        class="status-dot"
                        class:running=running
                    />
                    <span class="status-text">
                        {move || panel.with(|p| p.sync_state().label())}
                    </span>
                </div>
            </div>

            <div class="engine-actions">
                <button
                    class="btn-primary"
                    disabled=move || !controls().start_enabled
                    on:click=on_start
                >
                    <PlayIcon />
                    "Start"
                </button>
                <button
                    class="btn-secondary"
                    disabled=move || !controls().stop_enabled
                    on:click=on_stop
                >
                    <StopIcon />
                    "Stop"
                </button>
                <button
                    class="btn-secondary"
                    disabled=move || !controls().sync_enabled
                    on:click=on_sync
                >
                    <RefreshIcon />
                    "Sync Now"
                </button>
            </div>

            <dl class="details">
                <SummaryRow
                    label="Local folder"
                    value=Signal::derive(move || panel.with(|p| p.local_folder_label.clone()))
                />
                <SummaryRow
                    label="Drive folder"
                    value=Signal::derive(move || panel.with(|p| p.drive_folder_label.clone()))
                />
                <SummaryRow
                    label="Last sync"
                    value=Signal::derive(move || panel.with(|p| p.last_sync_label()))
                />
            </dl>
        </div>
    }
}

#[component]
fn SummaryRow(label: &'static str, value: Signal<String>) -> impl IntoView {
    view! {
        <div class="detail-row">
            <FolderIcon class="icon detail-icon" />
            <dt class="detail-label">{label}</dt>
            <dd class="detail-value">{move || value.get()}</dd>
        </div>
    }
}
