//! Activity Log Component

use leptos::*;
use syncpanel_shared::ActivityLogEntry;

use crate::state::AppState;

/// Recent panel actions, newest first
#[component]
pub fn ActivityLog() -> impl IntoView {
    let panel = expect_context::<AppState>().panel;

    view! {
        <div class="card">
            <h2 class="card-title">"Activity Log"</h2>
            <div class="log-list">
                {move || {
                    panel.with(|p| {
                        p.activity
                            .entries()
                            .cloned()
                            .map(|entry| view! { <ActivityRow entry=entry /> })
                            .collect::<Vec<_>>()
                    })
                }}
            </div>
        </div>
    }
}

#[component]
fn ActivityRow(entry: ActivityLogEntry) -> impl IntoView {
    view! {
        <div class="log-entry">
            <p class="log-message">{entry.message}</p>
            <span class="timestamp">{entry.timestamp}</span>
        </div>
    }
}
