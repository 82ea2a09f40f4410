//! Notification Toast Component

use leptos::*;

use crate::state::AppState;

/// The single transient notification
#[component]
pub fn NotificationToast() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let panel = app_state.panel;

    let class = move || {
        panel.with(|p| match p.notification.current() {
            Some(n) => format!("notification show {}", n.severity.as_str()),
            None => "notification".to_string(),
        })
    };

    view! {
        <div class=class>
            <span class="notification-message">
                {move || panel.with(|p| {
                    p.notification.current().map(|n| n.message.clone()).unwrap_or_default()
                })}
            </span>
            <button
                class="notification-close"
                on:click=move |_| app_state.dismiss_notification()
            >
                "✕"
            </button>
        </div>
    }
}
