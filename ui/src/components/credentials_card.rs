//! Credentials Card Component
//!
//! Shows whether the agent holds valid drive credentials and uploads a
//! new credentials file.

use leptos::*;

use super::{SpinnerIcon, UploadIcon};
use crate::state::AppState;

/// Drive credentials status and upload form
#[component]
pub fn CredentialsCard() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let panel = app_state.panel;
    let file_input = create_node_ref::<html::Input>();

    let selected_file = move || {
        file_input
            .get()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0))
    };

    let on_change = move |_| {
        let name = selected_file().map(|file| file.name());
        panel.update(|p| p.select_credentials_file(name));
    };

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let file = selected_file();
        app_state.dispatch(move |controller| async move { controller.upload_credentials(file).await });
    };

    view! {
        <form class="card" on:submit=on_submit>
            <div class="card-header">
                <h2 class="card-title">"Google Drive Credentials"</h2>
                <span class=move || format!("status-value {}", panel.with(|p| p.credentials.css_class()))>
                    {move || panel.with(|p| p.credentials.label())}
                </span>
            </div>

            <label class="file-picker">
                <input
                    type="file"
                    accept=".json"
                    class="hidden"
                    node_ref=file_input
                    on:change=on_change
                />
                <span class="btn-secondary">"Choose File"</span>
                <span class="file-name">
                    {move || panel.with(|p| p.credentials_form.file_label().to_string())}
                </span>
            </label>

            <div class="card-actions">
                <button
                    type="submit"
                    class="btn-primary"
                    disabled=move || !panel.with(|p| p.credentials_form.upload_enabled())
                >
                    {move || if panel.with(|p| p.credentials_form.uploading) {
                        view! { <SpinnerIcon /> }.into_view()
                    } else {
                        view! { <UploadIcon /> }.into_view()
                    }}
                    {move || panel.with(|p| p.credentials_form.upload_label())}
                </button>
            </div>
        </form>
    }
}
