//! Configuration Form Component
//!
//! Edits the local folder, drive folder and ignore patterns. Field values
//! live in the panel view-model so a config load repopulates them.

use leptos::*;
use syncpanel_shared::PanelState;

use crate::state::AppState;

/// Sync configuration editor
#[component]
pub fn ConfigForm() -> impl IntoView {
    let app_state = expect_context::<AppState>();
    let panel = app_state.panel;

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        app_state.dispatch(|controller| async move { controller.submit_config_form().await });
    };

    view! {
        <form class="card" on:submit=on_submit>
            <h2 class="card-title">"Configuration"</h2>

            <FormField
                label="Local Folder"
                placeholder="/home/user/Drive"
                value=Signal::derive(move || panel.with(|p| p.config_form.local_folder.clone()))
                on_input=|value: String, p: &mut PanelState| p.config_form.local_folder = value
            />
            <FormField
                label="Drive Folder"
                placeholder="My Sync Folder"
                value=Signal::derive(move || panel.with(|p| p.config_form.drive_folder.clone()))
                on_input=|value: String, p: &mut PanelState| p.config_form.drive_folder = value
            />
            <FormField
                label="Ignore Patterns"
                placeholder="*.tmp, .git, node_modules"
                value=Signal::derive(move || panel.with(|p| p.config_form.ignore_patterns.clone()))
                on_input=|value: String, p: &mut PanelState| p.config_form.ignore_patterns = value
            />
            <p class="hint">"Separate patterns with commas"</p>

            <div class="card-actions">
                <button type="submit" class="btn-primary">"Save Configuration"</button>
            </div>
        </form>
    }
}

#[component]
fn FormField<F>(
    label: &'static str,
    placeholder: &'static str,
    value: Signal<String>,
    on_input: F,
) -> impl IntoView
where
    F: Fn(String, &mut PanelState) + Copy + 'static,
{
    let panel = expect_context::<AppState>().panel;

    view! {
        <div class="field">
            <label class="field-label">{label}</label>
            <input
                type="text"
                class="field-input"
                placeholder=placeholder
                prop:value=move || value.get()
                on:input=move |e| {
                    let text = event_target_value(&e);
                    panel.update(|p| on_input(text, p));
                }
            />
        </div>
    }
}
