//! Plain-text rendering of the panel for the terminal

use std::fmt::Write;

use syncpanel_shared::{Notification, PanelState, Severity};

/// Render the whole panel as a block of text
pub fn render_panel(state: &PanelState) -> String {
    let mut out = String::new();
    let controls = state.controls();

    let _ = writeln!(out, "Drive Sync");
    let _ = writeln!(out, "==========");
    let _ = writeln!(out, "{:<14} {}", "Status:", state.sync_state().label());
    let _ = writeln!(out, "{:<14} {}", "Local folder:", state.local_folder_label);
    let _ = writeln!(out, "{:<14} {}", "Drive folder:", state.drive_folder_label);
    let _ = writeln!(out, "{:<14} {}", "Last sync:", state.last_sync_label());
    let _ = writeln!(out, "{:<14} {}", "Credentials:", state.credentials.label());
    let _ = writeln!(
        out,
        "{:<14} start={} stop={} sync={}",
        "Controls:",
        on_off(controls.start_enabled),
        on_off(controls.stop_enabled),
        on_off(controls.sync_enabled),
    );

    if let Some(notification) = state.notification.current() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", render_notification(notification));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Activity");
    let _ = writeln!(out, "{}", "-".repeat(40));
    for entry in state.activity.entries() {
        let _ = writeln!(out, "[{}] {}", entry.timestamp, entry.message);
    }

    out
}

/// Short summary printed after a one-shot command
pub fn render_summary(state: &PanelState) -> String {
    let mut out = String::new();
    if state.status.is_some() {
        let _ = writeln!(out, "{:<14} {}", "Status:", state.sync_state().label());
    }
    if state.last_sync.is_some() {
        let _ = writeln!(out, "{:<14} {}", "Last sync:", state.last_sync_label());
    }
    if let Some(entry) = state.activity.entries().next() {
        let _ = writeln!(out, "{:<14} [{}] {}", "Last activity:", entry.timestamp, entry.message);
    }
    out
}

/// One-line form of a notification
pub fn render_notification(notification: &Notification) -> String {
    let marker = match notification.severity {
        Severity::Info => "i",
        Severity::Success => "+",
        Severity::Error => "!",
    };
    format!(
        "[{}] {}: {}",
        marker,
        notification.severity.as_str(),
        notification.message
    )
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncpanel_shared::{ApiAck, PanelAction, SyncState, SyncStatusSnapshot};

    #[test]
    fn test_fresh_panel() {
        let text = render_panel(&PanelState::default());

        assert!(text.contains("Status:        Stopped"));
        assert!(text.contains("Local folder:  Not configured"));
        assert!(text.contains("Last sync:     Never"));
        assert!(text.contains("Credentials:   Checking..."));
        assert!(text.contains("start=on stop=off sync=off"));
        assert!(text.contains("Application started"));
    }

    #[test]
    fn test_running_panel_with_notification() {
        let mut state = PanelState::default();
        state.apply_status(Ok(SyncStatusSnapshot {
            status: SyncState::Running,
            local_folder: Some("/home/me/Documents".into()),
            ..Default::default()
        }));
        state.apply_ack(&PanelAction::Start, Ok(ApiAck::default()));

        let text = render_panel(&state);
        assert!(text.contains("Status:        Running"));
        assert!(text.contains("/home/me/Documents"));
        assert!(text.contains("start=off stop=on sync=on"));
        assert!(text.contains("[+] success: Sync engine started successfully"));

        // Newest activity first
        let started = text.find("Sync engine started\n").unwrap();
        let boot = text.find("Application started").unwrap();
        assert!(started < boot);
    }

    #[test]
    fn test_summary_only_shows_known_fields() {
        let mut state = PanelState::default();
        let text = render_summary(&state);
        assert!(!text.contains("Status:"));
        assert!(!text.contains("Last sync:"));
        assert!(text.contains("Ready to configure sync settings"));

        state.apply_ack(&PanelAction::Sync, Ok(ApiAck::default()));
        let text = render_summary(&state);
        assert!(text.contains("Last sync:"));
        assert!(text.contains("Manual sync triggered"));
    }

    #[test]
    fn test_error_notification_line() {
        let mut state = PanelState::default();
        state.notify("busy", Severity::Error);
        let line = render_notification(state.notification.current().unwrap());
        assert_eq!(line, "[!] error: busy");
    }
}
