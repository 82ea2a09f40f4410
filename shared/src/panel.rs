//! Control surface view-model
//!
//! [`PanelState`] is the single owned record behind every rendering of the
//! panel. It is mutated only through the transitions in this module, each
//! of which takes the outcome of one remote call:
//! - [`PanelState::apply_config`] after `GET /api/config`
//! - [`PanelState::apply_status`] after `GET /api/status`
//! - [`PanelState::apply_credentials_status`] after `GET /api/credentials/status`
//! - [`PanelState::apply_ack`] after any mutating call
//!
//! Nothing here performs I/O or reads a timer, so renderers (browser or
//! terminal) stay dumb and the control logic is testable on its own.

use std::collections::VecDeque;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::AgentClientError;
use crate::config::{PanelSettings, MAX_ACTIVITY_LOG_CAPACITY};
use crate::messages::{
    ApiAck, ConfigResponse, CredentialsStatus, SyncConfig, SyncState, SyncStatusSnapshot,
};

/// Folder label shown before anything is known
pub const NOT_CONFIGURED: &str = "Not configured";

/// Last-sync label shown before the first manual sync
pub const NEVER_SYNCED: &str = "Never";

/// File label shown when no credentials file is chosen
pub const NO_FILE_CHOSEN: &str = "No file chosen";

// ============================================================================
// Notifications
// ============================================================================

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

/// A transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// Identifies one showing of a notification
///
/// Renderers schedule [`PanelState::expire_notification`] with the ticket
/// they were handed. Tickets of superseded notifications expire nothing.
/// Later notifications always carry greater tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationTicket(u64);

/// Holds at most one visible notification
#[derive(Debug, Clone, Default)]
pub struct NotificationSlot {
    current: Option<(NotificationTicket, Notification)>,
    shown: u64,
}

impl NotificationSlot {
    /// Replace whatever is visible with a new notification
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) -> NotificationTicket {
        self.shown += 1;
        let ticket = NotificationTicket(self.shown);
        self.current = Some((
            ticket,
            Notification {
                message: message.into(),
                severity,
            },
        ));
        ticket
    }

    /// Hide the notification if `ticket` still refers to it
    pub fn expire(&mut self, ticket: NotificationTicket) -> bool {
        match &self.current {
            Some((current, _)) if *current == ticket => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Hide whatever is visible
    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref().map(|(_, notification)| notification)
    }

    pub fn current_ticket(&self) -> Option<NotificationTicket> {
        self.current.as_ref().map(|(ticket, _)| *ticket)
    }
}

// ============================================================================
// Activity log
// ============================================================================

/// One line of the activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub message: String,
    pub timestamp: String,
}

/// Capped, newest-first history of panel actions
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityLogEntry>,
    capacity: usize,
}

impl ActivityLog {
    /// Log keeping `capacity` entries, clamped to `1..=MAX_ACTIVITY_LOG_CAPACITY`
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_ACTIVITY_LOG_CAPACITY);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Record a message stamped with the given local time
    pub fn record_at(&mut self, message: impl Into<String>, at: DateTime<Local>) {
        self.entries.push_front(ActivityLogEntry {
            message: message.into(),
            timestamp: at.format("%H:%M:%S").to_string(),
        });
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// Record a message stamped now
    pub fn record(&mut self, message: impl Into<String>) {
        self.record_at(message, Local::now());
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &ActivityLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ============================================================================
// Derived display values
// ============================================================================

/// Credentials indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsDisplay {
    /// No check has completed yet
    Checking,
    Valid,
    Invalid,
    Missing,
    /// The last check failed in transport
    Error,
}

impl CredentialsDisplay {
    pub fn from_status(status: CredentialsStatus) -> Self {
        match (status.exists, status.valid) {
            (true, true) => CredentialsDisplay::Valid,
            (true, false) => CredentialsDisplay::Invalid,
            (false, _) => CredentialsDisplay::Missing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CredentialsDisplay::Checking => "Checking...",
            CredentialsDisplay::Valid => "Valid",
            CredentialsDisplay::Invalid => "Invalid",
            CredentialsDisplay::Missing => "Missing",
            CredentialsDisplay::Error => "Error",
        }
    }

    /// Style class; transport errors share the invalid styling
    pub fn css_class(self) -> &'static str {
        match self {
            CredentialsDisplay::Checking => "checking",
            CredentialsDisplay::Valid => "valid",
            CredentialsDisplay::Invalid | CredentialsDisplay::Error => "invalid",
            CredentialsDisplay::Missing => "missing",
        }
    }
}

/// Which engine controls are usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub sync_enabled: bool,
}

impl Controls {
    pub fn for_state(state: SyncState) -> Self {
        let running = state.is_running();
        Self {
            start_enabled: !running,
            stop_enabled: running,
            sync_enabled: running,
        }
    }
}

/// Split the comma-separated ignore pattern input into patterns
///
/// Tokens are trimmed and empty tokens dropped, so `"a, b,, c "` yields
/// `["a", "b", "c"]`.
pub fn parse_ignore_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inverse of [`parse_ignore_patterns`] for populating the form
pub fn join_ignore_patterns(patterns: &[String]) -> String {
    patterns.join(", ")
}

// ============================================================================
// Forms
// ============================================================================

/// Editable configuration form fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigForm {
    pub local_folder: String,
    pub drive_folder: String,
    /// Raw comma-separated input
    pub ignore_patterns: String,
}

impl ConfigForm {
    /// Configuration to submit from the current field values
    pub fn to_config(&self) -> SyncConfig {
        SyncConfig {
            local_folder: self.local_folder.clone(),
            drive_folder: self.drive_folder.clone(),
            ignore_patterns: parse_ignore_patterns(&self.ignore_patterns),
        }
    }
}

/// Credentials upload form state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsForm {
    pub file_name: Option<String>,
    pub uploading: bool,
}

impl CredentialsForm {
    pub fn file_label(&self) -> &str {
        self.file_name.as_deref().unwrap_or(NO_FILE_CHOSEN)
    }

    pub fn upload_enabled(&self) -> bool {
        self.file_name.is_some() && !self.uploading
    }

    pub fn upload_label(&self) -> &'static str {
        if self.uploading {
            "Uploading..."
        } else {
            "Upload Credentials"
        }
    }
}

// ============================================================================
// Actions
// ============================================================================

/// A user-triggered mutating call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    Start,
    Stop,
    Sync,
    SaveConfig(SyncConfig),
    UploadCredentials,
}

/// Read performed after an action succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    RefreshStatus,
    RefreshCredentials,
}

impl PanelAction {
    pub fn success_message(&self) -> &'static str {
        match self {
            PanelAction::Start => "Sync engine started successfully",
            PanelAction::Stop => "Sync engine stopped",
            PanelAction::Sync => "Manual sync triggered",
            PanelAction::SaveConfig(_) => "Configuration saved successfully",
            PanelAction::UploadCredentials => "Credentials uploaded successfully",
        }
    }

    /// Generic message for transport failures
    pub fn failure_message(&self) -> &'static str {
        match self {
            PanelAction::Start => "Failed to start sync engine",
            PanelAction::Stop => "Failed to stop sync engine",
            PanelAction::Sync => "Failed to trigger manual sync",
            PanelAction::SaveConfig(_) => "Failed to save configuration",
            PanelAction::UploadCredentials => "Failed to upload credentials",
        }
    }

    pub fn log_message(&self) -> &'static str {
        match self {
            PanelAction::Start => "Sync engine started",
            PanelAction::Stop => "Sync engine stopped",
            PanelAction::Sync => "Manual sync triggered",
            PanelAction::SaveConfig(_) => "Configuration updated",
            PanelAction::UploadCredentials => "Google Drive credentials uploaded",
        }
    }

    pub fn follow_up(&self) -> Option<FollowUp> {
        match self {
            PanelAction::Start | PanelAction::Stop => Some(FollowUp::RefreshStatus),
            PanelAction::UploadCredentials => Some(FollowUp::RefreshCredentials),
            PanelAction::Sync | PanelAction::SaveConfig(_) => None,
        }
    }
}

/// Result of applying an action's response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOutcome {
    pub ticket: NotificationTicket,
    pub succeeded: bool,
}

// ============================================================================
// Panel state
// ============================================================================

/// Everything the control surface renders
#[derive(Debug, Clone)]
pub struct PanelState {
    /// Last status reported by the agent
    pub status: Option<SyncStatusSnapshot>,
    pub local_folder_label: String,
    pub drive_folder_label: String,
    pub last_sync: Option<DateTime<Local>>,
    pub config_form: ConfigForm,
    pub credentials_form: CredentialsForm,
    pub credentials: CredentialsDisplay,
    pub activity: ActivityLog,
    pub notification: NotificationSlot,
}

impl PanelState {
    /// Fresh panel with the two startup log entries
    pub fn new(settings: &PanelSettings) -> Self {
        let mut activity = ActivityLog::new(settings.activity_log_capacity);
        activity.record("Application started");
        activity.record("Ready to configure sync settings");

        Self {
            status: None,
            local_folder_label: NOT_CONFIGURED.to_string(),
            drive_folder_label: NOT_CONFIGURED.to_string(),
            last_sync: None,
            config_form: ConfigForm::default(),
            credentials_form: CredentialsForm::default(),
            credentials: CredentialsDisplay::Checking,
            activity,
            notification: NotificationSlot::default(),
        }
    }

    pub fn sync_state(&self) -> SyncState {
        self.status.as_ref().map(|s| s.status).unwrap_or_default()
    }

    pub fn controls(&self) -> Controls {
        Controls::for_state(self.sync_state())
    }

    pub fn last_sync_label(&self) -> String {
        match self.last_sync {
            Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => NEVER_SYNCED.to_string(),
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> NotificationTicket {
        self.notification.show(message, severity)
    }

    pub fn expire_notification(&mut self, ticket: NotificationTicket) -> bool {
        self.notification.expire(ticket)
    }

    pub fn select_credentials_file(&mut self, file_name: Option<String>) {
        self.credentials_form.file_name = file_name;
    }

    /// Apply the outcome of `GET /api/config`
    pub fn apply_config(
        &mut self,
        result: Result<ConfigResponse, AgentClientError>,
    ) -> Option<NotificationTicket> {
        let config = match result {
            Ok(config) => config,
            Err(e) => {
                warn!("Error loading config: {}", e);
                return Some(self.notify("Failed to load configuration", Severity::Error));
            }
        };

        if let Some(error) = config.error {
            warn!("Agent reported config error: {}", error);
            return Some(self.notify("Error loading configuration", Severity::Error));
        }

        let local_folder = config.local_folder.unwrap_or_default();
        let drive_folder = config.drive_folder.unwrap_or_default();

        self.config_form = ConfigForm {
            local_folder: local_folder.clone(),
            drive_folder: drive_folder.clone(),
            ignore_patterns: config
                .ignore_patterns
                .as_deref()
                .map(join_ignore_patterns)
                .unwrap_or_default(),
        };
        self.local_folder_label = label_or_default(local_folder);
        self.drive_folder_label = label_or_default(drive_folder);
        None
    }

    /// Apply the outcome of a status poll
    ///
    /// Failures are logged only; routine polling never raises a notification.
    pub fn apply_status(&mut self, result: Result<SyncStatusSnapshot, AgentClientError>) {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Error updating status: {}", e);
                return;
            }
        };

        if let Some(message) = &snapshot.message {
            debug!("Agent status: {} ({})", snapshot.status.label(), message);
        }
        if let Some(local_folder) = snapshot.local_folder.as_ref().filter(|f| !f.is_empty()) {
            self.local_folder_label = local_folder.clone();
        }
        if let Some(drive_folder) = snapshot.drive_folder.as_ref().filter(|f| !f.is_empty()) {
            self.drive_folder_label = drive_folder.clone();
        }
        self.status = Some(snapshot);
    }

    /// Apply the outcome of a credentials check
    pub fn apply_credentials_status(&mut self, result: Result<CredentialsStatus, AgentClientError>) {
        self.credentials = match result {
            Ok(status) => CredentialsDisplay::from_status(status),
            Err(e) => {
                warn!("Error checking credentials status: {}", e);
                CredentialsDisplay::Error
            }
        };
    }

    /// Apply the acknowledgement of a mutating call
    pub fn apply_ack(
        &mut self,
        action: &PanelAction,
        result: Result<ApiAck, AgentClientError>,
    ) -> ActionOutcome {
        let ack = match result {
            Ok(ack) => ack,
            Err(e) => {
                warn!("{}: {}", action.failure_message(), e);
                return ActionOutcome {
                    ticket: self.notify(action.failure_message(), Severity::Error),
                    succeeded: false,
                };
            }
        };

        if let Some(error) = ack.error {
            return ActionOutcome {
                ticket: self.notify(error, Severity::Error),
                succeeded: false,
            };
        }

        if let Some(message) = &ack.message {
            debug!("Agent: {}", message);
        }

        match action {
            PanelAction::Sync => self.last_sync = Some(Local::now()),
            PanelAction::SaveConfig(config) => {
                self.local_folder_label = config.local_folder.clone();
                self.drive_folder_label = config.drive_folder.clone();
            }
            PanelAction::Start | PanelAction::Stop | PanelAction::UploadCredentials => {}
        }

        let ticket = self.notify(action.success_message(), Severity::Success);
        self.activity.record(action.log_message());
        ActionOutcome {
            ticket,
            succeeded: true,
        }
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new(&PanelSettings::default())
    }
}

fn label_or_default(value: String) -> String {
    if value.is_empty() {
        NOT_CONFIGURED.to_string()
    } else {
        value
    }
}
