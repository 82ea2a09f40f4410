//! CLI subcommands for driving a sync agent
//!
//! Provides commands for:
//! - The engine (status, start, stop, sync)
//! - Config (show, set)
//! - Credentials (status, upload)
//!
//! Every command runs through the same controller as the browser panel, so
//! messages and activity entries match what the panel would show.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use syncpanel_shared::{Controller, NotificationTicket, PanelSettings, PanelState, Severity};
use tracing::{debug, warn};

use crate::agent::{AgentClient, CredentialsFile};
use crate::render::{render_notification, render_panel, render_summary};
use crate::watch::TerminalController;

/// Controller used by the one-shot commands
pub type CliController = TerminalController<AgentClient>;

/// Build a controller for the agent at `url`
pub fn connect(url: &str, settings: &PanelSettings) -> CliController {
    let client = AgentClient::new(url, settings.request_timeout());
    Controller::new(client, RefCell::new(PanelState::new(settings)))
}

/// Settings file used when `--settings` is not given
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("syncpanel").join("settings.toml"))
}

/// Load settings from `explicit`, else from `fallback` if it exists, else defaults
pub fn load_settings(explicit: Option<&Path>, fallback: Option<&Path>) -> anyhow::Result<PanelSettings> {
    if let Some(path) = explicit {
        return PanelSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()));
    }

    match fallback.filter(|path| path.exists()) {
        Some(path) => {
            debug!("Loading settings from {}", path.display());
            PanelSettings::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))
        }
        None => Ok(PanelSettings::default()),
    }
}

/// Print the notification a command produced, failing on errors
pub fn report(controller: &CliController, ticket: Option<NotificationTicket>) -> anyhow::Result<()> {
    let state = controller.store().borrow();
    let current = ticket
        .filter(|t| state.notification.current_ticket() == Some(*t))
        .and_then(|_| state.notification.current());

    match current {
        Some(notification) if notification.severity == Severity::Error => {
            anyhow::bail!("{}", notification.message)
        }
        Some(notification) => {
            println!("{}", render_notification(notification));
            Ok(())
        }
        None => Ok(()),
    }
}

/// `syncpanel status`
pub async fn show_status(controller: &CliController) -> anyhow::Result<()> {
    let ticket = controller.initialize().await;

    if controller.store().borrow().status.is_none() {
        anyhow::bail!(
            "Could not reach the sync agent at {}",
            controller.client().base_url()
        );
    }

    print!("{}", render_panel(&controller.store().borrow()));
    report(controller, ticket)
}

/// Engine control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Start,
    Stop,
    Sync,
}

impl EngineCommand {
    pub async fn execute(self, controller: &CliController) -> anyhow::Result<()> {
        let ticket = match self {
            EngineCommand::Start => controller.start().await,
            EngineCommand::Stop => controller.stop().await,
            EngineCommand::Sync => controller.sync().await,
        };
        report(controller, ticket)?;
        print!("{}", render_summary(&controller.store().borrow()));
        Ok(())
    }
}

// =============================================================================
// Config Commands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the agent's current configuration
    Show,
    /// Change the configuration; omitted fields keep their current value
    Set {
        /// Local folder to sync
        #[arg(long)]
        local_folder: Option<String>,
        /// Drive folder to sync into
        #[arg(long)]
        drive_folder: Option<String>,
        /// Comma-separated ignore patterns (pass "" to clear)
        #[arg(long)]
        ignore: Option<String>,
    },
}

impl ConfigCommands {
    pub async fn execute(&self, controller: &CliController) -> anyhow::Result<()> {
        let ticket = controller.load_config().await;

        match self {
            ConfigCommands::Show => {
                report(controller, ticket)?;
                let state = controller.store().borrow();
                let form = &state.config_form;
                println!("{:<16} {}", "Local folder:", state.local_folder_label);
                println!("{:<16} {}", "Drive folder:", state.drive_folder_label);
                println!(
                    "{:<16} {}",
                    "Ignore patterns:",
                    if form.ignore_patterns.is_empty() {
                        "-"
                    } else {
                        form.ignore_patterns.as_str()
                    }
                );
                Ok(())
            }
            ConfigCommands::Set {
                local_folder,
                drive_folder,
                ignore,
            } => {
                // An agent that was never configured answers with an error
                if let Err(e) = report(controller, ticket) {
                    warn!("{}, starting from an empty configuration", e);
                }

                {
                    let mut state = controller.store().borrow_mut();
                    let form = &mut state.config_form;
                    if let Some(local_folder) = local_folder {
                        form.local_folder = local_folder.clone();
                    }
                    if let Some(drive_folder) = drive_folder {
                        form.drive_folder = drive_folder.clone();
                    }
                    if let Some(ignore) = ignore {
                        form.ignore_patterns = ignore.clone();
                    }
                }

                let ticket = controller.submit_config_form().await;
                report(controller, ticket)
            }
        }
    }
}

// =============================================================================
// Credentials Commands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum CredentialsCommands {
    /// Show whether the agent has valid Google Drive credentials
    Status,
    /// Upload a Google Drive credentials JSON file
    Upload {
        /// Path to the credentials file
        file: PathBuf,
    },
}

impl CredentialsCommands {
    pub async fn execute(&self, controller: &CliController) -> anyhow::Result<()> {
        match self {
            CredentialsCommands::Status => {
                controller.check_credentials().await;
                let credentials = controller.store().borrow().credentials;
                println!("Credentials: {}", credentials.label());
                Ok(())
            }
            CredentialsCommands::Upload { file } => {
                let upload = CredentialsFile::read(file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                controller
                    .store()
                    .borrow_mut()
                    .select_credentials_file(Some(upload.file_name.clone()));

                let ticket = controller.upload_credentials(Some(upload)).await;
                report(controller, ticket)?;

                let credentials = controller.store().borrow().credentials;
                println!("Credentials: {}", credentials.label());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fallback_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("settings.toml");

        let settings = load_settings(None, Some(&missing)).unwrap();
        assert_eq!(settings, PanelSettings::default());
    }

    #[test]
    fn test_explicit_settings_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = load_settings(Some(&missing), None).unwrap_err();
        assert!(err.to_string().contains("Failed to load settings"));
    }

    #[test]
    fn test_fallback_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "status_interval_secs = 2\n").unwrap();

        let settings = load_settings(None, Some(&path)).unwrap();
        assert_eq!(settings.status_interval_secs, 2);
        assert_eq!(settings.credentials_interval_secs, 10);
    }

    #[test]
    fn test_report_fails_on_error_notification() {
        let controller = connect("http://127.0.0.1:9", &PanelSettings::default());
        let ticket = controller
            .store()
            .borrow_mut()
            .notify("Sync engine not running", Severity::Error);

        let err = report(&controller, Some(ticket)).unwrap_err();
        assert_eq!(err.to_string(), "Sync engine not running");
    }

    #[test]
    fn test_report_ignores_superseded_ticket() {
        let controller = connect("http://127.0.0.1:9", &PanelSettings::default());
        let stale = controller.store().borrow_mut().notify("old", Severity::Error);
        controller.store().borrow_mut().notify("new", Severity::Success);

        assert!(report(&controller, Some(stale)).is_ok());
    }
}
