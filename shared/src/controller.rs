//! Control surface operations
//!
//! The [`Controller`] sequences each operation as remote call, pure state
//! transition, then any follow-up read. State is reached through a
//! [`PanelStore`] and is never borrowed across an `.await`, so several
//! operations may be in flight at once (the browser panel relies on this).

use std::cell::RefCell;
use std::rc::Rc;

use crate::client::{AgentApi, AgentClientError};
use crate::messages::{ApiAck, SyncConfig};
use crate::panel::{FollowUp, NotificationTicket, PanelAction, PanelState, Severity};

/// Somewhere a [`PanelState`] lives
pub trait PanelStore {
    /// Run `f` against the state; `None` if the state is gone
    fn update<R>(&self, f: impl FnOnce(&mut PanelState) -> R) -> Option<R>;
}

impl PanelStore for RefCell<PanelState> {
    fn update<R>(&self, f: impl FnOnce(&mut PanelState) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}

impl<T: PanelStore> PanelStore for Rc<T> {
    fn update<R>(&self, f: impl FnOnce(&mut PanelState) -> R) -> Option<R> {
        (**self).update(f)
    }
}

/// Store wrapper that reports every notification as it is shown
///
/// The hook runs right after the update that showed the notification,
/// outside the inner store, so tickets arrive in the order notifications
/// appeared even when operations finish out of order.
pub struct NotifyingStore<S> {
    inner: S,
    on_shown: Box<dyn Fn(NotificationTicket)>,
}

impl<S: PanelStore> NotifyingStore<S> {
    pub fn new(inner: S, on_shown: impl Fn(NotificationTicket) + 'static) -> Self {
        Self {
            inner,
            on_shown: Box::new(on_shown),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: PanelStore> PanelStore for NotifyingStore<S> {
    fn update<R>(&self, f: impl FnOnce(&mut PanelState) -> R) -> Option<R> {
        let (result, shown) = self.inner.update(|state| {
            let before = state.notification.current_ticket();
            let result = f(state);
            let after = state.notification.current_ticket();
            (result, after.filter(|ticket| Some(*ticket) != before))
        })?;

        if let Some(ticket) = shown {
            (self.on_shown)(ticket);
        }
        Some(result)
    }
}

/// Drives a panel against a sync agent
pub struct Controller<C, S> {
    client: C,
    store: S,
}

impl<C: AgentApi, S: PanelStore> Controller<C, S> {
    pub fn new(client: C, store: S) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Initial load: configuration, status, then credentials
    pub async fn initialize(&self) -> Option<NotificationTicket> {
        let ticket = self.load_config().await;
        self.refresh_status().await;
        self.check_credentials().await;
        ticket
    }

    pub async fn load_config(&self) -> Option<NotificationTicket> {
        let result = self.client.get_config().await;
        self.store.update(|state| state.apply_config(result)).flatten()
    }

    pub async fn refresh_status(&self) {
        let result = self.client.status().await;
        self.store.update(|state| state.apply_status(result));
    }

    pub async fn check_credentials(&self) {
        let result = self.client.credentials_status().await;
        self.store.update(|state| state.apply_credentials_status(result));
    }

    pub async fn start(&self) -> Option<NotificationTicket> {
        let result = self.client.start().await;
        self.finish(PanelAction::Start, result).await
    }

    pub async fn stop(&self) -> Option<NotificationTicket> {
        let result = self.client.stop().await;
        self.finish(PanelAction::Stop, result).await
    }

    pub async fn sync(&self) -> Option<NotificationTicket> {
        let result = self.client.sync().await;
        self.finish(PanelAction::Sync, result).await
    }

    /// Submit an explicit configuration
    pub async fn save_config(&self, config: SyncConfig) -> Option<NotificationTicket> {
        let result = self.client.save_config(&config).await;
        self.finish(PanelAction::SaveConfig(config), result).await
    }

    /// Submit the configuration currently held in the form fields
    pub async fn submit_config_form(&self) -> Option<NotificationTicket> {
        let config = self.store.update(|state| state.config_form.to_config())?;
        self.save_config(config).await
    }

    /// Upload a credentials file; `None` means nothing was chosen
    pub async fn upload_credentials(&self, file: Option<C::Upload>) -> Option<NotificationTicket> {
        let Some(file) = file else {
            return self
                .store
                .update(|state| state.notify("Please select a credentials file", Severity::Error));
        };

        self.store.update(|state| state.credentials_form.uploading = true);
        let result = self.client.upload_credentials(file).await;
        self.store.update(|state| state.credentials_form.uploading = false);

        self.finish(PanelAction::UploadCredentials, result).await
    }

    pub fn expire_notification(&self, ticket: NotificationTicket) -> bool {
        self.store
            .update(|state| state.expire_notification(ticket))
            .unwrap_or(false)
    }

    async fn finish(
        &self,
        action: PanelAction,
        result: Result<ApiAck, AgentClientError>,
    ) -> Option<NotificationTicket> {
        let outcome = self.store.update(|state| state.apply_ack(&action, result))?;

        if outcome.succeeded {
            match action.follow_up() {
                Some(FollowUp::RefreshStatus) => self.refresh_status().await,
                Some(FollowUp::RefreshCredentials) => self.check_credentials().await,
                None => {}
            }
        }

        Some(outcome.ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ConfigResponse, CredentialsStatus, SyncState, SyncStatusSnapshot};
    use crate::panel::CredentialsDisplay;
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use futures::executor::block_on;

    /// In-memory agent that records the calls it receives
    struct FakeAgent {
        running: RefCell<bool>,
        ack: RefCell<Result<ApiAck, AgentClientError>>,
        credentials: RefCell<CredentialsStatus>,
        saved: RefCell<Option<SyncConfig>>,
        calls: RefCell<Vec<&'static str>>,
        status_gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    impl FakeAgent {
        fn new() -> Self {
            Self {
                running: RefCell::new(false),
                ack: RefCell::new(Ok(ApiAck::default())),
                credentials: RefCell::new(CredentialsStatus::default()),
                saved: RefCell::new(None),
                calls: RefCell::new(Vec::new()),
                status_gate: RefCell::new(None),
            }
        }

        fn reply_with(&self, ack: Result<ApiAck, AgentClientError>) {
            *self.ack.borrow_mut() = ack;
        }

        /// Hold the next status reply until the returned sender fires
        fn hold_status(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.status_gate.borrow_mut() = Some(rx);
            tx
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.borrow().clone()
        }

        fn ack(&self, call: &'static str) -> Result<ApiAck, AgentClientError> {
            self.calls.borrow_mut().push(call);
            self.ack.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl AgentApi for FakeAgent {
        type Upload = String;

        async fn get_config(&self) -> Result<ConfigResponse, AgentClientError> {
            self.calls.borrow_mut().push("get_config");
            Ok(ConfigResponse {
                local_folder: Some("/data".into()),
                drive_folder: Some("Drive".into()),
                ignore_patterns: Some(vec!["*.tmp".into()]),
                error: None,
            })
        }

        async fn save_config(&self, config: &SyncConfig) -> Result<ApiAck, AgentClientError> {
            *self.saved.borrow_mut() = Some(config.clone());
            self.ack("save_config")
        }

        async fn status(&self) -> Result<SyncStatusSnapshot, AgentClientError> {
            self.calls.borrow_mut().push("status");
            let gate = self.status_gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            let status = if *self.running.borrow() {
                SyncState::Running
            } else {
                SyncState::Stopped
            };
            Ok(SyncStatusSnapshot {
                status,
                ..Default::default()
            })
        }

        async fn start(&self) -> Result<ApiAck, AgentClientError> {
            let ack = self.ack("start");
            if matches!(&ack, Ok(a) if a.error.is_none()) {
                *self.running.borrow_mut() = true;
            }
            ack
        }

        async fn stop(&self) -> Result<ApiAck, AgentClientError> {
            *self.running.borrow_mut() = false;
            self.ack("stop")
        }

        async fn sync(&self) -> Result<ApiAck, AgentClientError> {
            self.ack("sync")
        }

        async fn upload_credentials(&self, _file: String) -> Result<ApiAck, AgentClientError> {
            *self.credentials.borrow_mut() = CredentialsStatus {
                exists: true,
                valid: true,
            };
            self.ack("upload_credentials")
        }

        async fn credentials_status(&self) -> Result<CredentialsStatus, AgentClientError> {
            self.calls.borrow_mut().push("credentials_status");
            Ok(*self.credentials.borrow())
        }
    }

    fn controller() -> Controller<FakeAgent, RefCell<PanelState>> {
        Controller::new(FakeAgent::new(), RefCell::new(PanelState::default()))
    }

    fn state<C: AgentApi>(controller: &Controller<C, RefCell<PanelState>>) -> PanelState {
        controller.store().borrow().clone()
    }

    #[test]
    fn test_initialize_loads_everything() {
        let controller = controller();
        let ticket = block_on(controller.initialize());

        assert!(ticket.is_none());
        assert_eq!(
            controller.client().calls(),
            vec!["get_config", "status", "credentials_status"]
        );
        let state = state(&controller);
        assert_eq!(state.local_folder_label, "/data");
        assert_eq!(state.config_form.ignore_patterns, "*.tmp");
        assert_eq!(state.credentials, CredentialsDisplay::Missing);
        assert!(state.controls().start_enabled);
    }

    #[test]
    fn test_start_success_logs_and_refreshes_status() {
        let controller = controller();
        let before = state(&controller).activity.len();

        let ticket = block_on(controller.start());

        assert!(ticket.is_some());
        assert_eq!(controller.client().calls(), vec!["start", "status"]);
        let state = state(&controller);
        assert_eq!(state.activity.len(), before + 1);
        assert_eq!(
            state.activity.entries().next().map(|e| e.message.as_str()),
            Some("Sync engine started")
        );
        assert_eq!(
            state.notification.current().map(|n| (n.message.as_str(), n.severity)),
            Some(("Sync engine started successfully", Severity::Success))
        );
        assert!(state.controls().stop_enabled);
    }

    #[test]
    fn test_start_agent_error_is_shown_verbatim() {
        let controller = controller();
        controller.client().reply_with(Ok(ApiAck::err("busy")));
        let before = state(&controller).activity.len();

        block_on(controller.start());

        assert_eq!(controller.client().calls(), vec!["start"]);
        let state = state(&controller);
        assert_eq!(state.activity.len(), before);
        assert_eq!(
            state.notification.current().map(|n| (n.message.as_str(), n.severity)),
            Some(("busy", Severity::Error))
        );
    }

    #[test]
    fn test_transport_failure_uses_generic_message() {
        let controller = controller();
        controller
            .client()
            .reply_with(Err(AgentClientError::ConnectionFailed("refused".into())));

        block_on(controller.sync());

        let state = state(&controller);
        assert!(state.last_sync.is_none());
        assert_eq!(
            state.notification.current().map(|n| n.message.as_str()),
            Some("Failed to trigger manual sync")
        );
    }

    #[test]
    fn test_submit_form_splits_patterns() {
        let controller = controller();
        controller.store().borrow_mut().config_form.local_folder = "/srv".into();
        controller.store().borrow_mut().config_form.drive_folder = "Remote".into();
        controller.store().borrow_mut().config_form.ignore_patterns = "a, b,, c ".into();

        block_on(controller.submit_config_form());

        let saved = controller.client().saved.borrow().clone().unwrap();
        assert_eq!(saved.ignore_patterns, vec!["a", "b", "c"]);
        assert_eq!(state(&controller).drive_folder_label, "Remote");
    }

    #[test]
    fn test_upload_without_file_makes_no_request() {
        let controller = controller();

        block_on(controller.upload_credentials(None));

        assert!(controller.client().calls().is_empty());
        assert_eq!(
            state(&controller).notification.current().map(|n| n.message.as_str()),
            Some("Please select a credentials file")
        );
    }

    #[test]
    fn test_upload_rechecks_credentials_and_resets_form() {
        let controller = controller();
        controller
            .store()
            .borrow_mut()
            .select_credentials_file(Some("credentials.json".into()));

        block_on(controller.upload_credentials(Some("{}".into())));

        assert_eq!(
            controller.client().calls(),
            vec!["upload_credentials", "credentials_status"]
        );
        let state = state(&controller);
        assert_eq!(state.credentials, CredentialsDisplay::Valid);
        assert!(!state.credentials_form.uploading);
        assert_eq!(
            state.activity.entries().next().map(|e| e.message.as_str()),
            Some("Google Drive credentials uploaded")
        );
    }

    #[test]
    fn test_failed_upload_still_resets_form() {
        let controller = controller();
        controller.client().reply_with(Ok(ApiAck::err("Invalid credentials file format")));

        block_on(controller.upload_credentials(Some("{}".into())));

        let state = state(&controller);
        assert!(!state.credentials_form.uploading);
        assert_eq!(
            state.notification.current().map(|n| n.message.as_str()),
            Some("Invalid credentials file format")
        );
    }

    #[test]
    fn test_stale_expiry_does_not_hide_newer_notification() {
        let controller = controller();
        let first = block_on(controller.start()).unwrap();
        let second = block_on(controller.stop()).unwrap();

        assert!(!controller.expire_notification(first));
        assert!(state(&controller).notification.current().is_some());
        assert!(controller.expire_notification(second));
        assert!(state(&controller).notification.current().is_none());
    }

    #[test]
    fn test_overlapping_operations_report_tickets_in_display_order() {
        let shown = Rc::new(RefCell::new(Vec::new()));
        let store = {
            let shown = shown.clone();
            NotifyingStore::new(RefCell::new(PanelState::default()), move |ticket| {
                shown.borrow_mut().push(ticket)
            })
        };
        let controller = Controller::new(FakeAgent::new(), store);
        let release = controller.client().hold_status();

        // Start shows its notification, then waits on its status refresh
        // while Sync runs to completion.
        let (start_ticket, sync_ticket, _) = block_on(async {
            futures::join!(controller.start(), controller.sync(), async {
                let _ = release.send(());
            })
        });
        let (start_ticket, sync_ticket) = (start_ticket.unwrap(), sync_ticket.unwrap());

        assert!(start_ticket < sync_ticket);
        assert_eq!(*shown.borrow(), vec![start_ticket, sync_ticket]);

        // The last ticket reported is the one on screen, so expiring it hides it
        let latest = *shown.borrow().last().unwrap();
        let state = controller.store().inner();
        assert_eq!(state.borrow().notification.current_ticket(), Some(latest));
        assert_eq!(
            state.borrow().notification.current().map(|n| n.message.as_str()),
            Some("Manual sync triggered")
        );
        assert!(controller.expire_notification(latest));
        assert!(state.borrow().notification.current().is_none());
    }

    #[test]
    fn test_notifying_store_ignores_updates_without_new_notification() {
        let shown = Rc::new(RefCell::new(Vec::new()));
        let store = {
            let shown = shown.clone();
            NotifyingStore::new(RefCell::new(PanelState::default()), move |ticket| {
                shown.borrow_mut().push(ticket)
            })
        };
        let controller = Controller::new(FakeAgent::new(), store);

        block_on(controller.refresh_status());
        block_on(controller.check_credentials());
        assert!(shown.borrow().is_empty());

        let ticket = block_on(controller.upload_credentials(None)).unwrap();
        assert_eq!(*shown.borrow(), vec![ticket]);
    }
}
