//! Global State Management
//!
//! This module owns everything the panel needs at runtime:
//! - The panel view-model, held in a signal so views re-render on change
//! - The controller that runs operations against the agent
//! - The notification hide timer and the polling handles

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use leptos::*;
use syncpanel_shared::{
    Controller, NotificationTicket, NotifyingStore, PanelSettings, PanelState, PanelStore,
};

use crate::client::DirectClient;

/// Panel view-model stored in a Leptos signal
#[derive(Clone, Copy)]
pub struct SignalStore(pub RwSignal<PanelState>);

impl SignalStore {
    pub fn new(state: PanelState) -> Self {
        Self(create_rw_signal(state))
    }
}

impl PanelStore for SignalStore {
    fn update<R>(&self, f: impl FnOnce(&mut PanelState) -> R) -> Option<R> {
        self.0.try_update(f)
    }
}

/// Controller type used by the browser panel
pub type PanelController = Controller<DirectClient, NotifyingStore<SignalStore>>;

/// Auto-hide timer for the visible notification
///
/// Holds one pending timeout. A request for an older ticket never replaces
/// the timer of a newer one.
#[derive(Clone)]
pub struct HideTimer {
    panel: RwSignal<PanelState>,
    ttl_millis: u32,
    pending: Rc<RefCell<Option<(NotificationTicket, Timeout)>>>,
}

impl HideTimer {
    pub fn new(panel: RwSignal<PanelState>, settings: &PanelSettings) -> Self {
        Self {
            panel,
            ttl_millis: u32::try_from(settings.notification_ttl().as_millis()).unwrap_or(u32::MAX),
            pending: Rc::new(RefCell::new(None)),
        }
    }

    /// Hide the notification for `ticket` once the TTL elapses
    pub fn schedule(&self, ticket: NotificationTicket) {
        let scheduled = self.pending.borrow().as_ref().map(|(t, _)| *t);
        if !supersedes(ticket, scheduled) {
            tracing::debug!("Ignoring hide request for superseded {:?}", ticket);
            return;
        }

        let panel = self.panel;
        let timeout = Timeout::new(self.ttl_millis, move || {
            panel.try_update(|state| state.expire_notification(ticket));
        });
        // Replacing the previous timeout drops and so cancels it
        self.pending.borrow_mut().replace((ticket, timeout));
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}

/// Whether a timer for `ticket` should replace the one for `scheduled`
fn supersedes(ticket: NotificationTicket, scheduled: Option<NotificationTicket>) -> bool {
    scheduled.map_or(true, |scheduled| ticket > scheduled)
}

/// Global application state
#[derive(Clone)]
pub struct AppState {
    /// Panel view-model
    pub panel: RwSignal<PanelState>,

    /// Timing and capacity settings
    pub settings: PanelSettings,

    controller: Rc<PanelController>,

    hide_timer: HideTimer,
}

impl AppState {
    /// Create state talking to the agent that served the page
    pub fn new() -> Self {
        Self::with_client(DirectClient::same_origin(), PanelSettings::default())
    }

    pub fn with_client(client: DirectClient, settings: PanelSettings) -> Self {
        let store = SignalStore::new(PanelState::new(&settings));
        let panel = store.0;
        let hide_timer = HideTimer::new(panel, &settings);

        // Every notification starts its countdown the moment it is shown
        let store = {
            let hide_timer = hide_timer.clone();
            NotifyingStore::new(store, move |ticket| hide_timer.schedule(ticket))
        };

        Self {
            panel,
            settings,
            controller: Rc::new(Controller::new(client, store)),
            hide_timer,
        }
    }

    pub fn controller(&self) -> Rc<PanelController> {
        self.controller.clone()
    }

    /// Run an operation in the background
    pub fn dispatch<F, Fut>(&self, op: F)
    where
        F: FnOnce(Rc<PanelController>) -> Fut + 'static,
        Fut: Future + 'static,
    {
        let controller = self.controller();
        spawn_local(async move {
            op(controller).await;
        });
    }

    /// Hide the visible notification now
    pub fn dismiss_notification(&self) {
        self.hide_timer.cancel();
        self.panel.update(|state| state.notification.dismiss());
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the status and credentials polling loops
///
/// Dropping the poller (or calling [`Poller::stop`]) cancels both loops.
pub struct Poller {
    status: Interval,
    credentials: Interval,
}

impl Poller {
    pub fn start(state: &AppState) -> Self {
        let status = {
            let state = state.clone();
            Interval::new(interval_millis(state.settings.status_interval_secs), move || {
                state.dispatch(|controller| async move { controller.refresh_status().await });
            })
        };

        let credentials = {
            let state = state.clone();
            Interval::new(interval_millis(state.settings.credentials_interval_secs), move || {
                state.dispatch(|controller| async move { controller.check_credentials().await });
            })
        };

        tracing::debug!("Polling started");
        Self { status, credentials }
    }

    pub fn stop(self) {
        let Self { status, credentials } = self;
        drop(status);
        drop(credentials);
        tracing::debug!("Polling stopped");
    }
}

fn interval_millis(secs: u64) -> u32 {
    u32::try_from(secs.saturating_mul(1000)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncpanel_shared::{ApiAck, PanelAction, Severity};

    #[test]
    fn test_signal_store_applies_transitions() {
        let runtime = create_runtime();

        let store = SignalStore::new(PanelState::default());
        let outcome = store
            .update(|state| state.apply_ack(&PanelAction::Start, Ok(ApiAck::default())))
            .unwrap();

        assert!(outcome.succeeded);
        store.0.with(|state| {
            assert_eq!(
                state.notification.current().map(|n| n.severity),
                Some(Severity::Success)
            );
            assert_eq!(state.activity.len(), 3);
        });

        runtime.dispose();
    }

    #[test]
    fn test_disposed_store_is_gone() {
        let runtime = create_runtime();
        let store = SignalStore::new(PanelState::default());
        store.0.dispose();

        assert!(store.update(|state| state.activity.len()).is_none());

        runtime.dispose();
    }

    #[test]
    fn test_older_ticket_never_replaces_newer_timer() {
        let mut state = PanelState::default();
        let first = state.notify("Sync engine started successfully", Severity::Success);
        let second = state.notify("Manual sync triggered", Severity::Success);

        assert!(supersedes(first, None));
        assert!(supersedes(second, Some(first)));
        assert!(!supersedes(first, Some(second)));
        assert!(!supersedes(second, Some(second)));
    }

    #[test]
    fn test_interval_millis_saturates() {
        assert_eq!(interval_millis(5), 5_000);
        assert_eq!(interval_millis(u64::MAX), u32::MAX);
    }
}
