//! Live terminal panel
//!
//! Loads the panel once, then keeps it fresh on two independent timers
//! (status and credentials) until the shutdown future resolves. The panel
//! is redrawn after every event.

use std::cell::RefCell;
use std::future::Future;
use std::io::Write;

use syncpanel_shared::{AgentApi, Controller, NotificationTicket, PanelSettings, PanelState};
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::render::render_panel;

/// Controller type used by the terminal commands
pub type TerminalController<C> = Controller<C, RefCell<PanelState>>;

/// Options for [`watch`]
#[derive(Debug, Clone, Copy, Default)]
pub struct WatchOptions {
    /// Clear the terminal before each redraw
    pub clear_screen: bool,
}

/// Run the live panel until `shutdown` resolves
pub async fn watch<C, W, F>(
    controller: &TerminalController<C>,
    settings: &PanelSettings,
    options: WatchOptions,
    out: &mut W,
    shutdown: F,
) -> anyhow::Result<()>
where
    C: AgentApi,
    W: Write,
    F: Future<Output = ()>,
{
    let mut pending = controller.initialize().await.map(|ticket| expiry(settings, ticket));
    draw(controller, options, out)?;

    let status_period = settings.status_interval();
    let credentials_period = settings.credentials_interval();
    let mut status_timer = interval_at(Instant::now() + status_period, status_period);
    let mut credentials_timer = interval_at(Instant::now() + credentials_period, credentials_period);
    status_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    credentials_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(shutdown);
    info!(
        "Watching agent (status every {:?}, credentials every {:?})",
        status_period, credentials_period
    );

    loop {
        let deadline = pending.map(|(_, at)| at).unwrap_or_else(Instant::now);

        tokio::select! {
            _ = status_timer.tick() => {
                controller.refresh_status().await;
            }
            _ = credentials_timer.tick() => {
                controller.check_credentials().await;
            }
            _ = sleep_until(deadline), if pending.is_some() => {
                if let Some((ticket, _)) = pending.take() {
                    controller.expire_notification(ticket);
                }
            }
            _ = &mut shutdown => {
                debug!("Watch stopped");
                break;
            }
        }

        draw(controller, options, out)?;
    }

    Ok(())
}

fn expiry(settings: &PanelSettings, ticket: NotificationTicket) -> (NotificationTicket, Instant) {
    (ticket, Instant::now() + settings.notification_ttl())
}

fn draw<C: AgentApi, W: Write>(
    controller: &TerminalController<C>,
    options: WatchOptions,
    out: &mut W,
) -> anyhow::Result<()> {
    let text = render_panel(&controller.store().borrow());
    if options.clear_screen {
        write!(out, "\x1b[2J\x1b[H")?;
    }
    writeln!(out, "{}", text)?;
    out.flush()?;
    Ok(())
}
