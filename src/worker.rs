use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::db;
use crate::services::billing;
use crate::state::SharedState;

/// Periodic housekeeping: the payment reminder sweep, expired session
/// purge and rate limiter cleanup. Runs until `shutdown` flips to true.
pub fn spawn(
    state: SharedState,
    mut shutdown: watch::Receiver<bool>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Reminder worker started (every {}s)", interval.as_secs());

        loop {
            if *shutdown.borrow() {
                break;
            }

            tick(&state).await;

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {}
            }
        }

        tracing::info!("Reminder worker stopped");
    })
}

async fn tick(state: &SharedState) {
    let summary = billing::send_payment_reminders(state).await;
    tracing::debug!("Reminder sweep finished: {summary:?}");

    let purged = db::sessions::purge_expired(&state.store).await;
    if purged > 0 {
        tracing::debug!("Purged {purged} expired sessions");
    }

    state.login_limiter.cleanup();
}
