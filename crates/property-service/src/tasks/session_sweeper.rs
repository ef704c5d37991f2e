//! Session sweeper background task.
//!
//! Reads already ignore expired entries; this task bounds memory by evicting
//! them on a fixed interval. One task serves every session, so no timer is
//! held per login.
//!
//! # Graceful Shutdown
//!
//! Exits when the cancellation token is cancelled.

use crate::observability::metrics::record_sessions_swept;
use crate::services::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

/// Start the session sweeper.
///
/// Runs one sweep per `interval` (the first immediately) until
/// `cancel_token` is cancelled.
#[instrument(skip_all, name = "ps.task.session_sweeper")]
pub async fn start_session_sweeper(
    sessions: Arc<dyn SessionStore>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    info!(
        target: "ps.task.session_sweeper",
        interval_seconds = interval.as_secs(),
        "Starting session sweeper"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_sweep(sessions.as_ref()).await;
            }
            () = cancel_token.cancelled() => {
                info!(
                    target: "ps.task.session_sweeper",
                    "Session sweeper received shutdown signal, exiting"
                );
                break;
            }
        }
    }
}

/// Run a single sweep; returns the number of evicted sessions.
pub(crate) async fn run_sweep(sessions: &dyn SessionStore) -> usize {
    let evicted = sessions.sweep().await;
    if evicted > 0 {
        debug!(
            target: "ps.task.session_sweeper",
            evicted,
            "Evicted expired sessions"
        );
        record_sessions_swept(evicted);
    }
    evicted
}
