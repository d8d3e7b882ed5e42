//! Periodic purge of expired refresh sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use guardpost_core::error::AppError;

use super::store::SessionStore;

/// Deletes expired refresh sessions on a fixed interval.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    store: Arc<SessionStore>,
    interval: Duration,
}

impl SessionCleanup {
    /// Creates a cleanup task that runs every `interval`.
    pub fn new(store: Arc<SessionStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Runs one cleanup cycle and returns how many sessions were removed.
    pub async fn run_cleanup(&self) -> Result<u64, AppError> {
        let purged = self.store.purge_expired().await?;
        if purged > 0 {
            info!(purged, "Purged expired refresh sessions");
        }
        Ok(purged)
    }

    /// Loops until `shutdown` flips to `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cleanup().await {
                        error!(error = %e, retryable = e.is_retryable(), "Session cleanup failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Session cleanup stopped");
                        break;
                    }
                }
            }
        }
    }
}
