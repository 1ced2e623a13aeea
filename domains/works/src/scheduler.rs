//! Expiry scheduler
//!
//! A recurring background task that sweeps the gallery for works past
//! their retention window. A single task runs the sweep inline, so at
//! most one sweep is ever in flight.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::entities::WorkGallery;

/// Handle to the running sweep task. Stopping (or dropping) the handle
/// cancels the task when the owning session ends.
pub struct ExpiryScheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ExpiryScheduler {
    /// Spawn the sweep loop with the given period and retention window
    pub fn start(gallery: Arc<WorkGallery>, period: Duration, ttl: chrono::Duration) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; a fresh session has nothing
            // to sweep yet, so skip it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let swept = gallery.sweep_expired(Utc::now(), ttl);
                        if !swept.is_empty() {
                            tracing::info!(count = swept.len(), "Expiry sweep evicted works");
                        }
                    }
                    _ = stopped.changed() => break,
                }
            }
            tracing::debug!("Expiry scheduler stopped");
        });

        Self { shutdown, handle }
    }

    /// Stop the sweep loop and wait for it to wind down
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
