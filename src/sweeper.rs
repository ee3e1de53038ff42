use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info};

use crate::metrics::RATE_LIMIT_KEYS;
use crate::rate_limit::RateLimitStore;

/// Periodic cleanup of expired rate limit windows.
pub struct Sweeper;

/// Owns the running sweep task. Call `stop` on shutdown.
pub struct SweeperHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl Sweeper {
    pub fn start(store: Arc<dyn RateLimitStore>, every: Duration) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = every.as_secs(), "Rate limit sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.sweep(Utc::now()).await;
                        let tracked = store.len().await;
                        RATE_LIMIT_KEYS.set(tracked as f64);
                        debug!(removed, tracked, "Sweep finished");
                    }
                    _ = &mut shutdown_rx => break,
                }
            }

            info!("Rate limit sweeper stopped");
        });

        SweeperHandle { shutdown_tx, task }
    }
}

impl SweeperHandle {
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        let _ = self.task.await;
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}
