use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::services::risk_evaluator::RiskEvaluator;
use crate::utils::time::format_timestamp;

/// Background task that empties the evaluator's caches on a fixed period.
///
/// The first sweep runs one full period after `start`. Dropping the handle
/// without calling `shutdown` leaves the task running until the runtime stops.
pub struct CacheSweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CacheSweeper {
    pub fn start(evaluator: Arc<RiskEvaluator>, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let first_sweep = Instant::now() + period;

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(first_sweep, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            info!("Cache sweeper started (period: {}s)", period.as_secs());

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        evaluator.sweep_stale_entries();
                        info!("Cache sweep completed at {}", format_timestamp(chrono::Utc::now()));
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Cache sweeper stopped");
        });

        Self { shutdown_tx, handle }
    }

    /// Stop the ticker and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!("Cache sweeper task ended abnormally: {}", e);
        }
    }
}
