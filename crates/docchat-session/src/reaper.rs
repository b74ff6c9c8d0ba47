//! Background expiry reaper.
//!
//! A single long-lived task that periodically runs
//! [`SessionStore::sweep_expired`]. The loop is owned: spawning returns a
//! handle whose shutdown flips a watch channel and joins the task, so the
//! process (and tests) stop deterministically. The shutdown signal is only
//! observed between scans: an in-flight sweep, and every delete inside it,
//! always runs to completion.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::payload::SessionPayload;
use crate::store::SessionStore;

/// Handle to a running reaper task.
pub struct ReaperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Stop the loop before its next scan and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "reaper task did not shut down cleanly");
        }
    }

    /// Whether the task has already exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn the reaper, sweeping every `interval`.
///
/// The first sweep runs one full interval after spawn, matching the source
/// service's hourly cleanup cadence. Sweep failures are logged by the
/// store and never stop the loop; a scan that cannot finish still leaves
/// the next one scheduled.
pub fn spawn<P: SessionPayload>(store: SessionStore<P>, interval: Duration) -> ReaperHandle {
    let (tx, mut rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // An interval's first tick completes immediately; consume it so
        // sweeping starts after one full period.
        ticker.tick().await;

        debug!(interval_secs = interval.as_secs_f64(), "expiry reaper started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = store.sweep_expired().await;
                    debug!(
                        hot_evicted = report.hot_evicted,
                        records_removed = report.records_removed,
                        failures = report.failures,
                        "reaper sweep finished"
                    );
                }
                changed = rx.changed() => {
                    if changed.is_err() || *rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("expiry reaper stopped");
    });

    ReaperHandle { shutdown: tx, task }
}
