//! Interval scheduler for the sync engine

use crate::engine::{SyncEngine, SyncOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Fires the sync engine on a fixed wall-clock interval.
///
/// The first run starts immediately; afterwards one run per interval. Ticks
/// that land while a run is still active are skipped by the engine's own
/// guard, never queued, and a failed run only produces a log line: the next
/// tick proceeds normally.
pub struct Scheduler;

impl Scheduler {
    /// Spawn the scheduling loop onto the current runtime. Dropping or
    /// aborting the returned handle stops future ticks; it does not cancel
    /// a run already in flight.
    pub fn spawn(engine: Arc<SyncEngine>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(period_secs = period.as_secs(), "Sync scheduler started");
            let mut ticker = tokio::time::interval(period);
            // A late tick fires once, then the cadence realigns; no backlog
            // of deferred runs.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match engine.run().await {
                    Ok(SyncOutcome::Completed(report)) => {
                        info!(
                            pages = report.pages_processed,
                            inserted = report.inserted,
                            "Scheduled sync completed"
                        );
                    }
                    Ok(SyncOutcome::Skipped) => {
                        info!("Scheduled sync skipped, previous run still active");
                    }
                    // Background failure: visible in logs only, never fatal
                    // to the process.
                    Err(err) => error!(error = %err, "Scheduled sync failed"),
                }
            }
        })
    }
}
