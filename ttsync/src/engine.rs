//! Paginated, idempotent ingestion of recent plays

use crate::error::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};
use ttlastfm::LastfmClient;
use ttstore::{NewScrobble, ScrobbleStore};

/// Tuning knobs for one sync run.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Hard ceiling on pages fetched per run. Upstream's reported page
    /// count can be stale or plain wrong; this bound guarantees the loop
    /// terminates no matter what the API claims.
    pub page_limit: u32,
    /// Pause between page fetches, to respect upstream rate limits.
    pub page_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            page_limit: 5,
            page_delay: Duration::from_millis(1200),
        }
    }
}

/// What one call to [`SyncEngine::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A run executed to completion.
    Completed(SyncReport),
    /// Another run was already active; upstream was not contacted.
    Skipped,
}

/// Counters from a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub pages_processed: u32,
    /// Events actually inserted; already-known duplicates do not count.
    pub inserted: u64,
}

/// Pulls recent plays from upstream into the persisted store.
///
/// Only one run may be active at a time, process-wide: the engine guards
/// itself with an atomic flag, so a second caller (scheduler tick or manual
/// trigger) gets [`SyncOutcome::Skipped`] instead of a queued run. The flag
/// is released on every exit path, including failures.
pub struct SyncEngine {
    client: Arc<LastfmClient>,
    store: Arc<ScrobbleStore>,
    options: SyncOptions,
    running: AtomicBool,
}

impl SyncEngine {
    pub fn new(client: Arc<LastfmClient>, store: Arc<ScrobbleStore>, options: SyncOptions) -> Self {
        Self {
            client,
            store,
            options,
            running: AtomicBool::new(false),
        }
    }

    /// Whether a run is currently active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Execute one sync run, or skip if one is already active.
    ///
    /// A mid-run upstream failure propagates to the caller after the
    /// run-lock is released; rows inserted before the failure remain
    /// committed.
    pub async fn run(&self) -> Result<SyncOutcome> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Sync already in progress, skipping");
            return Ok(SyncOutcome::Skipped);
        }
        let _lock = RunLock {
            flag: &self.running,
        };

        let report = self.ingest().await?;
        Ok(SyncOutcome::Completed(report))
    }

    async fn ingest(&self) -> Result<SyncReport> {
        let mut page: u32 = 1;
        let mut pages_processed: u32 = 0;
        let mut inserted: u64 = 0;
        info!(user = self.client.username(), "Starting sync");

        loop {
            let batch = self.client.recent_tracks(page).await?;
            pages_processed += 1;

            for track in &batch.tracks {
                // The in-progress "now playing" entry has no timestamp and
                // must never be persisted.
                let Some(played_at) = track.played_at else {
                    continue;
                };
                let event = NewScrobble {
                    artist: track.artist.clone(),
                    track: track.track.clone(),
                    album: track.album.clone(),
                    played_at,
                };
                if self.store.insert_event(&event)? {
                    inserted += 1;
                }
            }
            debug!(page, total_pages = batch.total_pages, "Page ingested");

            if page >= batch.total_pages || page >= self.options.page_limit {
                break;
            }
            page += 1;
            sleep(self.options.page_delay).await;
        }

        info!(pages = pages_processed, inserted, "Sync finished");
        Ok(SyncReport {
            pages_processed,
            inserted,
        })
    }
}

/// Releases the run flag on every exit path, panics and errors included.
struct RunLock<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RunLock<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
