//! TuneTrail background ingestion daemon
//!
//! Wires the pieces together: configuration, the scrobble store, the
//! upstream clients, the metadata cache and the scheduled sync engine. A
//! companion sweep resolves images and durations for freshly ingested
//! events, so reads hit enriched rows instead of triggering provider
//! lookups. Runs until interrupted.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use ttconfig::Config;
use ttdeezer::DeezerClient;
use ttlastfm::{LastfmClient, RetryPolicy};
use ttmeta::{DeezerProvider, LastfmProvider, MetadataCache, MetadataProvider};
use ttstore::ScrobbleStore;
use ttsync::{Scheduler, SyncEngine, SyncOptions};

/// Events inspected per enrichment sweep.
const SWEEP_WINDOW: u32 = 200;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load().context("loading configuration")?;
    info!(
        user = config.username,
        db = %config.database_path.display(),
        "Starting TuneTrail"
    );

    let store = Arc::new(
        ScrobbleStore::open(&config.database_path).with_context(|| {
            format!("opening scrobble database {}", config.database_path.display())
        })?,
    );

    let lastfm = Arc::new(
        LastfmClient::builder()
            .api_key(&config.api_key)
            .username(&config.username)
            .timeout(config.request_timeout())
            .retry(RetryPolicy {
                max_retries: config.retry_max_retries,
                base_delay: config.retry_base_delay(),
            })
            .build()
            .context("building Last.fm client")?,
    );
    let deezer = Arc::new(DeezerClient::new().context("building Deezer client")?);

    let providers: Vec<Arc<dyn MetadataProvider>> = vec![
        Arc::new(LastfmProvider::new(lastfm.clone())),
        Arc::new(DeezerProvider::new(deezer)),
    ];
    let cache = MetadataCache::new(store.clone(), providers, config.fallback_duration_secs);

    let engine = Arc::new(SyncEngine::new(
        lastfm,
        store.clone(),
        SyncOptions {
            page_limit: config.page_limit,
            page_delay: config.page_delay(),
        },
    ));
    let scheduler = Scheduler::spawn(engine, config.sync_interval());
    let sweeper = spawn_enrichment_sweep(store, cache, config.sync_interval());

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Shutdown signal received, stopping");
    scheduler.abort();
    sweeper.abort();

    // Give an in-flight page fetch a moment to settle before exiting.
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(())
}

/// Periodically resolve metadata for the most recent events.
///
/// The cache checks the store first and caches negative results, so a
/// sweep over already-enriched rows costs a handful of indexed reads and
/// no provider traffic.
fn spawn_enrichment_sweep(
    store: Arc<ScrobbleStore>,
    cache: MetadataCache,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the immediate first tick: let the initial sync land first.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let events = match store.recent_events(SWEEP_WINDOW) {
                Ok(events) => events,
                Err(err) => {
                    warn!(error = %err, "Enrichment sweep could not read recent events");
                    continue;
                }
            };
            debug!(events = events.len(), "Enrichment sweep started");
            for event in events {
                if let Some(album) = &event.album {
                    let _ = cache.resolve_album_cover(&event.artist, album).await;
                }
                let _ = cache.resolve_artist_image(&event.artist).await;
                let _ = cache
                    .resolve_track_duration(&event.artist, &event.track)
                    .await;
            }
            debug!("Enrichment sweep finished");
        }
    })
}
