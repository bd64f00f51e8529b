//! Cache driver: one resolution algorithm shared by all three entity kinds

use crate::key::MetadataKey;
use crate::provider::{MetadataProvider, MetadataValue};
use moka::future::Cache as MemoryCache;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use ttstore::ScrobbleStore;

/// Hot keys kept in memory, and the window within which concurrent
/// resolutions for the same key coalesce into one provider call chain.
const MEMORY_CAPACITY: u64 = 10_000;
const MEMORY_TTL: Duration = Duration::from_secs(15 * 60);

/// Negative marker persisted for image keys with no result anywhere.
const NO_IMAGE: &str = "";

/// Outcome of one resolution, as stored in the in-memory layer.
#[derive(Debug, Clone)]
enum Resolved {
    Image(Option<String>),
    Duration(u32),
}

/// Multi-tier metadata resolver.
///
/// Cheap to clone; clones share the same store handle, provider chain and
/// in-memory layer. Safe to call from any number of tasks concurrently:
/// store writes are idempotent, and concurrent resolutions of one key are
/// collapsed into a single in-flight lookup.
#[derive(Clone)]
pub struct MetadataCache {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<ScrobbleStore>,
    providers: Vec<Arc<dyn MetadataProvider>>,
    fallback_duration: u32,
    memory: MemoryCache<String, Resolved>,
}

impl MetadataCache {
    /// Build a cache over `store`, consulting `providers` in the given
    /// priority order. `fallback_duration` (seconds) is used when no
    /// provider knows a track's length.
    pub fn new(
        store: Arc<ScrobbleStore>,
        providers: Vec<Arc<dyn MetadataProvider>>,
        fallback_duration: u32,
    ) -> Self {
        let memory = MemoryCache::builder()
            .max_capacity(MEMORY_CAPACITY)
            .time_to_live(MEMORY_TTL)
            .build();
        Self {
            inner: Arc::new(Inner {
                store,
                providers,
                fallback_duration,
                memory,
            }),
        }
    }

    /// Album cover URL for `(artist, album)`, or `None` when no source has
    /// one. The "no cover" outcome is itself cached.
    pub async fn resolve_album_cover(&self, artist: &str, album: &str) -> Option<String> {
        match self.resolve(MetadataKey::album(artist, album)).await {
            Resolved::Image(url) => url,
            Resolved::Duration(_) => None,
        }
    }

    /// Artist portrait URL for `artist`, or `None` when no source has one.
    pub async fn resolve_artist_image(&self, artist: &str) -> Option<String> {
        match self.resolve(MetadataKey::artist(artist)).await {
            Resolved::Image(url) => url,
            Resolved::Duration(_) => None,
        }
    }

    /// Track duration in seconds for `(artist, track)`. Never fails: when
    /// no provider knows, the configured fallback is returned and persisted
    /// so providers are not asked again.
    pub async fn resolve_track_duration(&self, artist: &str, track: &str) -> u32 {
        match self.resolve(MetadataKey::track(artist, track)).await {
            Resolved::Duration(secs) => secs,
            Resolved::Image(_) => self.inner.fallback_duration,
        }
    }

    async fn resolve(&self, key: MetadataKey) -> Resolved {
        let inner = self.inner.clone();
        self.inner
            .memory
            .get_with(key.memory_key(), async move { inner.resolve_uncached(&key).await })
            .await
    }
}

impl Inner {
    /// Steps 1-4 of the resolution algorithm: stored value, provider chain,
    /// fallback, write-back.
    async fn resolve_uncached(&self, key: &MetadataKey) -> Resolved {
        match self.read_stored(key) {
            Ok(Some(resolved)) => {
                debug!(key = %key, "Metadata cache hit (store)");
                return resolved;
            }
            Ok(None) => {}
            // A failed read degrades to a provider lookup; it must not
            // surface to the caller.
            Err(err) => warn!(key = %key, error = %err, "Store read failed, querying providers"),
        }

        let found = self.query_providers(key).await;
        self.persist(key, found)
    }

    fn read_stored(&self, key: &MetadataKey) -> ttstore::Result<Option<Resolved>> {
        Ok(match key {
            MetadataKey::Album { artist, album } => self
                .store
                .album_image(artist, album)?
                .map(|url| Resolved::Image(non_empty(url))),
            MetadataKey::Artist { artist } => self
                .store
                .artist_image(artist)?
                .map(|url| Resolved::Image(non_empty(url))),
            MetadataKey::Track { artist, track } => self
                .store
                .track_duration(artist, track)?
                .map(Resolved::Duration),
        })
    }

    async fn query_providers(&self, key: &MetadataKey) -> Option<MetadataValue> {
        for provider in &self.providers {
            match provider.lookup(key).await {
                Ok(Some(value)) => {
                    debug!(provider = provider.name(), key = %key, "Provider hit");
                    return Some(value);
                }
                Ok(None) => {
                    debug!(provider = provider.name(), key = %key, "Provider miss");
                }
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        key = %key,
                        error = %err,
                        "Provider failed, continuing down the chain"
                    );
                }
            }
        }
        None
    }

    /// Write the outcome (value or fallback) onto every event row sharing
    /// the key. A write failure is logged and the value still returned; the
    /// next resolution simply retries the chain.
    fn persist(&self, key: &MetadataKey, found: Option<MetadataValue>) -> Resolved {
        let (resolved, write) = match key {
            MetadataKey::Album { artist, album } => {
                let url = found.and_then(into_image);
                let stored = url.clone().unwrap_or_else(|| NO_IMAGE.to_string());
                let write = self.store.set_album_image(artist, album, &stored);
                (Resolved::Image(url), write)
            }
            MetadataKey::Artist { artist } => {
                let url = found.and_then(into_image);
                let stored = url.clone().unwrap_or_else(|| NO_IMAGE.to_string());
                let write = self.store.set_artist_image(artist, &stored);
                (Resolved::Image(url), write)
            }
            MetadataKey::Track { artist, track } => {
                let secs = found.and_then(into_duration).unwrap_or(self.fallback_duration);
                let write = self.store.set_track_duration(artist, track, secs);
                (Resolved::Duration(secs), write)
            }
        };
        match write {
            Ok(rows) => debug!(key = %key, rows, "Persisted resolved metadata"),
            Err(err) => warn!(key = %key, error = %err, "Failed to persist resolved metadata"),
        }
        resolved
    }
}

fn non_empty(url: String) -> Option<String> {
    if url.is_empty() { None } else { Some(url) }
}

fn into_image(value: MetadataValue) -> Option<String> {
    match value {
        MetadataValue::Image(url) => Some(url),
        MetadataValue::DurationSecs(_) => None,
    }
}

fn into_duration(value: MetadataValue) -> Option<u32> {
    match value {
        MetadataValue::DurationSecs(secs) => Some(secs),
        MetadataValue::Image(_) => None,
    }
}
