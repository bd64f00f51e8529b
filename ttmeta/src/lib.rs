//! Metadata cache for TuneTrail
//!
//! Resolves artwork and durations for `(artist)`, `(artist, album)` and
//! `(artist, track)` keys through a prioritized chain of sources:
//!
//! 1. the persisted scrobble store (the primary hit path, one indexed read),
//! 2. the configured providers, in priority order,
//! 3. an entity-specific fallback (no image, or a default duration).
//!
//! Whatever a resolution produces is written back onto every stored event
//! row sharing the key, so later lookups short-circuit at step 1, including
//! "no image found", which is persisted as a negative marker so providers
//! are never re-queried for a key known to have nothing. Provider and
//! storage failures are absorbed and logged; `resolve_*` never fails.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ttmeta::{LastfmProvider, MetadataCache};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(ttstore::ScrobbleStore::open("tunetrail.db")?);
//! let lastfm = Arc::new(ttlastfm::LastfmClient::new("key", "alice")?);
//! let cache = MetadataCache::new(
//!     store,
//!     vec![Arc::new(LastfmProvider::new(lastfm))],
//!     180,
//! );
//! let cover = cache.resolve_album_cover("Caribou", "Swim").await;
//! # Ok(())
//! # }
//! ```

mod cache;
mod key;
mod provider;
mod providers;

pub use cache::MetadataCache;
pub use key::MetadataKey;
pub use provider::{MetadataProvider, MetadataValue};
pub use providers::{DeezerProvider, LastfmProvider};
