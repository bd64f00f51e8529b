//! Persisted scrobble store for TuneTrail
//!
//! One SQLite table holds every ingested play event. The table is both the
//! durable event log written by the sync engine and the backing storage for
//! the metadata cache: resolved artwork and durations are materialized onto
//! the event rows themselves, so a cache hit is a single indexed lookup.
//!
//! Identity of an event is the `(artist, track, album, played_at)` tuple;
//! inserting a duplicate is a no-op. All name matching is case-insensitive
//! (`COLLATE NOCASE` on the name columns), so differently-cased upstream
//! strings hit the same cache keys.

mod db;
mod error;
mod models;

pub use db::ScrobbleStore;
pub use error::{Error, Result};
pub use models::{NewScrobble, ScrobbleEvent};
