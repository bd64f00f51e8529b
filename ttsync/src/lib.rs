//! Scrobble ingestion for TuneTrail
//!
//! The [`SyncEngine`] pulls pages of recent plays from the upstream tracking
//! API and inserts them idempotently into the persisted store; the
//! [`Scheduler`] fires it on a fixed interval, skipping ticks while a run is
//! still active. At most one sync run is logically active at any time.

mod engine;
mod error;
mod scheduler;

pub use engine::{SyncEngine, SyncOptions, SyncOutcome, SyncReport};
pub use error::{Error, Result};
pub use scheduler::Scheduler;
