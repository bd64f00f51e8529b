//! Error types for the sync engine

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a sync run
///
/// Either way the run-lock is released and already-inserted rows stay
/// committed; the next run starts over from page 1 and relies on idempotent
/// insertion to skip what it has already seen.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The upstream API failed past the retry budget (or permanently)
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] ttlastfm::Error),

    /// The local store rejected a write
    #[error("store write failed: {0}")]
    Store(#[from] ttstore::Error),
}
