//! Error types for the scrobble store

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the scrobble store
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying SQLite error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
