//! Error types for the Deezer client

/// Result type alias for Deezer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when querying the Deezer search API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code
    #[error("Deezer returned status {0}")]
    Status(reqwest::StatusCode),
}
