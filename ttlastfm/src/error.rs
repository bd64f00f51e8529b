//! Error types for the Last.fm client

/// Result type alias for Last.fm operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the Last.fm API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport failure (connect error, timeout, decode error)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),

    /// The API answered 200 but carried an explicit error payload
    #[error("Last.fm API error {code}: {message}")]
    Api { code: u64, message: String },

    /// Response body did not match the expected shape
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// A transient failure persisted through every allowed retry
    #[error("upstream still failing after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether this failure class is worth retrying.
    ///
    /// Server-side errors (5xx) and transport-level connect/timeout failures
    /// are transient; everything else (4xx, API error payloads, malformed
    /// bodies) is permanent and propagates immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Status(status) => status.is_server_error(),
            Error::Http(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().is_some_and(|status| status.is_server_error())
            }
            _ => false,
        }
    }
}
