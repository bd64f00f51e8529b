use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default Deezer API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.deezer.com";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Deezer search client
///
/// Both lookups ask for a single best match (`limit=1`) and return `None`
/// when the search comes back empty; "not found" is a normal outcome here,
/// not an error.
#[derive(Debug, Clone)]
pub struct DeezerClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct AlbumHit {
    #[serde(default)]
    cover_xl: Option<String>,
    #[serde(default)]
    cover_big: Option<String>,
    #[serde(default)]
    cover_medium: Option<String>,
    #[serde(default)]
    cover: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistHit {
    #[serde(default)]
    picture_xl: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl DeezerClient {
    /// Create a client with default settings.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Best-match cover image for an album search, largest variant first.
    pub async fn album_image(&self, artist: &str, album: &str) -> Result<Option<String>> {
        let query = format!("artist:\"{artist}\" album:\"{album}\"");
        let envelope: SearchEnvelope<AlbumHit> = self.search("album", &query).await?;
        Ok(envelope.data.into_iter().next().and_then(|hit| {
            hit.cover_xl
                .or(hit.cover_big)
                .or(hit.cover_medium)
                .or(hit.cover)
                .filter(|url| !url.is_empty())
        }))
    }

    /// Best-match portrait for an artist search.
    pub async fn artist_image(&self, artist: &str) -> Result<Option<String>> {
        let envelope: SearchEnvelope<ArtistHit> = self.search("artist", artist).await?;
        Ok(envelope.data.into_iter().next().and_then(|hit| {
            hit.picture_xl
                .or(hit.picture)
                .filter(|url| !url.is_empty())
        }))
    }

    async fn search<T: serde::de::DeserializeOwned>(
        &self,
        kind: &str,
        query: &str,
    ) -> Result<SearchEnvelope<T>> {
        debug!(kind, query, "Searching Deezer");
        let response = self
            .client
            .get(format!("{}/search/{kind}", self.base_url))
            .query(&[("q", query), ("limit", "1")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status));
        }
        Ok(response.json().await?)
    }
}
