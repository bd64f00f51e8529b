//! HTTP client for the Last.fm API
//!
//! The client is stateless apart from its credentials: it does not cache
//! responses. Caching and idempotent persistence are handled by higher
//! layers (metadata cache, sync engine).

use crate::error::{Error, Result};
use crate::models::*;
use crate::retry::RetryPolicy;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Default Last.fm API endpoint
pub const DEFAULT_BASE_URL: &str = "https://ws.audioscrobbler.com/2.0/";

/// Default per-request timeout (connection + response)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "TuneTrail/0.1 (ttlastfm)";

/// Events requested per page of `user.getrecenttracks`
pub const RECENT_TRACKS_PAGE_SIZE: u32 = 200;

/// Last.fm HTTP client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct LastfmClient {
    client: Client,
    base_url: String,
    api_key: String,
    username: String,
    retry: RetryPolicy,
}

impl LastfmClient {
    /// Create a client with default settings for the given credentials.
    pub fn new(api_key: impl Into<String>, username: impl Into<String>) -> Result<Self> {
        Self::builder()
            .api_key(api_key)
            .username(username)
            .build()
    }

    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The username whose scrobbles this client tracks.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The API base URL in use.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Ingestion
    // ========================================================================

    /// Fetch one page of the tracked user's recent plays.
    ///
    /// A page with zero tracks is not an error; the in-progress "now
    /// playing" entry (if any) appears with `played_at = None`.
    pub async fn recent_tracks(&self, page: u32) -> Result<RecentTracksPage> {
        let page = page.to_string();
        let limit = RECENT_TRACKS_PAGE_SIZE.to_string();
        let payload = self
            .call(
                "user.getrecenttracks",
                &[("user", &self.username), ("limit", &limit), ("page", &page)],
            )
            .await?;
        let wire: WireRecentTracksEnvelope = serde_json::from_value(payload)?;
        Ok(wire.recenttracks.into())
    }

    // ========================================================================
    // Metadata lookups
    // ========================================================================

    /// Best cover image URL for an album, if Last.fm knows one.
    pub async fn album_cover(&self, artist: &str, album: &str) -> Result<Option<String>> {
        let payload = self
            .call("album.getinfo", &[("artist", artist), ("album", album)])
            .await?;
        let wire: WireAlbumEnvelope = serde_json::from_value(payload)?;
        Ok(wire.album.and_then(|album| best_image(&album.image)))
    }

    /// Track duration in whole seconds, if Last.fm knows it.
    ///
    /// The API reports milliseconds; zero means unknown and maps to `None`.
    pub async fn track_duration(&self, artist: &str, track: &str) -> Result<Option<u32>> {
        let payload = self
            .call("track.getInfo", &[("artist", artist), ("track", track)])
            .await?;
        let wire: WireTrackEnvelope = serde_json::from_value(payload)?;
        let millis = wire.track.and_then(|track| track.duration);
        Ok(millis
            .filter(|&ms| ms > 0)
            .map(|ms| ((ms + 500) / 1000) as u32))
    }

    // ========================================================================
    // Social endpoints (friend comparison)
    // ========================================================================

    /// Profile of an arbitrary user.
    pub async fn user_info(&self, user: &str) -> Result<UserProfile> {
        let payload = self.call("user.getInfo", &[("user", user)]).await?;
        let wire: WireUserEnvelope = serde_json::from_value(payload)?;
        Ok(wire.user.into())
    }

    /// Friends of the tracked user.
    pub async fn friends(&self, limit: u32) -> Result<Vec<UserProfile>> {
        let limit = limit.to_string();
        let payload = self
            .call(
                "user.getFriends",
                &[("user", &self.username), ("limit", &limit)],
            )
            .await?;
        let wire: WireFriendsEnvelope = serde_json::from_value(payload)?;
        Ok(wire
            .friends
            .map(|friends| friends.user.into_iter().map(Into::into).collect())
            .unwrap_or_default())
    }

    /// A user's most-played artists.
    pub async fn top_artists(&self, user: &str, limit: u32) -> Result<TopList<TopArtist>> {
        let limit = limit.to_string();
        let payload = self
            .call("user.getTopArtists", &[("user", user), ("limit", &limit)])
            .await?;
        let wire: WireTopArtistsEnvelope = serde_json::from_value(payload)?;
        Ok(TopList {
            total: wire.topartists.attr.total,
            entries: wire.topartists.entries.into_iter().map(Into::into).collect(),
        })
    }

    /// A user's most-played albums.
    pub async fn top_albums(&self, user: &str, limit: u32) -> Result<TopList<TopAlbum>> {
        let limit = limit.to_string();
        let payload = self
            .call("user.getTopAlbums", &[("user", user), ("limit", &limit)])
            .await?;
        let wire: WireTopAlbumsEnvelope = serde_json::from_value(payload)?;
        Ok(TopList {
            total: wire.topalbums.attr.total,
            entries: wire.topalbums.entries.into_iter().map(Into::into).collect(),
        })
    }

    /// A user's most-played tracks.
    pub async fn top_tracks(&self, user: &str, limit: u32) -> Result<TopList<TopTrack>> {
        let limit = limit.to_string();
        let payload = self
            .call("user.getTopTracks", &[("user", user), ("limit", &limit)])
            .await?;
        let wire: WireTopTracksEnvelope = serde_json::from_value(payload)?;
        Ok(TopList {
            total: wire.toptracks.attr.total,
            entries: wire.toptracks.entries.into_iter().map(Into::into).collect(),
        })
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Perform one API call through the retry policy.
    ///
    /// Returns the JSON payload after checking both the HTTP status and the
    /// API's in-band `{"error": …}` convention. An in-band error is
    /// permanent and is never retried.
    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.retry
            .run(method, || async {
                debug!(method, "Calling Last.fm API");
                let response = self
                    .client
                    .get(&self.base_url)
                    .query(&[
                        ("method", method),
                        ("api_key", self.api_key.as_str()),
                        ("format", "json"),
                    ])
                    .query(params)
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(Error::Status(status));
                }
                let payload: Value = response.json().await?;
                if let Some(code) = payload.get("error") {
                    let code = code.as_u64().unwrap_or(0);
                    let message = payload
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error")
                        .to_string();
                    return Err(Error::Api { code, message });
                }
                Ok(payload)
            })
            .await
    }
}

/// Builder for [`LastfmClient`]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    api_key: String,
    username: String,
    base_url: Option<String>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
}

impl ClientBuilder {
    /// API key used for every call.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Username whose scrobbles are tracked.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Override the API base URL (used by tests to point at a local mock).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Per-request timeout. A timeout counts as a transient failure.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Retry policy applied to every call.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LastfmClient> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .timeout(
                self.timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            )
            .build()?;
        Ok(LastfmClient {
            client,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: self.api_key,
            username: self.username,
            retry: self.retry.unwrap_or_default(),
        })
    }
}
