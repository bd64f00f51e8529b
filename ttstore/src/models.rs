use serde::Serialize;

/// A play event as reported by the upstream tracking API, ready to be
/// inserted into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScrobble {
    pub artist: String,
    pub track: String,
    /// Upstream reports an empty album for single releases; callers should
    /// map that to `None` before insertion.
    pub album: Option<String>,
    /// Unix timestamp (seconds) of the play.
    pub played_at: i64,
}

/// A stored play event, including lazily-filled enrichment columns.
#[derive(Debug, Clone, Serialize)]
pub struct ScrobbleEvent {
    pub id: i64,
    pub artist: String,
    pub track: String,
    pub album: Option<String>,
    pub played_at: i64,
    /// Album cover URL, filled by the metadata cache. The empty string marks
    /// a key that was resolved to "no image available".
    pub album_image: Option<String>,
    /// Artist image URL, same convention as `album_image`.
    pub artist_image: Option<String>,
    /// Track duration in seconds, filled by the metadata cache.
    pub track_duration: Option<u32>,
}
