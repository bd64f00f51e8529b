//! Response models for the Last.fm API
//!
//! The wire format has a few quirks the public models hide:
//! - nested `{"#text": …}` nodes for plain strings,
//! - numbers serialized as strings (`"totalPages": "42"`),
//! - single-element lists serialized as a bare object instead of an array,
//! - image variants delivered as a size-tagged list.

use serde::{Deserialize, Deserializer};

// ============================================================================
// Public models
// ============================================================================

/// One page of a user's recent plays.
#[derive(Debug, Clone)]
pub struct RecentTracksPage {
    pub tracks: Vec<RecentTrack>,
    /// Page count reported by upstream. Can be stale or wrong; callers must
    /// bound their own pagination.
    pub total_pages: u32,
}

/// One recent play. `played_at` is absent for the in-progress "now playing"
/// entry, which must never be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTrack {
    pub artist: String,
    pub track: String,
    pub album: Option<String>,
    pub played_at: Option<i64>,
}

/// A Last.fm user profile (own account or a friend).
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub name: String,
    pub avatar: Option<String>,
    pub playcount: u64,
    pub url: Option<String>,
}

/// A user's top-N chart for one category.
#[derive(Debug, Clone)]
pub struct TopList<T> {
    pub entries: Vec<T>,
    /// Total number of distinct entries the user has, from the `@attr`
    /// block (not the length of `entries`).
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct TopArtist {
    pub name: String,
    pub playcount: u64,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TopAlbum {
    pub name: String,
    pub artist: String,
    pub playcount: u64,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TopTrack {
    pub name: String,
    pub artist: String,
    pub playcount: u64,
    pub image: Option<String>,
}

// ============================================================================
// Deserialization helpers
// ============================================================================

/// Accept either a JSON array or a bare object for list fields.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

/// Accept a number delivered either natively or as a string.
pub(crate) fn stringly<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr + Deserialize<'de>,
    T::Err: std::fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Typed(T),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Typed(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct WireText {
    #[serde(rename = "#text", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireImage {
    #[serde(default)]
    pub size: String,
    #[serde(rename = "#text", default)]
    pub url: String,
}

/// Pick the best display image from a size-tagged list: extralarge, then
/// large, then whatever non-empty variant comes last.
pub(crate) fn best_image(images: &[WireImage]) -> Option<String> {
    for wanted in ["extralarge", "large"] {
        if let Some(image) = images
            .iter()
            .find(|image| image.size == wanted && !image.url.is_empty())
        {
            return Some(image.url.clone());
        }
    }
    images
        .iter()
        .rev()
        .find(|image| !image.url.is_empty())
        .map(|image| image.url.clone())
}

fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}

// ---- user.getrecenttracks --------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireRecentTracksEnvelope {
    pub recenttracks: WireRecentTracks,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRecentTracks {
    #[serde(default, deserialize_with = "one_or_many")]
    pub track: Vec<WireRecentTrack>,
    #[serde(rename = "@attr")]
    pub attr: WirePageAttr,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePageAttr {
    #[serde(rename = "totalPages", deserialize_with = "stringly")]
    pub total_pages: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRecentTrack {
    pub name: String,
    pub artist: WireText,
    #[serde(default)]
    pub album: Option<WireText>,
    #[serde(default)]
    pub date: Option<WireDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireDate {
    #[serde(deserialize_with = "stringly")]
    pub uts: i64,
}

impl From<WireRecentTracks> for RecentTracksPage {
    fn from(wire: WireRecentTracks) -> Self {
        let tracks = wire
            .track
            .into_iter()
            .map(|track| RecentTrack {
                artist: track.artist.text,
                track: track.name,
                album: track.album.and_then(|album| non_empty(album.text)),
                played_at: track.date.map(|date| date.uts),
            })
            .collect();
        Self {
            tracks,
            total_pages: wire.attr.total_pages,
        }
    }
}

// ---- album.getinfo / track.getinfo -----------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireAlbumEnvelope {
    #[serde(default)]
    pub album: Option<WireAlbumInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAlbumInfo {
    #[serde(default)]
    pub image: Vec<WireImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTrackEnvelope {
    #[serde(default)]
    pub track: Option<WireTrackInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTrackInfo {
    /// Duration in milliseconds; `"0"` means unknown.
    #[serde(default, deserialize_with = "stringly_opt_u64")]
    pub duration: Option<u64>,
}

fn stringly_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Typed(u64),
        Text(String),
        None,
    }
    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Typed(value)) => Some(value),
        Some(Raw::Text(text)) => text.trim().parse().ok(),
        Some(Raw::None) | None => None,
    })
}

// ---- user.getinfo / user.getfriends ----------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireUserEnvelope {
    pub user: WireUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFriendsEnvelope {
    #[serde(default)]
    pub friends: Option<WireFriends>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFriends {
    #[serde(default, deserialize_with = "one_or_many")]
    pub user: Vec<WireUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireUser {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "stringly")]
    pub playcount: u64,
    #[serde(default)]
    pub image: Vec<WireImage>,
}

impl From<WireUser> for UserProfile {
    fn from(wire: WireUser) -> Self {
        let avatar = best_image(&wire.image);
        Self {
            name: wire.name,
            avatar,
            playcount: wire.playcount,
            url: wire.url,
        }
    }
}

// ---- user.gettopartists / gettopalbums / gettoptracks ----------------------

#[derive(Debug, Deserialize)]
pub(crate) struct WireTopArtistsEnvelope {
    pub topartists: WireTopChart<WireTopArtist>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTopAlbumsEnvelope {
    pub topalbums: WireTopChart<WireTopAlbum>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTopTracksEnvelope {
    pub toptracks: WireTopChart<WireTopTrack>,
}

// `deserialize_with` suppresses the derive's inferred `T: Deserialize`
// bound and a bare `default` would infer `T: Default`, so both are spelled
// out explicitly here.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct WireTopChart<T> {
    #[serde(
        default = "Vec::new",
        deserialize_with = "one_or_many",
        alias = "artist",
        alias = "album",
        alias = "track"
    )]
    pub entries: Vec<T>,
    #[serde(rename = "@attr")]
    pub attr: WireTotalAttr,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTotalAttr {
    #[serde(deserialize_with = "stringly")]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTopArtist {
    pub name: String,
    #[serde(default, deserialize_with = "stringly")]
    pub playcount: u64,
    #[serde(default)]
    pub image: Vec<WireImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireArtistRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTopAlbum {
    pub name: String,
    pub artist: WireArtistRef,
    #[serde(default, deserialize_with = "stringly")]
    pub playcount: u64,
    #[serde(default)]
    pub image: Vec<WireImage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTopTrack {
    pub name: String,
    pub artist: WireArtistRef,
    #[serde(default, deserialize_with = "stringly")]
    pub playcount: u64,
    #[serde(default)]
    pub image: Vec<WireImage>,
}

impl From<WireTopArtist> for TopArtist {
    fn from(wire: WireTopArtist) -> Self {
        let image = best_image(&wire.image);
        Self {
            name: wire.name,
            playcount: wire.playcount,
            image,
        }
    }
}

impl From<WireTopAlbum> for TopAlbum {
    fn from(wire: WireTopAlbum) -> Self {
        let image = best_image(&wire.image);
        Self {
            name: wire.name,
            artist: wire.artist.name,
            playcount: wire.playcount,
            image,
        }
    }
}

impl From<WireTopTrack> for TopTrack {
    fn from(wire: WireTopTrack) -> Self {
        let image = best_image(&wire.image);
        Self {
            name: wire.name,
            artist: wire.artist.name,
            playcount: wire.playcount,
            image,
        }
    }
}
