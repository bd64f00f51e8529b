//! Taste comparison between the tracked user and one friend

use crate::score::compatibility_score;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use ttlastfm::LastfmClient;
use ttmeta::MetadataCache;
use ttstore::ScrobbleStore;

/// Entries requested from each of the friend's top charts.
const CHART_LIMIT: u32 = 50;

/// Common entries kept for display after scoring.
const DISPLAY_LIMIT: usize = 5;

/// Shown when neither the cache nor the friend's chart has an image.
pub const PLACEHOLDER_IMAGE: &str = "/images/artist-placeholder.png";

/// An artist both listeners play.
#[derive(Debug, Clone, Serialize)]
pub struct CommonArtist {
    pub name: String,
    pub my_plays: u64,
    pub friend_plays: u64,
    pub image: String,
}

/// An album both listeners play.
#[derive(Debug, Clone, Serialize)]
pub struct CommonAlbum {
    pub name: String,
    pub artist: String,
    pub my_plays: u64,
    pub friend_plays: u64,
    pub image: String,
}

/// A track both listeners play.
#[derive(Debug, Clone, Serialize)]
pub struct CommonTrack {
    pub name: String,
    pub artist: String,
    pub my_plays: u64,
    pub friend_plays: u64,
    pub image: String,
}

/// Display header for one side of the comparison.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub avatar: Option<String>,
    pub playcount: u64,
    pub url: Option<String>,
}

impl From<ttlastfm::UserProfile> for ProfileSummary {
    fn from(profile: ttlastfm::UserProfile) -> Self {
        Self {
            name: profile.name,
            avatar: profile.avatar,
            playcount: profile.playcount,
            url: profile.url,
        }
    }
}

/// Totals over the locally ingested library, shown next to the profile
/// summaries.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    pub scrobbles: u64,
    pub artists: u64,
    pub albums: u64,
}

/// Result of comparing the tracked user's library with one friend.
#[derive(Debug, Clone, Serialize)]
pub struct FriendComparison {
    pub me: ProfileSummary,
    pub my_library: LibraryStats,
    pub friend: ProfileSummary,
    /// 0..=100, computed from the full intersection counts below.
    pub score: u8,
    pub common_artist_count: usize,
    pub common_album_count: usize,
    pub common_track_count: usize,
    /// Top common entries, sorted by own play count, at most five each.
    pub common_artists: Vec<CommonArtist>,
    pub common_albums: Vec<CommonAlbum>,
    pub common_tracks: Vec<CommonTrack>,
}

/// Compare the locally ingested library against one friend's top charts.
///
/// Read-only with respect to scrobble events: the store is only consulted
/// for play counts and already-enriched columns, so a concurrent sync run
/// is unaffected. Artist and album images come from the metadata cache,
/// track images from the cover stored on the matching local rows; the
/// friend's chart entry and then the placeholder are the fallbacks.
pub async fn compare_with_friend(
    client: &LastfmClient,
    store: &ScrobbleStore,
    cache: &MetadataCache,
    friend: &str,
) -> Result<FriendComparison> {
    debug!(friend, "Comparing libraries");
    let (me, friend_profile, top_artists, top_albums, top_tracks) = tokio::try_join!(
        client.user_info(client.username()),
        client.user_info(friend),
        client.top_artists(friend, CHART_LIMIT),
        client.top_albums(friend, CHART_LIMIT),
        client.top_tracks(friend, CHART_LIMIT),
    )
    .with_context(|| format!("fetching charts for {friend}"))?;

    let mut artists = Vec::new();
    for entry in top_artists.entries {
        let my_plays = store.artist_play_count(&entry.name)?;
        if my_plays == 0 {
            continue;
        }
        let image = match cache.resolve_artist_image(&entry.name).await {
            Some(url) => url,
            None => entry.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        };
        artists.push(CommonArtist {
            name: entry.name,
            my_plays,
            friend_plays: entry.playcount,
            image,
        });
    }

    let mut albums = Vec::new();
    for entry in top_albums.entries {
        let my_plays = store.album_play_count(&entry.artist, &entry.name)?;
        if my_plays == 0 {
            continue;
        }
        let image = match cache.resolve_album_cover(&entry.artist, &entry.name).await {
            Some(url) => url,
            None => entry.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        };
        albums.push(CommonAlbum {
            name: entry.name,
            artist: entry.artist,
            my_plays,
            friend_plays: entry.playcount,
            image,
        });
    }

    let mut tracks = Vec::new();
    for entry in top_tracks.entries {
        let my_plays = store.track_play_count(&entry.artist, &entry.name)?;
        if my_plays == 0 {
            continue;
        }
        // Top-track charts carry no album name; the cover resolved for the
        // album this track was scrobbled from is read off the local rows.
        let image = match store.track_album_image(&entry.artist, &entry.name)? {
            Some(url) => url,
            None => entry.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        };
        tracks.push(CommonTrack {
            name: entry.name,
            artist: entry.artist,
            my_plays,
            friend_plays: entry.playcount,
            image,
        });
    }

    let score = compatibility_score(artists.len(), albums.len(), tracks.len());
    info!(
        friend,
        score,
        artists = artists.len(),
        albums = albums.len(),
        tracks = tracks.len(),
        "Comparison computed"
    );

    let my_library = LibraryStats {
        scrobbles: store.event_count()?,
        artists: store.distinct_artist_count()?,
        albums: store.distinct_album_count()?,
    };

    let comparison = FriendComparison {
        me: me.into(),
        my_library,
        friend: friend_profile.into(),
        score,
        common_artist_count: artists.len(),
        common_album_count: albums.len(),
        common_track_count: tracks.len(),
        common_artists: top_by_own_plays(artists, |artist| artist.my_plays),
        common_albums: top_by_own_plays(albums, |album| album.my_plays),
        common_tracks: top_by_own_plays(tracks, |track| track.my_plays),
    };
    Ok(comparison)
}

fn top_by_own_plays<T>(mut entries: Vec<T>, plays: impl Fn(&T) -> u64) -> Vec<T> {
    entries.sort_by(|a, b| plays(b).cmp(&plays(a)));
    entries.truncate(DISPLAY_LIMIT);
    entries
}

/// Compare the local library against every friend of the tracked user.
///
/// Friends are compared sequentially; a failure on one friend fails the
/// whole call rather than returning a silently incomplete list.
pub async fn compare_with_all_friends(
    client: &LastfmClient,
    store: &ScrobbleStore,
    cache: &MetadataCache,
    limit: u32,
) -> Result<Vec<FriendComparison>> {
    let friends = client
        .friends(limit)
        .await
        .context("fetching friends list")?;
    info!(friends = friends.len(), "Comparing against all friends");

    let mut comparisons = Vec::with_capacity(friends.len());
    for friend in &friends {
        comparisons.push(compare_with_friend(client, store, cache, &friend.name).await?);
    }
    Ok(comparisons)
}
