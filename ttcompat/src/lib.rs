//! Friend taste comparison for TuneTrail
//!
//! Intersects the locally ingested library with a friend's top charts and
//! condenses the overlap into a 0..=100 compatibility score plus short
//! "in common" lists for display. Purely read-style: it consults the store
//! for play counts and the metadata cache for images, and never writes
//! scrobble events.

mod compare;
mod score;

pub use compare::{
    CommonAlbum, CommonArtist, CommonTrack, FriendComparison, LibraryStats, PLACEHOLDER_IMAGE,
    ProfileSummary, compare_with_all_friends, compare_with_friend,
};
pub use score::compatibility_score;
