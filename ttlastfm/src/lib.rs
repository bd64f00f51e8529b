//! Client for the Last.fm scrobble-tracking API
//!
//! This crate provides the upstream side of TuneTrail's ingestion pipeline:
//! paginated recent-track fetches, metadata lookups (album art, track
//! duration), and the social endpoints consumed by the friend-comparison
//! feature.
//!
//! Every outbound call goes through a [`RetryPolicy`]: transient failures
//! (HTTP 5xx, connect errors, timeouts) are retried with exponential
//! backoff up to a bounded attempt count; permanent failures (4xx, explicit
//! API error payloads, malformed responses) propagate immediately.
//!
//! # Example
//!
//! ```no_run
//! use ttlastfm::LastfmClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = LastfmClient::new("api-key", "alice")?;
//!     let page = client.recent_tracks(1).await?;
//!     println!("{} tracks, {} pages total", page.tracks.len(), page.total_pages);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod models;
mod retry;

pub use client::{ClientBuilder, DEFAULT_BASE_URL, LastfmClient, RECENT_TRACKS_PAGE_SIZE};
pub use error::{Error, Result};
pub use models::{
    RecentTrack, RecentTracksPage, TopAlbum, TopArtist, TopList, TopTrack, UserProfile,
};
pub use retry::RetryPolicy;
