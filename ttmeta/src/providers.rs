//! Provider adapters for the external lookup services
//!
//! Last.fm is the primary source (album covers, track durations); Deezer is
//! the secondary image search and the only source for artist portraits.

use crate::key::MetadataKey;
use crate::provider::{MetadataProvider, MetadataValue};
use async_trait::async_trait;
use std::sync::Arc;
use ttdeezer::DeezerClient;
use ttlastfm::LastfmClient;

/// Primary metadata source: the Last.fm info endpoints.
pub struct LastfmProvider {
    client: Arc<LastfmClient>,
}

impl LastfmProvider {
    pub fn new(client: Arc<LastfmClient>) -> Self {
        Self { client }
    }

    /// The API reports "not found" as an in-band error payload; for a
    /// lookup that is a normal miss, not a failure.
    fn absorb_not_found<T>(
        result: ttlastfm::Result<Option<T>>,
    ) -> anyhow::Result<Option<T>> {
        match result {
            Ok(value) => Ok(value),
            Err(ttlastfm::Error::Api { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl MetadataProvider for LastfmProvider {
    fn name(&self) -> &'static str {
        "lastfm"
    }

    async fn lookup(&self, key: &MetadataKey) -> anyhow::Result<Option<MetadataValue>> {
        match key {
            MetadataKey::Album { artist, album } => {
                let cover = Self::absorb_not_found(self.client.album_cover(artist, album).await)?;
                Ok(cover.map(MetadataValue::Image))
            }
            MetadataKey::Track { artist, track } => {
                let secs =
                    Self::absorb_not_found(self.client.track_duration(artist, track).await)?;
                Ok(secs.map(MetadataValue::DurationSecs))
            }
            // Last.fm no longer serves real artist images.
            MetadataKey::Artist { .. } => Ok(None),
        }
    }
}

/// Secondary image source: the Deezer keyword search.
pub struct DeezerProvider {
    client: Arc<DeezerClient>,
}

impl DeezerProvider {
    pub fn new(client: Arc<DeezerClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataProvider for DeezerProvider {
    fn name(&self) -> &'static str {
        "deezer"
    }

    async fn lookup(&self, key: &MetadataKey) -> anyhow::Result<Option<MetadataValue>> {
        match key {
            MetadataKey::Album { artist, album } => {
                let cover = self.client.album_image(artist, album).await?;
                Ok(cover.map(MetadataValue::Image))
            }
            MetadataKey::Artist { artist } => {
                let portrait = self.client.artist_image(artist).await?;
                Ok(portrait.map(MetadataValue::Image))
            }
            // Deezer search has no duration lookup worth trusting.
            MetadataKey::Track { .. } => Ok(None),
        }
    }
}
