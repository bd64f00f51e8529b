use crate::key::MetadataKey;
use async_trait::async_trait;

/// A value produced by a provider for some metadata key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    /// Image URL (artist portrait or album cover).
    Image(String),
    /// Track duration in whole seconds.
    DurationSecs(u32),
}

/// An external source capable of supplying metadata for a key.
///
/// Implementations answer `Ok(None)` for keys they do not handle or cannot
/// find; the cache driver iterates providers in priority order and stops at
/// the first `Ok(Some(_))`. An `Err` is logged by the driver and treated
/// like a miss, so one flaky provider never breaks the chain.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Look up metadata for `key`.
    async fn lookup(&self, key: &MetadataKey) -> anyhow::Result<Option<MetadataValue>>;
}
