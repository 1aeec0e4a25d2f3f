//! # Feed Publisher
//!
//! Writes the merged snapshot over a single cache key. The value is replaced
//! whole; a failed cycle leaves the previous snapshot in place.

use crate::metrics;
use crate::redis_manager::CacheStore;
use crate::types::PriceRecord;
use log::{error, info};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write snapshot to cache: {0:#}")]
    Cache(anyhow::Error),
}

pub struct FeedPublisher {
    cache: Arc<dyn CacheStore>,
    key: String,
}

impl FeedPublisher {
    pub fn new(cache: Arc<dyn CacheStore>, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// CEX records first, then DEX records, as one JSON array. Returns the
    /// number of records written.
    pub async fn publish(
        &self,
        cex_records: &[PriceRecord],
        dex_records: &[PriceRecord],
    ) -> Result<usize, PublishError> {
        let snapshot: Vec<&PriceRecord> = cex_records.iter().chain(dex_records).collect();

        let bytes = match serde_json::to_vec(&snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("❌ Snapshot serialization failed, keeping previous feed: {}", e);
                return Err(PublishError::Serialize(e));
            }
        };

        if let Err(e) = self.cache.set(&self.key, bytes, None).await {
            error!("❌ Failed to publish feed to {}, keeping previous feed: {:#}", self.key, e);
            metrics::increment_provider_failure("cache", "set");
            return Err(PublishError::Cache(e));
        }

        metrics::set_published_records("cex", cex_records.len());
        metrics::set_published_records("dex", dex_records.len());
        info!(
            "📤 Published {} records to {} ({} cex, {} dex)",
            snapshot.len(),
            self.key,
            cex_records.len(),
            dex_records.len()
        );
        Ok(snapshot.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::types::SourceKind;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::time::Duration;

    struct BrokenCache;

    #[async_trait]
    impl CacheStore for BrokenCache {
        async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Option<Duration>) -> Result<()> {
            anyhow::bail!("connection refused")
        }

        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    fn dex_record(address: &str) -> PriceRecord {
        PriceRecord {
            source: SourceKind::Dex,
            ..PriceRecord::cex(2.0, address, "TKN", "base")
        }
    }

    #[tokio::test]
    async fn test_publish_puts_cex_first() {
        let cache = MemoryCache::new();
        let publisher = FeedPublisher::new(Arc::new(cache.clone()), "prices");

        let written = publisher
            .publish(&[PriceRecord::cex(1.0, "0xc", "C", "ethereum")], &[dex_record("0xd")])
            .await
            .unwrap();

        assert_eq!(written, 2);
        let bytes = cache.get("prices").await.unwrap().unwrap();
        let feed: Vec<PriceRecord> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(feed[0].source, SourceKind::Cex);
        assert_eq!(feed[1].address, "0xd");
    }

    #[tokio::test]
    async fn test_empty_snapshot_is_still_published() {
        let cache = MemoryCache::new();
        let publisher = FeedPublisher::new(Arc::new(cache.clone()), "prices");

        publisher.publish(&[], &[]).await.unwrap();

        assert_eq!(cache.get("prices").await.unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[tokio::test]
    async fn test_cache_failure_is_reported() {
        let publisher = FeedPublisher::new(Arc::new(BrokenCache), "prices");
        let err = publisher.publish(&[], &[]).await.unwrap_err();
        assert!(matches!(err, PublishError::Cache(_)));
    }
}
