use crate::redis_manager::CacheStore;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

/// In-process `CacheStore`.
///
/// Used by `--dry-run` and by tests in place of Redis. Clones share the same map,
/// so a test can hold one handle while the worker writes through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, Entry>>,
    writes: Arc<DashMap<String, u64>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes to `key` so far.
    pub fn write_count(&self, key: &str) -> u64 {
        self.writes.get(key).map(|c| *c.value()).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        *self.writes.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) => match entry.expires_at {
                Some(at) if Instant::now() >= at => true,
                _ => return Ok(Some(entry.value.clone())),
            },
        };
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_without_ttl_persists() {
        let cache = MemoryCache::new();
        cache.set("feed", b"v1".to_vec(), None).await.unwrap();
        cache.set("feed", b"v2".to_vec(), None).await.unwrap();

        assert_eq!(cache.get("feed").await.unwrap().as_deref(), Some(&b"v2"[..]));
        assert_eq!(cache.write_count("feed"), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_gone() {
        let cache = MemoryCache::new();
        cache
            .set("short", b"x".to_vec(), Some(Duration::from_millis(0)))
            .await
            .unwrap();
        assert!(cache.get("short").await.unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        other.set("k", b"1".to_vec(), None).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_some());
    }
}
