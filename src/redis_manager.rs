// Redis Manager - shared cache the price snapshot is published to
// Readers poll well-known keys; writers overwrite them whole.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;

/// Key/value store the workers publish snapshots to.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Overwrites `key`. `ttl = None` means the value never expires.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Configuration for Redis connection.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

/// Redis-backed `CacheStore`.
///
/// `ConnectionManager` reconnects on its own, so a Redis restart only fails
/// the writes issued while it is down.
#[derive(Clone)]
pub struct RedisManager {
    conn: ConnectionManager,
    config: RedisConfig,
}

impl RedisManager {
    /// Create new Redis Manager; fails if Redis is unreachable.
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())
            .context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        let mut manager = Self { conn, config };
        manager.health_check().await?;
        info!("✅ Redis Manager connected to {}", redacted(&manager.config.url));

        Ok(manager)
    }

    /// Create with default localhost config
    pub async fn new_default() -> Result<Self> {
        Self::new(RedisConfig::default()).await
    }

    /// Test Redis connection
    pub async fn health_check(&mut self) -> Result<()> {
        let pong: String = redis::cmd("PING")
            .query_async(&mut self.conn)
            .await
            .context("Redis health check failed")?;

        if pong == "PONG" {
            Ok(())
        } else {
            anyhow::bail!("Unexpected Redis response: {}", pong)
        }
    }
}

#[async_trait]
impl CacheStore for RedisManager {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        let size = value.len();
        match ttl {
            Some(ttl) => redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(ttl.as_secs().max(1))
                .query_async::<_, ()>(&mut conn)
                .await
                .with_context(|| format!("Failed to SET {} with expiry", key))?,
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .with_context(|| format!("Failed to SET {}", key))?,
        }
        debug!("💾 Wrote {} bytes to {}", size, key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let bytes: Option<Vec<u8>> = conn
            .get(key)
            .await
            .with_context(|| format!("Failed to GET {}", key))?;
        Ok(bytes)
    }
}

// Hide the password part of redis://:pass@host
fn redacted(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => format!("{}***{}", &url[..scheme + 3], &url[at..]),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_url() {
        assert_eq!(redacted("redis://:secret@host:6379/0"), "redis://***@host:6379/0");
        assert_eq!(redacted("redis://localhost:6379"), "redis://localhost:6379");
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn test_redis_roundtrip() {
        let manager = RedisManager::new_default().await.unwrap();
        manager
            .set("rate_feed:test", b"[]".to_vec(), None)
            .await
            .unwrap();
        let cached = manager.get("rate_feed:test").await.unwrap();
        assert_eq!(cached.as_deref(), Some(&b"[]"[..]));
    }
}
