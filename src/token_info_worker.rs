//! # Token Info Worker
//!
//! Sibling of the rate worker: periodically pages through the token-metadata
//! listing and stores it under its own cache key. Shares nothing with the
//! rate worker except the cache.

use crate::metrics;
use crate::rate_provider::{ProviderError, TokenInfoProvider, TokenListing};
use crate::redis_manager::CacheStore;
use crate::settings;
use crate::utils::short_run_id;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

// Stop paging even if the provider keeps returning full pages.
const MAX_PAGES: u32 = 200;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub circulating_supply: f64,
    pub total_supply: f64,
    pub max_supply: f64,
    pub usd_price: f64,
    pub market_cap: f64,
    pub tags: Vec<String>,
    pub volume_24h: f64,
    pub fully_diluted_valuation: f64,
    pub percent_change_1h: f64,
    pub percent_change_24h: f64,
    pub percent_change_7d: f64,
}

impl From<TokenListing> for TokenInfo {
    fn from(listing: TokenListing) -> Self {
        let quote = listing.quote.usd;
        let usd_price = quote.price.unwrap_or_default();
        let max_supply = listing.max_supply.unwrap_or_default();
        Self {
            name: listing.name,
            symbol: listing.symbol,
            circulating_supply: listing.circulating_supply.unwrap_or_default(),
            total_supply: listing.total_supply.unwrap_or_default(),
            max_supply,
            usd_price,
            market_cap: quote.market_cap.unwrap_or_default(),
            tags: listing.tags,
            volume_24h: quote.volume_24h.unwrap_or_default(),
            fully_diluted_valuation: usd_price * max_supply,
            percent_change_1h: quote.percent_change_1h.unwrap_or_default(),
            percent_change_24h: quote.percent_change_24h.unwrap_or_default(),
            percent_change_7d: quote.percent_change_7d.unwrap_or_default(),
        }
    }
}

/// Value stored under the token-info key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenInfoSnapshot {
    /// Unix seconds.
    pub updated_time: i64,
    pub tokens: Vec<TokenInfo>,
}

pub struct TokenInfoWorker {
    provider: Box<dyn TokenInfoProvider>,
    cache: Arc<dyn CacheStore>,
    key: String,
    page_size: u32,
    interval: Duration,
}

impl TokenInfoWorker {
    pub fn new(
        provider: Box<dyn TokenInfoProvider>,
        cache: Arc<dyn CacheStore>,
        config: &settings::TokenInfo,
    ) -> Self {
        Self {
            provider,
            cache,
            key: config.cache_key.clone(),
            page_size: config.page_size.max(1),
            interval: Duration::from_secs(config.interval_seconds.max(1)),
        }
    }

    /// Every listing page, in order. Any page error aborts the fetch.
    async fn fetch_all(&mut self) -> Result<Vec<TokenInfo>, ProviderError> {
        let mut tokens = Vec::new();
        let mut start = 1;
        for page in 0..MAX_PAGES {
            let rows = self.provider.listings(start, self.page_size).await?;
            let full_page = rows.len() as u32 == self.page_size;
            debug!("Token info page {} (start {}): {} rows", page + 1, start, rows.len());
            tokens.extend(rows.into_iter().map(TokenInfo::from));
            if !full_page {
                return Ok(tokens);
            }
            start += self.page_size;
        }
        warn!("⚠️ Token info listing still full after {} pages, stopping", MAX_PAGES);
        Ok(tokens)
    }

    /// Fetches the full listing and overwrites the cache key. Nothing is
    /// written if any page fails. Returns the number of tokens stored.
    pub async fn refresh(&mut self) -> Result<usize> {
        let tokens = self
            .fetch_all()
            .await
            .context("Failed to fetch token listings")?;
        let snapshot = TokenInfoSnapshot {
            updated_time: chrono::Utc::now().timestamp(),
            tokens,
        };
        let bytes = serde_json::to_vec(&snapshot).context("Failed to serialize token info")?;
        self.cache
            .set(&self.key, bytes, None)
            .await
            .with_context(|| format!("Failed to write token info to {}", self.key))?;
        Ok(snapshot.tokens.len())
    }

    /// Refreshes immediately, then once per interval. Never returns.
    pub async fn run(mut self) {
        info!(
            "🚀 Token info worker started: interval {:?}, key {}",
            self.interval, self.key
        );
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let id = short_run_id();
            match self.refresh().await {
                Ok(count) => {
                    metrics::increment_token_info_refresh("ok");
                    info!("✅ [token info {}] stored {} tokens in {}", id, count, self.key);
                }
                Err(e) => {
                    metrics::increment_token_info_refresh("error");
                    error!("❌ [token info {}] refresh failed: {:#}", id, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::rate_provider::{ListingQuote, ListingQuotes};
    use async_trait::async_trait;

    struct PagedListings {
        total: u32,
        fail_at_start: Option<u32>,
    }

    #[async_trait]
    impl TokenInfoProvider for PagedListings {
        async fn listings(&mut self, start: u32, limit: u32) -> Result<Vec<TokenListing>, ProviderError> {
            if self.fail_at_start == Some(start) {
                return Err(ProviderError::Status {
                    status: 500,
                    body: String::new(),
                });
            }
            let end = (start + limit - 1).min(self.total);
            Ok((start..=end)
                .map(|i| TokenListing {
                    name: format!("Token {i}"),
                    symbol: format!("T{i}"),
                    max_supply: Some(1_000.0),
                    quote: ListingQuotes {
                        usd: ListingQuote {
                            price: Some(2.0),
                            ..Default::default()
                        },
                    },
                    ..Default::default()
                })
                .collect())
        }
    }

    fn config(page_size: u32) -> settings::TokenInfo {
        settings::TokenInfo {
            page_size,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_pages_until_short_page() {
        let cache = MemoryCache::new();
        let provider = PagedListings {
            total: 7,
            fail_at_start: None,
        };
        let mut worker = TokenInfoWorker::new(Box::new(provider), Arc::new(cache.clone()), &config(3));

        assert_eq!(worker.refresh().await.unwrap(), 7);

        let bytes = cache.get("cmc_token_info").await.unwrap().unwrap();
        let snapshot: TokenInfoSnapshot = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot.tokens.len(), 7);
        assert_eq!(snapshot.tokens[0].fully_diluted_valuation, 2_000.0);
        assert!(snapshot.updated_time > 0);
    }

    #[tokio::test]
    async fn test_page_error_writes_nothing() {
        let cache = MemoryCache::new();
        let provider = PagedListings {
            total: 10,
            fail_at_start: Some(4),
        };
        let mut worker = TokenInfoWorker::new(Box::new(provider), Arc::new(cache.clone()), &config(3));

        assert!(worker.refresh().await.is_err());
        assert_eq!(cache.write_count("cmc_token_info"), 0);
    }

    #[test]
    fn test_missing_quote_fields_default_to_zero() {
        let info = TokenInfo::from(TokenListing {
            name: "Obscure".to_string(),
            ..Default::default()
        });
        assert_eq!(info.usd_price, 0.0);
        assert_eq!(info.fully_diluted_valuation, 0.0);
    }
}
