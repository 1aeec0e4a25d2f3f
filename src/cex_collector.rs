//! # CEX Collector
//!
//! Prices every coin the exchange lists against the stablecoin and maps it to
//! its contract address on the allowed networks. Addresses priced here are
//! exempt from DEX lookups for the cycle.

use crate::metrics;
use crate::rate_provider::CexProvider;
use crate::settings;
use crate::types::cex_data::CoinEntry;
use crate::types::conversions::parse_price;
use crate::types::{address_key, PriceRecord};
use indexmap::{IndexMap, IndexSet};
use log::{debug, error, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of one CEX collection pass.
#[derive(Debug, Clone, Default)]
pub struct CexSnapshot {
    /// Trading symbol (`BTCUSDT`) -> last price.
    pub prices: IndexMap<String, f64>,
    pub records: Vec<PriceRecord>,
    /// Address keys of `records`.
    pub priced: IndexSet<String>,
}

impl CexSnapshot {
    pub fn is_priced(&self, address: &str) -> bool {
        self.priced.contains(&address_key(address))
    }
}

pub struct CexCollector {
    provider: Arc<dyn CexProvider>,
    stablecoin: String,
    chunk_size: usize,
    /// Network code -> published chain id.
    networks: BTreeMap<String, String>,
}

impl CexCollector {
    pub fn new(provider: Arc<dyn CexProvider>, config: &settings::Cex) -> Self {
        Self {
            provider,
            stablecoin: config.stablecoin.clone(),
            chunk_size: config.symbol_chunk_size.max(1),
            // config lowercases map keys; exchange network codes are upper-case
            networks: config
                .networks
                .iter()
                .map(|(code, chain)| (code.to_ascii_uppercase(), chain.clone()))
                .collect(),
        }
    }

    pub async fn collect_cex_prices(&self) -> CexSnapshot {
        let prices = self.fetch_price_map().await;

        let coins = match self.provider.all_coins().await {
            Ok(coins) => coins,
            Err(e) => {
                error!("❌ Failed to fetch CEX coin list: {}", e);
                metrics::increment_provider_failure("cex", "all_coins");
                Vec::new()
            }
        };

        let snapshot = self.match_coins(prices, &coins);
        info!(
            "✅ CEX: {} symbols priced, {} token records",
            snapshot.prices.len(),
            snapshot.records.len()
        );
        snapshot
    }

    async fn fetch_price_map(&self) -> IndexMap<String, f64> {
        let mut prices = IndexMap::new();

        let symbols = match self.provider.stablecoin_pairs(&self.stablecoin).await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!("❌ Failed to list {} pairs: {}", self.stablecoin, e);
                metrics::increment_provider_failure("cex", "stablecoin_pairs");
                return prices;
            }
        };

        for chunk in symbols.chunks(self.chunk_size) {
            let tickers = match self.provider.ticker_prices(chunk).await {
                Ok(tickers) => tickers,
                Err(e) => {
                    error!(
                        "❌ Ticker request failed for {} symbols ({}..{}): {}",
                        chunk.len(),
                        chunk.first().map(String::as_str).unwrap_or_default(),
                        chunk.last().map(String::as_str).unwrap_or_default(),
                        e
                    );
                    metrics::increment_provider_failure("cex", "ticker_prices");
                    continue;
                }
            };
            for ticker in tickers {
                match parse_price(&ticker.last_price) {
                    Ok(price) => {
                        prices.insert(ticker.symbol, price);
                    }
                    Err(e) => warn!("Skipping ticker {}: {}", ticker.symbol, e),
                }
            }
        }
        debug!("CEX price map has {} symbols", prices.len());
        prices
    }

    /// One record per (coin, allowed network) whose `coin + stablecoin` symbol is priced.
    pub fn match_coins(&self, prices: IndexMap<String, f64>, coins: &[CoinEntry]) -> CexSnapshot {
        let mut snapshot = CexSnapshot {
            prices,
            ..Default::default()
        };

        for coin in coins {
            for network in &coin.network_list {
                let Some(chain_id) = self.networks.get(&network.network.to_ascii_uppercase()) else {
                    continue;
                };
                if network.contract_address.trim().is_empty() {
                    continue;
                }
                let symbol_coin = if network.coin.is_empty() {
                    coin.coin.as_str()
                } else {
                    network.coin.as_str()
                };
                let pair = format!("{}{}", symbol_coin, self.stablecoin);
                let Some(&price) = snapshot.prices.get(&pair) else {
                    continue;
                };

                let key = address_key(&network.contract_address);
                if !snapshot.priced.insert(key) {
                    debug!(
                        "{} on {} already priced, skipping duplicate",
                        network.contract_address, network.network
                    );
                    continue;
                }
                snapshot.records.push(PriceRecord::cex(
                    price,
                    network.contract_address.trim(),
                    symbol_coin,
                    chain_id,
                ));
            }
        }
        snapshot
    }
}
