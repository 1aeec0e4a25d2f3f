//! In-memory fakes for the worker's collaborators.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use token_rate_feed::database::{AddressRole, LogStore};
use token_rate_feed::rate_provider::{CexProvider, DexProvider, ProviderError};
use token_rate_feed::settings::Settings;
use token_rate_feed::types::cex_data::{CoinEntry, NetworkEntry, TickerPrice};
use token_rate_feed::types::dex_data::{PairToken, RawPool};

/// Settings with no inter-request delay and the default limits.
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.dex.request_delay_ms = 0;
    settings
}

pub struct FakeLogStore {
    pub head: Mutex<i64>,
    pub trades: Vec<String>,
    pub transfers: Vec<String>,
    pub ranges: Mutex<Vec<(i64, i64)>>,
}

impl FakeLogStore {
    pub fn new(head: i64, trades: &[&str], transfers: &[&str]) -> Self {
        Self {
            head: Mutex::new(head),
            trades: trades.iter().map(|s| s.to_string()).collect(),
            transfers: transfers.iter().map(|s| s.to_string()).collect(),
            ranges: Mutex::new(Vec::new()),
        }
    }

    pub fn set_head(&self, head: i64) {
        *self.head.lock().unwrap() = head;
    }
}

#[async_trait]
impl LogStore for FakeLogStore {
    async fn latest_block(&self, _table: &str) -> Result<i64> {
        Ok(*self.head.lock().unwrap())
    }

    async fn unique_addresses(
        &self,
        _table: &str,
        from_block: i64,
        to_block: i64,
        role: AddressRole,
    ) -> Result<Vec<String>> {
        if role == AddressRole::TradeLegs {
            self.ranges.lock().unwrap().push((from_block, to_block));
        }
        Ok(match role {
            AddressRole::TradeLegs => self.trades.clone(),
            AddressRole::TransferSubject => self.transfers.clone(),
        })
    }
}

#[derive(Default)]
pub struct FakeCex {
    pub prices: Vec<(String, String)>,
    pub coins: Vec<CoinEntry>,
}

impl FakeCex {
    pub fn with_price(mut self, symbol: &str, price: &str) -> Self {
        self.prices.push((symbol.to_string(), price.to_string()));
        self
    }

    pub fn with_coin(mut self, coin: &str, network: &str, contract: &str) -> Self {
        self.coins.push(CoinEntry {
            coin: coin.to_string(),
            network_list: vec![NetworkEntry {
                network: network.to_string(),
                coin: coin.to_string(),
                contract_address: contract.to_string(),
            }],
        });
        self
    }
}

#[async_trait]
impl CexProvider for FakeCex {
    async fn stablecoin_pairs(&self, _stablecoin: &str) -> Result<Vec<String>, ProviderError> {
        Ok(self.prices.iter().map(|(s, _)| s.clone()).collect())
    }

    async fn ticker_prices(&self, symbols: &[String]) -> Result<Vec<TickerPrice>, ProviderError> {
        Ok(self
            .prices
            .iter()
            .filter(|(s, _)| symbols.contains(s))
            .map(|(s, p)| TickerPrice {
                symbol: s.clone(),
                last_price: p.clone(),
            })
            .collect())
    }

    async fn all_coins(&self) -> Result<Vec<CoinEntry>, ProviderError> {
        Ok(self.coins.clone())
    }
}

/// Serves canned pools per token address and records every request.
#[derive(Default)]
pub struct FakeDex {
    pub pools: HashMap<String, Vec<RawPool>>,
    pub failing: Vec<String>,
    pub requests: Mutex<Vec<Vec<String>>>,
}

impl FakeDex {
    pub fn with_pool(mut self, pool: RawPool) -> Self {
        self.pools
            .entry(pool.base_token.address.to_lowercase())
            .or_default()
            .push(pool);
        self
    }

    pub fn failing_for(mut self, address: &str) -> Self {
        self.failing.push(address.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl DexProvider for FakeDex {
    async fn pools_for_tokens(&self, addresses: &[String]) -> Result<Vec<RawPool>, ProviderError> {
        self.requests.lock().unwrap().push(addresses.to_vec());
        if addresses.iter().any(|a| self.failing.contains(a)) {
            return Err(ProviderError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(addresses
            .iter()
            .flat_map(|a| self.pools.get(&a.to_lowercase()).cloned().unwrap_or_default())
            .collect())
    }
}

/// A pool that clears the default filters.
pub fn liquid_pool(address: &str, symbol: &str, price: f64, volume_h24: f64) -> RawPool {
    let mut pool = RawPool {
        price_usd: Some(price),
        base_token: PairToken {
            address: address.to_string(),
            symbol: symbol.to_string(),
            ..Default::default()
        },
        chain_id: "base".to_string(),
        dex_id: "uniswap".to_string(),
        url: format!("https://dexscreener.com/base/{}", address),
        pair_address: format!("{}-pair", address),
        ..Default::default()
    };
    pool.txns.h24.buys = 120;
    pool.txns.h24.sells = 80;
    pool.liquidity.usd = 50_000.0;
    pool.volume.h24 = volume_h24;
    pool
}
