// Pool Filtering and Resolution
// Drops illiquid or inactive pools, then keeps one pool per base token

use crate::settings::Settings;
use crate::types::dex_data::RawPool;
use crate::types::{address_key, PriceRecord};
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::HashSet;

/// Thresholds a pool must clear to price its base token.
#[derive(Debug, Clone)]
pub struct PoolFilterConfig {
    pub supported_chains: HashSet<String>,
    // buys + sells over 24h must be strictly above this
    pub min_total_trades_24h: u64,
    // buys over 24h must be strictly above this
    pub min_buys_24h: u64,
    pub min_liquidity_usd: f64,
}

impl Default for PoolFilterConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl PoolFilterConfig {
    /// Create PoolFilterConfig from Settings
    pub fn from_settings(settings: &Settings) -> Self {
        let filters = &settings.pool_filters;
        Self {
            supported_chains: filters
                .supported_chains
                .iter()
                .map(|c| c.trim().to_ascii_lowercase())
                .collect(),
            min_total_trades_24h: filters.min_total_trades_24h,
            min_buys_24h: filters.min_buys_24h,
            min_liquidity_usd: filters.min_liquidity_usd,
        }
    }
}

/// Result of pool filtering
#[derive(Debug, Clone, PartialEq)]
pub struct PoolFilterResult {
    pub is_valid: bool,
    pub rejection_reason: Option<String>,
}

impl PoolFilterResult {
    fn accepted() -> Self {
        Self {
            is_valid: true,
            rejection_reason: None,
        }
    }

    fn rejected(reason: String) -> Self {
        Self {
            is_valid: false,
            rejection_reason: Some(reason),
        }
    }
}

/// Output of `PoolFilter::resolve`.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One DEX record per base token, in first-survivor order.
    pub records: Vec<PriceRecord>,
    /// Surviving pools per base-token key, for every base token in the input.
    pub pool_counts: IndexMap<String, u32>,
    pub rejected: usize,
}

pub struct PoolFilter {
    config: PoolFilterConfig,
}

impl PoolFilter {
    pub fn new(config: PoolFilterConfig) -> Self {
        Self { config }
    }

    pub fn filter_pool(&self, pool: &RawPool) -> PoolFilterResult {
        let chain = pool.chain_id.to_ascii_lowercase();
        if !self.config.supported_chains.contains(&chain) {
            return PoolFilterResult::rejected(format!("unsupported chain {}", pool.chain_id));
        }

        let trades = pool.trades_24h();
        if trades <= self.config.min_total_trades_24h {
            return PoolFilterResult::rejected(format!(
                "{} trades in 24h <= {}",
                trades, self.config.min_total_trades_24h
            ));
        }

        let buys = pool.txns.h24.buys;
        if buys <= self.config.min_buys_24h {
            return PoolFilterResult::rejected(format!(
                "{} buys in 24h <= {}",
                buys, self.config.min_buys_24h
            ));
        }

        if pool.liquidity.usd < self.config.min_liquidity_usd {
            return PoolFilterResult::rejected(format!(
                "liquidity ${:.0} < ${:.0}",
                pool.liquidity.usd, self.config.min_liquidity_usd
            ));
        }

        PoolFilterResult::accepted()
    }

    /// Filters `pools` and picks, per base token, the surviving pool with the
    /// greatest 24h volume. A later pool only replaces the incumbent when its
    /// volume is strictly greater, so the first pool wins ties.
    ///
    /// Every surviving pool counts toward its token's weight, including pools
    /// whose price is unusable; those just never become the record.
    pub fn resolve(&self, pools: &[RawPool]) -> Resolution {
        let mut resolution = Resolution::default();
        // key -> (index into records, winning volume)
        let mut winners: IndexMap<String, (usize, f64)> = IndexMap::new();

        for pool in pools {
            let key = address_key(&pool.base_token.address);
            if key.is_empty() {
                continue;
            }
            let count = resolution.pool_counts.entry(key.clone()).or_insert(0);

            let verdict = self.filter_pool(pool);
            if !verdict.is_valid {
                resolution.rejected += 1;
                debug!(
                    "Pool {} ({}) rejected: {}",
                    pool.pair_address,
                    pool.base_token.symbol,
                    verdict.rejection_reason.unwrap_or_default()
                );
                continue;
            }
            *count += 1;

            let record = match PriceRecord::try_from(pool) {
                Ok(record) => record,
                Err(e) => {
                    warn!("⚠️ Pool {} counted but not priced: {}", pool.pair_address, e);
                    continue;
                }
            };
            let volume = pool.volume.h24;

            match winners.get_mut(&key) {
                Some((idx, best_volume)) => {
                    if volume > *best_volume {
                        resolution.records[*idx] = record;
                        *best_volume = volume;
                    }
                }
                None => {
                    winners.insert(key, (resolution.records.len(), volume));
                    resolution.records.push(record);
                }
            }
        }

        debug!(
            "Resolved {} pools into {} records ({} rejected)",
            pools.len(),
            resolution.records.len(),
            resolution.rejected
        );
        resolution
    }
}
