// Pool-aggregator (DexScreener) response types.
// Every section is optional upstream, so everything defaults.

use crate::types::conversions::{f64_lenient, null_as_default, opt_f64_lenient};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<RawPool>>,
}

impl PairsResponse {
    pub fn into_pools(self) -> Vec<RawPool> {
        self.pairs.unwrap_or_default()
    }
}

/// One liquidity pool as reported by the DEX provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPool {
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub price_usd: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub base_token: PairToken,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quote_token: PairToken,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chain_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dex_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pair_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volume: Timeframes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price_change: Timeframes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub txns: TxnTimeframes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub liquidity: Liquidity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: PoolInfo,
}

impl RawPool {
    pub fn trades_24h(&self) -> u64 {
        self.txns.h24.buys.saturating_add(self.txns.h24.sells)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PairToken {
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symbol: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Timeframes {
    #[serde(default, deserialize_with = "f64_lenient")]
    pub m5: f64,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub h1: f64,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub h6: f64,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub h24: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxnCounts {
    #[serde(default, deserialize_with = "null_as_default")]
    pub buys: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sells: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxnTimeframes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub m5: TxnCounts,
    #[serde(default, deserialize_with = "null_as_default")]
    pub h1: TxnCounts,
    #[serde(default, deserialize_with = "null_as_default")]
    pub h6: TxnCounts,
    #[serde(default, deserialize_with = "null_as_default")]
    pub h24: TxnCounts,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Liquidity {
    #[serde(default, deserialize_with = "f64_lenient")]
    pub usd: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    #[serde(default)]
    pub image_url: Option<String>,
}
