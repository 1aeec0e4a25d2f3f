//! Shared data model: chains, source tags and the published price record.

pub mod cex_data;
pub mod conversions;
pub mod dex_data;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use conversions::address_key;

/// Chain whose on-chain logs are scanned for token discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Base,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Base => "base",
        }
    }

    /// Table holding swap logs (`token_in_address` / `token_out_address`).
    pub fn trade_table(&self) -> &'static str {
        match self {
            Chain::Base => "base_trade_logs",
        }
    }

    /// Table holding ERC-20 transfer logs (`token_address`).
    pub fn transfer_table(&self) -> &'static str {
        match self {
            Chain::Base => "base_transfer_logs",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(Chain::Base),
            other => Err(anyhow::anyhow!("unsupported chain: {}", other)),
        }
    }
}

/// Where a published price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Cex,
    Dex,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Cex => "cex",
            SourceKind::Dex => "dex",
        }
    }
}

/// One entry of the published snapshot.
///
/// Rebuilt from scratch every cycle; the snapshot replaces the previous one
/// wholesale. The JSON shape (camelCase keys, `tokenAddress`, `sourcePrice`)
/// is what downstream readers of the cache key consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub usd_price: f64,
    #[serde(rename = "tokenAddress")]
    pub address: String,
    pub symbol: String,
    pub chain_id: String,
    #[serde(rename = "sourcePrice")]
    pub source: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dex_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub price_change_m5: f64,
    #[serde(default)]
    pub price_change_h1: f64,
    #[serde(default)]
    pub price_change_h6: f64,
    #[serde(default)]
    pub price_change_h24: f64,
}

impl PriceRecord {
    /// Record for a token priced from a CEX `<coin><stablecoin>` ticker.
    pub fn cex(usd_price: f64, address: &str, symbol: &str, chain_id: &str) -> Self {
        Self {
            usd_price,
            address: address.to_string(),
            symbol: symbol.to_string(),
            chain_id: chain_id.to_string(),
            source: SourceKind::Cex,
            image_url: None,
            dex_id: None,
            url: None,
            price_change_m5: 0.0,
            price_change_h1: 0.0,
            price_change_h6: 0.0,
            price_change_h24: 0.0,
        }
    }

    pub fn key(&self) -> String {
        address_key(&self.address)
    }
}

/// Per-cycle projection of the pool-weight table used to drive batching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPoolEntry {
    pub address: String,
    pub weight: u32,
}

impl TokenPoolEntry {
    pub fn new(address: impl Into<String>, weight: u32) -> Self {
        Self {
            address: address.into(),
            weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_record_json_shape() {
        let record = PriceRecord::cex(50000.0, "0xAbC", "BTC", "ethereum");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["usdPrice"], 50000.0);
        assert_eq!(json["tokenAddress"], "0xAbC");
        assert_eq!(json["chainId"], "ethereum");
        assert_eq!(json["sourcePrice"], "cex");
        assert!(json.get("imageUrl").is_none());
        assert_eq!(json["priceChangeH24"], 0.0);
    }

    #[test]
    fn test_chain_parsing() {
        assert_eq!("Base".parse::<Chain>().unwrap(), Chain::Base);
        assert!("arbitrum".parse::<Chain>().is_err());
        assert_eq!(Chain::Base.trade_table(), "base_trade_logs");
    }
}
