//! # Provider seams
//!
//! The aggregation core only talks to price providers through these traits.
//! `adapters` holds the HTTP implementations; tests plug in fakes.

use crate::types::cex_data::{CoinEntry, TickerPrice};
use crate::types::dex_data::RawPool;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

// Error bodies are kept for logging, not whole.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response ({source}): {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("no credential configured for {0}")]
    MissingCredential(&'static str),
}

/// Centralized exchange with a spot ticker and a coin/network catalogue.
#[async_trait]
pub trait CexProvider: Send + Sync {
    /// Symbols quoted in `stablecoin` that are currently trading (e.g. `BTCUSDT`).
    async fn stablecoin_pairs(&self, stablecoin: &str) -> Result<Vec<String>, ProviderError>;

    /// Last-trade prices for at most one chunk of symbols.
    async fn ticker_prices(&self, symbols: &[String]) -> Result<Vec<TickerPrice>, ProviderError>;

    /// Every coin with the networks it lives on and its contract address there.
    async fn all_coins(&self) -> Result<Vec<CoinEntry>, ProviderError>;
}

/// DEX pool aggregator.
#[async_trait]
pub trait DexProvider: Send + Sync {
    /// All pools whose base or quote token is one of `addresses`.
    async fn pools_for_tokens(&self, addresses: &[String]) -> Result<Vec<RawPool>, ProviderError>;
}

/// One row of a paginated token-metadata listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenListing {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub quote: ListingQuotes,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingQuotes {
    #[serde(default, rename = "USD")]
    pub usd: ListingQuote,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingQuote {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub volume_24h: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub percent_change_1h: Option<f64>,
    #[serde(default)]
    pub percent_change_24h: Option<f64>,
    #[serde(default)]
    pub percent_change_7d: Option<f64>,
}

/// Paginated token-metadata source.
///
/// Takes `&mut self` because implementations rotate credentials between
/// requests; the refresher owns its provider exclusively.
#[async_trait]
pub trait TokenInfoProvider: Send {
    /// Rows `start..start + limit` (1-based `start`).
    async fn listings(&mut self, start: u32, limit: u32) -> Result<Vec<TokenListing>, ProviderError>;
}

/// Checks the status and decodes a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    decode_body(status, &body)
}

pub(crate) fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ProviderError> {
    if !(200..300).contains(&status) {
        return Err(ProviderError::Status {
            status,
            body: truncate(body),
        });
    }
    serde_json::from_str(body).map_err(|source| ProviderError::Decode {
        source,
        body: truncate(body),
    })
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dex_data::PairsResponse;

    #[test]
    fn test_decode_body_rejects_error_status() {
        let err = decode_body::<PairsResponse>(429, "rate limited").unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_body_reports_bad_json() {
        let err = decode_body::<PairsResponse>(200, "<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[test]
    fn test_long_error_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY * 2);
        let err = decode_body::<PairsResponse>(500, &body).unwrap_err();
        let ProviderError::Status { body, .. } = err else {
            panic!("expected status error");
        };
        assert!(body.len() < MAX_ERROR_BODY + 8);
    }

    #[test]
    fn test_listing_decodes_usd_quote() {
        let json = r#"{
            "name": "Bitcoin", "symbol": "BTC",
            "circulating_supply": 19000000, "total_supply": 19000000, "max_supply": 21000000,
            "tags": ["mineable"],
            "quote": {"USD": {"price": 50000.0, "volume_24h": 1.5e10, "market_cap": 9.5e11,
                              "percent_change_1h": 0.1, "percent_change_24h": -1.2, "percent_change_7d": 3.4}}
        }"#;
        let listing: TokenListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.symbol, "BTC");
        assert_eq!(listing.max_supply, Some(21_000_000.0));
        assert_eq!(listing.quote.usd.price, Some(50_000.0));
    }
}
