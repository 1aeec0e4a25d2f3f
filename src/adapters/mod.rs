// Provider Adapters Module
// HTTP pass-through clients behind the traits in `rate_provider`

pub mod binance;
pub mod coinmarketcap;
pub mod dexscreener;

pub use binance::BinanceClient;
pub use coinmarketcap::CoinMarketCapClient;
pub use dexscreener::DexScreenerClient;

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

/// Validates a configured base URL and strips the trailing slash so paths can be appended.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim()).with_context(|| format!("Invalid provider URL {}", raw))?;
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

pub(crate) fn http_client(timeout_ms: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms.max(1)))
        .build()
        .context("Failed to build HTTP client")
}
