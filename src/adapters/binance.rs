// Binance-compatible spot API (direct or through a signing proxy).

use crate::adapters::{http_client, normalize_base_url};
use crate::rate_provider::{read_json, CexProvider, ProviderError};
use crate::settings;
use crate::types::cex_data::{CoinEntry, ExchangeInfo, TickerPrice};
use anyhow::Result;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use log::debug;
use sha2::Sha256;

const TRADING: &str = "TRADING";
const RECV_WINDOW_MS: u64 = 5_000;

type HmacSha256 = Hmac<Sha256>;

pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl BinanceClient {
    pub fn new(config: &settings::Cex) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_ms)?,
            base_url: normalize_base_url(&config.base_url)?,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            api_secret: config.api_secret.clone().filter(|s| !s.is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Hex HMAC-SHA256 of the query string, as the signed endpoints expect.
pub fn sign_query(secret: &str, query: &str) -> String {
    // new_from_slice accepts keys of any length for HMAC
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(query.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Symbols quoted in `stablecoin` and open for trading.
pub fn stablecoin_symbols(info: &ExchangeInfo, stablecoin: &str) -> Vec<String> {
    info.symbols
        .iter()
        .filter(|s| s.quote_asset == stablecoin && s.status == TRADING)
        .map(|s| s.symbol.clone())
        .collect()
}

#[async_trait]
impl CexProvider for BinanceClient {
    async fn stablecoin_pairs(&self, stablecoin: &str) -> Result<Vec<String>, ProviderError> {
        let response = self.client.get(self.url("/api/v3/exchangeInfo")).send().await?;
        let info: ExchangeInfo = read_json(response).await?;
        let symbols = stablecoin_symbols(&info, stablecoin);
        debug!(
            "exchangeInfo: {} symbols, {} quoted in {}",
            info.symbols.len(),
            symbols.len(),
            stablecoin
        );
        Ok(symbols)
    }

    async fn ticker_prices(&self, symbols: &[String]) -> Result<Vec<TickerPrice>, ProviderError> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        let symbols_param = serde_json::to_string(symbols).map_err(|source| ProviderError::Decode {
            source,
            body: String::new(),
        })?;
        let response = self
            .client
            .get(self.url("/api/v3/ticker/24hr"))
            .query(&[("symbols", symbols_param.as_str()), ("type", "MINI")])
            .send()
            .await?;
        read_json(response).await
    }

    async fn all_coins(&self) -> Result<Vec<CoinEntry>, ProviderError> {
        let path = self.url("/sapi/v1/capital/config/getall");
        let request = match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => {
                let timestamp = chrono::Utc::now().timestamp_millis();
                let query = format!("recvWindow={}&timestamp={}", RECV_WINDOW_MS, timestamp);
                let signature = sign_query(secret, &query);
                self.client
                    .get(format!("{}?{}&signature={}", path, query, signature))
                    .header("X-MBX-APIKEY", key.as_str())
            }
            (None, Some(_)) => return Err(ProviderError::MissingCredential("binance api key")),
            // No secret: the base URL is a proxy that signs on our behalf.
            _ => self.client.get(path),
        };
        let response = request.send().await?;
        read_json(response).await
    }
}
