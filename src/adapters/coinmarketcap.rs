// CoinMarketCap listings endpoint, one rotated API key per request.

use crate::adapters::{http_client, normalize_base_url};
use crate::credentials::KeyRotator;
use crate::rate_provider::{read_json, ProviderError, TokenInfoProvider, TokenListing};
use crate::settings;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

#[derive(Debug, Deserialize)]
struct ListingsResponse {
    #[serde(default)]
    data: Vec<TokenListing>,
}

pub struct CoinMarketCapClient {
    client: reqwest::Client,
    base_url: String,
    keys: KeyRotator,
}

impl CoinMarketCapClient {
    pub fn new(config: &settings::TokenInfo) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_ms)?,
            base_url: normalize_base_url(&config.base_url)?,
            keys: KeyRotator::new(&config.api_keys),
        })
    }
}

#[async_trait]
impl TokenInfoProvider for CoinMarketCapClient {
    async fn listings(&mut self, start: u32, limit: u32) -> Result<Vec<TokenListing>, ProviderError> {
        let key = self
            .keys
            .next_key()
            .ok_or(ProviderError::MissingCredential("coinmarketcap"))?
            .to_string();
        let response = self
            .client
            .get(format!("{}/v1/cryptocurrency/listings/latest", self.base_url))
            .query(&[("start", start), ("limit", limit)])
            .header(API_KEY_HEADER, key)
            .send()
            .await?;
        let listings: ListingsResponse = read_json(response).await?;
        Ok(listings.data)
    }
}
