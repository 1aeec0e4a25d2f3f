// DexScreener pools-by-token endpoint.

use crate::adapters::{http_client, normalize_base_url};
use crate::rate_provider::{read_json, DexProvider, ProviderError};
use crate::settings;
use crate::types::dex_data::{PairsResponse, RawPool};
use anyhow::Result;
use async_trait::async_trait;

pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(config: &settings::Dex) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_ms)?,
            base_url: normalize_base_url(&config.base_url)?,
        })
    }

    /// `{base}/latest/dex/tokens/{a,b,c}`
    pub fn tokens_url(&self, addresses: &[String]) -> String {
        format!("{}/latest/dex/tokens/{}", self.base_url, addresses.join(","))
    }
}

#[async_trait]
impl DexProvider for DexScreenerClient {
    async fn pools_for_tokens(&self, addresses: &[String]) -> Result<Vec<RawPool>, ProviderError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let response = self.client.get(self.tokens_url(addresses)).send().await?;
        let pairs: PairsResponse = read_json(response).await?;
        Ok(pairs.into_pools())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_url_joins_addresses() {
        let client = DexScreenerClient::new(&settings::Dex {
            base_url: "https://api.dexscreener.com/".to_string(),
            ..Default::default()
        })
        .unwrap();

        let url = client.tokens_url(&["0xaaa".to_string(), "0xbbb".to_string()]);
        assert_eq!(url, "https://api.dexscreener.com/latest/dex/tokens/0xaaa,0xbbb");
    }
}
