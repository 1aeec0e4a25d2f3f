// Centralized-exchange (Binance-compatible) response types.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub base_asset: String,
    #[serde(default)]
    pub quote_asset: String,
}

/// Last-trade price for one symbol; the price stays a string until parsed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerPrice {
    pub symbol: String,
    pub last_price: String,
}

/// Coin with the networks (and contract addresses) it can be withdrawn on.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinEntry {
    pub coin: String,
    #[serde(default)]
    pub network_list: Vec<NetworkEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    pub network: String,
    #[serde(default)]
    pub coin: String,
    #[serde(default)]
    pub contract_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_coin_entries() {
        let raw = r#"[{
            "coin": "BTC",
            "name": "Bitcoin",
            "networkList": [
                {"network": "BTC", "coin": "BTC", "contractAddress": ""},
                {"network": "ETH", "coin": "BTC", "contractAddress": "0xabc", "withdrawEnable": true}
            ]
        }]"#;
        let coins: Vec<CoinEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(coins[0].network_list.len(), 2);
        assert_eq!(coins[0].network_list[1].contract_address, "0xabc");
    }
}
