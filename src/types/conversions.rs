use super::dex_data::RawPool;
use super::{PriceRecord, SourceKind};
use serde::{Deserialize, Deserializer};

// Identity key for token addresses.
// EVM hex addresses are case-insensitive, base58 mints are not.
pub fn address_key(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.len() > 2 && (trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
        trimmed.to_ascii_lowercase()
    } else {
        trimmed.to_string()
    }
}

// Providers send prices as strings ("1.2345") and volumes as numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

pub fn parse_price(raw: &str) -> Result<f64, ConversionError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ConversionError::InvalidNumber(raw.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConversionError::InvalidNumber(raw.to_string()))
    }
}

/// Decodes a number that may arrive as a JSON number, a numeric string, or null.
/// Anything unparseable becomes `0.0`.
pub fn f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_f64_lenient(deserializer)?.unwrap_or(0.0))
}

pub fn opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Number(n)) if n.is_finite() => Some(n),
        Some(NumberOrString::Text(s)) => parse_price(&s).ok(),
        _ => None,
    })
}

/// `null` decodes to `T::default()` instead of failing.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl TryFrom<&RawPool> for PriceRecord {
    type Error = ConversionError;

    fn try_from(pool: &RawPool) -> Result<Self, Self::Error> {
        let usd_price = pool
            .price_usd
            .filter(|p| *p > 0.0 && p.is_finite())
            .ok_or_else(|| ConversionError::MissingPrice(pool.base_token.address.clone()))?;

        Ok(PriceRecord {
            usd_price,
            address: pool.base_token.address.clone(),
            symbol: pool.base_token.symbol.clone(),
            chain_id: pool.chain_id.clone(),
            source: SourceKind::Dex,
            image_url: pool.info.image_url.clone().filter(|s| !s.is_empty()),
            dex_id: Some(pool.dex_id.clone()).filter(|s| !s.is_empty()),
            url: Some(pool.url.clone()).filter(|s| !s.is_empty()),
            price_change_m5: pool.price_change.m5,
            price_change_h1: pool.price_change.h1,
            price_change_h6: pool.price_change.h6,
            price_change_h24: pool.price_change.h24,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Pool for {0} has no usable USD price")]
    MissingPrice(String),
}
