//! Raw-unit amount codec
//!
//! Every amount crossing the port boundary is an unscaled integer in the
//! token's smallest unit. It is written as a decimal string and read from a
//! JSON number, a decimal string or a `0x` hex string.

use alloy_primitives::U256;
use serde::{de, Deserialize, Deserializer, Serializer};

/// Parse a decimal or `0x`-prefixed hex integer.
pub fn parse_amount(text: &str) -> Result<U256, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("empty amount".to_string());
    }
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(trimmed, 10),
    };
    parsed.map_err(|err| format!("invalid amount `{}`: {}", trimmed, err))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(u64),
    Text(String),
}

/// `#[serde(with = "amount::decimal")]` adapter for `U256` fields.
pub mod decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(n) => Ok(U256::from(n)),
            RawAmount::Text(text) => parse_amount(&text).map_err(de::Error::custom),
        }
    }
}
