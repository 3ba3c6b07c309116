//! Base-unit amounts as 256-bit integers.
//!
//! Amounts are token base units and are never fractional. They are
//! persisted and exposed as base-10 strings so that downstream readers
//! do not lose precision parsing them as JSON numbers.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serializer};

/// Token amount in base units.
pub type Amount = U256;

/// `10^decimals`, one whole unit of an asset with that precision.
///
/// Saturates at `U256::MAX`; the config loader keeps decimals within
/// the representable range so this never saturates in practice.
pub fn one_unit(decimals: u8) -> Amount {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .unwrap_or(U256::MAX)
}

/// Parse a base-10 amount string.
pub fn parse_amount(raw: &str) -> anyhow::Result<Amount> {
    U256::from_str_radix(raw.trim(), 10)
        .map_err(|e| anyhow::anyhow!("invalid amount {raw:?}: {e}"))
}

pub fn serialize<S>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_amount(&raw).map_err(serde::de::Error::custom)
}

/// Same encoding for optional amounts (`null` when absent).
pub mod option {
    use super::{parse_amount, Amount};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Amount>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_amount(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
