//! Liquidity probe state for one ordered pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::amount::{self, Amount};
use super::token::OrderedPair;

/// Outcome of the previous probe for a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Never probed since seeding.
    #[default]
    Unknown,
    Passed,
    Failed,
}

impl CheckStatus {
    /// Column encoding: `passed`, `failed`, or absent.
    pub const fn as_column(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Passed => Some("passed"),
            Self::Failed => Some("failed"),
        }
    }

    /// Decode the column value; unrecognised text reads as unknown.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("passed") => Self::Passed,
            Some("failed") => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_column().unwrap_or("unknown"))
    }
}

/// Persisted search state for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityState {
    /// Next candidate amount to probe.
    #[serde(with = "amount")]
    pub amount: Amount,
    /// Largest amount a probe has confirmed fillable.
    #[serde(with = "amount")]
    pub validated_amount: Amount,
    /// Magnitude of the most recent adjustment to `amount`.
    #[serde(with = "amount::option")]
    pub last_step_size: Option<Amount>,
    pub last_check: CheckStatus,
}

impl LiquidityState {
    /// Initial state for a freshly seeded pair: one unit at the
    /// coarser precision, no step, unknown status.
    pub fn seed_for(pair: &OrderedPair) -> Self {
        let unit = amount::one_unit(pair.min_decimals());
        Self {
            amount: unit,
            validated_amount: unit,
            last_step_size: None,
            last_check: CheckStatus::Unknown,
        }
    }
}
