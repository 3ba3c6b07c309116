//! Liquidity Store Port - Probe State Persistence Interface
//!
//! The store is the sole durable owner of [`LiquidityState`]. Sweeps
//! read everything once, then write back per pair; concurrent writes to
//! different keys never conflict.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::amount::{self, Amount};
use crate::domain::{CheckStatus, LiquidityState, OrderedPair, PairKey};

/// One row of the liquidity table, as exposed by the read-side API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityRow {
  pub address_from: String,
  pub address_to: String,
  #[serde(with = "amount")]
  pub amount: Amount,
  #[serde(with = "amount")]
  pub validated_amount: Amount,
  #[serde(with = "amount::option")]
  pub last_step_size: Option<Amount>,
  /// `passed`, `failed` or null.
  pub last_liquidity_check: Option<String>,
  pub updated_at: DateTime<Utc>,
}

impl LiquidityRow {
  /// Build a row for `key`. Returns `None` for keys without a separator.
  pub fn from_state(key: &PairKey, state: &LiquidityState) -> Option<Self> {
    let (from, to) = key.split()?;
    Some(Self {
      address_from: from.to_string(),
      address_to: to.to_string(),
      amount: state.amount,
      validated_amount: state.validated_amount,
      last_step_size: state.last_step_size,
      last_liquidity_check: state.last_check.as_column().map(str::to_string),
      updated_at: Utc::now(),
    })
  }

  pub fn key(&self) -> PairKey {
    PairKey::new(&self.address_from, &self.address_to)
  }

  pub fn state(&self) -> LiquidityState {
    LiquidityState {
      amount: self.amount,
      validated_amount: self.validated_amount,
      last_step_size: self.last_step_size,
      last_check: CheckStatus::from_column(self.last_liquidity_check.as_deref()),
    }
  }
}

/// Trait for liquidity state persistence providers.
#[async_trait]
pub trait LiquidityStore: Send + Sync + 'static {
  /// Load every persisted state keyed by pair.
  ///
  /// # Errors
  /// Any failure here aborts the sweep that requested it.
  async fn load_all(&self) -> anyhow::Result<HashMap<PairKey, LiquidityState>>;

  /// Insert the default seed state for pairs that have no record.
  ///
  /// Existing records are left untouched. Returns the number of rows
  /// inserted.
  async fn seed(&self, pairs: &[OrderedPair]) -> anyhow::Result<usize>;

  /// Insert or replace the state of one pair.
  async fn upsert(&self, key: &PairKey, state: &LiquidityState) -> anyhow::Result<()>;

  /// Remove the state of one pair. Removing a missing key is not an error.
  async fn delete(&self, key: &PairKey) -> anyhow::Result<()>;

  /// Raw table contents for the read-side API.
  async fn rows(&self) -> anyhow::Result<Vec<LiquidityRow>>;

  /// Check if the backing storage is usable.
  async fn is_healthy(&self) -> bool;
}
