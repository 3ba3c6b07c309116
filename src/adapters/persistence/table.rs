//! Liquidity table shared by the store backends.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};

use crate::domain::{LiquidityState, OrderedPair, PairKey};
use crate::ports::LiquidityRow;

/// Rows keyed by `(address_from, address_to)`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct LiquidityTable {
  rows: BTreeMap<PairKey, LiquidityRow>,
}

impl LiquidityTable {
  pub(super) fn from_rows(rows: Vec<LiquidityRow>) -> Self {
    Self {
      rows: rows.into_iter().map(|row| (row.key(), row)).collect(),
    }
  }

  pub(super) fn states(&self) -> HashMap<PairKey, LiquidityState> {
    self
      .rows
      .iter()
      .map(|(key, row)| (key.clone(), row.state()))
      .collect()
  }

  /// Insert seed rows for pairs without one; returns how many were added.
  pub(super) fn seed(&mut self, pairs: &[OrderedPair]) -> usize {
    let mut inserted = 0;
    for pair in pairs {
      let key = pair.key();
      if self.rows.contains_key(&key) {
        continue;
      }
      if let Some(row) = LiquidityRow::from_state(&key, &LiquidityState::seed_for(pair)) {
        self.rows.insert(key, row);
        inserted += 1;
      }
    }
    inserted
  }

  pub(super) fn upsert(&mut self, key: &PairKey, state: &LiquidityState) -> Result<()> {
    let row = LiquidityRow::from_state(key, state)
      .with_context(|| format!("Malformed pair key {key}"))?;
    self.rows.insert(key.clone(), row);
    Ok(())
  }

  /// Returns whether a row was removed.
  pub(super) fn delete(&mut self, key: &PairKey) -> bool {
    self.rows.remove(key).is_some()
  }

  pub(super) fn rows(&self) -> Vec<LiquidityRow> {
    self.rows.values().cloned().collect()
  }
}
