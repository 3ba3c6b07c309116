//! In-memory Liquidity Store
//!
//! Backs tests and ephemeral deployments. State is lost on restart.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::table::LiquidityTable;
use crate::domain::{LiquidityState, OrderedPair, PairKey};
use crate::ports::{LiquidityRow, LiquidityStore};

/// Process-local liquidity table.
#[derive(Debug, Default)]
pub struct MemoryLiquidityStore {
  table: RwLock<LiquidityTable>,
}

impl MemoryLiquidityStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start from existing rows.
  pub fn with_rows(rows: Vec<LiquidityRow>) -> Self {
    Self {
      table: RwLock::new(LiquidityTable::from_rows(rows)),
    }
  }
}

#[async_trait]
impl LiquidityStore for MemoryLiquidityStore {
  async fn load_all(&self) -> Result<HashMap<PairKey, LiquidityState>> {
    Ok(self.table.read().await.states())
  }

  async fn seed(&self, pairs: &[OrderedPair]) -> Result<usize> {
    Ok(self.table.write().await.seed(pairs))
  }

  async fn upsert(&self, key: &PairKey, state: &LiquidityState) -> Result<()> {
    self.table.write().await.upsert(key, state)
  }

  async fn delete(&self, key: &PairKey) -> Result<()> {
    self.table.write().await.delete(key);
    Ok(())
  }

  async fn rows(&self) -> Result<Vec<LiquidityRow>> {
    Ok(self.table.read().await.rows())
  }

  async fn is_healthy(&self) -> bool {
    true
  }
}
