//! File Liquidity Store - Atomic JSON Table Snapshots
//!
//! Keeps the liquidity table in memory and rewrites `liquidity.json`
//! as compact JSON after every mutation that changes it, using atomic
//! writes (write to tmp file, then rename). The file is always either the old or the new table, never
//! a partial write. Mutations are serialized through one lock so that
//! concurrent per-pair upserts cannot interleave their snapshots.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::table::LiquidityTable;
use crate::domain::{LiquidityState, OrderedPair, PairKey};
use crate::ports::{LiquidityRow, LiquidityStore};

/// Liquidity table persisted as a JSON array of rows.
pub struct FileLiquidityStore {
    /// Path to liquidity.json.
    table_path: PathBuf,
    /// Temporary path for atomic writes.
    tmp_path: PathBuf,
    table: Mutex<LiquidityTable>,
}

impl FileLiquidityStore {
    /// Open the store in `data_dir`, loading the existing table if any.
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn open(data_dir: &str) -> Result<Self> {
        let dir = Path::new(data_dir);
        fs::create_dir_all(dir)
            .await
            .context("Failed to create data directory")?;

        let table_path = dir.join("liquidity.json");
        let tmp_path = dir.join("liquidity.json.tmp");

        let table = if fs::try_exists(&table_path).await.unwrap_or(false) {
            let json = fs::read_to_string(&table_path)
                .await
                .context("Failed to read liquidity table")?;
            let rows: Vec<LiquidityRow> =
                serde_json::from_str(&json).context("Failed to parse liquidity table JSON")?;
            info!(rows = rows.len(), path = %table_path.display(), "Liquidity table loaded");
            LiquidityTable::from_rows(rows)
        } else {
            info!(path = %table_path.display(), "No liquidity table found, starting empty");
            LiquidityTable::default()
        };

        Ok(Self {
            table_path,
            tmp_path,
            table: Mutex::new(table),
        })
    }

    /// Write the table atomically (tmp → rename).
    async fn persist(&self, table: &LiquidityTable) -> Result<()> {
        let json = serde_json::to_string(&table.rows())
            .context("Failed to serialize liquidity table")?;

        fs::write(&self.tmp_path, &json)
            .await
            .context("Failed to write tmp liquidity table")?;

        fs::rename(&self.tmp_path, &self.table_path)
            .await
            .context("Failed to rename liquidity table")?;

        Ok(())
    }

    /// Apply `mutate` to a copy and only commit it once the snapshot is on disk.
    ///
    /// A mutation that leaves the table unchanged writes nothing.
    async fn mutate<T>(&self, mutate: impl FnOnce(&mut LiquidityTable) -> Result<T>) -> Result<T> {
        let mut guard = self.table.lock().await;
        let mut next = guard.clone();
        let out = mutate(&mut next)?;
        if next == *guard {
            return Ok(out);
        }
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl LiquidityStore for FileLiquidityStore {
    async fn load_all(&self) -> Result<HashMap<PairKey, LiquidityState>> {
        Ok(self.table.lock().await.states())
    }

    #[instrument(skip(self, pairs), fields(pairs = pairs.len()))]
    async fn seed(&self, pairs: &[OrderedPair]) -> Result<usize> {
        let inserted = self.mutate(|table| Ok(table.seed(pairs))).await?;
        info!(inserted, "Seeded liquidity table");
        Ok(inserted)
    }

    async fn upsert(&self, key: &PairKey, state: &LiquidityState) -> Result<()> {
        self.mutate(|table| table.upsert(key, state)).await
    }

    async fn delete(&self, key: &PairKey) -> Result<()> {
        let removed = self.mutate(|table| Ok(table.delete(key))).await?;
        debug!(pair = %key, removed, "Deleted liquidity row");
        Ok(())
    }

    async fn rows(&self) -> Result<Vec<LiquidityRow>> {
        Ok(self.table.lock().await.rows())
    }

    /// Check if the data directory is writable.
    async fn is_healthy(&self) -> bool {
        let Some(dir) = self.table_path.parent() else {
            return false;
        };
        let probe = dir.join(".health_check");
        let result = fs::write(&probe, b"ok").await;
        let _ = fs::remove_file(&probe).await;
        result.is_ok()
    }
}
