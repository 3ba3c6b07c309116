//! Config Hot-Reload - Pick Up Token Catalog Changes Between Sweeps
//!
//! Periodically re-reads config.toml and, when its contents change and
//! still validate, publishes the new config on a `tokio::sync::watch`
//! channel. Sweeps build their pair registry from the latest published
//! catalog, so delisted or deprecated tokens get reconciled away on the
//! next sweep without a restart.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use super::AppConfig;
use crate::domain::PairRegistry;

/// Polls config.toml and broadcasts validated updates.
///
/// Polling rather than a filesystem watcher keeps behaviour identical
/// across Linux, macOS and container volume mounts.
pub struct ConfigWatcher {
    config_path: String,
    poll_interval: Duration,
    config_tx: watch::Sender<AppConfig>,
    /// Hash of the last file contents that were published.
    last_hash: Option<u64>,
}

impl ConfigWatcher {
    /// Create a watcher polling every 60 seconds.
    ///
    /// Returns the watcher and the receiver consumers read the current
    /// config from.
    pub fn new(config_path: &str, initial_config: AppConfig) -> (Self, watch::Receiver<AppConfig>) {
        Self::with_interval(config_path, initial_config, Duration::from_secs(60))
    }

    pub fn with_interval(
        config_path: &str,
        initial_config: AppConfig,
        poll_interval: Duration,
    ) -> (Self, watch::Receiver<AppConfig>) {
        let (config_tx, config_rx) = watch::channel(initial_config);

        let watcher = Self {
            config_path: config_path.to_string(),
            poll_interval,
            config_tx,
            last_hash: None,
        };

        (watcher, config_rx)
    }

    /// Run the poll loop until shutdown.
    #[instrument(skip(self, shutdown_rx), fields(path = %self.config_path))]
    pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Config watcher started"
        );

        self.last_hash = self.compute_hash().await;

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Config watcher shutting down");
                    return Ok(());
                }
                () = tokio::time::sleep(self.poll_interval) => {
                    self.check_and_reload().await;
                }
            }
        }
    }

    /// Reload if the file changed. Invalid edits keep the current config.
    async fn check_and_reload(&mut self) -> bool {
        let new_hash = self.compute_hash().await;

        if new_hash == self.last_hash {
            debug!("Config unchanged");
            return false;
        }

        match super::loader::load_config(&self.config_path) {
            Ok(new_config) => {
                self.last_hash = new_hash;
                let before = PairRegistry::from_catalog(&self.config_tx.borrow().tokens).len();
                let after = PairRegistry::from_catalog(&new_config.tokens).len();
                self.config_tx.send_replace(new_config);
                info!(pairs_before = before, pairs_after = after, "Config reloaded");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to reload config, keeping current");
                false
            }
        }
    }

    async fn compute_hash(&self) -> Option<u64> {
        let content = tokio::fs::read_to_string(&self.config_path).await.ok()?;

        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        Some(hasher.finish())
    }
}
