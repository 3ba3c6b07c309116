//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::domain::{PairRegistry, PAIR_KEY_SEPARATOR};

/// 10^77 is the largest power of ten that fits in 256 bits.
const MAX_DECIMALS: u8 = 77;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    catalog_entries = config.tokens.len(),
    pairs = PairRegistry::from_catalog(&config.tokens).len(),
    backend = ?config.store.backend,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - A non-empty token catalog with well-formed asset ids
/// - Decimal precisions whose unit fits in 256 bits
/// - Coherent jitter window and timeouts
/// - Non-empty solver relay URL
fn validate_config(config: &AppConfig) -> Result<()> {
  // Catalog validation
  anyhow::ensure!(
    !config.tokens.is_empty(),
    "At least one catalog token must be configured"
  );

  for (i, entry) in config.tokens.iter().enumerate() {
    for token in entry.tokens() {
      let id = &token.token.asset_id;
      anyhow::ensure!(!id.is_empty(), "Catalog entry {} has an empty asset_id", i);
      anyhow::ensure!(
        !id.contains(PAIR_KEY_SEPARATOR),
        "Catalog entry {} asset_id {:?} contains reserved separator '{}'",
        i,
        id,
        PAIR_KEY_SEPARATOR
      );
      anyhow::ensure!(
        token.token.decimals <= MAX_DECIMALS,
        "Catalog entry {} asset_id {:?} has decimals {} > {}",
        i,
        id,
        token.token.decimals,
        MAX_DECIMALS
      );
    }
  }

  // Scheduler validation
  let scheduler = &config.scheduler;
  anyhow::ensure!(
    scheduler.jitter_min_ms <= scheduler.jitter_max_ms,
    "jitter_min_ms ({}) must not exceed jitter_max_ms ({})",
    scheduler.jitter_min_ms,
    scheduler.jitter_max_ms
  );
  anyhow::ensure!(
    scheduler.probe_timeout_ms > 0,
    "probe_timeout_ms must be positive"
  );
  if let Some(interval) = scheduler.interval_seconds {
    anyhow::ensure!(interval > 0, "interval_seconds must be positive");
  }

  // Solver validation
  anyhow::ensure!(
    !config.solver.relay_url.is_empty(),
    "Solver relay URL must not be empty"
  );
  anyhow::ensure!(config.solver.wait_ms > 0, "solver wait_ms must be positive");
  anyhow::ensure!(
    config.solver.request_timeout_ms > 0,
    "solver request_timeout_ms must be positive"
  );
  // Both bounds must outlast the relay wait, or every probe reads as a failure.
  anyhow::ensure!(
    config.solver.request_timeout_ms > config.solver.wait_ms,
    "solver request_timeout_ms ({}) must exceed wait_ms ({})",
    config.solver.request_timeout_ms,
    config.solver.wait_ms
  );
  anyhow::ensure!(
    scheduler.probe_timeout_ms > config.solver.wait_ms,
    "probe_timeout_ms ({}) must exceed solver wait_ms ({})",
    scheduler.probe_timeout_ms,
    config.solver.wait_ms
  );
  anyhow::ensure!(
    config.solver.max_quotes_per_second > 0,
    "max_quotes_per_second must be positive"
  );

  anyhow::ensure!(
    !config.api.trigger_secret_env.is_empty(),
    "trigger_secret_env must name an environment variable"
  );

  Ok(())
}
