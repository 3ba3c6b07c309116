//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`. Secrets
//! (trigger bearer secret, relay API key) are read from environment
//! variables named here, never stored in the file. The token catalog
//! lives in the same file so that hot-reloading it changes the probe
//! universe on the next sweep.

pub mod hot_reload;
pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::domain::CatalogEntry;

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and HTTP bind address.
  pub service: ServiceConfig,
  /// Sweep pacing, timeouts and policy switches.
  #[serde(default)]
  pub scheduler: SchedulerConfig,
  /// Upstream solver relay.
  pub solver: SolverConfig,
  /// Liquidity state persistence.
  #[serde(default)]
  pub store: StoreConfig,
  /// Trigger endpoint authentication.
  #[serde(default)]
  pub api: ApiConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Token catalog the pair universe is derived from.
  pub tokens: Vec<CatalogEntry>,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Bind address for the trigger / read-side / health API.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
}

/// Sweep scheduling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
  /// Lower bound of the random delay between probe launches (ms).
  #[serde(default = "default_jitter_min")]
  pub jitter_min_ms: u64,
  /// Upper bound of the random delay between probe launches (ms).
  #[serde(default = "default_jitter_max")]
  pub jitter_max_ms: u64,
  /// Local hard timeout per probe; a probe still pending is a failure.
  #[serde(default = "default_probe_timeout")]
  pub probe_timeout_ms: u64,
  /// Optional overall sweep deadline. Probes still in flight are abandoned.
  #[serde(default)]
  pub sweep_deadline_seconds: Option<u64>,
  /// Run sweeps in-process on this interval (in addition to the HTTP trigger).
  #[serde(default)]
  pub interval_seconds: Option<u64>,
  /// Allow a second sweep to start while one is still running.
  #[serde(default)]
  pub allow_overlapping_sweeps: bool,
  /// Log individual probe and write failures at warn level.
  #[serde(default = "default_true")]
  pub log_pair_failures: bool,
  /// Seed default state for unseeded pairs at startup.
  #[serde(default = "default_true")]
  pub seed_on_startup: bool,
}

impl SchedulerConfig {
  pub fn probe_timeout(&self) -> Duration {
    Duration::from_millis(self.probe_timeout_ms)
  }

  pub fn sweep_deadline(&self) -> Option<Duration> {
    self.sweep_deadline_seconds.map(Duration::from_secs)
  }
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      jitter_min_ms: default_jitter_min(),
      jitter_max_ms: default_jitter_max(),
      probe_timeout_ms: default_probe_timeout(),
      sweep_deadline_seconds: None,
      interval_seconds: None,
      allow_overlapping_sweeps: false,
      log_pair_failures: true,
      seed_on_startup: true,
    }
  }
}

/// Solver relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
  /// JSON-RPC endpoint of the solver relay.
  pub relay_url: String,
  /// How long the relay may wait for solver quotes (ms).
  #[serde(default = "default_wait_ms")]
  pub wait_ms: u64,
  /// HTTP request timeout (ms). Should exceed `wait_ms`.
  #[serde(default = "default_request_timeout")]
  pub request_timeout_ms: u64,
  /// Client-side cap on quote requests per second.
  #[serde(default = "default_max_quotes")]
  pub max_quotes_per_second: u32,
  /// Env var holding an optional relay API key.
  #[serde(default)]
  pub api_key_env: Option<String>,
}

/// Which store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  /// Atomic JSON snapshot in `data_dir`.
  File,
  /// Process memory; lost on restart.
  Memory,
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  #[serde(default = "default_backend")]
  pub backend: StoreBackend,
  /// Directory for the liquidity table snapshot.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      backend: default_backend(),
      data_dir: default_data_dir(),
    }
  }
}

/// Trigger endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Env var holding the bearer secret for the trigger and seed endpoints.
  #[serde(default = "default_secret_env")]
  pub trigger_secret_env: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      trigger_secret_env: default_secret_env(),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_bind_address() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_true() -> bool {
  true
}

fn default_jitter_min() -> u64 {
  50
}

fn default_jitter_max() -> u64 {
  100
}

fn default_probe_timeout() -> u64 {
  4_000
}

fn default_wait_ms() -> u64 {
  3_000
}

fn default_request_timeout() -> u64 {
  5_000
}

fn default_max_quotes() -> u32 {
  20
}

fn default_backend() -> StoreBackend {
  StoreBackend::File
}

fn default_data_dir() -> String {
  "data".to_string()
}

fn default_secret_env() -> String {
  "CRON_SECRET".to_string()
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
