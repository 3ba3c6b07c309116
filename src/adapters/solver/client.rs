//! Solver Relay Client - Rate-limited JSON-RPC Client
//!
//! Wraps reqwest with a client-side rate limit for the solver relay's
//! `quote` method. There are deliberately no retries here: a failed
//! quote is a failed probe, and the next sweep probes again.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use tracing::debug;

use super::types::{JsonRpcRequest, JsonRpcResponse, QuoteParams, SolverQuote};

/// Configuration for the relay client.
#[derive(Debug, Clone)]
pub struct SolverRelayConfig {
  /// JSON-RPC endpoint.
  pub relay_url: String,
  /// HTTP request timeout.
  pub timeout: Duration,
  /// Maximum quote requests per second.
  pub max_per_second: NonZeroU32,
  /// Optional bearer key for the relay.
  pub api_key: Option<String>,
}

impl Default for SolverRelayConfig {
  fn default() -> Self {
    Self {
      relay_url: "https://solver-relay-v2.chaindefuser.com/rpc".to_string(),
      timeout: Duration::from_secs(5),
      max_per_second: NonZeroU32::new(20).unwrap_or(NonZeroU32::MIN),
      api_key: None,
    }
  }
}

/// Rate-limited HTTP client for the solver relay.
pub struct SolverRelayClient {
  http: Client,
  config: SolverRelayConfig,
  limiter: DefaultDirectRateLimiter,
  next_id: AtomicU64,
}

impl SolverRelayClient {
  /// Create a new relay client.
  pub fn new(config: SolverRelayConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    let limiter = RateLimiter::direct(Quota::per_second(config.max_per_second));

    Ok(Self {
      http,
      config,
      limiter,
      next_id: AtomicU64::new(1),
    })
  }

  /// Call `quote` and return the solver offers (empty when none).
  ///
  /// # Errors
  /// Transport failures, non-success HTTP status, malformed bodies and
  /// JSON-RPC error objects.
  pub async fn quote(&self, params: QuoteParams) -> Result<Vec<SolverQuote>> {
    self.limiter.until_ready().await;

    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let body = JsonRpcRequest::new(id, "quote", params);

    let mut request = self.http.post(&self.config.relay_url).json(&body);
    if let Some(key) = &self.config.api_key {
      request = request.bearer_auth(key);
    }

    let response = request.send().await.context("Quote request failed")?;
    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      anyhow::bail!("Relay error {status}: {text}");
    }

    let parsed: JsonRpcResponse<Vec<SolverQuote>> = response
      .json()
      .await
      .context("Failed to decode relay response")?;

    if let Some(err) = parsed.error {
      anyhow::bail!("Relay JSON-RPC error {}: {}", err.code, err.message);
    }

    let quotes = parsed.result.unwrap_or_default();
    debug!(id, quotes = quotes.len(), "Quote response");
    Ok(quotes)
  }
}
