//! Solver Quote Probe - `QuoteProbe` over the Relay Client

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{instrument, trace};

use super::client::SolverRelayClient;
use super::types::QuoteParams;
use crate::domain::{Amount, OrderedPair};
use crate::ports::QuoteProbe;

/// Probes liquidity by asking the relay for exact-input quotes.
///
/// The relay wait is kept short (seconds) so that missing liquidity
/// surfaces as an empty quote list rather than blocking the sweep.
pub struct SolverQuoteProbe {
  client: Arc<SolverRelayClient>,
  wait_ms: u64,
}

impl SolverQuoteProbe {
  pub fn new(client: Arc<SolverRelayClient>, wait_ms: u64) -> Self {
    Self { client, wait_ms }
  }
}

#[async_trait]
impl QuoteProbe for SolverQuoteProbe {
  #[instrument(skip(self, pair), fields(pair = %pair.key(), %amount))]
  async fn probe(&self, pair: &OrderedPair, amount: Amount) -> anyhow::Result<bool> {
    let params = QuoteParams {
      asset_in: pair.token_in.asset_id.clone(),
      asset_out: pair.token_out.asset_id.clone(),
      exact_amount_in: amount.to_string(),
      wait_ms: self.wait_ms,
    };

    let quotes = self.client.quote(params).await?;
    trace!(quotes = quotes.len(), "Probe settled");
    Ok(!quotes.is_empty())
  }
}
