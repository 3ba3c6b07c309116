//! Quote Probe Port - Solver Fill Check Interface
//!
//! A probe asks the solver network whether an exact input amount can
//! be filled right now. It does not retry; the adaptive search is the
//! adjustment mechanism across sweeps.

use async_trait::async_trait;

use crate::domain::{Amount, OrderedPair};

/// Trait for fill-quote providers.
#[async_trait]
pub trait QuoteProbe: Send + Sync + 'static {
  /// Request a quote for exactly `amount` of `pair.token_in`.
  ///
  /// Returns `Ok(true)` if at least one solver can fill it, `Ok(false)`
  /// if none can within the bounded wait.
  ///
  /// # Errors
  /// Transport or solver errors. Callers treat them like `Ok(false)`.
  async fn probe(&self, pair: &OrderedPair, amount: Amount) -> anyhow::Result<bool>;
}
