//! Solver Relay Request/Response Types
//!
//! JSON-RPC 2.0 envelope and the `quote` method payloads. Amounts
//! travel as base-10 strings.

use serde::{Deserialize, Serialize};

/// Parameters of a `quote` call: exact input, bounded wait.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteParams {
  pub asset_in: String,
  pub asset_out: String,
  /// Exact input amount in base units.
  pub exact_amount_in: String,
  /// How long the relay collects solver responses (ms).
  pub wait_ms: u64,
}

/// JSON-RPC request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<P> {
  pub jsonrpc: &'static str,
  pub id: u64,
  pub method: &'static str,
  pub params: Vec<P>,
}

impl<P> JsonRpcRequest<P> {
  pub fn new(id: u64, method: &'static str, params: P) -> Self {
    Self {
      jsonrpc: "2.0",
      id,
      method,
      params: vec![params],
    }
  }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
  pub code: i64,
  pub message: String,
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<R> {
  #[serde(default)]
  pub result: Option<R>,
  #[serde(default)]
  pub error: Option<JsonRpcError>,
}

/// One solver's offer for the requested input.
#[derive(Debug, Clone, Deserialize)]
pub struct SolverQuote {
  #[serde(default)]
  pub quote_hash: Option<String>,
  /// Output amount in base units.
  pub amount_out: String,
  #[serde(default)]
  pub expiration_time: Option<String>,
}
