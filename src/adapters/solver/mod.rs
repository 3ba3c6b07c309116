//! Solver Relay Adapter
//!
//! Implements the `QuoteProbe` port against the solver relay's
//! JSON-RPC `quote` method.
//!
//! Sub-modules:
//! - `client`: HTTP client with client-side rate limiting
//! - `probe`: `QuoteProbe` implementation
//! - `types`: JSON-RPC request/response definitions

pub mod client;
pub mod probe;
pub mod types;

pub use client::{SolverRelayClient, SolverRelayConfig};
pub use probe::SolverQuoteProbe;
