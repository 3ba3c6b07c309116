//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `LiquidityStore`: Durable per-pair probe state
//! - `QuoteProbe`: Fill-quote requests against the solver network

pub mod liquidity_store;
pub mod quote_probe;

pub use liquidity_store::{LiquidityRow, LiquidityStore};
pub use quote_probe::QuoteProbe;
