//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, file I/O) and exposes the
//! service over HTTP.
//!
//! Adapter categories:
//! - `http`: Trigger, read-side and health endpoints (axum)
//! - `metrics`: Prometheus metrics export
//! - `persistence`: Liquidity table storage
//! - `solver`: Solver relay quote client

pub mod http;
pub mod metrics;
pub mod persistence;
pub mod solver;
