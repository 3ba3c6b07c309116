//! Metrics and Monitoring Adapters
//!
//! Prometheus metrics export for probes and sweeps. Liveness and
//! readiness live with the rest of the HTTP routes in `adapters::http`.

pub mod prometheus;

pub use prometheus::MetricsRegistry;
