//! Prometheus Metrics Registry - Probe Observability
//!
//! Registers and exposes Prometheus metrics on `/metrics`. Covers
//! probe outcomes and latency, store failures, sweep results and the
//! size of the tracked pair set.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Centralized Prometheus metrics for the prober.
///
/// All metrics follow the naming convention `liquidity_probe_*`.
pub struct MetricsRegistry {
    registry: Registry,
    /// Probe results by outcome (`passed`, `failed`, `error`, `timeout`).
    pub probes: IntCounterVec,
    /// Probe round-trip latency in milliseconds.
    pub probe_latency_ms: Histogram,
    /// Store failures by operation (`upsert`, `delete`, `load`, `seed`).
    pub store_errors: IntCounterVec,
    /// Sweeps by terminal status.
    pub sweeps: IntCounterVec,
    /// Wall-clock sweep duration in seconds.
    pub sweep_duration_seconds: Histogram,
    /// Pairs in the registry at the last sweep.
    pub pairs_tracked: IntGauge,
    /// States deleted by reconciliation.
    pub pairs_removed: IntCounter,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let probes = IntCounterVec::new(
            Opts::new("liquidity_probe_probes_total", "Probe results by outcome"),
            &["outcome"],
        )?;

        let probe_latency_ms = Histogram::with_opts(
            HistogramOpts::new(
                "liquidity_probe_probe_latency_ms",
                "Quote probe latency in milliseconds",
            )
            .buckets(vec![50.0, 250.0, 1000.0, 2000.0, 3000.0, 4000.0, 6000.0]),
        )?;

        let store_errors = IntCounterVec::new(
            Opts::new(
                "liquidity_probe_store_errors_total",
                "Liquidity store failures by operation",
            ),
            &["op"],
        )?;

        let sweeps = IntCounterVec::new(
            Opts::new("liquidity_probe_sweeps_total", "Sweeps by status"),
            &["status"],
        )?;

        let sweep_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "liquidity_probe_sweep_duration_seconds",
                "Sweep wall-clock duration in seconds",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;

        let pairs_tracked = IntGauge::new(
            "liquidity_probe_pairs_tracked",
            "Pairs in the registry at the last sweep",
        )?;

        let pairs_removed = IntCounter::new(
            "liquidity_probe_pairs_removed_total",
            "Pair states deleted by reconciliation",
        )?;

        registry.register(Box::new(probes.clone()))?;
        registry.register(Box::new(probe_latency_ms.clone()))?;
        registry.register(Box::new(store_errors.clone()))?;
        registry.register(Box::new(sweeps.clone()))?;
        registry.register(Box::new(sweep_duration_seconds.clone()))?;
        registry.register(Box::new(pairs_tracked.clone()))?;
        registry.register(Box::new(pairs_removed.clone()))?;

        Ok(Self {
            registry,
            probes,
            probe_latency_ms,
            store_errors,
            sweeps,
            sweep_duration_seconds,
            pairs_tracked,
            pairs_removed,
        })
    }

    /// Text exposition of all registered metrics.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
