//! Solver Liquidity Prober - Entry Point
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Open the liquidity store (file or memory backend)
//! 4. Create the rate-limited solver relay client and quote probe
//! 5. Create the Prometheus registry and the probe scheduler
//! 6. Seed unseeded pairs (optional)
//! 7. Spawn API server, metrics server, config watcher, interval sweeps
//! 8. Wait for SIGINT, then broadcast shutdown and drain tasks

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

use solver_liquidity_prober::adapters::http::{ApiServer, ApiState, TriggerAuth};
use solver_liquidity_prober::adapters::metrics::MetricsRegistry;
use solver_liquidity_prober::adapters::persistence::{FileLiquidityStore, MemoryLiquidityStore};
use solver_liquidity_prober::adapters::solver::{
    SolverQuoteProbe, SolverRelayClient, SolverRelayConfig,
};
use solver_liquidity_prober::config::hot_reload::ConfigWatcher;
use solver_liquidity_prober::config::{self, AppConfig, StoreBackend};
use solver_liquidity_prober::domain::PairRegistry;
use solver_liquidity_prober::ports::LiquidityStore;
use solver_liquidity_prober::usecases::{LiquidityProbeScheduler, SchedulerSettings};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config = config::loader::load_config(CONFIG_PATH).context("Failed to load configuration")?;

    // ── 2. Structured JSON logging ──────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level)),
        )
        .json()
        .init();

    let pairs = PairRegistry::from_catalog(&config.tokens).len();
    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        catalog_entries = config.tokens.len(),
        pairs,
        backend = ?config.store.backend,
        "Starting solver liquidity prober"
    );
    if pairs == 0 {
        warn!("Token catalog yields no probeable pairs; sweeps will be rejected");
    }

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 3. Liquidity store ──────────────────────────────────
    let store: Arc<dyn LiquidityStore> = match config.store.backend {
        StoreBackend::File => Arc::new(
            FileLiquidityStore::open(&config.store.data_dir)
                .await
                .context("Failed to open liquidity store")?,
        ),
        StoreBackend::Memory => {
            warn!("Memory store selected; liquidity state is lost on restart");
            Arc::new(MemoryLiquidityStore::new())
        }
    };

    // ── 4. Solver relay client + probe ──────────────────────
    let api_key = config
        .solver
        .api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .filter(|key| !key.is_empty());
    let relay_config = SolverRelayConfig {
        relay_url: config.solver.relay_url.clone(),
        timeout: Duration::from_millis(config.solver.request_timeout_ms),
        max_per_second: NonZeroU32::new(config.solver.max_quotes_per_second)
            .context("max_quotes_per_second must be > 0")?,
        api_key,
    };
    let client = Arc::new(SolverRelayClient::new(relay_config).context("Failed to create relay client")?);
    let probe = Arc::new(SolverQuoteProbe::new(client, config.solver.wait_ms));

    // ── 5. Metrics + scheduler ──────────────────────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let scheduler = Arc::new(LiquidityProbeScheduler::new(
        store,
        probe,
        Arc::clone(&metrics),
        SchedulerSettings::from_config(&config.scheduler),
    ));

    let auth = Arc::new(
        TriggerAuth::from_env(&config.api.trigger_secret_env)
            .context("Failed to load trigger secret from env")?,
    );

    // ── 6. Seed unseeded pairs ──────────────────────────────
    if config.scheduler.seed_on_startup {
        let registry = PairRegistry::from_catalog(&config.tokens);
        if let Err(e) = scheduler.seed_missing(&registry).await {
            error!(error = %e, "Startup seeding failed; continuing with existing state");
        }
    }

    // ── 7. Spawn tasks ──────────────────────────────────────
    let (mut watcher, config_rx) = ConfigWatcher::new(CONFIG_PATH, config.clone());
    let accepting = Arc::new(AtomicBool::new(true));

    let api_state = ApiState {
        scheduler: Arc::clone(&scheduler),
        config_rx: config_rx.clone(),
        auth,
        accepting: Arc::clone(&accepting),
    };
    let api_server = ApiServer::new(api_state, config.service.bind_address.clone());
    let api_shutdown = shutdown_tx.subscribe();
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api_server.run(api_shutdown).await {
            error!(error = %e, "API server failed");
        }
    });

    let metrics_handle = config.metrics.enabled.then(|| {
        let bind = config.metrics.bind_address.clone();
        let metrics_shutdown = shutdown_tx.subscribe();
        let metrics = Arc::clone(&metrics);
        tokio::spawn(async move {
            if let Err(e) = metrics.serve(bind, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        })
    });

    let watcher_shutdown = shutdown_tx.subscribe();
    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watcher.run(watcher_shutdown).await {
            error!(error = %e, "Config watcher failed");
        }
    });

    let interval_handle = config.scheduler.interval_seconds.map(|secs| {
        let scheduler = Arc::clone(&scheduler);
        let config_rx = config_rx.clone();
        let interval_shutdown = shutdown_tx.subscribe();
        tokio::spawn(run_interval(
            scheduler,
            config_rx,
            Duration::from_secs(secs),
            interval_shutdown,
        ))
    });

    info!(bind = %config.service.bind_address, "All tasks spawned, prober is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("SIGINT received, initiating graceful shutdown");

    accepting.store(false, Ordering::Relaxed);
    let _ = shutdown_tx.send(());

    // A sweep in flight gets its own deadline to finish writing back.
    if let Some(handle) = interval_handle {
        let _ = tokio::time::timeout(Duration::from_secs(30), handle).await;
    }
    let _ = tokio::time::timeout(Duration::from_secs(30), api_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), watcher_handle).await;
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}

/// Run sweeps on a fixed interval until shutdown.
///
/// The registry is rebuilt from the latest published config on every
/// tick. Missed ticks are skipped rather than bunched up.
async fn run_interval(
    scheduler: Arc<LiquidityProbeScheduler>,
    config_rx: watch::Receiver<AppConfig>,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    info!(period_secs = period.as_secs(), "Interval sweeps enabled");

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                info!("Interval sweeper shutting down");
                return;
            }
            _ = ticker.tick() => {
                let registry = PairRegistry::from_catalog(&config_rx.borrow().tokens);
                // Failures are logged and counted by the scheduler.
                let _ = scheduler.run_sweep(&registry).await;
            }
        }
    }
}
