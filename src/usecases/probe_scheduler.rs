//! Liquidity Probe Scheduler - One Sweep Over All Tracked Pairs
//!
//! A sweep:
//! 1. Checks the pair universe and loads every persisted state (fatal on failure)
//! 2. Launches one probe per pair that has state, spaced by jittered delays
//! 3. Feeds each settled probe through the adaptive search and writes it back
//! 4. Deletes state for pairs that left the registry
//! 5. Collects outcomes, abandoning stragglers past the optional deadline
//!
//! Probes are fire-and-continue: each runs in its own task racing its own
//! timeout, and a slow probe never delays the others. Per-pair failures
//! never abort the sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn, Instrument, Span};
use uuid::Uuid;

use super::pacing::Pacing;
use crate::adapters::metrics::MetricsRegistry;
use crate::config::SchedulerConfig;
use crate::domain::{AdaptiveSearch, LiquidityState, OrderedPair, PairKey, PairRegistry};
use crate::ports::{LiquidityStore, QuoteProbe};

/// Reasons a sweep stops before probing anything.
#[derive(Debug, Error)]
pub enum SweepError {
  #[error("a liquidity sweep is already running")]
  SweepInProgress,
  #[error("pair universe is empty")]
  EmptyPairUniverse,
  #[error("no liquidity state has been seeded")]
  NoState,
  #[error("failed to load liquidity state: {0:#}")]
  StoreLoad(#[source] anyhow::Error),
}

impl SweepError {
  /// Metric label.
  pub const fn status(&self) -> &'static str {
    match self {
      Self::SweepInProgress => "in_progress",
      Self::EmptyPairUniverse => "empty_registry",
      Self::NoState => "no_state",
      Self::StoreLoad(_) => "store_load",
    }
  }
}

/// Sweep behaviour knobs.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
  pub pacing: Pacing,
  pub probe_timeout: Duration,
  pub sweep_deadline: Option<Duration>,
  pub allow_overlapping_sweeps: bool,
  pub log_pair_failures: bool,
}

impl SchedulerSettings {
  pub fn from_config(config: &SchedulerConfig) -> Self {
    Self {
      pacing: Pacing::from_config(config),
      probe_timeout: config.probe_timeout(),
      sweep_deadline: config.sweep_deadline(),
      allow_overlapping_sweeps: config.allow_overlapping_sweeps,
      log_pair_failures: config.log_pair_failures,
    }
  }
}

impl Default for SchedulerSettings {
  fn default() -> Self {
    Self::from_config(&SchedulerConfig::default())
  }
}

/// Summary of one sweep, returned by the trigger endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
  pub sweep_id: Uuid,
  pub started_at: DateTime<Utc>,
  pub duration_ms: u64,
  /// Pairs in the registry.
  pub pairs_total: usize,
  /// Probes launched.
  pub probed: usize,
  /// Registry pairs without state.
  pub skipped: usize,
  pub passed: usize,
  /// Includes probe errors and timeouts.
  pub failed: usize,
  pub write_failures: usize,
  /// States deleted by reconciliation.
  pub removed: usize,
  pub delete_failures: usize,
  /// Probes still in flight at the sweep deadline.
  pub abandoned: usize,
}

impl SweepReport {
  fn new(sweep_id: Uuid, pairs_total: usize) -> Self {
    Self {
      sweep_id,
      started_at: Utc::now(),
      duration_ms: 0,
      pairs_total,
      probed: 0,
      skipped: 0,
      passed: 0,
      failed: 0,
      write_failures: 0,
      removed: 0,
      delete_failures: 0,
      abandoned: 0,
    }
  }

  fn record(&mut self, outcome: &PairOutcome) {
    if outcome.result.has_liquidity() {
      self.passed += 1;
    } else {
      self.failed += 1;
    }
    if !outcome.written {
      self.write_failures += 1;
    }
  }
}

/// Result of deleting state for pairs that left the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reconciliation {
  pub removed: usize,
  pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeResult {
  Passed,
  Failed,
  Error,
  Timeout,
}

impl ProbeResult {
  /// Errors and timeouts fail closed.
  const fn has_liquidity(self) -> bool {
    matches!(self, Self::Passed)
  }

  const fn label(self) -> &'static str {
    match self {
      Self::Passed => "passed",
      Self::Failed => "failed",
      Self::Error => "error",
      Self::Timeout => "timeout",
    }
  }
}

#[derive(Debug)]
struct PairOutcome {
  result: ProbeResult,
  written: bool,
}

/// Everything a detached probe task needs.
#[derive(Clone)]
struct ProbeContext {
  store: Arc<dyn LiquidityStore>,
  probe: Arc<dyn QuoteProbe>,
  metrics: Arc<MetricsRegistry>,
  probe_timeout: Duration,
  log_pair_failures: bool,
}

/// Orchestrates sweeps over the pair universe.
pub struct LiquidityProbeScheduler {
  store: Arc<dyn LiquidityStore>,
  probe: Arc<dyn QuoteProbe>,
  metrics: Arc<MetricsRegistry>,
  settings: SchedulerSettings,
  /// Held for the duration of a sweep unless overlap is allowed.
  sweep_lock: Mutex<()>,
}

impl LiquidityProbeScheduler {
  pub fn new(
    store: Arc<dyn LiquidityStore>,
    probe: Arc<dyn QuoteProbe>,
    metrics: Arc<MetricsRegistry>,
    settings: SchedulerSettings,
  ) -> Self {
    Self {
      store,
      probe,
      metrics,
      settings,
      sweep_lock: Mutex::new(()),
    }
  }

  pub fn store(&self) -> &Arc<dyn LiquidityStore> {
    &self.store
  }

  /// Run one sweep over `registry`.
  ///
  /// # Errors
  /// Only the fatal preconditions in [`SweepError`]; per-pair failures
  /// are counted in the report.
  pub async fn run_sweep(&self, registry: &PairRegistry) -> Result<SweepReport, SweepError> {
    let _guard = if self.settings.allow_overlapping_sweeps {
      None
    } else {
      match self.sweep_lock.try_lock() {
        Ok(guard) => Some(guard),
        Err(_) => {
          warn!("Sweep requested while another is running, rejecting");
          self.metrics.sweeps.with_label_values(&[SweepError::SweepInProgress.status()]).inc();
          return Err(SweepError::SweepInProgress);
        }
      }
    };

    let sweep_id = Uuid::new_v4();
    let started = Instant::now();
    let result = self.sweep(sweep_id, started, registry).await;

    self
      .metrics
      .sweep_duration_seconds
      .observe(started.elapsed().as_secs_f64());
    match &result {
      Ok(_) => self.metrics.sweeps.with_label_values(&["ok"]).inc(),
      Err(e) => {
        error!(%sweep_id, error = %e, "Liquidity sweep aborted");
        self.metrics.sweeps.with_label_values(&[e.status()]).inc();
      }
    }
    result
  }

  #[instrument(skip(self, started, registry), fields(pairs = registry.len()))]
  async fn sweep(
    &self,
    sweep_id: Uuid,
    started: Instant,
    registry: &PairRegistry,
  ) -> Result<SweepReport, SweepError> {
    if registry.is_empty() {
      return Err(SweepError::EmptyPairUniverse);
    }
    self
      .metrics
      .pairs_tracked
      .set(i64::try_from(registry.len()).unwrap_or(i64::MAX));

    let states = self.store.load_all().await.map_err(|e| {
      self.metrics.store_errors.with_label_values(&["load"]).inc();
      SweepError::StoreLoad(e)
    })?;
    if states.is_empty() {
      return Err(SweepError::NoState);
    }

    let mut report = SweepReport::new(sweep_id, registry.len());
    let ctx = ProbeContext {
      store: Arc::clone(&self.store),
      probe: Arc::clone(&self.probe),
      metrics: Arc::clone(&self.metrics),
      probe_timeout: self.settings.probe_timeout,
      log_pair_failures: self.settings.log_pair_failures,
    };

    let mut tasks = JoinSet::new();
    for pair in registry.pairs() {
      let Some(state) = states.get(&pair.key()) else {
        report.skipped += 1;
        continue;
      };
      if report.probed > 0 {
        tokio::time::sleep(self.settings.pacing.next_delay()).await;
      }
      tasks.spawn(probe_pair(ctx.clone(), pair.clone(), state.clone()).instrument(Span::current()));
      report.probed += 1;
    }
    debug!(launched = report.probed, skipped = report.skipped, "All probes launched");

    let reconciliation = self.reconcile(&states, registry).await;
    report.removed = reconciliation.removed;
    report.delete_failures = reconciliation.failed;

    let deadline = self.settings.sweep_deadline.map(|d| started + d);
    collect_outcomes(&mut tasks, deadline, &mut report).await;

    report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
      probed = report.probed,
      passed = report.passed,
      failed = report.failed,
      skipped = report.skipped,
      removed = report.removed,
      write_failures = report.write_failures,
      abandoned = report.abandoned,
      duration_ms = report.duration_ms,
      "Liquidity sweep complete"
    );
    Ok(report)
  }

  /// Delete state whose key is no longer in `registry`.
  ///
  /// Best-effort: failures are logged and retried implicitly by the
  /// next sweep. Keys still in the registry are never touched.
  pub async fn reconcile(
    &self,
    states: &HashMap<PairKey, LiquidityState>,
    registry: &PairRegistry,
  ) -> Reconciliation {
    let live = registry.keys();
    let mut stale: Vec<&PairKey> = states.keys().filter(|key| !live.contains(*key)).collect();
    stale.sort();

    let mut outcome = Reconciliation::default();
    for key in stale {
      match self.store.delete(key).await {
        Ok(()) => {
          outcome.removed += 1;
          self.metrics.pairs_removed.inc();
          info!(pair = %key, "Removed state for pair no longer in registry");
        }
        Err(e) => {
          outcome.failed += 1;
          self.metrics.store_errors.with_label_values(&["delete"]).inc();
          warn!(pair = %key, error = %e, "Failed to delete stale pair state");
        }
      }
    }
    outcome
  }

  /// Insert default state for registry pairs that have none.
  ///
  /// # Errors
  /// Propagates the store failure after counting it.
  #[instrument(skip(self, registry), fields(pairs = registry.len()))]
  pub async fn seed_missing(&self, registry: &PairRegistry) -> anyhow::Result<usize> {
    let inserted = self.store.seed(registry.pairs()).await.inspect_err(|e| {
      self.metrics.store_errors.with_label_values(&["seed"]).inc();
      warn!(error = %e, "Seeding liquidity state failed");
    })?;
    info!(inserted, "Seeded missing pair states");
    Ok(inserted)
  }
}

/// Probe one pair, advance its state and write it back.
async fn probe_pair(ctx: ProbeContext, pair: OrderedPair, state: LiquidityState) -> PairOutcome {
  let key = pair.key();
  let started = Instant::now();

  let result = match tokio::time::timeout(ctx.probe_timeout, ctx.probe.probe(&pair, state.amount)).await
  {
    Ok(Ok(true)) => ProbeResult::Passed,
    Ok(Ok(false)) => ProbeResult::Failed,
    Ok(Err(e)) => {
      if ctx.log_pair_failures {
        warn!(pair = %key, amount = %state.amount, error = %e, "Quote probe errored");
      }
      ProbeResult::Error
    }
    Err(_) => {
      if ctx.log_pair_failures {
        warn!(pair = %key, amount = %state.amount, "Quote probe timed out");
      }
      ProbeResult::Timeout
    }
  };

  ctx
    .metrics
    .probe_latency_ms
    .observe(started.elapsed().as_secs_f64() * 1000.0);
  ctx.metrics.probes.with_label_values(&[result.label()]).inc();

  let next = AdaptiveSearch::next_state(&state, result.has_liquidity());

  let written = match ctx.store.upsert(&key, &next).await {
    Ok(()) => true,
    Err(e) => {
      ctx.metrics.store_errors.with_label_values(&["upsert"]).inc();
      if ctx.log_pair_failures {
        warn!(pair = %key, error = %e, "Failed to write liquidity state");
      }
      false
    }
  };

  debug!(
    pair = %key,
    outcome = result.label(),
    amount = %next.amount,
    validated = %next.validated_amount,
    "Pair probed"
  );

  PairOutcome { result, written }
}

/// Drain settled probes; past `deadline`, abort whatever is left.
async fn collect_outcomes(
  tasks: &mut JoinSet<PairOutcome>,
  deadline: Option<Instant>,
  report: &mut SweepReport,
) {
  loop {
    let joined = match deadline {
      Some(at) => match tokio::time::timeout_at(at, tasks.join_next()).await {
        Ok(joined) => joined,
        Err(_) => {
          // Settled but not yet joined: those already wrote their state.
          while let Some(joined) = tasks.try_join_next() {
            record_joined(joined, report);
          }
          report.abandoned = tasks.len();
          tasks.abort_all();
          warn!(abandoned = report.abandoned, "Sweep deadline reached, abandoning probes");
          return;
        }
      },
      None => tasks.join_next().await,
    };

    match joined {
      None => return,
      Some(joined) => record_joined(joined, report),
    }
  }
}

fn record_joined(joined: Result<PairOutcome, JoinError>, report: &mut SweepReport) {
  match joined {
    Ok(outcome) => report.record(&outcome),
    Err(e) => {
      // Panicked task: nothing was written for that pair.
      warn!(error = %e, "Probe task failed");
      report.failed += 1;
      report.write_failures += 1;
    }
  }
}
