//! Integration Tests - Sweep Orchestration
//!
//! Tests the probe scheduler against mock and in-memory adapters.
//! Uses mockall for trait mocking and tokio::test for async tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;
use mockall::mock;
use mockall::predicate::*;

use solver_liquidity_prober::adapters::metrics::MetricsRegistry;
use solver_liquidity_prober::adapters::persistence::MemoryLiquidityStore;
use solver_liquidity_prober::domain::{
    Amount, CatalogEntry, CatalogToken, CheckStatus, LiquidityState, OrderedPair, PairKey,
    PairRegistry,
};
use solver_liquidity_prober::ports::{LiquidityRow, LiquidityStore, QuoteProbe};
use solver_liquidity_prober::usecases::{
    LiquidityProbeScheduler, Pacing, SchedulerSettings, SweepError,
};

// ---- Mock Definitions ----

mock! {
    pub Probe {}

    #[async_trait::async_trait]
    impl QuoteProbe for Probe {
        async fn probe(&self, pair: &OrderedPair, amount: Amount) -> anyhow::Result<bool>;
    }
}

mock! {
    pub Store {}

    #[async_trait::async_trait]
    impl LiquidityStore for Store {
        async fn load_all(&self) -> anyhow::Result<HashMap<PairKey, LiquidityState>>;
        async fn seed(&self, pairs: &[OrderedPair]) -> anyhow::Result<usize>;
        async fn upsert(&self, key: &PairKey, state: &LiquidityState) -> anyhow::Result<()>;
        async fn delete(&self, key: &PairKey) -> anyhow::Result<()>;
        async fn rows(&self) -> anyhow::Result<Vec<LiquidityRow>>;
        async fn is_healthy(&self) -> bool;
    }
}

/// Probe that answers only after `delay`.
struct SlowProbe {
    delay: Duration,
}

#[async_trait]
impl QuoteProbe for SlowProbe {
    async fn probe(&self, _pair: &OrderedPair, _amount: Amount) -> anyhow::Result<bool> {
        tokio::time::sleep(self.delay).await;
        Ok(true)
    }
}

// ---- Helpers ----

/// One unified asset with the given variants (all 6 decimals).
fn registry(variants: &[&str]) -> PairRegistry {
    let grouped = variants.iter().map(|id| CatalogToken::new(*id, 6)).collect();
    PairRegistry::from_catalog(&[CatalogEntry::Unified {
        unified_asset_id: "usdc".to_string(),
        symbol: Some("USDC".to_string()),
        grouped,
    }])
}

fn settings() -> SchedulerSettings {
    SchedulerSettings {
        pacing: Pacing::none(),
        probe_timeout: Duration::from_secs(2),
        sweep_deadline: None,
        allow_overlapping_sweeps: false,
        log_pair_failures: true,
    }
}

fn scheduler(
    store: Arc<dyn LiquidityStore>,
    probe: Arc<dyn QuoteProbe>,
    settings: SchedulerSettings,
) -> LiquidityProbeScheduler {
    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    LiquidityProbeScheduler::new(store, probe, metrics, settings)
}

fn state(amount: u64, step: Option<u64>, check: CheckStatus) -> LiquidityState {
    LiquidityState {
        amount: U256::from(amount),
        validated_amount: U256::from(amount),
        last_step_size: step.map(U256::from),
        last_check: check,
    }
}

async fn seeded_store(registry: &PairRegistry) -> Arc<MemoryLiquidityStore> {
    let store = Arc::new(MemoryLiquidityStore::new());
    store.seed(registry.pairs()).await.unwrap();
    store
}

// ---- Sweep ----

#[tokio::test]
async fn test_sweep_advances_every_seeded_pair() {
    let registry = registry(&["near:usdc", "eth:usdc", "base:usdc"]);
    let store = seeded_store(&registry).await;

    let mut probe = MockProbe::new();
    probe
        .expect_probe()
        .times(6)
        .returning(|_, amount| Ok(amount == U256::from(1_000_000u64)));

    let scheduler = scheduler(store.clone(), Arc::new(probe), settings());
    let report = scheduler.run_sweep(&registry).await.unwrap();

    assert_eq!(report.pairs_total, 6);
    assert_eq!(report.probed, 6);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.passed, 6);
    assert_eq!(report.failed, 0);
    assert_eq!(report.write_failures, 0);
    assert_eq!(report.removed, 0);

    let states = store.load_all().await.unwrap();
    for pair in registry.pairs() {
        let s = &states[&pair.key()];
        assert_eq!(s.amount, U256::from(1_200_000u64));
        assert_eq!(s.validated_amount, U256::from(1_000_000u64));
        assert_eq!(s.last_step_size, Some(U256::from(400_000u64)));
        assert_eq!(s.last_check, CheckStatus::Passed);
    }
}

#[tokio::test]
async fn test_consecutive_sweeps_converge_on_boundary() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let store = seeded_store(&registry).await;

    let boundary = U256::from(5_000_000u64);
    let mut probe = MockProbe::new();
    probe.expect_probe().returning(move |_, amount| Ok(amount <= boundary));

    let scheduler = scheduler(store.clone(), Arc::new(probe), settings());
    for _ in 0..20 {
        scheduler.run_sweep(&registry).await.unwrap();
    }

    for s in store.load_all().await.unwrap().values() {
        assert!(s.validated_amount <= boundary);
        assert!(s.validated_amount >= U256::from(4_000_000u64));
    }
}

#[tokio::test]
async fn test_unseeded_pairs_are_skipped() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let pair = registry.pairs()[0].clone();

    let store = Arc::new(MemoryLiquidityStore::new());
    store.seed(std::slice::from_ref(&pair)).await.unwrap();

    let mut probe = MockProbe::new();
    let expected = pair.clone();
    probe
        .expect_probe()
        .withf(move |p, _| *p == expected)
        .times(1)
        .returning(|_, _| Ok(false));

    let scheduler = scheduler(store.clone(), Arc::new(probe), settings());
    let report = scheduler.run_sweep(&registry).await.unwrap();

    assert_eq!(report.probed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(store.load_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_probe_error_fails_closed() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let store = seeded_store(&registry).await;

    let mut probe = MockProbe::new();
    probe
        .expect_probe()
        .returning(|_, _| Err(anyhow::anyhow!("relay unavailable")));

    let scheduler = scheduler(store.clone(), Arc::new(probe), settings());
    let report = scheduler.run_sweep(&registry).await.unwrap();

    assert_eq!(report.failed, 2);
    assert_eq!(report.passed, 0);
    for s in store.load_all().await.unwrap().values() {
        assert_eq!(s.last_check, CheckStatus::Failed);
        // default step 10^6 / 5
        assert_eq!(s.amount, U256::from(800_000u64));
    }
}

#[tokio::test]
async fn test_probe_timeout_fails_closed() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let store = seeded_store(&registry).await;

    let probe = SlowProbe {
        delay: Duration::from_secs(10),
    };
    let settings = SchedulerSettings {
        probe_timeout: Duration::from_millis(50),
        ..settings()
    };

    let scheduler = scheduler(store.clone(), Arc::new(probe), settings);
    let report = scheduler.run_sweep(&registry).await.unwrap();

    assert_eq!(report.failed, 2);
    assert_eq!(report.abandoned, 0);
    for s in store.load_all().await.unwrap().values() {
        assert_eq!(s.last_check, CheckStatus::Failed);
    }
}

// ---- Reconciliation ----

#[tokio::test]
async fn test_reconciliation_deletes_only_stale_keys() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let stale = PairKey::new("near:usdc", "arb:usdc");

    let mut states: HashMap<PairKey, LiquidityState> = registry
        .pairs()
        .iter()
        .map(|p| (p.key(), state(1_000, Some(200), CheckStatus::Passed)))
        .collect();
    states.insert(stale.clone(), state(1_000, None, CheckStatus::Unknown));

    let mut store = MockStore::new();
    store.expect_load_all().times(1).returning(move || Ok(states.clone()));
    store.expect_upsert().times(2).returning(|_, _| Ok(()));
    store
        .expect_delete()
        .with(eq(stale.clone()))
        .times(1)
        .returning(|_| Ok(()));

    let mut probe = MockProbe::new();
    probe.expect_probe().returning(|_, _| Ok(true));

    let scheduler = scheduler(Arc::new(store), Arc::new(probe), settings());
    let report = scheduler.run_sweep(&registry).await.unwrap();

    assert_eq!(report.removed, 1);
    assert_eq!(report.delete_failures, 0);
    assert_eq!(report.probed, 2);
}

#[tokio::test]
async fn test_reconciliation_leaves_live_state_untouched() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let store = Arc::new(MemoryLiquidityStore::new());
    store.seed(registry.pairs()).await.unwrap();

    let stale = PairKey::new("near:usdc", "sol:usdc");
    store
        .upsert(&stale, &state(42, None, CheckStatus::Unknown))
        .await
        .unwrap();

    let before = store.load_all().await.unwrap();
    let scheduler = scheduler(store.clone(), Arc::new(MockProbe::new()), settings());
    let outcome = scheduler.reconcile(&before, &registry).await;

    assert_eq!(outcome.removed, 1);
    let after = store.load_all().await.unwrap();
    assert!(!after.contains_key(&stale));
    for pair in registry.pairs() {
        assert_eq!(after[&pair.key()], before[&pair.key()]);
    }
}

#[tokio::test]
async fn test_delete_failure_does_not_abort_sweep() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let stale = PairKey::new("gone:usdc", "near:usdc");

    let mut states: HashMap<PairKey, LiquidityState> = registry
        .pairs()
        .iter()
        .map(|p| (p.key(), state(1_000, None, CheckStatus::Unknown)))
        .collect();
    states.insert(stale, state(1_000, None, CheckStatus::Unknown));

    let mut store = MockStore::new();
    store.expect_load_all().returning(move || Ok(states.clone()));
    store.expect_upsert().returning(|_, _| Ok(()));
    store
        .expect_delete()
        .returning(|_| Err(anyhow::anyhow!("disk full")));

    let mut probe = MockProbe::new();
    probe.expect_probe().returning(|_, _| Ok(true));

    let scheduler = scheduler(Arc::new(store), Arc::new(probe), settings());
    let report = scheduler.run_sweep(&registry).await.unwrap();

    assert_eq!(report.removed, 0);
    assert_eq!(report.delete_failures, 1);
    assert_eq!(report.passed, 2);
}

// ---- Write-back failures ----

#[tokio::test]
async fn test_upsert_failures_are_counted_not_fatal() {
    let registry = registry(&["near:usdc", "eth:usdc", "base:usdc"]);
    let states: HashMap<PairKey, LiquidityState> = registry
        .pairs()
        .iter()
        .map(|p| (p.key(), LiquidityState::seed_for(p)))
        .collect();

    let mut store = MockStore::new();
    store.expect_load_all().returning(move || Ok(states.clone()));
    store
        .expect_upsert()
        .times(6)
        .returning(|_, _| Err(anyhow::anyhow!("write rejected")));

    let mut probe = MockProbe::new();
    probe.expect_probe().returning(|_, _| Ok(true));

    let scheduler = scheduler(Arc::new(store), Arc::new(probe), settings());
    let report = scheduler.run_sweep(&registry).await.unwrap();

    assert_eq!(report.probed, 6);
    assert_eq!(report.passed, 6);
    assert_eq!(report.write_failures, 6);
}

// ---- Fatal preconditions ----

#[tokio::test]
async fn test_empty_registry_is_rejected() {
    let registry = registry(&["near:usdc"]);
    assert!(registry.is_empty());

    let mut store = MockStore::new();
    store.expect_load_all().never();

    let scheduler = scheduler(Arc::new(store), Arc::new(MockProbe::new()), settings());
    let err = scheduler.run_sweep(&registry).await.unwrap_err();
    assert!(matches!(err, SweepError::EmptyPairUniverse));
}

#[tokio::test]
async fn test_empty_state_is_rejected() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let store = Arc::new(MemoryLiquidityStore::new());

    let mut probe = MockProbe::new();
    probe.expect_probe().never();

    let scheduler = scheduler(store, Arc::new(probe), settings());
    let err = scheduler.run_sweep(&registry).await.unwrap_err();
    assert!(matches!(err, SweepError::NoState));
}

#[tokio::test]
async fn test_load_failure_aborts_before_probing() {
    let registry = registry(&["near:usdc", "eth:usdc"]);

    let mut store = MockStore::new();
    store
        .expect_load_all()
        .returning(|| Err(anyhow::anyhow!("connection refused")));
    store.expect_delete().never();

    let mut probe = MockProbe::new();
    probe.expect_probe().never();

    let scheduler = scheduler(Arc::new(store), Arc::new(probe), settings());
    let err = scheduler.run_sweep(&registry).await.unwrap_err();
    assert!(matches!(err, SweepError::StoreLoad(_)));
}

// ---- Overlap and deadline ----

#[tokio::test]
async fn test_overlapping_sweep_is_rejected() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let store = seeded_store(&registry).await;
    let probe = SlowProbe {
        delay: Duration::from_millis(300),
    };

    let scheduler = Arc::new(scheduler(store, Arc::new(probe), settings()));

    let first = {
        let scheduler = Arc::clone(&scheduler);
        let registry = registry.clone();
        tokio::spawn(async move { scheduler.run_sweep(&registry).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = scheduler.run_sweep(&registry).await;
    assert!(matches!(second, Err(SweepError::SweepInProgress)));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.passed, 2);

    // Lock is released once the first sweep returns.
    assert!(scheduler.run_sweep(&registry).await.is_ok());
}

#[tokio::test]
async fn test_overlap_allowed_when_configured() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let store = seeded_store(&registry).await;
    let probe = SlowProbe {
        delay: Duration::from_millis(200),
    };
    let settings = SchedulerSettings {
        allow_overlapping_sweeps: true,
        ..settings()
    };

    let scheduler = Arc::new(scheduler(store, Arc::new(probe), settings));
    let (a, b) = tokio::join!(scheduler.run_sweep(&registry), scheduler.run_sweep(&registry));
    assert!(a.is_ok());
    assert!(b.is_ok());
}

#[tokio::test]
async fn test_deadline_abandons_inflight_probes() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let store = seeded_store(&registry).await;
    let before = store.load_all().await.unwrap();

    let probe = SlowProbe {
        delay: Duration::from_secs(10),
    };
    let settings = SchedulerSettings {
        probe_timeout: Duration::from_secs(30),
        sweep_deadline: Some(Duration::from_millis(100)),
        ..settings()
    };

    let scheduler = scheduler(store.clone(), Arc::new(probe), settings);
    let report = scheduler.run_sweep(&registry).await.unwrap();

    assert_eq!(report.probed, 2);
    assert_eq!(report.abandoned, 2);
    assert_eq!(report.passed + report.failed, 0);
    assert_eq!(store.load_all().await.unwrap(), before);
}

// ---- Seeding ----

#[tokio::test]
async fn test_seed_missing_counts_store_inserts() {
    let registry = registry(&["near:usdc", "eth:usdc"]);

    let mut store = MockStore::new();
    store
        .expect_seed()
        .withf(|pairs| pairs.len() == 2)
        .times(1)
        .returning(|pairs| Ok(pairs.len()));

    let scheduler = scheduler(Arc::new(store), Arc::new(MockProbe::new()), settings());
    assert_eq!(scheduler.seed_missing(&registry).await.unwrap(), 2);
}

// ---- Pacing ----

/// Records when each call starts, then answers after `delay`.
struct TimedQuotes {
    origin: tokio::time::Instant,
    delay: Duration,
    starts: std::sync::Mutex<Vec<Duration>>,
}

#[async_trait]
impl QuoteProbe for TimedQuotes {
    async fn probe(&self, _pair: &OrderedPair, _amount: Amount) -> anyhow::Result<bool> {
        self.starts.lock().unwrap().push(self.origin.elapsed());
        tokio::time::sleep(self.delay).await;
        Ok(true)
    }
}

#[tokio::test(start_paused = true)]
async fn test_launches_are_jittered_and_never_wait_for_settlement() {
    let registry = registry(&["near:usdc", "eth:usdc", "base:usdc"]);
    let unseeded = registry.pairs()[2].clone();
    let seeded: Vec<OrderedPair> = registry
        .pairs()
        .iter()
        .filter(|p| **p != unseeded)
        .cloned()
        .collect();

    let store = Arc::new(MemoryLiquidityStore::new());
    store.seed(&seeded).await.unwrap();

    let origin = tokio::time::Instant::now();
    let quotes = Arc::new(TimedQuotes {
        origin,
        delay: Duration::from_secs(1),
        starts: std::sync::Mutex::new(Vec::new()),
    });
    let settings = SchedulerSettings {
        pacing: Pacing::new(50, 100),
        ..settings()
    };

    let scheduler = scheduler(store, quotes.clone(), settings);
    let report = scheduler.run_sweep(&registry).await.unwrap();
    let elapsed = origin.elapsed();

    assert_eq!(report.probed, 5);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.passed, 5);

    let starts = quotes.starts.lock().unwrap().clone();
    assert_eq!(starts.len(), 5);
    assert_eq!(starts[0], Duration::ZERO);
    // One draw per gap, including across the skipped pair.
    for gap in starts.windows(2).map(|w| w[1] - w[0]) {
        assert!(
            gap >= Duration::from_millis(50) && gap <= Duration::from_millis(100),
            "gap {gap:?} outside jitter window"
        );
    }

    // Last launch by 400ms, then one call duration; serial would take 5s.
    assert!(elapsed <= Duration::from_millis(1_400), "sweep took {elapsed:?}");
}

#[tokio::test]
async fn test_deadline_keeps_settled_results() {
    let registry = registry(&["near:usdc", "eth:usdc"]);
    let store = seeded_store(&registry).await;
    let fast = registry.pairs()[0].clone();

    let quotes = DelayByPair {
        fast: fast.clone(),
        slow_delay: Duration::from_secs(10),
    };
    let settings = SchedulerSettings {
        probe_timeout: Duration::from_secs(30),
        sweep_deadline: Some(Duration::from_millis(200)),
        ..settings()
    };

    let scheduler = scheduler(store.clone(), Arc::new(quotes), settings);
    let report = scheduler.run_sweep(&registry).await.unwrap();

    assert_eq!(report.probed, 2);
    assert_eq!(report.passed, 1);
    assert_eq!(report.abandoned, 1);
    assert_eq!(report.passed + report.failed + report.abandoned, report.probed);

    let states = store.load_all().await.unwrap();
    assert_eq!(states[&fast.key()].last_check, CheckStatus::Passed);
}

/// Answers immediately for `fast`, after `slow_delay` for anything else.
struct DelayByPair {
    fast: OrderedPair,
    slow_delay: Duration,
}

#[async_trait]
impl QuoteProbe for DelayByPair {
    async fn probe(&self, pair: &OrderedPair, _amount: Amount) -> anyhow::Result<bool> {
        if *pair != self.fast {
            tokio::time::sleep(self.slow_delay).await;
        }
        Ok(true)
    }
}
