//! Adaptive Search Benchmarks - Per-Pair Sweep Cost
//!
//! Benchmarks the state transition, registry derivation and a full
//! in-memory sweep with an instant probe.
//!
//! Run with: cargo bench --bench search_bench

use std::sync::Arc;

use alloy::primitives::U256;
use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use solver_liquidity_prober::adapters::metrics::MetricsRegistry;
use solver_liquidity_prober::adapters::persistence::MemoryLiquidityStore;
use solver_liquidity_prober::domain::{
    AdaptiveSearch, Amount, CatalogEntry, CatalogToken, CheckStatus, LiquidityState, OrderedPair,
    PairRegistry,
};
use solver_liquidity_prober::ports::{LiquidityStore, QuoteProbe};
use solver_liquidity_prober::usecases::{LiquidityProbeScheduler, Pacing, SchedulerSettings};

struct InstantProbe;

#[async_trait]
impl QuoteProbe for InstantProbe {
    async fn probe(&self, _pair: &OrderedPair, amount: Amount) -> anyhow::Result<bool> {
        Ok(amount < U256::from(10u64).pow(U256::from(20u64)))
    }
}

/// 20 unified assets with 5 variants each (400 ordered pairs).
fn catalog() -> Vec<CatalogEntry> {
    (0..20)
        .map(|a| CatalogEntry::Unified {
            unified_asset_id: format!("asset{a}"),
            symbol: None,
            grouped: (0..5)
                .map(|c| CatalogToken::new(format!("chain{c}:asset{a}"), 18))
                .collect(),
        })
        .collect()
}

/// Benchmark one success and one failure transition on 24-decimal amounts.
fn bench_next_state(c: &mut Criterion) {
    let state = LiquidityState {
        amount: U256::from(10u64).pow(U256::from(24u64)),
        validated_amount: U256::from(10u64).pow(U256::from(23u64)),
        last_step_size: Some(U256::from(10u64).pow(U256::from(22u64))),
        last_check: CheckStatus::Passed,
    };

    c.bench_function("next_state_pass", |b| {
        b.iter(|| AdaptiveSearch::next_state(black_box(&state), black_box(true)));
    });
    c.bench_function("next_state_fail", |b| {
        b.iter(|| AdaptiveSearch::next_state(black_box(&state), black_box(false)));
    });
}

/// Benchmark deriving the pair universe from the catalog.
fn bench_registry(c: &mut Criterion) {
    let catalog = catalog();

    c.bench_function("registry_from_catalog_400_pairs", |b| {
        b.iter(|| PairRegistry::from_catalog(black_box(&catalog)));
    });
}

/// Benchmark a full sweep over 400 pairs with no pacing.
fn bench_sweep(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let registry = PairRegistry::from_catalog(&catalog());

    let store = Arc::new(MemoryLiquidityStore::new());
    rt.block_on(store.seed(registry.pairs())).unwrap();

    let settings = SchedulerSettings {
        pacing: Pacing::none(),
        ..SchedulerSettings::default()
    };
    let scheduler = LiquidityProbeScheduler::new(
        store,
        Arc::new(InstantProbe),
        Arc::new(MetricsRegistry::new().unwrap()),
        settings,
    );

    c.bench_function("sweep_400_pairs_in_memory", |b| {
        b.to_async(&rt)
            .iter(|| async { scheduler.run_sweep(&registry).await.unwrap() });
    });
}

criterion_group!(benches, bench_next_state, bench_registry, bench_sweep);
criterion_main!(benches);
