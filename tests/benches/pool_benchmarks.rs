//! # Collateral Pool Benchmarks
//!
//! | Operation | Complexity | Target |
//! |-----------|------------|--------|
//! | Enter | O(log n) timelocks | < 10µs |
//! | Exit | O(k) expired timelocks | < 10µs |
//! | Claimable fees | O(1) per holder | < 1µs |
//! | Self-close burn sizing | O(1) | < 1µs |

use collateral_pool::{
    required_burn, BackingState, CollateralPoolApi, CollateralPoolService, InMemoryEventSink,
    InMemoryPoolStore, InMemoryTokenLedger, ManualTimeSource, MockAssetManager, PoolAccounts,
    PoolCollaborators, PoolConfig, PoolLedger, PriceRatio, SelfCloseInputs,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::time::Duration;

const POOL: [u8; 20] = [0xAA; 20];
const MANAGER: [u8; 20] = [0x11; 20];
const DAY: u64 = 86_400;

fn bench_config() -> PoolConfig {
    PoolConfig {
        exit_collateral_ratio_bips: 20_000,
        timelock_duration_secs: DAY,
        min_entry_collateral: 1,
        min_share_supply_after_exit: 0,
        min_collateral_after_exit: 0,
    }
}

fn one_to_one() -> PriceRatio {
    PriceRatio {
        numerator: 1,
        denominator: 1,
    }
}

fn holder(i: u32) -> [u8; 20] {
    let mut address = [0u8; 20];
    address[..4].copy_from_slice(&i.to_be_bytes());
    address
}

/// Ledger with `holders` entrants and fees deposited between entries.
fn populated_ledger(holders: u32) -> PoolLedger {
    let mut rng = rand::thread_rng();
    let mut ledger = PoolLedger::new(bench_config()).expect("valid config");
    for i in 0..holders {
        ledger
            .enter(holder(i), rng.gen_range(1_000..1_000_000), None, u64::from(i))
            .expect("entry");
        ledger
            .deposit_fees(rng.gen_range(0..10_000))
            .expect("deposit");
    }
    ledger
}

// ============================================================================
// Ledger
// ============================================================================

fn bench_ledger_entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger-entry");
    group.measurement_time(Duration::from_secs(5));

    for size in [10u32, 100, 1_000] {
        let ledger = populated_ledger(size);
        group.bench_with_input(BenchmarkId::new("enter", size), &ledger, |b, ledger| {
            b.iter_batched(
                || ledger.clone(),
                |mut ledger| black_box(ledger.enter(holder(size + 1), 50_000, None, DAY)),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_ledger_exit(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger-exit");
    group.measurement_time(Duration::from_secs(5));

    let backing = BackingState {
        liability: 0,
        price: one_to_one(),
    };
    let mut ledger = populated_ledger(100);
    // many small entries leave a long timelock queue to walk
    for t in 0..64 {
        ledger.enter(holder(7), 10, None, t).expect("entry");
    }
    let shares = ledger.share_balance(&holder(7)) / 2;

    group.bench_function("partial_exit_after_unlock", |b| {
        b.iter_batched(
            || ledger.clone(),
            |mut ledger| black_box(ledger.exit(&holder(7), shares, &backing, 10 * DAY)),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_claimable_fees(c: &mut Criterion) {
    let mut group = c.benchmark_group("claimable-fees");

    for size in [100u32, 1_000] {
        let ledger = populated_ledger(size);
        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("all_holders", size), &ledger, |b, ledger| {
            b.iter(|| {
                let mut total = 0u128;
                for i in 0..size {
                    total += ledger.claimable_fees(&holder(i)).unwrap_or(0);
                }
                black_box(total)
            })
        });
    }

    group.finish();
}

fn bench_self_close_sizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("self-close");

    let healthy = SelfCloseInputs {
        total_collateral: 1_000_000_000,
        collateral_share: 10_000_000,
        liability: 100_000_000,
        price: one_to_one(),
        exit_cr_bips: 20_000,
    };
    let unhealthy = SelfCloseInputs {
        liability: 900_000_000,
        ..healthy
    };

    group.bench_function("required_burn_healthy", |b| {
        b.iter(|| black_box(required_burn(black_box(&healthy))))
    });
    group.bench_function("required_burn_unhealthy", |b| {
        b.iter(|| black_box(required_burn(black_box(&unhealthy))))
    });

    group.finish();
}

// ============================================================================
// Service
// ============================================================================

fn bench_service_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("service");
    group.measurement_time(Duration::from_secs(5));

    let collateral = InMemoryTokenLedger::new("NAT");
    let clock = ManualTimeSource::new(0);
    let pool = CollateralPoolService::new(
        PoolAccounts {
            pool: POOL,
            manager: MANAGER,
        },
        PoolCollaborators {
            manager: MockAssetManager::new(one_to_one()),
            collateral: collateral.clone(),
            fasset: InMemoryTokenLedger::new("FXRP"),
            store: InMemoryPoolStore::new(),
            events: InMemoryEventSink::new(),
            clock: clock.clone(),
        },
        bench_config(),
    )
    .expect("valid config");

    let who = holder(1);
    group.bench_function("enter_then_exit", |b| {
        b.iter(|| {
            collateral.mint(who, 1_000);
            collateral.approve(who, POOL, 1_000);
            let receipt = pool.enter(who, 1_000).expect("entry");
            clock.advance(DAY);
            black_box(pool.exit(who, receipt.shares, None).expect("exit"))
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_ledger_entry,
    bench_ledger_exit,
    bench_claimable_fees,
    bench_self_close_sizing,
    bench_service_round_trip,
);
criterion_main!(benches);
