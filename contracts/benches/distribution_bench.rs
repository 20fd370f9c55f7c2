// Payout and Treasury benchmarks for the Strongbox vault contracts.
//
// Covers payout planning over multi-asset holdings, a full payout through the
// Coordinator, and redistribution rounds over growing sets of locked vaults.

use chrono::{DateTime, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use strongbox_contracts::holdings::Holdings;
use strongbox_contracts::payout::compute_plan;
use strongbox_contracts::vault::{VaultId, VaultParams};
use strongbox_contracts::{Asset, Coordinator, ProtocolConfig};

const ADMIN: &str = "admin";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// A Coordinator with `tokens` supported tokens recognized.
fn setup_coordinator(tokens: usize) -> Coordinator {
    let mut config = ProtocolConfig::new(ADMIN, "fee_sink");
    config.supported_assets = (0..tokens).map(|i| format!("token{i:03}")).collect();
    Coordinator::new(config).unwrap()
}

/// Builds a Coordinator with one open vault already collected into the
/// Treasury and `n` locked vaults with distinct native balances.
fn setup_distribution(n: usize) -> Coordinator {
    let mut c = setup_coordinator(0);

    let open = c
        .create_vault(ADMIN, VaultParams::new("open"), &[("quitter".into(), 1)], now())
        .unwrap();
    c.check_unlock(open, now()).unwrap();
    c.payout("quitter", open, now()).unwrap();
    c.deposit(open, "stray", Asset::Native, 1_000_000_000, now())
        .unwrap();
    c.collect(now()).unwrap();

    for i in 0..n {
        let id = c
            .create_vault(
                ADMIN,
                VaultParams::new("saver").with_target(u64::MAX),
                &[("saver".into(), 1)],
                now(),
            )
            .unwrap();
        c.deposit(id, "saver", Asset::Native, (i as u64 + 1) * 1_000, now())
            .unwrap();
    }
    c
}

fn bench_payout_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("payout/plan");

    for assets in [1usize, 8, 64] {
        let mut holdings = Holdings::new();
        holdings.credit(&Asset::Native, u64::MAX / 3).unwrap();
        for i in 1..assets {
            holdings
                .credit(&Asset::token(format!("token{i:03}")), 1_000_000 + i as u64)
                .unwrap();
        }

        group.throughput(Throughput::Elements(assets as u64));
        group.bench_with_input(BenchmarkId::from_parameter(assets), &holdings, |b, h| {
            b.iter(|| compute_plan(VaultId(1), black_box(h), 333, 1_000, 400).unwrap());
        });
    }

    group.finish();
}

fn bench_payout_execute(c: &mut Criterion) {
    c.bench_function("payout/execute_16_assets", |b| {
        b.iter_with_setup(
            || {
                let mut coord = setup_coordinator(15);
                let id = coord
                    .create_vault(
                        ADMIN,
                        VaultParams::new("v"),
                        &[("alice".into(), 50), ("bob".into(), 50)],
                        now(),
                    )
                    .unwrap();
                coord.check_unlock(id, now()).unwrap();
                coord.deposit(id, "f", Asset::Native, 10_000, now()).unwrap();
                for i in 0..15 {
                    coord
                        .deposit(id, "f", Asset::token(format!("token{i:03}")), 10_000, now())
                        .unwrap();
                }
                (coord, id)
            },
            |(mut coord, id)| {
                coord.payout("alice", id, now()).unwrap();
            },
        );
    });
}

fn bench_distribution(c: &mut Criterion) {
    let mut group = c.benchmark_group("treasury/distribute_native");

    for vault_count in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(vault_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(vault_count),
            &vault_count,
            |b, &n| {
                b.iter_with_setup(
                    || setup_distribution(n),
                    |mut coord| {
                        coord.distribute_native_rewards(now()).unwrap();
                    },
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_payout_plan,
    bench_payout_execute,
    bench_distribution,
);
criterion_main!(benches);
