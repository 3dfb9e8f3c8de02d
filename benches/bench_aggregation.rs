use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use liquidity_oracle_core::config::OracleSettings;
use liquidity_oracle_core::oracle::{AggregationEngine, HistoryLedger, PairId, PriceFeedRegistry, PriceSubmission};
use liquidity_oracle_core::{Address, CallContext, RecordingSink};

fn submissions(n: u8) -> Vec<PriceSubmission> {
    (0..n)
        .map(|i| PriceSubmission {
            reporter: Address::repeat_byte(i),
            price: 100_000_000 + u128::from(i) * 1_000,
            confidence: 60 + i % 40,
            timestamp: 1_000,
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let mut g = c.benchmark_group("aggregation");
    g.warm_up_time(Duration::from_secs(2));
    g.measurement_time(Duration::from_secs(5));
    g.sample_size(200);
    g.throughput(Throughput::Elements(1));

    let engine = AggregationEngine::new();
    for n in [3u8, 16, 64] {
        let subs = submissions(n);
        g.bench_function(format!("run_round_{n}"), |b| {
            b.iter(|| black_box(engine.run_round(black_box(&subs), 100_000_000, 1_100).unwrap()));
        });
    }

    let mut full = HistoryLedger::new(720, 3_600);
    for h in 0..720u64 {
        full.record(100 + u128::from(h), h * 3_600);
    }
    g.bench_function("history_twap_24_of_720", |b| {
        b.iter(|| black_box(full.twap(black_box(24))));
    });

    // rodada completa via registry: 3 submissões, a última publica
    let admin = Address::repeat_byte(0xAA);
    let pair = PairId::from("SOL/USDC");
    g.bench_function("registry_quorum_round", |b| {
        b.iter_batched(
            || {
                let reg = PriceFeedRegistry::new(admin, OracleSettings::default(), RecordingSink::new()).unwrap();
                let ctx = CallContext::new(admin, 0);
                reg.add_pair(&ctx, pair.clone()).unwrap();
                for i in 1..=3u8 {
                    let r = Address::repeat_byte(i);
                    reg.register_reporter(&CallContext::new(r, 0), 1).unwrap();
                    reg.authorize_reporter(&ctx, &r).unwrap();
                }
                reg
            },
            |reg| {
                for i in 1..=3u8 {
                    let ctx = CallContext::new(Address::repeat_byte(i), 10);
                    black_box(reg.submit_price(&ctx, &pair, 100_000_000, 90, 10).unwrap());
                }
            },
            BatchSize::SmallInput,
        );
    });

    g.finish();
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
