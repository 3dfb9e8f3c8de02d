use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use liquidity_oracle_core::amm::swap::{amount_in, amount_out};
use liquidity_oracle_core::amm::types::{Amount, CurveKind, PoolId, SwapDirection, UNIT};
use liquidity_oracle_core::amm::{PoolParams, ReservePool};
use liquidity_oracle_core::config::PoolDefaults;
use liquidity_oracle_core::Address;

#[inline]
fn w(n: u128) -> Amount {
    n * UNIT
}

const CP: CurveKind = CurveKind::ConstantProduct;
const STABLE: CurveKind = CurveKind::StableSwap { amplification: 100 };

fn bench_swap(c: &mut Criterion) {
    let mut g = c.benchmark_group("swap");
    g.warm_up_time(Duration::from_secs(2));
    g.measurement_time(Duration::from_secs(5));
    g.sample_size(300);
    g.throughput(Throughput::Elements(1));

    // rótulo único + curva + taxa
    let cases: [(&str, CurveKind, Amount, Amount, Amount, u32); 6] = [
        ("sym_small", CP, w(1_000_000), w(1_000_000), w(1_000), 0),
        ("sym_large", CP, w(5_000_000_000), w(5_000_000_000), w(1_000_000), 0),
        ("asym_xgg", CP, w(1_000_000_000), w(1_000_000), w(1_000), 0),
        ("sym_small_fee", CP, w(1_000_000), w(1_000_000), w(1_000), 30),
        ("asym_xgg_fee", CP, w(1_000_000_000), w(1_000_000), w(1_000), 30),
        ("stable_sym", STABLE, w(1_000_000), w(1_000_000), w(1_000), 0),
    ];

    for (label, curve, x, y, dx, fee) in cases {
        g.bench_function(format!("out_{label}_f{fee}"), |b| {
            b.iter(|| {
                let dy = amount_out(black_box(curve), black_box(dx), black_box(x), black_box(y), black_box(fee)).unwrap();
                black_box(dy);
            });
        });
    }

    // quote de saída exata (busca binária)
    g.bench_function("amount_in_sym_fee", |b| {
        b.iter(|| {
            let dx = amount_in(CP, black_box(w(9_870)), w(1_000_000), w(1_000_000), 30).unwrap();
            black_box(dx);
        });
    });

    // swap com estado (validação + commit + acumulador)
    let pool = ReservePool::initialize(
        PoolId::from("A/B"),
        PoolParams::constant_product(30),
        Address::repeat_byte(1),
        w(1_000_000),
        w(1_000_000),
        0,
        PoolDefaults::default(),
    )
    .unwrap();
    g.bench_function("pool_swap_exact_input", |b| {
        b.iter_batched(
            || pool.clone(),
            |mut p| {
                let r = p.swap_exact_input(SwapDirection::AToB, black_box(w(1_000)), 0, 1).unwrap();
                black_box(r);
            },
            BatchSize::SmallInput,
        );
    });
    g.finish();
}

criterion_group!(benches, bench_swap);
criterion_main!(benches);
