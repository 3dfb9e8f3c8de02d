//! Instrumentos OTel do núcleo, criados sob demanda no meter global.
//! Sem provider instalado (ex.: testes) todos viram no-op.
use std::time::Instant;

use once_cell::sync::Lazy;
use opentelemetry::metrics::{Counter, Histogram, Meter};
use opentelemetry::{global, KeyValue};

const METER_NAME: &str = "liquidity_oracle_core";

fn meter() -> Meter {
    global::meter(METER_NAME)
}

static SWAP_COUNT: Lazy<Counter<u64>> = Lazy::new(|| {
    meter()
        .u64_counter("swap_count")
        .with_description("Swaps executados por pool")
        .build()
});

static SWAP_PRICE_IMPACT: Lazy<Histogram<u64>> = Lazy::new(|| {
    meter()
        .u64_histogram("swap_price_impact_bps")
        .with_unit("bps")
        .with_description("Impacto de preço por swap")
        .build()
});

static INVARIANT_GROWTH: Lazy<Histogram<f64>> = Lazy::new(|| {
    meter()
        .f64_histogram("invariant_growth_rel")
        .with_unit("1")
        .with_description("Crescimento relativo de k = reserveA*reserveB por swap")
        .build()
});

static LIQUIDITY_OPS: Lazy<Counter<u64>> = Lazy::new(|| {
    meter()
        .u64_counter("liquidity_ops")
        .with_description("Depósitos e saques de liquidez")
        .build()
});

static FLASH_LOANS: Lazy<Counter<u64>> = Lazy::new(|| {
    meter()
        .u64_counter("flash_loans")
        .with_description("Flash loans liquidados")
        .build()
});

static ORACLE_ROUNDS: Lazy<Counter<u64>> = Lazy::new(|| {
    meter()
        .u64_counter("oracle_rounds")
        .with_description("Rodadas de agregação por desfecho")
        .build()
});

static ORACLE_SUBMISSIONS: Lazy<Counter<u64>> = Lazy::new(|| {
    meter()
        .u64_counter("oracle_submissions")
        .with_description("Submissões de preço por desfecho")
        .build()
});

static OP_DURATION: Lazy<Histogram<f64>> = Lazy::new(|| {
    meter()
        .f64_histogram("op_duration_seconds")
        .with_unit("s")
        .with_description("Duração das operações do núcleo")
        .build()
});

pub fn record_swap(pool: &str, price_impact_bps: u32, k_growth_rel: f64) {
    let attrs = [KeyValue::new("pool", pool.to_string())];
    SWAP_COUNT.add(1, &attrs);
    SWAP_PRICE_IMPACT.record(u64::from(price_impact_bps), &attrs);
    INVARIANT_GROWTH.record(k_growth_rel, &attrs);
}

pub fn record_liquidity(pool: &str, kind: &'static str) {
    LIQUIDITY_OPS.add(
        1,
        &[KeyValue::new("pool", pool.to_string()), KeyValue::new("kind", kind)],
    );
}

pub fn record_flash_loan(pool: &str) {
    FLASH_LOANS.add(1, &[KeyValue::new("pool", pool.to_string())]);
}

pub fn record_round(pair: &str, outcome: &'static str) {
    ORACLE_ROUNDS.add(
        1,
        &[KeyValue::new("pair", pair.to_string()), KeyValue::new("outcome", outcome)],
    );
}

pub fn record_submission(pair: &str, outcome: &'static str) {
    ORACLE_SUBMISSIONS.add(
        1,
        &[KeyValue::new("pair", pair.to_string()), KeyValue::new("outcome", outcome)],
    );
}

/// Mede a duração de `f` em `op_duration_seconds{op}`.
pub fn time<F, T>(op: &'static str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let out = f();
    OP_DURATION.record(start.elapsed().as_secs_f64(), &[KeyValue::new("op", op)]);
    out
}
