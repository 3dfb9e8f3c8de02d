//! Demo ponta a ponta: inicializa telemetria, cria um pool e um par de oráculo,
//! executa swaps, um flash loan e rodadas de preço (inclusive um disparo do breaker).
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use liquidity_oracle_core::amm::{PoolId, PoolParams, PoolRegistry, Side, SwapDirection};
use liquidity_oracle_core::config::{OracleSettings, PoolDefaults};
use liquidity_oracle_core::oracle::{PairId, PriceFeedRegistry};
use liquidity_oracle_core::{telemetry, Address, CallContext, TracingSink};

const ADMIN: Address = Address::repeat_byte(0xAA);

#[tokio::main]
async fn main() -> Result<()> {
    let tel = telemetry::init("liquidity-oracle-core")?;
    let sink = Arc::new(TracingSink);

    let pools = PoolRegistry::new(ADMIN, PoolDefaults::from_env()?, sink.clone())?;
    let oracle = PriceFeedRegistry::new(ADMIN, OracleSettings::from_env()?, sink)?;

    let pool = PoolId::from("SOL/USDC");
    let pair = PairId::from("SOL/USDC");
    let mut now = 1_700_000_000u64;
    let admin = |t| CallContext::new(ADMIN, t);

    pools.initialize_pool(&admin(now), pool.clone(), PoolParams::constant_product(30), 1_000_000, 1_000_000)?;
    oracle.add_pair(&admin(now), pair.clone())?;

    let reporters: Vec<Address> = (1..=3u8).map(Address::repeat_byte).collect();
    for r in &reporters {
        oracle.register_reporter(&CallContext::new(*r, now), 1_000)?;
        oracle.authorize_reporter(&admin(now), r)?;
    }

    for i in 0..5u64 {
        let span = telemetry::make_info_span("swap", i, "settlement_demo");
        let _guard = span.enter();
        now += 60;
        let trader = CallContext::new(Address::repeat_byte(0x10), now);
        let direction = if i % 2 == 0 { SwapDirection::AToB } else { SwapDirection::BToA };
        let r = pools.swap_exact_input(&trader, &pool, direction, 10_000, 0)?;
        info!(out = r.amount_out, impact_bps = r.price_impact_bps, "swap");
    }

    let flash = pools.flash_loan(&CallContext::new(Address::repeat_byte(0x11), now), &pool, Side::A, 50_000, |t| {
        Ok(t.amount_due())
    })?;
    info!(fee = flash.fee, "flash loan liquidado");

    // 100 publica, 125 dispara o breaker, 104 publica e rearma
    for (round, price) in [100u128, 125, 104].into_iter().enumerate() {
        let span = telemetry::make_info_span("oracle_round", round as u64, "settlement_demo");
        let _guard = span.enter();
        now += 120;
        for r in &reporters {
            let out = oracle.submit_price(&CallContext::new(*r, now), &pair, price, 90, now)?;
            info!(outcome = out.label(), "submissão");
        }
        info!(price = oracle.get_price(&pair), healthy = oracle.is_healthy(&pair, now), "estado do par");
    }

    info!(pool = ?pools.pool_info(&pool)?, twap = oracle.get_twap(&pair), "fim da demo");
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    tel.shutdown();
    Ok(())
}
