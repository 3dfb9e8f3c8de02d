//! ReservePool: duas reservas de um par + parâmetros da curva.
//!
//! Invariantes:
//! - após a inicialização, `reserve_a > 0` e `reserve_b > 0`;
//! - `reserve_a * reserve_b` nunca diminui num swap;
//! - toda operação valida tudo antes de mutar (falha = nenhuma mudança).
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::auth::{Address, Timestamp};
use crate::config::PoolDefaults;
use crate::error::Result;
use crate::error_catalog::ErrorCode;
use crate::math::{to_u128, U256};

use super::guardrails::{checked_add, checked_sub, ensure_fee, ensure_min_out};
use super::liquidity;
use super::pricing::{price_impact_bps, spot_price};
use super::swap;
use super::types::{Amount, Bps, CurveKind, PoolId, Reserves, Side, SwapDirection};

/// Parâmetros fixados na criação do pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolParams {
    pub fee_rate_bps: Bps,
    pub curve: CurveKind,
}

impl PoolParams {
    pub const fn constant_product(fee_rate_bps: Bps) -> Self {
        Self { fee_rate_bps, curve: CurveKind::ConstantProduct }
    }

    pub const fn stable(fee_rate_bps: Bps, amplification: u64) -> Self {
        Self { fee_rate_bps, curve: CurveKind::StableSwap { amplification } }
    }
}

/// Resultado de um swap aplicado.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapReceipt {
    pub direction: SwapDirection,
    pub amount_in: Amount,
    pub amount_out: Amount,
    pub fee_amount: Amount,
    pub price_impact_bps: Bps,
    /// `(k1 - k0) / k0`, só para métricas.
    pub k_growth_rel: f64,
}

/// Resultado de um depósito aplicado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityReceipt {
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub refund_a: Amount,
    pub refund_b: Amount,
    pub lp_minted: Amount,
}

/// Resultado de um saque aplicado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawal {
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub lp_burned: Amount,
}

/// Snapshot de leitura do pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolInfo {
    pub id: PoolId,
    pub reserve_a: Amount,
    pub reserve_b: Amount,
    pub lp_supply: Amount,
    pub fee_rate_bps: Bps,
    pub is_stable: bool,
    pub amplification: u64,
    pub last_price: u128,
    pub cumulative_price_last: u128,
    pub last_update_time: Timestamp,
}

#[derive(Debug, Clone)]
pub struct ReservePool {
    pub(crate) id: PoolId,
    pub(crate) reserves: Reserves,
    pub(crate) lp_supply: Amount,
    pub(crate) params: PoolParams,
    pub(crate) last_price: u128,
    pub(crate) cumulative_price_last: u128,
    pub(crate) last_update_time: Timestamp,
    pub(crate) lp_balances: HashMap<Address, Amount>,
    pub(crate) defaults: PoolDefaults,
}

impl ReservePool {
    /// Cria o pool com o primeiro depósito; `lp_supply = floor(sqrt(a*b))` fica com `provider`.
    pub fn initialize(
        id: PoolId,
        params: PoolParams,
        provider: Address,
        initial_a: Amount,
        initial_b: Amount,
        now: Timestamp,
        defaults: PoolDefaults,
    ) -> Result<Self> {
        ensure_fee(params.fee_rate_bps)?;
        defaults.validate()?;
        if initial_a == 0 || initial_b == 0 {
            crate::core_bail!(ErrorCode::InvalidAmount, initial_a => initial_a, initial_b => initial_b);
        }
        let lp_supply = liquidity::initial_mint(initial_a, initial_b)?;
        let reserves = Reserves::new(initial_a, initial_b);
        let mut lp_balances = HashMap::new();
        lp_balances.insert(provider, lp_supply);
        Ok(Self {
            id,
            last_price: spot_price(initial_a, initial_b)?,
            reserves,
            lp_supply,
            params,
            cumulative_price_last: 0,
            last_update_time: now,
            lp_balances,
            defaults,
        })
    }

    pub fn id(&self) -> &PoolId {
        &self.id
    }

    pub fn reserves(&self) -> Reserves {
        self.reserves
    }

    pub fn reserve(&self, side: Side) -> Amount {
        self.reserves.get(side)
    }

    pub fn lp_supply(&self) -> Amount {
        self.lp_supply
    }

    pub fn params(&self) -> PoolParams {
        self.params
    }

    pub fn is_stable(&self) -> bool {
        matches!(self.params.curve, CurveKind::StableSwap { .. })
    }

    pub fn amplification(&self) -> u64 {
        match self.params.curve {
            CurveKind::StableSwap { amplification } => amplification,
            CurveKind::ConstantProduct => 0,
        }
    }

    pub fn lp_balance_of(&self, provider: &Address) -> Amount {
        self.lp_balances.get(provider).copied().unwrap_or(0)
    }

    pub fn info(&self) -> PoolInfo {
        PoolInfo {
            id: self.id.clone(),
            reserve_a: self.reserves.a,
            reserve_b: self.reserves.b,
            lp_supply: self.lp_supply,
            fee_rate_bps: self.params.fee_rate_bps,
            is_stable: self.is_stable(),
            amplification: self.amplification(),
            last_price: self.last_price,
            cumulative_price_last: self.cumulative_price_last,
            last_update_time: self.last_update_time,
        }
    }

    /// Cotação sem efeito colateral.
    pub fn quote(&self, direction: SwapDirection, amount_in: Amount) -> Result<Amount> {
        let (rin, rout) = self.reserves.oriented(direction);
        swap::amount_out(self.params.curve, amount_in, rin, rout, self.params.fee_rate_bps)
    }

    /// Menor input que entrega ao menos `amount_out`.
    pub fn quote_exact_output(&self, direction: SwapDirection, amount_out: Amount) -> Result<Amount> {
        let (rin, rout) = self.reserves.oriented(direction);
        swap::amount_in(self.params.curve, amount_out, rin, rout, self.params.fee_rate_bps)
    }

    /// Acumula `last_price * Δt` (wrapping, como acumuladores de TWAP on-chain) e grava as
    /// novas reservas. Só é chamado depois de todas as validações.
    /// Nada é gravado se o novo preço não couber em u128.
    pub(crate) fn commit(&mut self, reserves: Reserves, now: Timestamp) -> Result<()> {
        let price = spot_price(reserves.a, reserves.b)?;
        let elapsed = now.saturating_sub(self.last_update_time);
        if elapsed > 0 {
            self.cumulative_price_last = self
                .cumulative_price_last
                .wrapping_add(self.last_price.wrapping_mul(u128::from(elapsed)));
        }
        self.last_update_time = self.last_update_time.max(now);
        self.reserves = reserves;
        self.last_price = price;
        Ok(())
    }

    /// Depósito na razão atual; o excesso de um dos lados é devolvido.
    pub fn add_liquidity(
        &mut self,
        provider: Address,
        amount_a: Amount,
        amount_b: Amount,
        min_lp_out: Amount,
        now: Timestamp,
    ) -> Result<LiquidityReceipt> {
        let deposit = liquidity::add_liquidity(self.reserves, self.lp_supply, amount_a, amount_b)?;
        if deposit.shares < min_lp_out {
            crate::core_bail!(ErrorCode::SlippageExceeded, lp_minted => deposit.shares, min_lp_out => min_lp_out);
        }
        let next = Reserves::new(
            checked_add(self.reserves.a, deposit.used_a)?,
            checked_add(self.reserves.b, deposit.used_b)?,
        );
        let supply = checked_add(self.lp_supply, deposit.shares)?;
        let balance = checked_add(self.lp_balance_of(&provider), deposit.shares)?;

        self.commit(next, now)?;
        self.lp_supply = supply;
        self.lp_balances.insert(provider, balance);
        debug!(pool = %self.id, shares = deposit.shares, "liquidez adicionada");
        Ok(LiquidityReceipt {
            amount_a: deposit.used_a,
            amount_b: deposit.used_b,
            refund_a: deposit.refund_a,
            refund_b: deposit.refund_b,
            lp_minted: deposit.shares,
        })
    }

    /// Burn proporcional das shares do provedor.
    pub fn remove_liquidity(
        &mut self,
        provider: Address,
        shares: Amount,
        min_a: Amount,
        min_b: Amount,
        now: Timestamp,
    ) -> Result<Withdrawal> {
        let held = self.lp_balance_of(&provider);
        if shares > held {
            crate::core_bail!(ErrorCode::InvalidAmount, shares => shares, held => held);
        }
        let (a_out, b_out) = liquidity::remove_liquidity(
            self.reserves,
            shares,
            self.lp_supply,
            self.defaults.min_reserve,
        )?;
        ensure_min_out(a_out, min_a)?;
        ensure_min_out(b_out, min_b)?;
        let next = Reserves::new(
            checked_sub(self.reserves.a, a_out)?,
            checked_sub(self.reserves.b, b_out)?,
        );
        let supply = checked_sub(self.lp_supply, shares)?;

        self.commit(next, now)?;
        self.lp_supply = supply;
        if held == shares {
            self.lp_balances.remove(&provider);
        } else {
            self.lp_balances.insert(provider, held - shares);
        }
        debug!(pool = %self.id, shares, a_out, b_out, "liquidez removida");
        Ok(Withdrawal { amount_a: a_out, amount_b: b_out, lp_burned: shares })
    }

    /// Swap com input exato. Falha `InsufficientLiquidity` se a saída for 0 e
    /// `SlippageExceeded` se ficar abaixo de `min_amount_out`.
    pub fn swap_exact_input(
        &mut self,
        direction: SwapDirection,
        amount_in: Amount,
        min_amount_out: Amount,
        now: Timestamp,
    ) -> Result<SwapReceipt> {
        let (rin, rout) = self.reserves.oriented(direction);
        let out = swap::amount_out(self.params.curve, amount_in, rin, rout, self.params.fee_rate_bps)?;
        if out == 0 {
            crate::core_bail!(ErrorCode::InsufficientLiquidity, amount_in => amount_in, amount_out => 0);
        }
        ensure_min_out(out, min_amount_out)?;

        let new_in = checked_add(rin, amount_in)?;
        let new_out = checked_sub(rout, out)?;
        if new_out == 0 {
            crate::core_bail!(ErrorCode::InsufficientLiquidity, amount_out => out, reserve_out => rout);
        }
        let fee_amount = swap::fee_amount(self.params.curve, amount_in, self.params.fee_rate_bps)?;
        let impact = price_impact_bps((rin, rout), (new_in, new_out))?;

        let k0 = U256::from(rin) * U256::from(rout);
        let k1 = U256::from(new_in) * U256::from(new_out);
        debug_assert!(k1 >= k0, "k diminuiu num swap");
        let k_growth_rel = relative_growth(k0, k1);

        let next = match direction {
            SwapDirection::AToB => Reserves::new(new_in, new_out),
            SwapDirection::BToA => Reserves::new(new_out, new_in),
        };
        self.commit(next, now)?;
        debug!(pool = %self.id, ?direction, amount_in, amount_out = out, impact, "swap aplicado");
        Ok(SwapReceipt {
            direction,
            amount_in,
            amount_out: out,
            fee_amount,
            price_impact_bps: impact,
            k_growth_rel,
        })
    }
}

/// `(k1 - k0) / k0` com 1e-12 de resolução.
fn relative_growth(k0: U256, k1: U256) -> f64 {
    if k0.is_zero() || k1 <= k0 {
        return 0.0;
    }
    let scaled = (k1 - k0) * U256::from(1_000_000_000_000u64) / k0;
    to_u128(scaled).map(|v| v as f64 / 1e12).unwrap_or(f64::MAX)
}
