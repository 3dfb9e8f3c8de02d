//! Funções puras de swap (SwapEngine).
//! - constant-product: `out = floor(in*(1e4-fee)*R_out / (R_in*1e4 + in*(1e4-fee)))`
//! - stable-swap simplificado: `out = floor(in*0,997*R_out / (R_in + in*0,997))`
//! - amount_in: menor input bruto que entrega ao menos `dy` (minimalidade garantida)
//!
//! Todas as contas intermediárias são exatas em U256; só o resultado final trunca.

use crate::error::Result;
use crate::error_catalog::ErrorCode;
use crate::math::to_u128;

use super::error_map::{from_swap_inputs, to_error};
use super::guardrails::{ensure_nonzero, ensure_reserves};
use super::types::{Amount, Bps, CurveKind, BPS_SCALE, STABLE_DEN, STABLE_NUM, U256};

/// `(numerador, denominador)` do fator aplicado ao input: `in_eff = in * num / den`.
#[inline]
fn input_factor(curve: CurveKind, fee_bps: Bps) -> (u128, u128) {
    match curve {
        CurveKind::ConstantProduct => (
            u128::from(BPS_SCALE.saturating_sub(fee_bps)),
            u128::from(BPS_SCALE),
        ),
        CurveKind::StableSwap { .. } => (STABLE_NUM, STABLE_DEN),
    }
}

fn amount_out_with_factor(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    (num, den): (u128, u128),
) -> Result<Amount> {
    let in_eff = U256::from(amount_in) * U256::from(num);
    let numerator = in_eff * U256::from(reserve_out);
    let denominator = U256::from(reserve_in) * U256::from(den) + in_eff;
    to_u128(numerator / denominator)
}

fn validate(amount_in: Amount, reserve_in: Amount, reserve_out: Amount, fee_bps: Bps) -> Result<()> {
    match from_swap_inputs(amount_in, (reserve_in, reserve_out), fee_bps) {
        Some(code) => Err(to_error(code, amount_in, (reserve_in, reserve_out))),
        None => Ok(()),
    }
}

/// Saída do constant-product com taxa sobre o input.
pub fn constant_product_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_bps: Bps,
) -> Result<Amount> {
    validate(amount_in, reserve_in, reserve_out, fee_bps)?;
    amount_out_with_factor(
        amount_in,
        reserve_in,
        reserve_out,
        input_factor(CurveKind::ConstantProduct, fee_bps),
    )
}

/// Saída do stable-swap simplificado. A amplificação não altera a fórmula.
pub fn stable_swap_amount_out(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> Result<Amount> {
    validate(amount_in, reserve_in, reserve_out, 0)?;
    amount_out_with_factor(amount_in, reserve_in, reserve_out, (STABLE_NUM, STABLE_DEN))
}

/// Despacha para a curva do pool.
pub fn amount_out(
    curve: CurveKind,
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_bps: Bps,
) -> Result<Amount> {
    match curve {
        CurveKind::ConstantProduct => {
            constant_product_amount_out(amount_in, reserve_in, reserve_out, fee_bps)
        }
        CurveKind::StableSwap { .. } => stable_swap_amount_out(amount_in, reserve_in, reserve_out),
    }
}

/// Parcela do input retida como taxa (floor), reportada em `SwapExecuted`.
pub fn fee_amount(curve: CurveKind, amount_in: Amount, fee_bps: Bps) -> Result<Amount> {
    let (num, den) = input_factor(curve, fee_bps);
    to_u128(U256::from(amount_in) * U256::from(den - num) / U256::from(den))
}

/// Calcula o **menor input bruto** tal que `amount_out(..) >= dy`.
/// Estratégia: fórmula fechada para chutar um upper bound, depois busca binária em cima
/// de `amount_out` para garantir minimalidade apesar dos arredondamentos.
pub fn amount_in(
    curve: CurveKind,
    dy: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_bps: Bps,
) -> Result<Amount> {
    ensure_reserves(reserve_in, reserve_out)?;
    ensure_nonzero(dy)?;
    if dy >= reserve_out {
        crate::core_bail!(ErrorCode::InsufficientLiquidity, dy => dy, reserve_out => reserve_out);
    }
    let (num, den) = input_factor(curve, fee_bps);
    if num == 0 {
        crate::core_bail!(ErrorCode::InsufficientLiquidity, fee_bps => fee_bps);
    }

    // in = ceil( R_in * dy * den / ((R_out - dy) * num) )
    let n = U256::from(reserve_in) * U256::from(dy) * U256::from(den);
    let d = U256::from(reserve_out - dy) * U256::from(num);
    let mut hi = to_u128((n + d - U256::from(1u8)) / d)?.max(1);

    // garante que `hi` satisfaz (expande se necessário)
    while amount_out(curve, hi, reserve_in, reserve_out, fee_bps).unwrap_or(0) < dy {
        hi = hi
            .checked_mul(2)
            .ok_or_else(|| crate::core_err!(ErrorCode::Overflow, dy => dy))?;
    }

    // busca binária: menor input com out >= dy
    let mut lo: Amount = 1;
    while lo < hi {
        let mid = lo + ((hi - lo) >> 1);
        let out_mid = amount_out(curve, mid, reserve_in, reserve_out, fee_bps).unwrap_or(0);
        if out_mid >= dy {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Ok(hi)
}
