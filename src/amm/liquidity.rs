//! Liquidez: mint inicial, depósito na proporção das reservas e burn de shares.
//! Políticas:
//! - shares_mint: **floor**
//! - par ótimo do depósito: **floor** (sobra devolvida ao provedor)
//! - amounts_out em burn: **floor**

use crate::error::Result;
use crate::error_catalog::ErrorCode;
use crate::math::{isqrt_product, mul_div_floor};

use super::guardrails::{checked_add, checked_sub, ensure_nonzero, ensure_reserves};
use super::types::{Amount, Reserves};

/// Resultado de um depósito: quanto entrou, quanto volta e quantas shares saem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deposit {
    pub used_a: Amount,
    pub used_b: Amount,
    pub refund_a: Amount,
    pub refund_b: Amount,
    pub shares: Amount,
}

/// Mint **inicial** de shares: `floor(sqrt(a*b))`.
pub fn initial_mint(a: Amount, b: Amount) -> Result<Amount> {
    ensure_nonzero(a)?;
    ensure_nonzero(b)?;
    let shares = isqrt_product(a, b)?;
    if shares == 0 {
        crate::core_bail!(ErrorCode::InvalidAmount, a => a, b => b);
    }
    Ok(shares)
}

/// Par `(a, b)` que preserva a razão das reservas sem exceder o desejado.
pub fn optimal_pair(reserves: Reserves, desired_a: Amount, desired_b: Amount) -> Result<(Amount, Amount)> {
    ensure_reserves(reserves.a, reserves.b)?;
    let b_optimal = mul_div_floor(desired_a, reserves.b, reserves.a)?;
    if b_optimal <= desired_b {
        return Ok((desired_a, b_optimal));
    }
    let a_optimal = mul_div_floor(desired_b, reserves.a, reserves.b)?;
    Ok((a_optimal.min(desired_a), desired_b))
}

/// Depósito completo. Com reservas zeradas o mint volta a ser `floor(sqrt(a*b))`;
/// caso contrário `shares = floor(min(a*S/Ra, b*S/Rb))` sobre o par ótimo.
pub fn add_liquidity(
    reserves: Reserves,
    lp_supply: Amount,
    desired_a: Amount,
    desired_b: Amount,
) -> Result<Deposit> {
    ensure_nonzero(desired_a)?;
    ensure_nonzero(desired_b)?;

    if reserves.a == 0 && reserves.b == 0 {
        let shares = initial_mint(desired_a, desired_b)?;
        return Ok(Deposit {
            used_a: desired_a,
            used_b: desired_b,
            refund_a: 0,
            refund_b: 0,
            shares,
        });
    }
    if lp_supply == 0 {
        crate::core_bail!(ErrorCode::InsufficientLiquidity, lp_supply => 0);
    }

    let (used_a, used_b) = optimal_pair(reserves, desired_a, desired_b)?;
    let sa = mul_div_floor(used_a, lp_supply, reserves.a)?;
    let sb = mul_div_floor(used_b, lp_supply, reserves.b)?;
    let shares = sa.min(sb);
    if shares == 0 {
        crate::core_bail!(ErrorCode::InvalidAmount, used_a => used_a, used_b => used_b, detalhe => "shares = 0");
    }

    // pós-condição: reservas só aumentam sem estourar
    checked_add(reserves.a, used_a)?;
    checked_add(reserves.b, used_b)?;

    Ok(Deposit {
        used_a,
        used_b,
        refund_a: desired_a - used_a,
        refund_b: desired_b - used_b,
        shares,
    })
}

/// Burn de shares (proporcional). Retorna `(a_out, b_out)` com **floor**.
/// Garante que as reservas remanescentes ficam >= `min_reserve`.
pub fn remove_liquidity(
    reserves: Reserves,
    burn_shares: Amount,
    lp_supply: Amount,
    min_reserve: Amount,
) -> Result<(Amount, Amount)> {
    ensure_reserves(reserves.a, reserves.b)?;
    ensure_nonzero(burn_shares)?;
    if burn_shares > lp_supply {
        crate::core_bail!(ErrorCode::InvalidAmount, burn => burn_shares, supply => lp_supply);
    }

    let a_out = mul_div_floor(reserves.a, burn_shares, lp_supply)?;
    let b_out = mul_div_floor(reserves.b, burn_shares, lp_supply)?;

    let a1 = checked_sub(reserves.a, a_out)?;
    let b1 = checked_sub(reserves.b, b_out)?;
    if a1 < min_reserve || b1 < min_reserve {
        crate::core_bail!(ErrorCode::InsufficientLiquidity, reserve_a => a1, reserve_b => b1, min => min_reserve);
    }
    if a_out == 0 && b_out == 0 {
        crate::core_bail!(ErrorCode::InvalidAmount, burn => burn_shares);
    }
    Ok((a_out, b_out))
}
