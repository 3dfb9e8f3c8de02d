//! Validações e helpers numéricos seguros para o AMM.
//! Objetivo: entradas seguras e somas/subtrações sem estouro.

use crate::error::Result;
use crate::error_catalog::ErrorCode;

use super::types::{Amount, Bps, BPS_SCALE};

#[inline]
pub fn ensure_nonzero(amount: Amount) -> Result<()> {
    if amount == 0 {
        crate::core_bail!(ErrorCode::InvalidAmount, amount => 0);
    }
    Ok(())
}

/// Reservas de um pool inicializado são sempre > 0.
#[inline]
pub fn ensure_reserves(reserve_in: Amount, reserve_out: Amount) -> Result<()> {
    if reserve_in == 0 || reserve_out == 0 {
        crate::core_bail!(ErrorCode::InsufficientLiquidity, reserve_in => reserve_in, reserve_out => reserve_out);
    }
    Ok(())
}

#[inline]
pub fn ensure_fee(fee_bps: Bps) -> Result<()> {
    if fee_bps > BPS_SCALE {
        crate::core_bail!(ErrorCode::InvalidConfig, fee_bps => fee_bps);
    }
    Ok(())
}

#[inline]
pub fn checked_add(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_add(b)
        .ok_or_else(|| crate::core_err!(ErrorCode::Overflow, a => a, b => b))
}

#[inline]
pub fn checked_sub(a: Amount, b: Amount) -> Result<Amount> {
    a.checked_sub(b)
        .ok_or_else(|| crate::core_err!(ErrorCode::Overflow, a => a, b => b))
}

/// Falha com `SlippageExceeded` se `got < min`.
#[inline]
pub fn ensure_min_out(got: Amount, min: Amount) -> Result<()> {
    if got < min {
        crate::core_bail!(ErrorCode::SlippageExceeded, got => got, min => min);
    }
    Ok(())
}
