//! Mapeamento entre condições de domínio de um swap e códigos de erro.
use crate::error::Error;
use crate::error_catalog::ErrorCode;

use super::types::{Amount, Bps, BPS_SCALE};

/// Determina o código de erro para um swap a partir dos inputs brutos.
/// `None` significa que os inputs são aceitáveis para a curva.
pub fn from_swap_inputs(
    amount_in: Amount,
    reserves: (Amount, Amount),
    fee_bps: Bps,
) -> Option<ErrorCode> {
    if amount_in == 0 {
        return Some(ErrorCode::InvalidAmount);
    }
    if reserves.0 == 0 || reserves.1 == 0 {
        return Some(ErrorCode::InsufficientLiquidity);
    }
    if fee_bps > BPS_SCALE {
        return Some(ErrorCode::InvalidConfig);
    }
    if reserves.0.checked_add(amount_in).is_none() {
        return Some(ErrorCode::Overflow);
    }
    None
}

/// Constrói um [`Error`] com os inputs do swap no contexto.
pub fn to_error(code: ErrorCode, amount_in: Amount, reserves: (Amount, Amount)) -> Error {
    Error::new(code)
        .with_context("amount_in", amount_in)
        .with_context("reserve_in", reserves.0)
        .with_context("reserve_out", reserves.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_zero_amount() {
        assert_eq!(from_swap_inputs(0, (1, 1), 30), Some(ErrorCode::InvalidAmount));
    }

    #[test]
    fn detects_zero_reserve() {
        assert_eq!(
            from_swap_inputs(1, (0, 1), 30),
            Some(ErrorCode::InsufficientLiquidity)
        );
    }

    #[test]
    fn detects_bad_fee() {
        assert_eq!(from_swap_inputs(10, (10, 10), 10_001), Some(ErrorCode::InvalidConfig));
    }

    #[test]
    fn detects_overflow() {
        assert_eq!(
            from_swap_inputs(u128::MAX, (u128::MAX, 10), 30),
            Some(ErrorCode::Overflow)
        );
    }

    #[test]
    fn ok_path() {
        assert_eq!(from_swap_inputs(10, (100, 100), 30), None);
    }

    #[test]
    fn error_carries_inputs() {
        let err = to_error(ErrorCode::InvalidAmount, 0, (5, 6));
        assert_eq!(err.context.get("reserve_out").unwrap(), "6");
    }
}
