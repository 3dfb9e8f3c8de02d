//! Utilitários para UI/roteadores: preço spot, impacto de preço e cotações com tolerância.
//! Preço = `reserveOut * 1e6 / reserveIn` (floor).

use crate::error::Result;
use crate::math::{mul_div_floor, BPS_SCALE};

use super::guardrails::ensure_reserves;
use super::types::{Amount, Bps, PRICE_SCALE};

/// Preço spot de 1 unidade do input em unidades do output, escala 1e6.
pub fn spot_price(reserve_in: Amount, reserve_out: Amount) -> Result<u128> {
    ensure_reserves(reserve_in, reserve_out)?;
    mul_div_floor(reserve_out, PRICE_SCALE, reserve_in)
}

/// Impacto de preço (bps) entre os estados antes/depois: `(p0 - p1) / p0 * 1e4`.
/// Movimentos a favor do trader saturam em 0.
pub fn price_impact_bps(
    before: (Amount, Amount),
    after: (Amount, Amount),
) -> Result<Bps> {
    let p0 = spot_price(before.0, before.1)?;
    let p1 = spot_price(after.0, after.1)?;
    if p1 >= p0 || p0 == 0 {
        return Ok(0);
    }
    let impact = mul_div_floor(p0 - p1, u128::from(BPS_SCALE), p0)?;
    Ok(impact.min(u128::from(BPS_SCALE)) as Bps)
}

/// **min_out** aceito para uma cotação `out` com `tolerance_bps` (0..=1e4):
/// `min_out = floor(out * (1 - tol))`
pub fn min_out_with_tolerance(out: Amount, tolerance_bps: Bps) -> Result<Amount> {
    let tol = tolerance_bps.min(BPS_SCALE);
    mul_div_floor(out, u128::from(BPS_SCALE - tol), u128::from(BPS_SCALE))
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::swap::constant_product_amount_out;
    use crate::error_catalog::ErrorCode;

    #[test]
    fn t_spot_prices_basic() {
        assert_eq!(spot_price(1_000_000, 2_000_000).unwrap(), 2_000_000);
        assert_eq!(spot_price(2_000_000, 1_000_000).unwrap(), 500_000);
    }

    #[test]
    fn t_price_impact_reference_swap() {
        let out = constant_product_amount_out(10_000, 1_000_000, 1_000_000, 30).unwrap();
        let impact = price_impact_bps((1_000_000, 1_000_000), (1_010_000, 1_000_000 - out)).unwrap();
        // p0 = 1_000_000, p1 = 980_325 -> 196 bps
        assert_eq!(impact, 196);
    }

    #[test]
    fn t_price_impact_favorable_is_zero() {
        assert_eq!(price_impact_bps((100, 100), (90, 110)).unwrap(), 0);
    }

    #[test]
    fn t_min_out_with_tolerance() {
        assert_eq!(min_out_with_tolerance(9_871, 50).unwrap(), 9_821);
        assert_eq!(min_out_with_tolerance(9_871, 0).unwrap(), 9_871);
        assert_eq!(min_out_with_tolerance(9_871, 20_000).unwrap(), 0);
    }

    #[test]
    fn t_safety_invalid_inputs() {
        assert_eq!(spot_price(0, 10).unwrap_err(), ErrorCode::InsufficientLiquidity);
    }
}
