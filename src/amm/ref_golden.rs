//! Referência exata ("goldens") em **BigRational** para as curvas do AMM.
//!
//! Calcula os resultados contínuos (sem quantização) e compara com o core inteiro:
//! 1. `amount_out` do core == `floor` do valor racional exato;
//! 2. `amount_in` do core == menor inteiro cujo out racional (floor) alcança `dy`;
//! 3. `|Δk/k|` do core discreto nunca é negativo.
//!
//! Só compila em testes (deps `num-*` são dev-dependencies).

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use super::swap;
use super::types::{Amount, Bps, CurveKind, BPS_SCALE, STABLE_DEN, STABLE_NUM};

#[inline]
fn q(n: u128, d: u128) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

#[inline]
fn qi(n: u128) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

#[inline]
fn floor_rat_to_u128(r: &BigRational) -> Option<u128> {
    r.floor().to_integer().to_u128()
}

/// Fator efetivo do input como fração exata.
fn input_factor_q(curve: CurveKind, fee_bps: Bps) -> BigRational {
    match curve {
        CurveKind::ConstantProduct => q(u128::from(BPS_SCALE - fee_bps), u128::from(BPS_SCALE)),
        CurveKind::StableSwap { .. } => q(STABLE_NUM, STABLE_DEN),
    }
}

/// `out = in_eff * y / (x + in_eff)` em racionais.
pub fn amount_out_exact(curve: CurveKind, dx: Amount, x: Amount, y: Amount, fee_bps: Bps) -> BigRational {
    let in_eff = qi(dx) * input_factor_q(curve, fee_bps);
    let den = qi(x) + in_eff.clone();
    if den.is_zero() {
        return BigRational::zero();
    }
    in_eff * qi(y) / den
}

/// Menor input inteiro cujo out (floor do exato) alcança `dy`, por busca linear a partir
/// do valor contínuo. Lento de propósito: é só oráculo de teste.
pub fn amount_in_reference(curve: CurveKind, dy: Amount, x: Amount, y: Amount, fee_bps: Bps) -> Option<Amount> {
    if dy == 0 || dy >= y {
        return None;
    }
    // contínuo: dx = x*dy / ((y-dy)*f)
    let f = input_factor_q(curve, fee_bps);
    if f.is_zero() {
        return None;
    }
    let cont = qi(x) * qi(dy) / (qi(y - dy) * f);
    let mut dx = floor_rat_to_u128(&cont)?.saturating_sub(2).max(1);
    loop {
        let out = floor_rat_to_u128(&amount_out_exact(curve, dx, x, y, fee_bps))?;
        if out >= dy {
            return Some(dx);
        }
        dx = dx.checked_add(1)?;
    }
}

/// `(k1 - k0) / k0` exato após um swap do core discreto.
pub fn k_delta_rel(x: Amount, y: Amount, dx: Amount, dy: Amount) -> BigRational {
    let k0 = qi(x) * qi(y);
    let k1 = qi(x + dx) * qi(y - dy);
    (k1 - k0.clone()) / k0
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [CurveKind; 2] = [
        CurveKind::ConstantProduct,
        CurveKind::StableSwap { amplification: 85 },
    ];

    const CASES: &[(Amount, Amount, Amount, Bps)] = &[
        (10_000, 1_000_000, 1_000_000, 30),
        (1, 1_000, 1_000_000_000, 0),
        (123_456_789, 987_654_321_000, 555_555_555_555, 25),
        (1_000_000_000_000, 3_000_000_000_000, 7_000_000_000_000, 100),
        (7, 13, 17, 9_999),
    ];

    #[test]
    fn core_amount_out_is_floor_of_exact() {
        for curve in CURVES {
            for &(dx, x, y, fee) in CASES {
                let core = swap::amount_out(curve, dx, x, y, fee).unwrap();
                let exact = floor_rat_to_u128(&amount_out_exact(curve, dx, x, y, fee)).unwrap();
                assert_eq!(core, exact, "curve={curve:?} dx={dx} x={x} y={y} fee={fee}");
            }
        }
    }

    #[test]
    fn core_amount_in_matches_reference() {
        for curve in CURVES {
            for &(dx, x, y, fee) in CASES {
                let dy = swap::amount_out(curve, dx, x, y, fee).unwrap();
                if dy == 0 {
                    continue;
                }
                let core = swap::amount_in(curve, dy, x, y, fee).unwrap();
                let reference = amount_in_reference(curve, dy, x, y, fee).unwrap();
                assert_eq!(core, reference, "curve={curve:?} dy={dy}");
                assert!(core <= dx);
            }
        }
    }

    #[test]
    fn k_never_shrinks_against_exact_math() {
        for curve in CURVES {
            for &(dx, x, y, fee) in CASES {
                let dy = swap::amount_out(curve, dx, x, y, fee).unwrap();
                assert!(k_delta_rel(x, y, dx, dy) >= BigRational::zero());
            }
        }
    }
}
