//! Helpers de ponto fixo compartilhados pelo AMM e pelo oráculo.
//! Toda divisão aqui é **floor** (trunca em direção a zero), exceto onde o nome diz `ceil`.

use uint::construct_uint;

use crate::error::Result as CoreResult;
use crate::error_catalog::ErrorCode;

construct_uint! {
    /// Inteiro de 256 bits para contas intermediárias seguras.
    pub struct U256(4);
}

/// Escala de basis points (10000 = 100%).
pub const BPS_SCALE: u32 = 10_000;

#[inline]
pub fn to_u128(v: U256) -> CoreResult<u128> {
    if v > U256::from(u128::MAX) {
        crate::core_bail!(ErrorCode::Overflow, value => v);
    }
    Ok(v.low_u128())
}

/// `floor(a * b / d)` com intermediário em 256 bits.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> CoreResult<u128> {
    if d == 0 {
        crate::core_bail!(ErrorCode::Overflow, detalhe => "divisão por zero");
    }
    to_u128(U256::from(a) * U256::from(b) / U256::from(d))
}

/// `ceil(a * b / d)` com intermediário em 256 bits.
pub fn mul_div_ceil(a: u128, b: u128, d: u128) -> CoreResult<u128> {
    if d == 0 {
        crate::core_bail!(ErrorCode::Overflow, detalhe => "divisão por zero");
    }
    let n = U256::from(a) * U256::from(b);
    let d = U256::from(d);
    to_u128((n + (d - U256::from(1u8))) / d)
}

/// Fração `value * bps / 10000` (floor).
#[inline]
pub fn bps_of(value: u128, bps: u32) -> CoreResult<u128> {
    mul_div_floor(value, u128::from(bps), u128::from(BPS_SCALE))
}

/// Fração `value * bps / 10000` arredondada para cima (taxas nunca sub-cobradas).
#[inline]
pub fn bps_of_ceil(value: u128, bps: u32) -> CoreResult<u128> {
    mul_div_ceil(value, u128::from(bps), u128::from(BPS_SCALE))
}

/// Desvio relativo em bps: `floor(|new - old| * 10000 / old)`; 0 se não há referência.
pub fn deviation_bps(new: u128, old: u128) -> u128 {
    if old == 0 {
        return 0;
    }
    let diff = new.abs_diff(old);
    // |Δ|*1e4 cabe em U256 sempre; saturamos no downcast
    let q = U256::from(diff) * U256::from(BPS_SCALE) / U256::from(old);
    to_u128(q).unwrap_or(u128::MAX)
}

/// `floor(sqrt(n))` por busca binária.
pub fn isqrt_u256(n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    let one = U256::from(1u8);
    let mut low = U256::zero();
    let mut high = n;
    while low < high {
        let mid = low + ((high - low + one) >> 1); // ceil((low+high)/2) sem estourar
        // evitar overflow: mid*mid <= n  <=>  mid <= n/mid
        if mid <= n / mid {
            low = mid;
        } else {
            high = mid - one;
        }
    }
    low
}

/// `floor(sqrt(a * b))`, usado no mint inicial de shares.
pub fn isqrt_product(a: u128, b: u128) -> CoreResult<u128> {
    to_u128(isqrt_u256(U256::from(a) * U256::from(b)))
}
