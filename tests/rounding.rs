//! Testes de direção de arredondamento: saídas e shares em floor, taxa do flash loan em ceil.

use liquidity_oracle_core::amm::liquidity::{add_liquidity, initial_mint, remove_liquidity};
use liquidity_oracle_core::amm::pricing::spot_price;
use liquidity_oracle_core::amm::swap::{amount_in, amount_out, constant_product_amount_out};
use liquidity_oracle_core::amm::types::{CurveKind, Reserves, UNIT};
use liquidity_oracle_core::math::{bps_of, bps_of_ceil, deviation_bps};
use liquidity_oracle_core::oracle::aggregation::weighted_price;
use liquidity_oracle_core::oracle::PriceSubmission;
use liquidity_oracle_core::{Address, ErrorCode, U256};

const CP: CurveKind = CurveKind::ConstantProduct;

#[test]
fn r1_amount_out_is_floor_of_continuous_value() {
    let (x, y, dx) = (1_000_000 * UNIT, 1_000_000 * UNIT, 10_000 * UNIT);
    let out = constant_product_amount_out(dx, x, y, 0).unwrap();
    // sem taxa: out = floor(dx*y/(x+dx))
    let exact = U256::from(dx) * U256::from(y) / U256::from(x + dx);
    assert_eq!(U256::from(out), exact);
}

#[test]
fn r2_amount_in_is_minimal() {
    let (x, y, dy) = (1_000_000 * UNIT, 1_000_000 * UNIT, 9_870 * UNIT);
    let dx = amount_in(CP, dy, x, y, 30).unwrap();
    assert!(amount_out(CP, dx, x, y, 30).unwrap() >= dy);
    assert!(amount_out(CP, dx - 1, x, y, 30).unwrap() < dy);
}

#[test]
fn r3_flash_fee_is_ceil_and_bps_is_floor() {
    assert_eq!(bps_of(1_001, 9).unwrap(), 0);
    assert_eq!(bps_of_ceil(1_001, 9).unwrap(), 1);
    assert_eq!(bps_of_ceil(100_000, 9).unwrap(), 90);
}

#[test]
fn r4_mint_is_floor_of_sqrt_xy() {
    assert_eq!(initial_mint(2, 3).unwrap(), 2); // sqrt(6) = 2,44
    assert_eq!(initial_mint(1_000_000, 1_000_000).unwrap(), 1_000_000);
    assert_eq!(initial_mint(0, 5).unwrap_err(), ErrorCode::InvalidAmount);
}

#[test]
fn r5_deposit_shares_floor() {
    // 333 * 1000 / 1000 = 333; b ótimo = floor(333*3000/1000) = 999
    let d = add_liquidity(Reserves::new(1_000, 3_000), 1_000, 333, 1_000).unwrap();
    assert_eq!((d.used_a, d.used_b, d.shares), (333, 999, 333));
    assert_eq!(d.refund_b, 1);
}

#[test]
fn r6_burn_outputs_floor() {
    // 7 * 3 / 10 = 2,1 -> 2 ; 11 * 3 / 10 = 3,3 -> 3
    let (a, b) = remove_liquidity(Reserves::new(7, 11), 3, 10, 1).unwrap();
    assert_eq!((a, b), (2, 3));
}

#[test]
fn r7_spot_price_and_deviation_floor() {
    assert_eq!(spot_price(3, 1).unwrap(), 333_333);
    assert_eq!(deviation_bps(301, 300), 33);
    assert_eq!(deviation_bps(299, 300), 33);
    assert_eq!(deviation_bps(5, 0), 0);
}

#[test]
fn r8_weighted_price_truncates_before_rescale() {
    let sub = |id: u8, price, confidence| PriceSubmission {
        reporter: Address::repeat_byte(id),
        price,
        confidence,
        timestamp: 0,
    };
    // Σp*c = 199*1 + 1*1 = 200 -> floor(200/100)=2 -> 2*100/2 = 100
    assert_eq!(weighted_price(&[sub(1, 199, 1), sub(2, 1, 1)]).unwrap(), 100);
    // Σp*c = 150*1 + 1*1 = 151 -> floor(151/100)=1 -> 1*100/2 = 50 (média exata seria 75,5)
    assert_eq!(weighted_price(&[sub(1, 150, 1), sub(2, 1, 1)]).unwrap(), 50);
}
