//! Flash loans: limite de 10%, taxa de 9 bps (ceil) e rollback quando não pago.
use liquidity_oracle_core::amm::{PoolId, PoolParams, PoolRegistry, ReservePool, Side};
use liquidity_oracle_core::config::PoolDefaults;
use liquidity_oracle_core::{Address, CallContext, ErrorCode, Event, RecordingSink};

const ADMIN: Address = Address::repeat_byte(0xAA);

fn pool() -> ReservePool {
    ReservePool::initialize(
        PoolId::from("A/B"),
        PoolParams::constant_product(30),
        ADMIN,
        1_000_000,
        1_000_000,
        0,
        PoolDefaults::default(),
    )
    .unwrap()
}

#[test]
fn ten_percent_loan_needs_100_090() {
    let mut p = pool();
    let before = p.info();
    let k0 = p.reserves().k();

    let loan = p.flash_borrow(Side::A, 100_000, 1).unwrap();
    assert_eq!(loan.terms().amount_due(), 100_090);
    let err = loan.repay(100_089).unwrap_err();
    assert_eq!(err, ErrorCode::InsufficientRepayment);
    assert_eq!(p.info(), before);

    let loan = p.flash_borrow(Side::A, 100_000, 1).unwrap();
    let receipt = loan.repay(100_090).unwrap();
    assert_eq!((receipt.principal, receipt.fee), (100_000, 90));
    assert_eq!(p.reserve(Side::A), 1_000_090);
    assert!(p.reserves().k() > k0);
}

#[test]
fn cap_is_ten_percent_of_the_borrowed_side() {
    let mut p = pool();
    assert!(p.flash_borrow(Side::B, 100_000, 1).is_ok());
    assert_eq!(p.reserve(Side::B), 1_000_000);
    let err = p.flash_borrow(Side::B, 100_001, 1).err().unwrap();
    assert_eq!(err, ErrorCode::InsufficientLiquidity);
}

#[test]
fn overpayment_is_kept_by_pool() {
    let mut p = pool();
    let r = p.flash_borrow(Side::B, 1_000, 1).unwrap().repay(1_500).unwrap();
    assert_eq!(r.fee, 500);
    assert_eq!(p.reserve(Side::B), 1_000_500);
}

#[test]
fn registry_emits_once_and_only_on_success() {
    let sink = RecordingSink::new();
    let reg = PoolRegistry::new(ADMIN, PoolDefaults::default(), sink.clone()).unwrap();
    let id = PoolId::from("A/B");
    reg.initialize_pool(&CallContext::new(ADMIN, 0), id.clone(), PoolParams::constant_product(30), 1_000_000, 1_000_000)
        .unwrap();
    sink.take();

    let ctx = CallContext::new(Address::repeat_byte(5), 10);
    reg.flash_loan(&ctx, &id, Side::A, 100_000, |terms| {
        assert_eq!(terms.principal, 100_000);
        Ok(terms.amount_due() - 1)
    })
    .unwrap_err();
    assert!(sink.is_empty());

    reg.flash_loan(&ctx, &id, Side::A, 100_000, |terms| Ok(terms.amount_due())).unwrap();
    let events = sink.take();
    assert!(matches!(
        events[..],
        [Event::FlashLoanRepaid { side: Side::A, principal: 100_000, fee: 90, .. }]
    ));
}
