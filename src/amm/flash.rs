//! Flash loan como capability: o empréstimo mantém `&mut ReservePool` até ser pago.
//!
//! - `fee = ceil(principal * flash_fee_bps / 1e4)`
//! - principal <= `flash_max_bps` da reserva emprestada
//! - `repay(x)` exige `x >= principal + fee`; qualquer outra saída (erro ou drop)
//!   devolve o principal à reserva, deixando o pool como estava.
use tracing::warn;

use crate::auth::Timestamp;
use crate::error::Result;
use crate::error_catalog::ErrorCode;
use crate::math::{bps_of, bps_of_ceil};

use super::guardrails::{checked_add, ensure_nonzero};
use super::pool::ReservePool;
use super::types::{Amount, Reserves, Side};

/// Termos de um empréstimo em curso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashTerms {
    pub side: Side,
    pub principal: Amount,
    pub fee: Amount,
}

impl FlashTerms {
    pub fn amount_due(&self) -> Amount {
        self.principal.saturating_add(self.fee)
    }
}

/// Comprovante de um flash loan liquidado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashRepayment {
    pub side: Side,
    pub principal: Amount,
    /// `repaid - principal` (>= taxa nominal).
    pub fee: Amount,
}

#[must_use = "um flash loan descartado sem repay é revertido"]
pub struct FlashLoan<'p> {
    pool: &'p mut ReservePool,
    terms: FlashTerms,
    now: Timestamp,
    settled: bool,
}

impl ReservePool {
    /// Retira `amount` do lado `side`. O pool fica inacessível até o `FlashLoan` acabar.
    pub fn flash_borrow(&mut self, side: Side, amount: Amount, now: Timestamp) -> Result<FlashLoan<'_>> {
        ensure_nonzero(amount)?;
        let reserve = self.reserve(side);
        let max = bps_of(reserve, self.defaults.flash_max_bps)?;
        if amount > max {
            crate::core_bail!(ErrorCode::InsufficientLiquidity, amount => amount, max => max, reserve => reserve);
        }
        let fee = bps_of_ceil(amount, self.defaults.flash_fee_bps)?;
        let remaining = reserve - amount;
        self.reserves = with_side(self.reserves, side, remaining);
        Ok(FlashLoan {
            pool: self,
            terms: FlashTerms { side, principal: amount, fee },
            now,
            settled: false,
        })
    }
}

fn with_side(r: Reserves, side: Side, value: Amount) -> Reserves {
    match side {
        Side::A => Reserves::new(value, r.b),
        Side::B => Reserves::new(r.a, value),
    }
}

impl FlashLoan<'_> {
    pub fn terms(&self) -> FlashTerms {
        self.terms
    }

    /// Paga o empréstimo. Falha `InsufficientRepayment` se `amount < principal + fee`;
    /// nesse caso o drop restaura a reserva.
    pub fn repay(mut self, amount: Amount) -> Result<FlashRepayment> {
        let due = self.terms.amount_due();
        if amount < due {
            crate::core_bail!(ErrorCode::InsufficientRepayment, repaid => amount, due => due);
        }
        let side = self.terms.side;
        let current = self.pool.reserve(side);
        let next = with_side(self.pool.reserves, side, checked_add(current, amount)?);
        let now = self.now;
        // devolve o principal antes do commit para o acumulador usar o preço pré-empréstimo
        self.restore();
        self.pool.commit(next, now)?;
        Ok(FlashRepayment {
            side,
            principal: self.terms.principal,
            fee: amount - self.terms.principal,
        })
    }

    fn restore(&mut self) {
        if self.settled {
            return;
        }
        let side = self.terms.side;
        let back = self.pool.reserve(side).saturating_add(self.terms.principal);
        self.pool.reserves = with_side(self.pool.reserves, side, back);
        self.settled = true;
    }
}

impl Drop for FlashLoan<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(pool = %self.pool.id(), principal = self.terms.principal, "flash loan não pago; reserva restaurada");
            self.restore();
        }
    }
}

// -------------------------
// TESTES
// -------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::pool::PoolParams;
    use crate::amm::types::PoolId;
    use crate::auth::Address;
    use crate::config::PoolDefaults;

    fn pool() -> ReservePool {
        ReservePool::initialize(
            PoolId::from("A/B"),
            PoolParams::constant_product(30),
            Address::repeat_byte(1),
            1_000_000,
            1_000_000,
            0,
            PoolDefaults::default(),
        )
        .unwrap()
    }

    #[test]
    fn t_fee_is_ceil_of_nine_bps() {
        let mut p = pool();
        let loan = p.flash_borrow(Side::A, 100_000, 1).unwrap();
        assert_eq!(loan.terms().fee, 90);
        assert_eq!(loan.terms().amount_due(), 100_090);
        drop(loan);

        let loan = p.flash_borrow(Side::A, 1_001, 1).unwrap();
        // 1001 * 9 / 1e4 = 0,9009 -> 1
        assert_eq!(loan.terms().fee, 1);
    }

    #[test]
    fn t_reserve_is_lent_during_loan() {
        let mut p = pool();
        let loan = p.flash_borrow(Side::B, 50_000, 1).unwrap();
        assert_eq!(loan.pool.reserve(Side::B), 950_000);
        let receipt = loan.repay(50_045).unwrap();
        assert_eq!(receipt.fee, 45);
        assert_eq!(p.reserve(Side::B), 1_000_045);
        assert_eq!(p.reserve(Side::A), 1_000_000);
    }

    #[test]
    fn t_short_repay_rolls_back() {
        let mut p = pool();
        let before = p.info();
        let err = p.flash_borrow(Side::A, 100_000, 5).unwrap().repay(100_089).unwrap_err();
        assert_eq!(err, ErrorCode::InsufficientRepayment);
        assert_eq!(p.info(), before);
    }

    #[test]
    fn t_drop_without_repay_rolls_back() {
        let mut p = pool();
        let before = p.info();
        {
            let _loan = p.flash_borrow(Side::A, 10_000, 5).unwrap();
        }
        assert_eq!(p.info(), before);
    }

    #[test]
    fn t_borrow_above_cap_rejected() {
        let mut p = pool();
        let err = p.flash_borrow(Side::A, 100_001, 1).err().unwrap();
        assert_eq!(err, ErrorCode::InsufficientLiquidity);
        let err = p.flash_borrow(Side::A, 0, 1).err().unwrap();
        assert_eq!(err, ErrorCode::InvalidAmount);
    }
}
