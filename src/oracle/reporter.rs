//! OracleReporter: stake, autorização e reputação de quem reporta preços.
//!
//! - reputação inicial 100; depois `accurate * 100 / total`
//! - multiplicador de recompensa `5000 + reputação * 100` bps (0,5x..1,5x)
use serde::Serialize;

use crate::amm::types::Amount;
use crate::auth::{Address, Timestamp};
use crate::math::{deviation_bps, BPS_SCALE};

use super::types::Price;

const BASE_MULTIPLIER_BPS: u32 = BPS_SCALE / 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleReporter {
    pub address: Address,
    pub reputation_score: u32,
    pub total_submissions: u64,
    pub accurate_submissions: u64,
    pub stake_amount: Amount,
    pub last_submission_time: Timestamp,
    pub is_authorized: bool,
    pub reward_multiplier_bps: u32,
}

impl OracleReporter {
    pub fn new(address: Address, stake_amount: Amount) -> Self {
        Self {
            address,
            reputation_score: 100,
            total_submissions: 0,
            accurate_submissions: 0,
            stake_amount,
            last_submission_time: 0,
            is_authorized: false,
            reward_multiplier_bps: multiplier_for(100),
        }
    }

    /// Conta uma submissão aceita no buffer.
    pub fn record_submission(&mut self, timestamp: Timestamp) {
        self.total_submissions = self.total_submissions.saturating_add(1);
        self.last_submission_time = self.last_submission_time.max(timestamp);
    }

    /// Liquida a participação numa rodada e recalcula reputação e multiplicador.
    pub fn settle(&mut self, accurate: bool) {
        if accurate {
            self.accurate_submissions = self.accurate_submissions.saturating_add(1);
        }
        if self.total_submissions > 0 {
            let score = self.accurate_submissions.saturating_mul(100) / self.total_submissions;
            self.reputation_score = score.min(100) as u32;
        }
        self.reward_multiplier_bps = multiplier_for(self.reputation_score);
    }
}

fn multiplier_for(reputation: u32) -> u32 {
    BASE_MULTIPLIER_BPS + reputation.min(100) * 100
}

/// Submissão "precisa": dentro de `band_bps` do preço publicado.
pub fn is_accurate(submitted: Price, published: Price, band_bps: u32) -> bool {
    published > 0 && deviation_bps(submitted, published) <= u128::from(band_bps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_reporter_defaults() {
        let r = OracleReporter::new(Address::repeat_byte(3), 1_000);
        assert_eq!(r.reputation_score, 100);
        assert!(!r.is_authorized);
        assert_eq!(r.reward_multiplier_bps, 15_000);
    }

    #[test]
    fn reputation_tracks_accuracy() {
        let mut r = OracleReporter::new(Address::repeat_byte(3), 1_000);
        for (i, ok) in [true, false, true, true].into_iter().enumerate() {
            r.record_submission(i as u64);
            r.settle(ok);
        }
        assert_eq!(r.reputation_score, 75);
        assert_eq!(r.reward_multiplier_bps, 12_500);
        assert_eq!(r.last_submission_time, 3);
    }

    #[test]
    fn accuracy_band() {
        assert!(is_accurate(101, 100, 100));
        assert!(!is_accurate(102, 100, 100));
        assert!(!is_accurate(100, 0, 100));
    }
}
