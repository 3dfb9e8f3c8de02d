//! CircuitBreaker por par.
//!
//! NORMAL -> TRIPPED quando uma rodada desvia mais que o limiar de disparo.
//! TRIPPED -> NORMAL por reset do admin ou por uma rodada publicada com preço dentro
//! da faixa de reset em torno de `last_normal_price`.
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::Timestamp;
use crate::math::deviation_bps;

use super::types::Price;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Normal,
    Tripped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitBreaker {
    pub is_triggered: bool,
    pub trigger_price: Price,
    pub trigger_timestamp: Timestamp,
    pub reset_deviation_threshold_bps: u32,
    pub consecutive_anomalies: u32,
    pub last_normal_price: Price,
}

impl CircuitBreaker {
    pub fn new(reset_deviation_threshold_bps: u32) -> Self {
        Self {
            is_triggered: false,
            trigger_price: 0,
            trigger_timestamp: 0,
            reset_deviation_threshold_bps,
            consecutive_anomalies: 0,
            last_normal_price: 0,
        }
    }

    pub fn state(&self) -> BreakerState {
        if self.is_triggered {
            BreakerState::Tripped
        } else {
            BreakerState::Normal
        }
    }

    /// Com o breaker armado, só entram submissões dentro da faixa de reset.
    pub fn admits(&self, price: Price) -> bool {
        if !self.is_triggered || self.last_normal_price == 0 {
            return true;
        }
        deviation_bps(price, self.last_normal_price) <= u128::from(self.reset_deviation_threshold_bps)
    }

    pub fn trip(&mut self, price: Price, now: Timestamp) {
        self.is_triggered = true;
        self.trigger_price = price;
        self.trigger_timestamp = now;
        self.consecutive_anomalies = self.consecutive_anomalies.saturating_add(1);
        warn!(price, anomalies = self.consecutive_anomalies, "circuit breaker disparado");
    }

    /// Registra uma publicação. Devolve `true` se isso rearmou um breaker disparado.
    pub fn record_normal(&mut self, price: Price) -> bool {
        self.last_normal_price = price;
        self.reset()
    }

    /// Força NORMAL. Devolve `true` se estava disparado.
    pub fn reset(&mut self) -> bool {
        let was = self.is_triggered;
        self.is_triggered = false;
        self.consecutive_anomalies = 0;
        if was {
            info!(last_normal_price = self.last_normal_price, "circuit breaker rearmado");
        }
        was
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_then_self_heal() {
        let mut b = CircuitBreaker::new(1_000);
        b.record_normal(100);
        assert!(b.admits(125));

        b.trip(125, 10);
        assert_eq!(b.state(), BreakerState::Tripped);
        assert_eq!(b.consecutive_anomalies, 1);
        assert!(!b.admits(125));
        assert!(b.admits(104));
        assert!(b.admits(110));
        assert!(!b.admits(111));

        assert!(b.record_normal(104));
        assert_eq!(b.state(), BreakerState::Normal);
        assert_eq!(b.consecutive_anomalies, 0);
        assert_eq!(b.last_normal_price, 104);
    }

    #[test]
    fn repeated_trips_count_anomalies() {
        let mut b = CircuitBreaker::new(1_000);
        b.trip(10, 1);
        b.trip(11, 2);
        assert_eq!(b.consecutive_anomalies, 2);
        assert_eq!(b.trigger_price, 11);
        assert!(b.reset());
        assert!(!b.reset());
    }
}
