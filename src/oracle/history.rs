//! HistoryLedger: buckets horários (OHLC + preço ponderado) com despejo FIFO.
//!
//! Rodadas dentro da mesma hora atualizam o bucket corrente; uma hora nova
//! acrescenta um bucket e, na capacidade, descarta o mais antigo.
use std::collections::VecDeque;

use serde::Serialize;

use crate::auth::Timestamp;
use crate::math::U256;

use super::types::Price;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryBucket {
    /// Início do bucket (múltiplo de `bucket_secs`).
    pub timestamp: Timestamp,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    /// Nº de rodadas publicadas no bucket.
    pub volume: u64,
    /// Média das rodadas do bucket (floor).
    pub weighted_price: Price,
}

impl HistoryBucket {
    fn opened(timestamp: Timestamp, price: Price) -> Self {
        Self {
            timestamp,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1,
            weighted_price: price,
        }
    }

    fn absorb(&mut self, price: Price) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        let n = U256::from(self.volume);
        let total = U256::from(self.weighted_price) * n + U256::from(price);
        // média de valores <= u128::MAX cabe em u128
        self.weighted_price = (total / (n + U256::from(1u8))).low_u128();
        self.volume = self.volume.saturating_add(1);
    }
}

#[derive(Debug, Clone)]
pub struct HistoryLedger {
    buckets: VecDeque<HistoryBucket>,
    capacity: usize,
    bucket_secs: u64,
}

impl HistoryLedger {
    pub fn new(capacity: usize, bucket_secs: u64) -> Self {
        Self {
            buckets: VecDeque::with_capacity(capacity.min(1_024)),
            capacity: capacity.max(1),
            bucket_secs: bucket_secs.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&HistoryBucket> {
        self.buckets.back()
    }

    /// Buckets do mais antigo ao mais novo.
    pub fn buckets(&self) -> Vec<HistoryBucket> {
        self.buckets.iter().copied().collect()
    }

    pub fn record(&mut self, price: Price, now: Timestamp) {
        let start = now - now % self.bucket_secs;
        if let Some(last) = self.buckets.back_mut() {
            if start <= last.timestamp {
                last.absorb(price);
                return;
            }
        }
        if self.buckets.len() == self.capacity {
            self.buckets.pop_front();
        }
        self.buckets.push_back(HistoryBucket::opened(start, price));
    }

    /// Média simples de `weighted_price` nos últimos `window` buckets; 0 sem histórico.
    pub fn twap(&self, window: usize) -> Price {
        let recent = self.buckets.iter().rev().take(window.max(1));
        let (sum, n) = recent.fold((U256::zero(), 0u64), |(s, n), b| {
            (s + U256::from(b.weighted_price), n + 1)
        });
        if n == 0 {
            return 0;
        }
        (sum / U256::from(n)).low_u128()
    }

    /// Média ponderada por `volume` nos últimos `window` buckets.
    pub fn volume_weighted(&self, window: usize) -> Price {
        let recent = self.buckets.iter().rev().take(window.max(1));
        let (sum, vol) = recent.fold((U256::zero(), U256::zero()), |(s, v), b| {
            let w = U256::from(b.volume);
            (s + U256::from(b.weighted_price) * w, v + w)
        });
        if vol.is_zero() {
            return 0;
        }
        (sum / vol).low_u128()
    }
}
