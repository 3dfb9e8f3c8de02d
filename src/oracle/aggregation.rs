//! AggregationEngine: transforma o buffer de uma rodada em publicar-ou-disparar.
//!
//! Algoritmo (truncamento em cada passo faz parte do contrato observável):
//! 1. descarta submissões mais velhas que `stale_threshold_secs`; menos que
//!    `min_sources` frescas => `InsufficientDataSources`;
//! 2. `weighted = floor(Σ(p*c) / 100) * 100 / Σc`;
//! 3. `confidence = floor(Σc / n)`;
//! 4. `deviation = floor(|new - old| * 1e4 / old)`, 0 sem preço anterior;
//! 5. breaker habilitado e `deviation > trip_threshold_bps` => Trip, senão Publish.
use crate::auth::Timestamp;
use crate::config::OracleSettings;
use crate::error::Result;
use crate::error_catalog::ErrorCode;
use crate::math::{deviation_bps, to_u128, U256};

use super::types::{Price, PriceSubmission};

/// Números de uma rodada já filtrada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundStats {
    pub price: Price,
    pub confidence: u8,
    pub source_count: u32,
    pub deviation_bps: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Publish(RoundStats),
    Trip(RoundStats),
}

impl Decision {
    pub fn stats(&self) -> &RoundStats {
        match self {
            Decision::Publish(s) | Decision::Trip(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationParams {
    pub min_sources: usize,
    pub stale_threshold_secs: u64,
    pub trip_threshold_bps: u32,
    pub breaker_enabled: bool,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self::from(&OracleSettings::default())
    }
}

impl From<&OracleSettings> for AggregationParams {
    fn from(s: &OracleSettings) -> Self {
        Self {
            min_sources: s.min_sources,
            stale_threshold_secs: s.stale_threshold_secs,
            trip_threshold_bps: s.trip_threshold_bps,
            breaker_enabled: s.breaker_enabled,
        }
    }
}

pub struct AggregationEngine {
    params: AggregationParams,
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self { params: AggregationParams::default() }
    }

    pub fn with_params(params: AggregationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AggregationParams {
        &self.params
    }

    /// Carimbos no futuro nunca contam como frescos.
    pub fn is_fresh(&self, sub: &PriceSubmission, now: Timestamp) -> bool {
        sub.timestamp <= now && now - sub.timestamp <= self.params.stale_threshold_secs
    }

    /// Submissões dentro da janela de frescor.
    pub fn filter_fresh(&self, subs: &[PriceSubmission], now: Timestamp) -> Vec<PriceSubmission> {
        subs.iter().filter(|s| self.is_fresh(s, now)).copied().collect()
    }

    /// Executa a rodada sobre `subs` contra o último preço publicado `previous`.
    pub fn run_round(&self, subs: &[PriceSubmission], previous: Price, now: Timestamp) -> Result<Decision> {
        let fresh = self.filter_fresh(subs, now);
        if fresh.len() < self.params.min_sources {
            crate::core_bail!(ErrorCode::InsufficientDataSources,
                fresh => fresh.len(),
                buffered => subs.len(),
                min_sources => self.params.min_sources);
        }

        let price = weighted_price(&fresh)?;
        let stats = RoundStats {
            price,
            confidence: average_confidence(&fresh),
            source_count: u32::try_from(fresh.len()).unwrap_or(u32::MAX),
            deviation_bps: deviation_bps(price, previous),
        };
        tracing::debug!(price, confidence = stats.confidence, sources = stats.source_count,
            deviation_bps = stats.deviation_bps, "rodada agregada");

        if self.params.breaker_enabled && stats.deviation_bps > u128::from(self.params.trip_threshold_bps) {
            return Ok(Decision::Trip(stats));
        }
        Ok(Decision::Publish(stats))
    }
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `floor(Σ(p*c) / 100) * 100 / Σc`; com `Σc = 0` cai para a média aritmética.
pub fn weighted_price(subs: &[PriceSubmission]) -> Result<Price> {
    if subs.is_empty() {
        crate::core_bail!(ErrorCode::InsufficientDataSources, fresh => 0);
    }
    let mut weighted = U256::zero();
    let mut total_conf = U256::zero();
    let mut plain = U256::zero();
    for s in subs {
        let c = U256::from(s.confidence);
        weighted = weighted + U256::from(s.price) * c;
        total_conf = total_conf + c;
        plain = plain + U256::from(s.price);
    }
    if total_conf.is_zero() {
        return to_u128(plain / U256::from(subs.len()));
    }
    let hundred = U256::from(100u8);
    to_u128((weighted / hundred) * hundred / total_conf)
}

/// `floor(Σc / n)`, sempre em 0..=100.
pub fn average_confidence(subs: &[PriceSubmission]) -> u8 {
    if subs.is_empty() {
        return 0;
    }
    let total: u64 = subs.iter().map(|s| u64::from(s.confidence)).sum();
    (total / subs.len() as u64).min(100) as u8
}
