//! Tipos do oráculo: par, submissão, feed publicado e desfechos de submissão.
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::{Address, Timestamp};

/// Preço inteiro na escala definida pelos reporters do par.
pub type Price = u128;

/// Identificador do par (ex.: `"SOL/USDC"`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairId(pub String);

impl PairId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PairId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Observação de um reporter; vive só até a rodada agregar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceSubmission {
    pub reporter: Address,
    pub price: Price,
    /// 0..=100
    pub confidence: u8,
    pub timestamp: Timestamp,
}

/// Último preço publicado do par. Só muda numa rodada publicada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceFeed {
    pub current_price: Price,
    pub confidence: u8,
    pub last_update_time: Timestamp,
    pub source_count: u32,
    pub twap: Price,
    /// Média dos buckets da janela do TWAP ponderada pelo nº de observações.
    pub volume_weighted_price: Price,
    pub is_active: bool,
}

impl PriceFeed {
    pub const fn empty() -> Self {
        Self {
            current_price: 0,
            confidence: 0,
            last_update_time: 0,
            source_count: 0,
            twap: 0,
            volume_weighted_price: 0,
            is_active: true,
        }
    }

    pub fn has_price(&self) -> bool {
        self.current_price > 0
    }
}

/// O que aconteceu com uma chamada de `submit_price` bem-sucedida.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Entrou no buffer; quórum ainda não atingido.
    Buffered { pending: usize },
    /// Breaker armado e preço fora da faixa de reset: não conta para o quórum.
    Excluded,
    /// Rodada publicou um novo preço.
    Published { price: Price, deviation_bps: u128 },
    /// Rodada disparou o breaker; feed intacto.
    Tripped { trigger_price: Price, deviation_bps: u128 },
}

impl SubmissionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buffered { .. } => "buffered",
            Self::Excluded => "excluded",
            Self::Published { .. } => "published",
            Self::Tripped { .. } => "tripped",
        }
    }
}
