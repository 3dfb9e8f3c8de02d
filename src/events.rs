//! Notificações observáveis, emitidas exatamente uma vez por transição bem-sucedida.
//!
//! Nenhuma chamada que falha emite evento: quem emite é sempre o registro, depois do commit.
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::amm::types::{Amount, Bps, PoolId, Side, SwapDirection};
use crate::auth::{Address, Timestamp};
use crate::oracle::types::{PairId, Price};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    PriceUpdated {
        pair: PairId,
        new_price: Price,
        old_price: Price,
        confidence: u8,
        source_count: u32,
        deviation_bps: u128,
        timestamp: Timestamp,
    },
    CircuitBreakerTriggered {
        pair: PairId,
        trigger_price: Price,
        previous_price: Price,
        deviation_bps: u128,
        timestamp: Timestamp,
    },
    CircuitBreakerReset {
        pair: PairId,
        manual: bool,
        timestamp: Timestamp,
    },
    SwapExecuted {
        pool: PoolId,
        direction: SwapDirection,
        amount_in: Amount,
        amount_out: Amount,
        fee_amount: Amount,
        price_impact_bps: Bps,
    },
    LiquidityAdded {
        pool: PoolId,
        provider: Address,
        amount_a: Amount,
        amount_b: Amount,
        lp_minted: Amount,
    },
    LiquidityRemoved {
        pool: PoolId,
        provider: Address,
        amount_a: Amount,
        amount_b: Amount,
        lp_burned: Amount,
    },
    FlashLoanRepaid {
        pool: PoolId,
        side: Side,
        principal: Amount,
        fee: Amount,
    },
    ReporterRegistered {
        reporter: Address,
        stake: Amount,
    },
}

impl Event {
    /// Nome estável do evento, usado como rótulo em logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::PriceUpdated { .. } => "price_updated",
            Event::CircuitBreakerTriggered { .. } => "circuit_breaker_triggered",
            Event::CircuitBreakerReset { .. } => "circuit_breaker_reset",
            Event::SwapExecuted { .. } => "swap_executed",
            Event::LiquidityAdded { .. } => "liquidity_added",
            Event::LiquidityRemoved { .. } => "liquidity_removed",
            Event::FlashLoanRepaid { .. } => "flash_loan_repaid",
            Event::ReporterRegistered { .. } => "reporter_registered",
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"event\":\"{}\"}}", self.name()))
    }
}

/// Destino fire-and-forget dos eventos.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Publica cada evento como log estruturado.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: Event) {
        tracing::info!(target: "liquidity_oracle_core::events", event = event.name(), payload = %event.to_json());
    }
}

/// Acumula eventos em memória (testes e inspeção).
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Esvazia e devolve o que foi registrado até aqui.
    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}
