//! Núcleo de precificação e liquidação: AMM de reservas pareadas + agregador de oráculo.
//!
//! Convenções numéricas compartilhadas pelos dois subsistemas:
//! - montantes são inteiros sem sinal em ponto fixo (9 casas decimais);
//! - percentuais em basis points (10000 = 100%);
//! - toda divisão trunca em direção a zero.

pub mod error_catalog;
pub mod error;

pub mod math;
pub mod auth;
pub mod events;
pub mod config;
pub mod metrics;
pub mod telemetry;

pub mod amm;
pub mod oracle;

pub use math::U256;
pub use auth::{Address, CallContext};
pub use error::{Error, Result};
pub use error_catalog::ErrorCode;
pub use events::{Event, EventSink, RecordingSink, TracingSink};
