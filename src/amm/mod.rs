pub mod types;         // identificadores, escalas, reservas
pub mod guardrails;    // pré-condições compartilhadas
pub mod error_map;     // inputs de swap -> ErrorCode
pub mod swap;          // curvas (funções puras)
pub mod liquidity;     // mint/burn de shares
pub mod pricing;       // preço spot, impacto, tolerância
pub mod pool;          // ReservePool
pub mod flash;         // flash loan
pub mod registry;      // PoolRegistry (estado compartilhado + eventos)

#[cfg(test)]
mod ref_golden;        // referência racional exata para os testes

pub use flash::{FlashLoan, FlashRepayment, FlashTerms};
pub use pool::{LiquidityReceipt, PoolInfo, PoolParams, ReservePool, SwapReceipt, Withdrawal};
pub use registry::PoolRegistry;
pub use types::{Amount, Bps, CurveKind, PoolId, Reserves, Side, SwapDirection};
