pub mod types;         // PairId, submissões, feed
pub mod reporter;      // reputação e autorização
pub mod breaker;       // CircuitBreaker
pub mod history;       // HistoryLedger + TWAP
pub mod aggregation;   // AggregationEngine (puro)
pub mod registry;      // PriceFeedRegistry (estado compartilhado + eventos)

pub use aggregation::{AggregationEngine, AggregationParams, Decision, RoundStats};
pub use breaker::{BreakerState, CircuitBreaker};
pub use history::{HistoryBucket, HistoryLedger};
pub use registry::PriceFeedRegistry;
pub use reporter::OracleReporter;
pub use types::{PairId, Price, PriceFeed, PriceSubmission, SubmissionOutcome};
