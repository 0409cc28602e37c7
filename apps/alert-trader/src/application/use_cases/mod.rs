//! Application Use Cases
//!
//! Use cases orchestrate domain logic and ports to fulfill business operations.

mod recheck;
mod submit_pair_trade;
mod take_profit;

pub use recheck::{RecheckOutcome, RecheckUseCase};
pub use submit_pair_trade::{
    ClosedLeg, OpenedLeg, OrchestratorState, PairTradeCommand, PairTradeOutcome,
    SubmitPairTradeUseCase, TradingSettings,
};
pub use take_profit::{TakeProfitOrder, TakeProfitUseCase};
