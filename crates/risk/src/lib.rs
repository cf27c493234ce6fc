//! # Scalper Risk Crate
//!
//! The daily risk gate that decides whether a new trade may be opened. It tracks
//! realized P&L and trade count for the current UTC day, enforces the trading-hour
//! window and imposes a cooldown after every losing trade.
//!
//! State resets lazily: the first check after the UTC date changes clears the
//! counters. There is no background timer.

pub mod daily_manager;
pub mod error;

pub use daily_manager::{BlockReason, DailyRiskManager, RiskDecision};
pub use error::RiskError;

use rust_decimal::Decimal;

/// The interface the trading engine uses to consult and update risk state.
pub trait RiskManager: Send + Sync {
    /// Decides whether a new trade may be opened right now.
    fn can_trade(&mut self) -> RiskDecision;

    /// Accounts for a closed trade's realized P&L.
    fn record_trade_result(&mut self, pnl: Decimal);

    /// True once the daily loss cap has been hit. Advisory only.
    fn should_stop_bot(&self) -> bool;
}
