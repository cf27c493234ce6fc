use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single OHLCV bar as returned by the market-data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Best bid / best ask at the time of the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: Decimal,
    pub ask: Decimal,
}

/// Derived indicators for one symbol, captured once per poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    /// The close of the most recent bar.
    pub price: Decimal,
    pub ema_9: Decimal,
    pub ema_21: Decimal,
    pub vwap: Decimal,
    pub volume_ratio: Decimal,
    /// Bid-ask spread as a percentage of the bid.
    pub spread_pct: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// A single long position from entry to exit.
///
/// The exit fields stay `None` while the trade is open and are populated
/// exactly once by [`Trade::close`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: Uuid,
    pub symbol: String,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub take_profit: Decimal,
    pub stop_loss: Decimal,
    pub opened_at: DateTime<Utc>,
    pub exit_price: Option<Decimal>,
    pub closed_at: Option<DateTime<Utc>>,
    pub pnl: Option<Decimal>,
}

impl Trade {
    /// Creates a new open trade with a fresh id.
    pub fn open(
        symbol: impl Into<String>,
        entry_price: Decimal,
        quantity: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            trade_id: Uuid::new_v4(),
            symbol: symbol.into(),
            entry_price,
            quantity,
            take_profit,
            stop_loss,
            opened_at,
            exit_price: None,
            closed_at: None,
            pnl: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Records the exit of the trade. Fails if the trade was already closed.
    pub fn close(
        &mut self,
        exit_price: Decimal,
        pnl: Decimal,
        closed_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if !self.is_open() {
            return Err(CoreError::AlreadyClosed(self.trade_id));
        }
        self.exit_price = Some(exit_price);
        self.pnl = Some(pnl);
        self.closed_at = Some(closed_at);
        Ok(())
    }

    /// Realized P&L, or zero while the trade is still open.
    pub fn realized_pnl(&self) -> Decimal {
        self.pnl.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn closing_a_trade_twice_is_rejected() {
        let mut trade = Trade::open("BTCUSDT", dec!(100), dec!(0.4), dec!(100.9), dec!(99.35), Utc::now());
        assert!(trade.is_open());
        assert_eq!(trade.realized_pnl(), Decimal::ZERO);

        trade.close(dec!(101), dec!(0.35), Utc::now()).unwrap();
        assert!(!trade.is_open());
        assert_eq!(trade.realized_pnl(), dec!(0.35));

        let err = trade.close(dec!(102), dec!(1), Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyClosed(id) if id == trade.trade_id));
        assert_eq!(trade.exit_price, Some(dec!(101)));
    }
}
