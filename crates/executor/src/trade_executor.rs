use crate::error::ExecutorError;
use crate::wallet::Wallet;
use chrono::{DateTime, TimeDelta, Utc};
use core_types::Trade;
use rust_decimal::Decimal;
use std::fmt;

/// Fractional digits kept when sizing a position.
pub const QUANTITY_PRECISION: u32 = 6;

/// Which exit condition fired for the active trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    MaxDuration,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::MaxDuration => "max_duration",
        };
        f.write_str(text)
    }
}

/// Owns the single active trade and drives it through the wallet.
///
/// At most one trade is active at a time; opening a second one is an error, not a
/// no-op. Once a trade is closed it is handed back to the caller and forgotten.
pub struct TradeExecutor {
    wallet: Box<dyn Wallet>,
    trade_notional: Decimal,
    max_duration: TimeDelta,
    active_trade: Option<Trade>,
}

impl TradeExecutor {
    pub fn new(wallet: Box<dyn Wallet>, trade_notional: Decimal, max_trade_duration_minutes: u32) -> Self {
        Self {
            wallet,
            trade_notional,
            max_duration: TimeDelta::minutes(i64::from(max_trade_duration_minutes)),
            active_trade: None,
        }
    }

    pub fn has_active_trade(&self) -> bool {
        self.active_trade.is_some()
    }

    pub fn active_trade(&self) -> Option<&Trade> {
        self.active_trade.as_ref()
    }

    pub async fn balance(&self) -> Result<Decimal, ExecutorError> {
        self.wallet.balance().await
    }

    /// Quantity = fixed notional / price, rounded to `QUANTITY_PRECISION` digits.
    pub fn calculate_quantity(&self, price: Decimal) -> Result<Decimal, ExecutorError> {
        if price <= Decimal::ZERO {
            return Err(ExecutorError::InvalidPrice(price));
        }
        let quantity = (self.trade_notional / price).round_dp(QUANTITY_PRECISION);
        if quantity.is_zero() {
            return Err(ExecutorError::ZeroQuantity {
                notional: self.trade_notional,
                price,
            });
        }
        Ok(quantity)
    }

    /// Sizes and opens a new trade. Fails if one is already active.
    pub async fn open_trade(
        &mut self,
        symbol: &str,
        market_price: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
    ) -> Result<Trade, ExecutorError> {
        if self.active_trade.is_some() {
            return Err(ExecutorError::ActiveTradeExists);
        }

        let quantity = self.calculate_quantity(market_price)?;
        let trade = self
            .wallet
            .open_trade(symbol, market_price, quantity, take_profit, stop_loss)
            .await?;

        self.active_trade = Some(trade.clone());
        Ok(trade)
    }

    /// The first exit condition that holds at `now`, checked in priority order.
    pub fn exit_reason_at(&self, current_price: Decimal, now: DateTime<Utc>) -> Option<ExitReason> {
        let trade = self.active_trade.as_ref()?;

        if current_price >= trade.take_profit {
            Some(ExitReason::TakeProfit)
        } else if current_price <= trade.stop_loss {
            Some(ExitReason::StopLoss)
        } else if now - trade.opened_at >= self.max_duration {
            Some(ExitReason::MaxDuration)
        } else {
            None
        }
    }

    pub fn should_close_trade(&self, current_price: Decimal) -> bool {
        self.exit_reason_at(current_price, Utc::now()).is_some()
    }

    /// Exits the active trade through the wallet and clears the slot.
    ///
    /// If the wallet fails the trade stays active and can be retried.
    pub async fn close_trade(&mut self, exit_price: Decimal) -> Result<Trade, ExecutorError> {
        let active = self.active_trade.as_ref().ok_or(ExecutorError::NoActiveTrade)?;
        let closed = self.wallet.close_trade(active, exit_price).await?;
        self.active_trade = None;
        Ok(closed)
    }
}
