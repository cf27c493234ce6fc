use crate::error::ExecutorError;
use async_trait::async_trait;
use core_types::Trade;
use rust_decimal::Decimal;

/// The fill side of trade execution.
///
/// A wallet turns the executor's intent into a realized `Trade`: it applies fees and
/// slippage (simulated or real), moves the balance and computes P&L on exit. The
/// `TradeExecutor` is agnostic about whether it talks to a simulation or an exchange.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Available balance in the quote currency.
    async fn balance(&self) -> Result<Decimal, ExecutorError>;

    /// Buys `quantity` of `symbol` around `price` and returns the opened trade.
    async fn open_trade(
        &mut self,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
    ) -> Result<Trade, ExecutorError>;

    /// Sells the position behind `trade` around `exit_price` and returns the closed trade.
    ///
    /// `trade` itself is left untouched so a failed exit does not lose the position.
    async fn close_trade(&mut self, trade: &Trade, exit_price: Decimal) -> Result<Trade, ExecutorError>;
}
