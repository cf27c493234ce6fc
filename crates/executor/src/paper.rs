use crate::error::ExecutorError;
use crate::wallet::Wallet;
use async_trait::async_trait;
use chrono::Utc;
use configuration::WalletConfig;
use core_types::Trade;
use rust_decimal::Decimal;
use uuid::Uuid;

/// The "virtual exchange" for paper trading.
///
/// Fills happen at the requested price moved against the trader by `slippage_rate`,
/// and every fill pays `fee_rate` of its notional. Only one position may be open.
#[derive(Debug, Clone)]
pub struct PaperWallet {
    balance: Decimal,
    fee_rate: Decimal,
    slippage_rate: Decimal,
    open_trade_id: Option<Uuid>,
}

impl PaperWallet {
    pub fn new(params: &WalletConfig) -> Self {
        Self {
            balance: params.starting_balance,
            fee_rate: params.fee_rate,
            slippage_rate: params.slippage_rate,
            open_trade_id: None,
        }
    }
}

#[async_trait]
impl Wallet for PaperWallet {
    async fn balance(&self) -> Result<Decimal, ExecutorError> {
        Ok(self.balance)
    }

    async fn open_trade(
        &mut self,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
        take_profit: Decimal,
        stop_loss: Decimal,
    ) -> Result<Trade, ExecutorError> {
        if self.open_trade_id.is_some() {
            return Err(ExecutorError::ActiveTradeExists);
        }
        if price <= Decimal::ZERO {
            return Err(ExecutorError::InvalidPrice(price));
        }

        // For a buy, slippage makes the price HIGHER (worse).
        let entry_price = price * (Decimal::ONE + self.slippage_rate);
        let cost = entry_price * quantity;
        let fee = cost * self.fee_rate;
        let total_cost = cost + fee;

        if total_cost > self.balance {
            return Err(ExecutorError::InsufficientBalance {
                required: total_cost,
                available: self.balance,
            });
        }
        self.balance -= total_cost;

        let trade = Trade::open(symbol, entry_price, quantity, take_profit, stop_loss, Utc::now());
        self.open_trade_id = Some(trade.trade_id);

        tracing::debug!(
            symbol,
            %entry_price,
            %quantity,
            %fee,
            balance = %self.balance,
            "PaperWallet: position opened."
        );
        Ok(trade)
    }

    async fn close_trade(&mut self, trade: &Trade, exit_price: Decimal) -> Result<Trade, ExecutorError> {
        if self.open_trade_id.is_none() {
            return Err(ExecutorError::NoActiveTrade);
        }
        if exit_price <= Decimal::ZERO {
            return Err(ExecutorError::InvalidPrice(exit_price));
        }

        // For a sell, slippage makes the price LOWER (worse).
        let adjusted_exit_price = exit_price * (Decimal::ONE - self.slippage_rate);
        let gross_value = adjusted_exit_price * trade.quantity;
        let fee = gross_value * self.fee_rate;
        let net_value = gross_value - fee;
        let pnl = net_value - trade.entry_price * trade.quantity;

        let mut closed = trade.clone();
        closed.close(adjusted_exit_price, pnl, Utc::now())?;

        self.balance += net_value;
        self.open_trade_id = None;

        tracing::debug!(
            symbol = %closed.symbol,
            exit_price = %adjusted_exit_price,
            %fee,
            %pnl,
            balance = %self.balance,
            "PaperWallet: position closed."
        );
        Ok(closed)
    }
}
