use crate::error::ExecutorError;
use crate::wallet::Wallet;
use api_client::OrderGateway;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{OrderSide, Trade};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// All configured symbols are quoted in this asset.
pub const QUOTE_ASSET: &str = "USDT";

/// The "live" wallet that sends real market orders to the exchange.
///
/// Prices, fees and P&L come from the exchange's fill report rather than a model.
/// `fee_rate` is only used to estimate the cost of a buy before it is sent.
pub struct LiveWallet {
    gateway: Arc<dyn OrderGateway>,
    quote_asset: String,
    fee_rate: Decimal,
    open_trade_id: Option<Uuid>,
}

impl LiveWallet {
    pub fn new(gateway: Arc<dyn OrderGateway>, fee_rate: Decimal) -> Self {
        Self {
            gateway,
            quote_asset: QUOTE_ASSET.to_string(),
            fee_rate,
            open_trade_id: None,
        }
    }

    fn base_asset<'a>(&self, symbol: &'a str) -> &'a str {
        symbol.strip_suffix(self.quote_asset.as_str()).unwrap_or(symbol)
    }
}

#[async_trait]
impl Wallet for LiveWallet {
    async fn balance(&self) -> Result<Decimal, ExecutorError> {
        Ok(self.gateway.free_balance(&self.quote_asset).await?)
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

        let estimated_cost = price * quantity * (Decimal::ONE + self.fee_rate);
        let available = self.balance().await?;
        if estimated_cost > available {
            return Err(ExecutorError::InsufficientBalance {
                required: estimated_cost,
                available,
            });
        }

        let response = self
            .gateway
            .place_market_order(symbol, OrderSide::Buy, quantity)
            .await?;
        let entry_price = response
            .average_price()
            .ok_or_else(|| ExecutorError::Unfilled(symbol.to_string()))?;

        // A commission taken in the base asset reduces what we actually hold.
        let held = response.executed_qty - response.commission_in(self.base_asset(symbol));

        let trade = Trade::open(symbol, entry_price, held, take_profit, stop_loss, Utc::now());
        self.open_trade_id = Some(trade.trade_id);

        tracing::info!(
            symbol,
            order_id = response.order_id,
            %entry_price,
            quantity = %held,
            "LiveWallet: buy order filled."
        );
        Ok(trade)
    }

    async fn close_trade(&mut self, trade: &Trade, exit_price: Decimal) -> Result<Trade, ExecutorError> {
        if self.open_trade_id.is_none() {
            return Err(ExecutorError::NoActiveTrade);
        }

        let response = self
            .gateway
            .place_market_order(&trade.symbol, OrderSide::Sell, trade.quantity)
            .await?;
        let fill_price = response
            .average_price()
            .ok_or_else(|| ExecutorError::Unfilled(trade.symbol.clone()))?;

        let fee = response.commission_in(&self.quote_asset);
        let net_value = response.cummulative_quote_qty - fee;
        let pnl = net_value - trade.entry_price * trade.quantity;

        let mut closed = trade.clone();
        closed.close(fill_price, pnl, Utc::now())?;
        self.open_trade_id = None;

        tracing::info!(
            symbol = %trade.symbol,
            order_id = response.order_id,
            requested_price = %exit_price,
            %fill_price,
            %pnl,
            "LiveWallet: sell order filled."
        );
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::error::ApiError;
    use api_client::{Fill, OrderResponse};
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    /// Fills every order at a fixed price and records what was sent.
    struct FixedPriceGateway {
        price: Decimal,
        balance: Decimal,
        orders: Mutex<Vec<(OrderSide, Decimal)>>,
    }

    #[async_trait]
    impl OrderGateway for FixedPriceGateway {
        async fn place_market_order(
            &self,
            symbol: &str,
            side: OrderSide,
            quantity: Decimal,
        ) -> Result<OrderResponse, ApiError> {
            self.orders.lock().unwrap().push((side, quantity));
            let quote_qty = self.price * quantity;
            let (commission, commission_asset) = match side {
                OrderSide::Buy => (quantity * dec!(0.001), "BTC"),
                OrderSide::Sell => (quote_qty * dec!(0.001), "USDT"),
            };
            Ok(OrderResponse {
                symbol: symbol.to_string(),
                order_id: 1,
                client_order_id: "test".to_string(),
                executed_qty: quantity,
                cummulative_quote_qty: quote_qty,
                status: "FILLED".to_string(),
                side,
                fills: vec![Fill {
                    price: self.price,
                    qty: quantity,
                    commission,
                    commission_asset: commission_asset.to_string(),
                }],
            })
        }

        async fn free_balance(&self, _asset: &str) -> Result<Decimal, ApiError> {
            Ok(self.balance)
        }
    }

    fn gateway(balance: Decimal) -> Arc<FixedPriceGateway> {
        Arc::new(FixedPriceGateway {
            price: dec!(100),
            balance,
            orders: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn opens_and_closes_from_fill_reports() {
        let gateway = gateway(dec!(1000));
        let mut wallet = LiveWallet::new(gateway.clone(), dec!(0.001));

        let trade = wallet
            .open_trade("BTCUSDT", dec!(100), dec!(1), dec!(101), dec!(99))
            .await
            .unwrap();
        assert_eq!(trade.entry_price, dec!(100));
        assert_eq!(trade.quantity, dec!(0.999));

        let closed = wallet.close_trade(&trade, dec!(100)).await.unwrap();
        // sold 0.999 @ 100 = 99.9, fee 0.0999, cost basis 99.9
        assert_eq!(closed.pnl, Some(dec!(-0.0999)));

        let orders = gateway.orders.lock().unwrap().clone();
        assert_eq!(orders, vec![(OrderSide::Buy, dec!(1)), (OrderSide::Sell, dec!(0.999))]);
    }

    #[tokio::test]
    async fn checks_balance_before_buying() {
        let gateway = gateway(dec!(50));
        let mut wallet = LiveWallet::new(gateway.clone(), dec!(0.001));

        let err = wallet
            .open_trade("BTCUSDT", dec!(100), dec!(1), dec!(101), dec!(99))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::InsufficientBalance { .. }));
        assert!(gateway.orders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn balance_check_includes_the_estimated_fee() {
        // 1 @ 100 costs exactly the balance, but not once the 0.1% fee is added.
        let gateway = gateway(dec!(100));
        let mut wallet = LiveWallet::new(gateway.clone(), dec!(0.001));

        let err = wallet
            .open_trade("BTCUSDT", dec!(100), dec!(1), dec!(101), dec!(99))
            .await
            .unwrap_err();
        match err {
            ExecutorError::InsufficientBalance { required, available } => {
                assert_eq!(required, dec!(100.1));
                assert_eq!(available, dec!(100));
            }
            other => panic!("expected InsufficientBalance, got {other:?}"),
        }
        assert!(gateway.orders.lock().unwrap().is_empty());

        let mut wallet = LiveWallet::new(self::gateway(dec!(100.1)), dec!(0.001));
        assert!(wallet
            .open_trade("BTCUSDT", dec!(100), dec!(1), dec!(101), dec!(99))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn refuses_second_position() {
        let mut wallet = LiveWallet::new(gateway(dec!(1000)), dec!(0.001));
        wallet
            .open_trade("BTCUSDT", dec!(100), dec!(1), dec!(101), dec!(99))
            .await
            .unwrap();
        let err = wallet
            .open_trade("BTCUSDT", dec!(100), dec!(1), dec!(101), dec!(99))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::ActiveTradeExists));
    }
}
