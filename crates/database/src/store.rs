use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{EventType, Trade};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Where closed trades and bot events are recorded.
///
/// Implementations must be safe to share across tasks. The engine treats every call
/// as best-effort: an error is logged and never affects trading state.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn save_trade(&self, trade: &Trade) -> Result<(), DbError>;

    async fn log_event(&self, event_type: EventType, message: &str) -> Result<(), DbError>;
}

/// A store that discards everything. Used when persistence is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl TradeStore for NullStore {
    async fn save_trade(&self, _trade: &Trade) -> Result<(), DbError> {
        Ok(())
    }

    async fn log_event(&self, _event_type: EventType, _message: &str) -> Result<(), DbError> {
        Ok(())
    }
}

/// A row of the `trades` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRow {
    pub trade_id: Uuid,
    pub symbol: String,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub quantity: Decimal,
    pub pnl: Option<Decimal>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<&Trade> for TradeRow {
    fn from(trade: &Trade) -> Self {
        Self {
            trade_id: trade.trade_id,
            symbol: trade.symbol.clone(),
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            quantity: trade.quantity,
            pnl: trade.pnl,
            opened_at: trade.opened_at,
            closed_at: trade.closed_at,
        }
    }
}

/// A row of the `bot_events` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    pub id: Uuid,
    pub event_type: &'static str,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl EventRow {
    pub fn new(event_type: EventType, message: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.as_str(),
            message: message.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn trade_row_copies_every_column() {
        let mut trade = Trade::open("BTCUSDT", dec!(100), dec!(0.4), dec!(101), dec!(99), Utc::now());
        trade.close(dec!(101), dec!(0.3), Utc::now()).unwrap();

        let row = TradeRow::from(&trade);
        assert_eq!(row.trade_id, trade.trade_id);
        assert_eq!(row.exit_price, Some(dec!(101)));
        assert_eq!(row.pnl, Some(dec!(0.3)));
        assert_eq!(row.closed_at, trade.closed_at);
    }

    #[test]
    fn event_row_uses_wire_name() {
        let row = EventRow::new(EventType::TradeClose, "BTCUSDT pnl=0.3");
        assert_eq!(row.event_type, "TRADE_CLOSE");
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["event_type"], "TRADE_CLOSE");
        assert_eq!(json["message"], "BTCUSDT pnl=0.3");
    }

    #[tokio::test]
    async fn null_store_accepts_everything() {
        let store = NullStore;
        let trade = Trade::open("BTCUSDT", dec!(1), dec!(1), dec!(2), dec!(0.5), Utc::now());
        assert!(store.save_trade(&trade).await.is_ok());
        assert!(store.log_event(EventType::TradeOpen, "x").await.is_ok());
    }
}
