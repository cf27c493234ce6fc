use crate::error::DbError;
use crate::store::{EventRow, TradeRow, TradeStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{EventType, Trade};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the PostgreSQL database. It encapsulates all SQL queries.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// A stored trade as read back for reporting.
#[derive(Debug, Clone, FromRow)]
pub struct DbTrade {
    pub trade_id: Uuid,
    pub symbol: String,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub quantity: Decimal,
    pub pnl: Option<Decimal>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the most recently opened trades, newest first.
    pub async fn recent_trades(&self, limit: i64) -> Result<Vec<DbTrade>, DbError> {
        let trades = sqlx::query_as::<_, DbTrade>(
            r#"
            SELECT trade_id, symbol, entry_price, exit_price, quantity, pnl, opened_at, closed_at
            FROM trades
            ORDER BY opened_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(trades)
    }
}

#[async_trait]
impl TradeStore for DbRepository {
    /// Saves a trade. Uses `ON CONFLICT ... DO UPDATE` so re-saving the same trade
    /// after it closes updates the exit columns instead of failing.
    async fn save_trade(&self, trade: &Trade) -> Result<(), DbError> {
        let row = TradeRow::from(trade);
        sqlx::query(
            r#"
            INSERT INTO trades (
                trade_id, symbol, entry_price, exit_price,
                quantity, pnl, opened_at, closed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (trade_id) DO UPDATE SET
                exit_price = EXCLUDED.exit_price,
                pnl = EXCLUDED.pnl,
                closed_at = EXCLUDED.closed_at
            "#,
        )
        .bind(row.trade_id)
        .bind(&row.symbol)
        .bind(row.entry_price)
        .bind(row.exit_price)
        .bind(row.quantity)
        .bind(row.pnl)
        .bind(row.opened_at)
        .bind(row.closed_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(trade_id = %row.trade_id, symbol = %row.symbol, "Trade saved.");
        Ok(())
    }

    async fn log_event(&self, event_type: EventType, message: &str) -> Result<(), DbError> {
        let row = EventRow::new(event_type, message);
        sqlx::query(
            "INSERT INTO bot_events (id, event_type, message, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(row.id)
        .bind(row.event_type)
        .bind(&row.message)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
