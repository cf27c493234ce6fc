use chrono::{TimeZone, Utc};
use core_types::{Candle, OrderSide, Quote};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::error::ApiError;

// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.

/// One row of `GET /api/v3/klines`. Binance sends klines as heterogeneous arrays.
#[derive(Debug, Deserialize)]
pub struct RawKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub i64,
    pub String,
    pub String,
    pub String,
);

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ApiError> {
    Decimal::from_str(raw)
        .map_err(|e| ApiError::Deserialization(format!("{field} '{raw}': {e}")))
}

impl TryFrom<RawKline> for Candle {
    type Error = ApiError;

    fn try_from(raw: RawKline) -> Result<Self, Self::Error> {
        Ok(Candle {
            open_time: Utc
                .timestamp_millis_opt(raw.0)
                .single()
                .ok_or_else(|| ApiError::InvalidData(format!("Invalid open_time: {}", raw.0)))?,
            open: parse_decimal("open", &raw.1)?,
            high: parse_decimal("high", &raw.2)?,
            low: parse_decimal("low", &raw.3)?,
            close: parse_decimal("close", &raw.4)?,
            volume: parse_decimal("volume", &raw.5)?,
        })
    }
}

/// The response of `GET /api/v3/ticker/bookTicker`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookTickerResponse {
    pub symbol: String,
    pub bid_price: Decimal,
    pub bid_qty: Decimal,
    pub ask_price: Decimal,
    pub ask_qty: Decimal,
}

impl From<BookTickerResponse> for Quote {
    fn from(ticker: BookTickerResponse) -> Self {
        Quote {
            bid: ticker.bid_price,
            ask: ticker.ask_price,
        }
    }
}

/// A single partial fill of a market order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub price: Decimal,
    pub qty: Decimal,
    pub commission: Decimal,
    pub commission_asset: String,
}

/// The `FULL` response from a successful `POST /api/v3/order` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: i64,
    pub client_order_id: String,
    pub executed_qty: Decimal,
    pub cummulative_quote_qty: Decimal,
    pub status: String,
    pub side: OrderSide,
    #[serde(default)]
    pub fills: Vec<Fill>,
}

impl OrderResponse {
    /// Quantity-weighted fill price, or `None` if nothing was filled.
    pub fn average_price(&self) -> Option<Decimal> {
        if self.executed_qty.is_zero() {
            return None;
        }
        Some(self.cummulative_quote_qty / self.executed_qty)
    }

    /// Sum of commissions charged in `asset`. Commissions in other assets are ignored.
    pub fn commission_in(&self, asset: &str) -> Decimal {
        self.fills
            .iter()
            .filter(|f| f.commission_asset == asset)
            .map(|f| f.commission)
            .sum()
    }
}

/// A single asset balance from `GET /api/v3/account`.
#[derive(Debug, Clone, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub balances: Vec<Balance>,
}

/// Represents an error response from the Binance API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}
