//! # Scalper API Client
//!
//! The bridge between the bot and the exchange. Public market data (klines and the
//! order-book ticker) is exposed through the `MarketData` trait; authenticated order
//! placement used by the live wallet goes through `OrderGateway`. `BinanceClient`
//! implements both against the Binance spot REST API.

use crate::auth::sign_request;
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::Utc;
use configuration::{ApiConfig, MarketDataConfig};
use core_types::{Candle, OrderSide, Quote};
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

mod auth;
pub mod error;
pub mod responses;

// --- Public API ---
pub use responses::{AccountResponse, ApiErrorResponse, Balance, BookTickerResponse, Fill, OrderResponse};

/// Read-only market data needed to build a snapshot for one symbol.
///
/// Implementations must be safe to call concurrently for different symbols.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Recent bars for `symbol`, oldest first.
    async fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, ApiError>;

    /// Current best bid and best ask for `symbol`.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ApiError>;
}

/// Authenticated trading operations used by the live wallet.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Places a market order and returns the exchange's fill report.
    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderResponse, ApiError>;

    /// Free balance of a single asset.
    async fn free_balance(&self, asset: &str) -> Result<Decimal, ApiError>;
}

/// A concrete implementation of `MarketData` and `OrderGateway` for Binance spot.
#[derive(Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
    interval: String,
    kline_limit: u32,
    api_secret: String,
}

impl BinanceClient {
    /// Builds a client whose every request is bounded by the configured timeout.
    pub fn new(market: &MarketDataConfig, api: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if !api.key.is_empty() {
            let key = HeaderValue::from_str(&api.key)
                .map_err(|e| ApiError::InvalidData(format!("Invalid API key: {e}")))?;
            headers.insert("X-MBX-APIKEY", key);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(market.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: market.base_url.trim_end_matches('/').to_string(),
            interval: market.interval.clone(),
            kline_limit: market.kline_limit,
            api_secret: api.secret.clone(),
        })
    }

    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        Self::decode(response).await
    }

    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        params: &mut BTreeMap<&str, String>,
    ) -> Result<T, ApiError> {
        if self.api_secret.is_empty() {
            return Err(ApiError::InvalidData(
                "API secret is required for signed requests".to_string(),
            ));
        }
        params.insert("timestamp", Utc::now().timestamp_millis().to_string());

        let query_string = serde_qs::to_string(params)
            .map_err(|e| ApiError::InvalidData(e.to_string()))?;
        let signature = sign_request(&self.api_secret, &query_string);

        let url = format!(
            "{}{}?{}&signature={}",
            self.base_url, path, query_string, signature
        );

        let response = self.client.request(method, &url).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            let api_error: ApiErrorResponse = serde_json::from_str(&text).map_err(|e| {
                ApiError::Deserialization(format!(
                    "Failed to deserialize error response: {e}. Original text: {text}"
                ))
            })?;
            Err(ApiError::BinanceError(api_error.code, api_error.msg))
        }
    }
}

#[async_trait]
impl MarketData for BinanceClient {
    async fn fetch_candles(&self, symbol: &str) -> Result<Vec<Candle>, ApiError> {
        let raw: Vec<responses::RawKline> = self
            .get_public(
                "/api/v3/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", self.interval.clone()),
                    ("limit", self.kline_limit.to_string()),
                ],
            )
            .await?;

        raw.into_iter().map(Candle::try_from).collect()
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ApiError> {
        let ticker: BookTickerResponse = self
            .get_public("/api/v3/ticker/bookTicker", &[("symbol", symbol.to_string())])
            .await?;
        Ok(ticker.into())
    }
}

#[async_trait]
impl OrderGateway for BinanceClient {
    async fn place_market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
    ) -> Result<OrderResponse, ApiError> {
        let mut params = BTreeMap::new();
        params.insert("symbol", symbol.to_string());
        params.insert("side", side.as_str().to_string());
        params.insert("type", "MARKET".to_string());
        params.insert("quantity", quantity.normalize().to_string());
        params.insert("newOrderRespType", "FULL".to_string());

        tracing::info!(symbol, side = side.as_str(), %quantity, "Placing market order.");
        self.send_signed(reqwest::Method::POST, "/api/v3/order", &mut params)
            .await
    }

    async fn free_balance(&self, asset: &str) -> Result<Decimal, ApiError> {
        let mut params = BTreeMap::new();
        let account: AccountResponse = self
            .send_signed(reqwest::Method::GET, "/api/v3/account", &mut params)
            .await?;

        Ok(account
            .balances
            .iter()
            .find(|b| b.asset == asset)
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let market = MarketDataConfig {
            base_url: "https://api.binance.com/".to_string(),
            ..MarketDataConfig::default()
        };
        let client = BinanceClient::new(&market, &ApiConfig::default()).unwrap();
        assert_eq!(client.base_url, "https://api.binance.com");
        assert_eq!(client.kline_limit, 21);
    }

    #[tokio::test]
    async fn signed_requests_require_a_secret() {
        let client = BinanceClient::new(&MarketDataConfig::default(), &ApiConfig::default()).unwrap();
        let result = client.free_balance("USDT").await;
        assert!(matches!(result, Err(ApiError::InvalidData(_))));
    }
}
