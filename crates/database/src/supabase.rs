use crate::error::DbError;
use crate::store::{EventRow, TradeRow, TradeStore};
use async_trait::async_trait;
use core_types::{EventType, Trade};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Writes the same rows as `DbRepository`, through Supabase's PostgREST API.
///
/// The tables must already exist; they are created from the SQL migration in the
/// Supabase SQL editor.
#[derive(Debug, Clone)]
pub struct SupabaseRepository {
    client: Client,
    rest_url: String,
    key: String,
}

impl SupabaseRepository {
    /// Every request made through the repository is bounded by `REQUEST_TIMEOUT`.
    pub fn new(project_url: &str, key: &str) -> Result<Self, DbError> {
        let base = project_url.trim_end_matches('/');
        let base = base.strip_suffix("/rest/v1").unwrap_or(base);
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            rest_url: format!("{base}/rest/v1"),
            key: key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T, upsert: bool) -> Result<(), DbError> {
        let prefer = if upsert {
            "return=minimal,resolution=merge-duplicates"
        } else {
            "return=minimal"
        };

        let response = self
            .client
            .post(self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Prefer", prefer)
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(DbError::Supabase { status: status.as_u16(), body });
        }
        Ok(())
    }
}

#[async_trait]
impl TradeStore for SupabaseRepository {
    async fn save_trade(&self, trade: &Trade) -> Result<(), DbError> {
        self.insert("trades", &TradeRow::from(trade), true).await?;
        tracing::debug!(trade_id = %trade.trade_id, "Trade saved to Supabase.");
        Ok(())
    }

    async fn log_event(&self, event_type: EventType, message: &str) -> Result<(), DbError> {
        self.insert("bot_events", &EventRow::new(event_type, message), false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_project_url() {
        let repo = SupabaseRepository::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(repo.table_url("trades"), "https://abc.supabase.co/rest/v1/trades");

        let repo = SupabaseRepository::new("https://abc.supabase.co/rest/v1", "key").unwrap();
        assert_eq!(repo.table_url("bot_events"), "https://abc.supabase.co/rest/v1/bot_events");
    }
}
