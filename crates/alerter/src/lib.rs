use async_trait::async_trait;
use configuration::TelegramConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod error;
pub mod formatter;

pub use error::AlerterError;
pub use formatter::{engine_started_message, trade_close_message, trade_open_message};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can deliver a plain-text message to the operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), AlerterError>;
}

/// Used when Telegram is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _message: &str) -> Result<(), AlerterError> {
        Ok(())
    }
}

/// The JSON payload for the Telegram `sendMessage` endpoint.
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// A client for sending messages to the Telegram Bot API.
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    /// Creates a new `TelegramNotifier` whose requests give up after `REQUEST_TIMEOUT`.
    ///
    /// Fails with `AlerterError::NotConfigured` if the token or chat_id is missing.
    pub fn new(config: &TelegramConfig) -> Result<Self, AlerterError> {
        if config.token.is_empty() || config.chat_id.is_empty() {
            return Err(AlerterError::NotConfigured);
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: TELEGRAM_API_URL.to_string(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// Sends a text message to the configured Telegram chat.
    async fn send(&self, message: &str) -> Result<(), AlerterError> {
        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text: message,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body: TelegramResponse = response.json().await?;

        if !status.is_success() || !body.ok {
            let description = body
                .description
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::error!(status = status.as_u16(), error = %description, "Telegram message failed.");
            return Err(AlerterError::ApiError(description));
        }

        tracing::info!(
            message_id = body.result.map(|r| r.message_id),
            "Telegram message sent."
        );
        Ok(())
    }
}

/// Builds the notifier selected by configuration: Telegram when both credentials are
/// present, otherwise a `NullNotifier`. Alerting is optional, so a notifier that
/// cannot be built is logged and replaced by a `NullNotifier`.
pub fn notifier_from_config(config: &TelegramConfig) -> Box<dyn Notifier> {
    match TelegramNotifier::new(config) {
        Ok(telegram) => Box::new(telegram),
        Err(AlerterError::NotConfigured) => {
            tracing::warn!("Telegram notifier is not configured (missing token or chat_id).");
            Box::new(NullNotifier)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to build the Telegram notifier.");
            Box::new(NullNotifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_disable_telegram() {
        let config = TelegramConfig {
            token: "abc".to_string(),
            chat_id: String::new(),
        };
        assert!(matches!(
            TelegramNotifier::new(&config),
            Err(AlerterError::NotConfigured)
        ));
    }

    #[test]
    fn builds_bot_url() {
        let config = TelegramConfig {
            token: "123:XYZ".to_string(),
            chat_id: "42".to_string(),
        };
        let notifier = TelegramNotifier::new(&config).unwrap();
        assert_eq!(
            notifier.send_message_url(),
            "https://api.telegram.org/bot123:XYZ/sendMessage"
        );
    }

    #[test]
    fn parses_error_response() {
        let body: TelegramResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
                .unwrap();
        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("Bad Request: chat not found"));
    }

    #[tokio::test]
    async fn null_notifier_never_fails() {
        assert!(NullNotifier.send("hello").await.is_ok());
    }
}
