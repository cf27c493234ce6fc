use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle state of the trading bot. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BotState {
    #[default]
    Idle,
    Scanning,
    InTrade,
    Cooldown,
    Stopped,
}

impl BotState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotState::Idle => "IDLE",
            BotState::Scanning => "SCANNING",
            BotState::InTrade => "IN_TRADE",
            BotState::Cooldown => "COOLDOWN",
            BotState::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for BotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of row written to the bot event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    TradeOpen,
    TradeClose,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::TradeOpen => "TRADE_OPEN",
            EventType::TradeClose => "TRADE_CLOSE",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an exchange order. The bot only goes long: it buys to open and sells to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

/// Selects which wallet implementation backs the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    #[default]
    Paper,
    Live,
}
