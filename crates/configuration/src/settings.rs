use crate::error::ConfigError;
use core_types::TradingMode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub trading: TradingConfig,
    pub risk: RiskConfig,
    pub engine: EngineConfig,
    pub wallet: WalletConfig,
    pub market_data: MarketDataConfig,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub telegram: TelegramConfig,
    pub logging: LoggingConfig,
}

/// What to trade and how each position is sized and exited.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    pub mode: TradingMode,
    /// The universe scanned on every tick (e.g., "BTCUSDT").
    pub symbols: Vec<String>,
    /// Quote-currency amount committed to each trade.
    pub trade_notional: Decimal,
    /// 0.009 corresponds to a take-profit 0.9% above entry.
    pub take_profit_pct: Decimal,
    /// 0.0065 corresponds to a stop-loss 0.65% below entry.
    pub stop_loss_pct: Decimal,
    pub max_trade_duration_minutes: u32,
}

/// Limits enforced by the daily risk gate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Positive amount; trading halts once daily P&L falls to or below its negation.
    pub max_daily_loss: Decimal,
    pub max_trades_per_day: u32,
    pub cooldown_minutes: u32,
    /// Inclusive UTC hour at which trading may start.
    pub trading_start_hour: u32,
    /// Exclusive UTC hour at which trading stops. 24 means "until midnight".
    pub trading_end_hour: u32,
}

/// Pacing of the decision loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub poll_interval_seconds: u64,
    /// Pause between checks while a trade is open.
    pub monitor_interval_seconds: u64,
    /// Time spent in the cooldown state after a trade closes.
    pub cooldown_pause_seconds: u64,
    /// Pause after a tick fails before the loop retries.
    pub error_backoff_seconds: u64,
    /// Upper bound on each persistence or notification call made by the loop.
    pub side_effect_timeout_ms: u64,
}

/// Parameters for the simulated fill model.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Paper-trading balance in the quote currency.
    pub starting_balance: Decimal,
    /// 0.001 corresponds to a 0.1% fee on each side.
    pub fee_rate: Decimal,
    /// 0.0002 corresponds to a 0.02% adverse move on each fill.
    pub slippage_rate: Decimal,
}

/// Where candles and quotes come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub interval: String,
    /// Number of bars requested per symbol. Must cover the slow EMA window.
    pub kline_limit: u32,
    pub request_timeout_seconds: u64,
}

/// Exchange credentials, only required for live trading.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub key: String,
    pub secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    None,
    Postgres,
    Supabase,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// PostgreSQL connection string. Falls back to `DATABASE_URL` when empty.
    pub url: String,
    pub supabase_url: String,
    pub supabase_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub json: bool,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for TradingConfig {
    fn default() -> Self {
        let symbols = [
            "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "XRPUSDT", "ADAUSDT", "DOGEUSDT",
            "AVAXUSDT", "LINKUSDT", "MATICUSDT", "LTCUSDT", "TRXUSDT", "DOTUSDT", "OPUSDT",
            "ATOMUSDT",
        ];
        Self {
            mode: TradingMode::Paper,
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            trade_notional: dec!(40),
            take_profit_pct: dec!(0.009),
            stop_loss_pct: dec!(0.0065),
            max_trade_duration_minutes: 20,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_daily_loss: dec!(2),
            max_trades_per_day: 10,
            cooldown_minutes: 60,
            trading_start_hour: 0,
            trading_end_hour: 24,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 2,
            monitor_interval_seconds: 1,
            cooldown_pause_seconds: 2,
            error_backoff_seconds: 5,
            side_effect_timeout_ms: 5000,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            starting_balance: dec!(100),
            fee_rate: dec!(0.001),
            slippage_rate: dec!(0.0002),
        }
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            interval: "1m".to_string(),
            kline_limit: 21,
            request_timeout_seconds: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
            file_prefix: "scalper.log".to_string(),
        }
    }
}

impl Config {
    /// Checks that the loaded values are internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        let trading = &self.trading;
        if trading.symbols.is_empty() {
            return fail("trading.symbols must contain at least one symbol");
        }
        if trading.trade_notional <= Decimal::ZERO {
            return fail("trading.trade_notional must be greater than 0");
        }
        if trading.take_profit_pct <= Decimal::ZERO || trading.take_profit_pct >= Decimal::ONE {
            return fail("trading.take_profit_pct must be between 0 and 1");
        }
        if trading.stop_loss_pct <= Decimal::ZERO || trading.stop_loss_pct >= Decimal::ONE {
            return fail("trading.stop_loss_pct must be between 0 and 1");
        }

        let risk = &self.risk;
        if risk.max_daily_loss < Decimal::ZERO {
            return fail("risk.max_daily_loss must not be negative");
        }
        if risk.max_trades_per_day == 0 {
            return fail("risk.max_trades_per_day must be at least 1");
        }
        if risk.trading_end_hour > 24 || risk.trading_start_hour >= risk.trading_end_hour {
            return fail("risk trading hours must satisfy start_hour < end_hour <= 24");
        }

        let wallet = &self.wallet;
        if wallet.fee_rate < Decimal::ZERO || wallet.slippage_rate < Decimal::ZERO {
            return fail("wallet.fee_rate and wallet.slippage_rate must not be negative");
        }
        if wallet.starting_balance < Decimal::ZERO {
            return fail("wallet.starting_balance must not be negative");
        }

        if self.engine.side_effect_timeout_ms == 0 {
            return fail("engine.side_effect_timeout_ms must be greater than 0");
        }

        if self.market_data.kline_limit < 21 {
            return fail("market_data.kline_limit must be at least 21 to cover the slow EMA");
        }

        if trading.mode == TradingMode::Live && (self.api.key.is_empty() || self.api.secret.is_empty()) {
            return fail("live trading requires api.key and api.secret");
        }

        if self.database.backend == DatabaseBackend::Supabase
            && (self.database.supabase_url.is_empty() || self.database.supabase_key.is_empty())
        {
            return fail("supabase backend requires database.supabase_url and database.supabase_key");
        }

        Ok(())
    }
}
