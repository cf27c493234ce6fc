use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    ApiConfig, Config, DatabaseBackend, DatabaseConfig, EngineConfig, LoggingConfig, MarketDataConfig,
    RiskConfig, TelegramConfig, TradingConfig, WalletConfig,
};

/// Prefix for environment variable overrides, e.g. `SCALPER__TELEGRAM__TOKEN`.
pub const ENV_PREFIX: &str = "SCALPER";

/// Loads the application configuration from a TOML file layered with environment variables.
///
/// The file is optional: every section has defaults, so a bare environment is enough
/// to start a paper-trading session. The result is validated before it is returned.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("trading.symbols")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
