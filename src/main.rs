use anyhow::Context;
use api_client::BinanceClient;
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{init_tracing, load_config, Config, DatabaseBackend};
use core_types::TradingMode;
use database::DbRepository;
use engine::{fetch_snapshots, TradingEngine};
use executor::{LiveWallet, PaperWallet, TradeExecutor, Wallet};
use risk::DailyRiskManager;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use strategies::{evaluate_entry, momentum_score, select_best};
use tokio::sync::watch;

/// The main entry point for the scalper trading bot.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets such as SCALPER__API__SECRET may live in a .env file.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let path = cli.command.config_path();
    let config = load_config(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    let _log_guard = init_tracing(&config.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Run(_) => handle_run(config).await,
        Commands::Scan(_) => handle_scan(config).await,
        Commands::InitDb(_) => handle_init_db(config).await,
        Commands::History { limit, .. } => handle_history(config, limit).await,
        Commands::CheckConfig(_) => {
            print_config_summary(&config);
            Ok(())
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A single-position intraday momentum scalper for Binance spot markets.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trading bot until Ctrl+C.
    Run(ConfigArgs),
    /// Scan every configured symbol once and print the indicator table.
    Scan(ConfigArgs),
    /// Connect to PostgreSQL and apply the schema migrations.
    InitDb(ConfigArgs),
    /// Show the most recent trades stored in PostgreSQL.
    History {
        #[command(flatten)]
        args: ConfigArgs,
        /// How many trades to show.
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
    /// Load and validate the configuration, then print a summary.
    CheckConfig(ConfigArgs),
}

impl Commands {
    fn config_path(&self) -> &Path {
        match self {
            Commands::Run(args)
            | Commands::Scan(args)
            | Commands::InitDb(args)
            | Commands::CheckConfig(args)
            | Commands::History { args, .. } => &args.config,
        }
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Wires every component together and runs the engine until Ctrl+C.
async fn handle_run(config: Config) -> anyhow::Result<()> {
    let client = Arc::new(BinanceClient::new(&config.market_data, &config.api)?);

    let wallet: Box<dyn Wallet> = match config.trading.mode {
        TradingMode::Paper => Box::new(PaperWallet::new(&config.wallet)),
        TradingMode::Live => {
            tracing::warn!("LIVE trading enabled. Real market orders will be placed.");
            Box::new(LiveWallet::new(client.clone(), config.wallet.fee_rate))
        }
    };
    let executor = TradeExecutor::new(
        wallet,
        config.trading.trade_notional,
        config.trading.max_trade_duration_minutes,
    );
    let risk = DailyRiskManager::new(&config.risk)?;
    let store = database::open_store(&config.database)
        .await
        .context("Failed to open the trade store")?;
    let notifier = alerter::notifier_from_config(&config.telegram);

    tracing::info!(
        mode = ?config.trading.mode,
        symbols = config.trading.symbols.len(),
        notional = %config.trading.trade_notional,
        "Starting scalper."
    );

    let mut engine = TradingEngine::new(&config, client, executor, Box::new(risk), store, notifier);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, initiating shutdown");
            let _ = ctrl_c_tx.send(true);
        }
    });

    engine.run(shutdown_rx).await;
    drop(shutdown_tx);
    Ok(())
}

/// One-shot scan: fetch every symbol, show indicators and rule results, and the pick.
async fn handle_scan(config: Config) -> anyhow::Result<()> {
    let client = BinanceClient::new(&config.market_data, &config.api)?;
    let timeout = Duration::from_secs(config.market_data.request_timeout_seconds);
    let symbols = &config.trading.symbols;

    let snapshots = fetch_snapshots(&client, symbols, timeout).await;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Symbol", "Price", "EMA 9", "EMA 21", "VWAP", "Vol ratio", "Spread %", "Spread", "EMA", "VWAP band",
        "Volume", "Score",
    ]);
    for snapshot in &snapshots {
        let check = evaluate_entry(snapshot);
        table.add_row(vec![
            snapshot.symbol.clone(),
            snapshot.price.to_string(),
            short(snapshot.ema_9),
            short(snapshot.ema_21),
            short(snapshot.vwap),
            short(snapshot.volume_ratio),
            short(snapshot.spread_pct),
            mark(check.tight_spread),
            mark(check.ema_momentum),
            mark(check.above_vwap_band),
            mark(check.volume_surge),
            format!("{:.4}", momentum_score(snapshot)),
        ]);
    }
    println!("{table}");

    let missing = symbols.len() - snapshots.len();
    if missing > 0 {
        println!("{missing} symbol(s) returned no usable data.");
    }

    let candidates: Vec<_> = snapshots
        .iter()
        .filter(|s| evaluate_entry(s).passed())
        .cloned()
        .collect();
    match select_best(&candidates) {
        Some(best) => println!(
            "Selected: {} at {} (score {:.4})",
            best.symbol,
            best.price,
            momentum_score(best)
        ),
        None => println!("No symbol passes the entry rule."),
    }
    Ok(())
}

async fn handle_init_db(config: Config) -> anyhow::Result<()> {
    if config.database.backend == DatabaseBackend::Supabase {
        println!("Supabase tables are created from crates/database/migrations in the SQL editor.");
        return Ok(());
    }

    let pool = database::connect(&config.database.url)
        .await
        .context("Failed to connect to the database")?;
    database::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    println!("Database schema is up to date.");
    Ok(())
}

async fn handle_history(config: Config, limit: i64) -> anyhow::Result<()> {
    let pool = database::connect(&config.database.url)
        .await
        .context("Failed to connect to the database")?;
    let trades = DbRepository::new(pool).recent_trades(limit).await?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Opened", "Symbol", "Entry", "Exit", "Quantity", "PnL", "Closed"]);
    for trade in &trades {
        table.add_row(vec![
            trade.opened_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            trade.symbol.clone(),
            trade.entry_price.to_string(),
            optional(trade.exit_price),
            trade.quantity.to_string(),
            optional(trade.pnl),
            trade
                .closed_at
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");

    let total: Decimal = trades.iter().filter_map(|t| t.pnl).sum();
    println!("{} trade(s), total PnL {}", trades.len(), total);
    Ok(())
}

fn print_config_summary(config: &Config) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Setting", "Value"]);
    let rows = [
        ("mode", format!("{:?}", config.trading.mode)),
        ("symbols", config.trading.symbols.join(", ")),
        ("trade_notional", config.trading.trade_notional.to_string()),
        ("take_profit_pct", config.trading.take_profit_pct.to_string()),
        ("stop_loss_pct", config.trading.stop_loss_pct.to_string()),
        (
            "max_trade_duration_minutes",
            config.trading.max_trade_duration_minutes.to_string(),
        ),
        ("max_daily_loss", config.risk.max_daily_loss.to_string()),
        ("max_trades_per_day", config.risk.max_trades_per_day.to_string()),
        ("cooldown_minutes", config.risk.cooldown_minutes.to_string()),
        (
            "trading_hours (UTC)",
            format!(
                "{}..{}",
                config.risk.trading_start_hour, config.risk.trading_end_hour
            ),
        ),
        ("poll_interval_seconds", config.engine.poll_interval_seconds.to_string()),
        ("side_effect_timeout_ms", config.engine.side_effect_timeout_ms.to_string()),
        ("fee_rate", config.wallet.fee_rate.to_string()),
        ("slippage_rate", config.wallet.slippage_rate.to_string()),
        ("database", format!("{:?}", config.database.backend)),
        (
            "telegram",
            if config.telegram.token.is_empty() { "disabled" } else { "enabled" }.to_string(),
        ),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    println!("{table}");
    println!("Configuration is valid.");
}

fn short(value: Decimal) -> String {
    value.round_dp(6).to_string()
}

fn optional(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn mark(passed: bool) -> String {
    if passed { "ok" } else { "x" }.to_string()
}
