//! # Scalper Engine
//!
//! `TradingEngine` drives the decision loop: one tick either monitors the active
//! trade or, when the risk gate allows, scans every symbol, filters by the entry
//! rule and opens a position on the best candidate. Persistence and notifications
//! run after the trade state has been committed and can never undo it.

use alerter::{engine_started_message, trade_close_message, trade_open_message, Notifier};
use api_client::MarketData;
use chrono::Utc;
use configuration::{Config, EngineConfig};
use core_types::{BotState, EventType, MarketSnapshot, Trade};
use database::TradeStore;
use executor::{calculate_stop_loss, calculate_take_profit, TradeExecutor};
use risk::{BlockReason, RiskDecision, RiskManager};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use strategies::{entry_conditions, select_best};
use tokio::sync::watch;

pub mod error;
pub mod scanner;
pub mod state_machine;

pub use error::EngineError;
pub use scanner::{fetch_snapshot, fetch_snapshots};
pub use state_machine::StateMachine;

/// What a single tick did. The run loop uses it to decide how long to pause.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A trade is open and no exit condition fired.
    Monitored,
    /// The risk gate refused new trades.
    Blocked(BlockReason),
    /// No symbol passed the entry rule.
    NoCandidate,
    Opened(Trade),
    Closed(Trade),
    /// A trade is open but its price could not be fetched.
    Skipped,
}

/// The central orchestrator for the trading bot.
pub struct TradingEngine {
    // --- Configuration ---
    symbols: Vec<String>,
    take_profit_pct: Decimal,
    stop_loss_pct: Decimal,
    timings: EngineConfig,
    fetch_timeout: Duration,
    side_effect_timeout: Duration,

    // --- Collaborators ---
    market: Arc<dyn MarketData>,
    executor: TradeExecutor,
    risk: Box<dyn RiskManager>,
    store: Arc<dyn TradeStore>,
    notifier: Box<dyn Notifier>,

    state: StateMachine,
}

impl TradingEngine {
    /// Creates a new `TradingEngine` with all its required components.
    pub fn new(
        config: &Config,
        market: Arc<dyn MarketData>,
        executor: TradeExecutor,
        risk: Box<dyn RiskManager>,
        store: Arc<dyn TradeStore>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            symbols: config.trading.symbols.clone(),
            take_profit_pct: config.trading.take_profit_pct,
            stop_loss_pct: config.trading.stop_loss_pct,
            timings: config.engine.clone(),
            fetch_timeout: Duration::from_secs(config.market_data.request_timeout_seconds),
            side_effect_timeout: Duration::from_millis(config.engine.side_effect_timeout_ms),
            market,
            executor,
            risk,
            store,
            notifier,
            state: StateMachine::new(),
        }
    }

    pub fn state(&self) -> BotState {
        self.state.state()
    }

    pub fn active_trade(&self) -> Option<&Trade> {
        self.executor.active_trade()
    }

    /// Leaves IDLE and begins scanning.
    pub fn start(&mut self) {
        if self.state.transition(BotState::Scanning) {
            tracing::info!(symbols = self.symbols.len(), "Engine started.");
        }
    }

    /// Enters the terminal STOPPED state. An open trade is left as it is.
    pub fn stop(&mut self) {
        self.state.transition(BotState::Stopped);
        match self.executor.active_trade() {
            Some(trade) => tracing::warn!(
                trade_id = %trade.trade_id,
                symbol = %trade.symbol,
                "Engine stopped with an open trade."
            ),
            None => tracing::info!("Engine stopped."),
        }
    }

    /// The main loop. Runs ticks until `shutdown_rx` carries `true` (or its sender is
    /// dropped), then moves to STOPPED. A failed tick is logged and retried after the
    /// error backoff; it never ends the loop.
    pub async fn run(&mut self, mut shutdown_rx: watch::Receiver<bool>) {
        self.start();
        bounded(
            self.side_effect_timeout,
            "send startup notification",
            self.notifier.send(&engine_started_message()),
        )
        .await;

        while !*shutdown_rx.borrow() {
            if self.cycle(&mut shutdown_rx).await {
                break;
            }
        }

        self.stop();
    }

    /// One pass of the run loop: tick, pause, and leave COOLDOWN once the pause is over.
    /// Returns true when the loop should end.
    async fn cycle(&mut self, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
        let pause = match self.tick().await {
            Ok(outcome) => self.pause_after(&outcome),
            Err(EngineError::Stopped) => return true,
            Err(e) => {
                if e.is_invariant_violation() {
                    tracing::error!(error = %e, "Tick aborted: active trade bookkeeping is inconsistent.");
                } else {
                    tracing::error!(error = %e, "Tick failed.");
                }
                Duration::from_secs(self.timings.error_backoff_seconds)
            }
        };

        if wait_or_shutdown(shutdown_rx, pause).await {
            return true;
        }
        if self.state.state() == BotState::Cooldown {
            self.state.transition(BotState::Scanning);
        }
        false
    }

    fn pause_after(&self, outcome: &TickOutcome) -> Duration {
        let seconds = match outcome {
            TickOutcome::Monitored | TickOutcome::Skipped => self.timings.monitor_interval_seconds,
            TickOutcome::Blocked(_) | TickOutcome::NoCandidate => self.timings.poll_interval_seconds,
            TickOutcome::Opened(_) => 0,
            TickOutcome::Closed(_) => self.timings.cooldown_pause_seconds,
        };
        Duration::from_secs(seconds)
    }

    /// Runs one iteration of the decision loop.
    pub async fn tick(&mut self) -> Result<TickOutcome, EngineError> {
        if self.state.state() == BotState::Stopped {
            return Err(EngineError::Stopped);
        }
        tracing::debug!(state = %self.state.state(), "Engine tick.");

        if self.executor.has_active_trade() {
            return self.monitor_active_trade().await;
        }

        if let RiskDecision::Blocked(reason) = self.risk.can_trade() {
            tracing::info!(%reason, "Trade blocked.");
            return Ok(TickOutcome::Blocked(reason));
        }

        let snapshots = fetch_snapshots(self.market.as_ref(), &self.symbols, self.fetch_timeout).await;
        let candidates: Vec<MarketSnapshot> = snapshots.into_iter().filter(entry_conditions).collect();

        let Some(selected) = select_best(&candidates).cloned() else {
            tracing::debug!("No candidate passed the entry rule.");
            return Ok(TickOutcome::NoCandidate);
        };
        tracing::info!(
            symbol = %selected.symbol,
            candidates = candidates.len(),
            "Candidate selected."
        );

        let trade = self.open_trade(&selected).await?;
        Ok(TickOutcome::Opened(trade))
    }

    async fn open_trade(&mut self, snapshot: &MarketSnapshot) -> Result<Trade, EngineError> {
        tracing::info!(symbol = %snapshot.symbol, price = %snapshot.price, "Opening trade.");

        let take_profit = calculate_take_profit(snapshot.price, self.take_profit_pct);
        let stop_loss = calculate_stop_loss(snapshot.price, self.stop_loss_pct);

        let trade = self
            .executor
            .open_trade(&snapshot.symbol, snapshot.price, take_profit, stop_loss)
            .await?;
        self.state.transition(BotState::InTrade);

        tracing::info!(
            trade_id = %trade.trade_id,
            symbol = %trade.symbol,
            entry = %trade.entry_price,
            quantity = %trade.quantity,
            tp = %trade.take_profit,
            sl = %trade.stop_loss,
            "Trade opened."
        );

        self.publish_open(&trade).await;
        Ok(trade)
    }

    async fn monitor_active_trade(&mut self) -> Result<TickOutcome, EngineError> {
        let Some(symbol) = self.executor.active_trade().map(|t| t.symbol.clone()) else {
            return Ok(TickOutcome::Monitored);
        };

        let Some(snapshot) = fetch_snapshot(self.market.as_ref(), &symbol, self.fetch_timeout).await else {
            tracing::debug!(%symbol, "No price for the active trade this tick.");
            return Ok(TickOutcome::Skipped);
        };

        let Some(reason) = self.executor.exit_reason_at(snapshot.price, Utc::now()) else {
            return Ok(TickOutcome::Monitored);
        };

        let closed = self.executor.close_trade(snapshot.price).await?;
        let pnl = closed.realized_pnl();
        self.risk.record_trade_result(pnl);

        tracing::info!(
            trade_id = %closed.trade_id,
            symbol = %closed.symbol,
            exit = %snapshot.price,
            %pnl,
            %reason,
            "Trade closed."
        );

        self.publish_close(&closed).await;

        if self.risk.should_stop_bot() {
            tracing::warn!("Daily loss limit reached. Consider stopping the bot.");
        }

        self.state.transition(BotState::Cooldown);
        Ok(TickOutcome::Closed(closed))
    }

    // --- Best-effort side effects. Each call is bounded, logged and never propagated. ---

    #[tracing::instrument(skip_all, fields(trade_id = %trade.trade_id))]
    async fn publish_open(&self, trade: &Trade) {
        let limit = self.side_effect_timeout;
        let message = format!("{} @ {}", trade.symbol, trade.entry_price);
        bounded(
            limit,
            "log trade open event",
            self.store.log_event(EventType::TradeOpen, &message),
        )
        .await;
        bounded(
            limit,
            "send trade open notification",
            self.notifier.send(&trade_open_message(trade)),
        )
        .await;
    }

    #[tracing::instrument(skip_all, fields(trade_id = %trade.trade_id))]
    async fn publish_close(&self, trade: &Trade) {
        let limit = self.side_effect_timeout;
        bounded(limit, "save closed trade", self.store.save_trade(trade)).await;
        let message = format!("{} pnl={}", trade.symbol, trade.realized_pnl());
        bounded(
            limit,
            "log trade close event",
            self.store.log_event(EventType::TradeClose, &message),
        )
        .await;
        bounded(
            limit,
            "send trade close notification",
            self.notifier.send(&trade_close_message(trade)),
        )
        .await;
    }
}

/// Awaits a side effect for at most `limit`. Errors and timeouts are logged and dropped.
async fn bounded<E: Display>(limit: Duration, action: &str, call: impl Future<Output = Result<(), E>>) {
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "Failed to {action}."),
        Err(_) => tracing::warn!(timeout_ms = limit.as_millis() as u64, "Timed out trying to {action}."),
    }
}

/// Sleeps for `duration` unless a shutdown arrives first. Returns true on shutdown.
async fn wait_or_shutdown(shutdown_rx: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    if duration.is_zero() {
        tokio::task::yield_now().await;
        return *shutdown_rx.borrow();
    }

    tokio::select! {
        biased;

        changed = shutdown_rx.changed() => match changed {
            Ok(()) => *shutdown_rx.borrow(),
            Err(_) => {
                tracing::warn!("Shutdown channel closed.");
                true
            }
        },
        _ = tokio::time::sleep(duration) => false,
    }
}
