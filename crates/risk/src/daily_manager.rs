use crate::error::RiskError;
use crate::RiskManager;
use chrono::{DateTime, NaiveDate, TimeDelta, Timelike, Utc};
use configuration::RiskConfig;
use rust_decimal::Decimal;
use std::fmt;

/// Why the gate refused a new trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    OutsideHours,
    DailyLossCap,
    MaxTrades,
    Cooldown,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BlockReason::OutsideHours => "Outside trading hours",
            BlockReason::DailyLossCap => "Max daily loss reached",
            BlockReason::MaxTrades => "Max trades per day reached",
            BlockReason::Cooldown => "In cooldown period",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDecision {
    Allowed,
    Blocked(BlockReason),
}

impl RiskDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RiskDecision::Allowed)
    }

    pub fn reason(&self) -> Option<BlockReason> {
        match self {
            RiskDecision::Allowed => None,
            RiskDecision::Blocked(reason) => Some(*reason),
        }
    }
}

/// Risk gate over a single UTC trading day.
#[derive(Debug, Clone)]
pub struct DailyRiskManager {
    max_daily_loss: Decimal,
    max_trades: u32,
    cooldown: TimeDelta,
    start_hour: u32,
    end_hour: u32,

    daily_pnl: Decimal,
    trades_today: u32,
    last_loss_time: Option<DateTime<Utc>>,
    current_day: NaiveDate,
}

impl DailyRiskManager {
    /// Creates a new `DailyRiskManager` anchored to the current UTC day.
    pub fn new(params: &RiskConfig) -> Result<Self, RiskError> {
        Self::new_at(params, Utc::now())
    }

    /// Creates a manager whose day marker is taken from `now`.
    pub fn new_at(params: &RiskConfig, now: DateTime<Utc>) -> Result<Self, RiskError> {
        if params.max_daily_loss < Decimal::ZERO {
            return Err(RiskError::InvalidParameters(
                "max_daily_loss must not be negative".to_string(),
            ));
        }
        if params.trading_end_hour > 24 || params.trading_start_hour >= params.trading_end_hour {
            return Err(RiskError::InvalidParameters(format!(
                "invalid trading window [{}, {})",
                params.trading_start_hour, params.trading_end_hour
            )));
        }

        Ok(Self {
            max_daily_loss: params.max_daily_loss,
            max_trades: params.max_trades_per_day,
            cooldown: TimeDelta::minutes(i64::from(params.cooldown_minutes)),
            start_hour: params.trading_start_hour,
            end_hour: params.trading_end_hour,
            daily_pnl: Decimal::ZERO,
            trades_today: 0,
            last_loss_time: None,
            current_day: now.date_naive(),
        })
    }

    pub fn daily_pnl(&self) -> Decimal {
        self.daily_pnl
    }

    pub fn trades_today(&self) -> u32 {
        self.trades_today
    }

    pub fn last_loss_time(&self) -> Option<DateTime<Utc>> {
        self.last_loss_time
    }

    fn reset_if_new_day(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today != self.current_day {
            tracing::info!(
                previous_day = %self.current_day,
                day = %today,
                daily_pnl = %self.daily_pnl,
                trades = self.trades_today,
                "New trading day, resetting risk counters."
            );
            self.current_day = today;
            self.daily_pnl = Decimal::ZERO;
            self.trades_today = 0;
            self.last_loss_time = None;
        }
    }

    /// Runs every gate in order against the clock value `now`.
    pub fn can_trade_at(&mut self, now: DateTime<Utc>) -> RiskDecision {
        self.reset_if_new_day(now);

        let hour = now.hour();
        if hour < self.start_hour || hour >= self.end_hour {
            return RiskDecision::Blocked(BlockReason::OutsideHours);
        }

        if self.loss_cap_reached() {
            return RiskDecision::Blocked(BlockReason::DailyLossCap);
        }

        if self.trades_today >= self.max_trades {
            return RiskDecision::Blocked(BlockReason::MaxTrades);
        }

        if let Some(last_loss) = self.last_loss_time {
            if now - last_loss < self.cooldown {
                return RiskDecision::Blocked(BlockReason::Cooldown);
            }
        }

        RiskDecision::Allowed
    }

    /// Records a closed trade. Only a losing trade touches the cooldown timer.
    pub fn record_trade_result_at(&mut self, pnl: Decimal, now: DateTime<Utc>) {
        self.daily_pnl += pnl;
        self.trades_today += 1;

        if pnl < Decimal::ZERO {
            self.last_loss_time = Some(now);
        }

        tracing::debug!(
            pnl = %pnl,
            daily_pnl = %self.daily_pnl,
            trades_today = self.trades_today,
            "Trade result recorded."
        );
    }

    fn loss_cap_reached(&self) -> bool {
        self.daily_pnl <= -self.max_daily_loss
    }
}

impl RiskManager for DailyRiskManager {
    fn can_trade(&mut self) -> RiskDecision {
        self.can_trade_at(Utc::now())
    }

    fn record_trade_result(&mut self, pnl: Decimal) {
        self.record_trade_result_at(pnl, Utc::now());
    }

    fn should_stop_bot(&self) -> bool {
        self.loss_cap_reached()
    }
}
