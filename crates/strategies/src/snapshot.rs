use crate::error::StrategyError;
use crate::indicators::{ema, spread_pct, volume_ratio, vwap};
use chrono::{DateTime, Utc};
use core_types::{Candle, MarketSnapshot, Quote};
use rust_decimal::Decimal;

pub const FAST_EMA_PERIOD: usize = 9;
pub const SLOW_EMA_PERIOD: usize = 21;

/// Builds the indicator snapshot for one symbol.
///
/// `candles` must be ordered oldest to newest and hold at least `SLOW_EMA_PERIOD` bars.
/// The fast EMA uses only the last `FAST_EMA_PERIOD` closes; the slow EMA, VWAP and
/// volume ratio use the whole window.
pub fn build_snapshot(
    symbol: &str,
    candles: &[Candle],
    quote: &Quote,
    timestamp: DateTime<Utc>,
) -> Result<MarketSnapshot, StrategyError> {
    if candles.len() < SLOW_EMA_PERIOD {
        return Err(StrategyError::InsufficientData {
            required: SLOW_EMA_PERIOD,
            available: candles.len(),
        });
    }

    let closes: Vec<Decimal> = candles.iter().map(|c| c.close).collect();
    let fast_window = &closes[closes.len() - FAST_EMA_PERIOD..];

    let snapshot = MarketSnapshot {
        symbol: symbol.to_string(),
        price: closes[closes.len() - 1],
        ema_9: ema(fast_window, FAST_EMA_PERIOD)?,
        ema_21: ema(&closes, SLOW_EMA_PERIOD)?,
        vwap: vwap(candles)?,
        volume_ratio: volume_ratio(candles)?,
        spread_pct: spread_pct(quote)?,
        timestamp,
    };

    tracing::trace!(?snapshot, "Snapshot built.");
    Ok(snapshot)
}
