use crate::error::StrategyError;
use core_types::{Candle, Quote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Exponential moving average over `values`, oldest first.
///
/// Seeded with the first value rather than a simple average. The caller decides the
/// window; nothing is trimmed here.
pub fn ema(values: &[Decimal], period: usize) -> Result<Decimal, StrategyError> {
    let (first, rest) = values.split_first().ok_or(StrategyError::EmptyWindow)?;
    let multiplier = dec!(2) / (Decimal::from(period) + Decimal::ONE);

    let value = rest
        .iter()
        .fold(*first, |ema, price| (*price - ema) * multiplier + ema);

    Ok(value)
}

/// Volume-weighted mean close. Falls back to the last close when there is no volume.
pub fn vwap(candles: &[Candle]) -> Result<Decimal, StrategyError> {
    let last = candles.last().ok_or(StrategyError::EmptyWindow)?;

    let total_volume: Decimal = candles.iter().map(|c| c.volume).sum();
    if total_volume.is_zero() {
        return Ok(last.close);
    }

    let weighted: Decimal = candles.iter().map(|c| c.close * c.volume).sum();
    Ok(weighted / total_volume)
}

/// Volume of the newest bar relative to the mean volume of all earlier bars.
pub fn volume_ratio(candles: &[Candle]) -> Result<Decimal, StrategyError> {
    let (latest, prior) = candles
        .split_last()
        .filter(|(_, prior)| !prior.is_empty())
        .ok_or(StrategyError::InsufficientData {
            required: 2,
            available: candles.len(),
        })?;

    let prior_total: Decimal = prior.iter().map(|c| c.volume).sum();
    let average = prior_total / Decimal::from(prior.len());
    if average.is_zero() {
        return Ok(Decimal::ZERO);
    }

    Ok(latest.volume / average)
}

/// Bid-ask spread as a percentage of the bid.
pub fn spread_pct(quote: &Quote) -> Result<Decimal, StrategyError> {
    if quote.bid <= Decimal::ZERO {
        return Err(StrategyError::NonPositiveBid(quote.bid));
    }
    Ok((quote.ask - quote.bid) / quote.bid * dec!(100))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    pub(crate) fn candle(close: Decimal, volume: Decimal) -> Candle {
        Candle {
            open_time: Utc.timestamp_opt(0, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    #[test]
    fn ema_is_seeded_with_first_value() {
        assert_eq!(ema(&[dec!(10)], 9).unwrap(), dec!(10));

        // multiplier = 2 / 4 = 0.5
        // 10 -> (20 - 10) * 0.5 + 10 = 15 -> (30 - 15) * 0.5 + 15 = 22.5
        let value = ema(&[dec!(10), dec!(20), dec!(30)], 3).unwrap();
        assert_eq!(value, dec!(22.5));
    }

    #[test]
    fn ema_of_empty_window_fails() {
        assert_eq!(ema(&[], 9), Err(StrategyError::EmptyWindow));
    }

    #[test]
    fn vwap_weights_closes_by_volume() {
        let candles = [candle(dec!(100), dec!(1)), candle(dec!(110), dec!(3))];
        // (100 * 1 + 110 * 3) / 4 = 107.5
        assert_eq!(vwap(&candles).unwrap(), dec!(107.5));
    }

    #[test]
    fn vwap_without_volume_is_last_close() {
        let candles = [candle(dec!(100), dec!(0)), candle(dec!(105), dec!(0))];
        assert_eq!(vwap(&candles).unwrap(), dec!(105));
    }

    #[test]
    fn volume_ratio_compares_latest_bar_with_prior_mean() {
        let candles = [
            candle(dec!(1), dec!(10)),
            candle(dec!(1), dec!(30)),
            candle(dec!(1), dec!(40)),
        ];
        assert_eq!(volume_ratio(&candles).unwrap(), dec!(2));
    }

    #[test]
    fn volume_ratio_is_zero_when_prior_volume_is_zero() {
        let candles = [candle(dec!(1), dec!(0)), candle(dec!(1), dec!(5))];
        assert_eq!(volume_ratio(&candles).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn volume_ratio_needs_a_prior_bar() {
        let candles = [candle(dec!(1), dec!(5))];
        assert!(matches!(
            volume_ratio(&candles),
            Err(StrategyError::InsufficientData { required: 2, available: 1 })
        ));
    }

    #[test]
    fn spread_is_a_percentage_of_the_bid() {
        let quote = Quote { bid: dec!(100), ask: dec!(100.05) };
        assert_eq!(spread_pct(&quote).unwrap(), dec!(0.05));

        let bad = Quote { bid: dec!(0), ask: dec!(1) };
        assert_eq!(spread_pct(&bad), Err(StrategyError::NonPositiveBid(dec!(0))));
    }
}
