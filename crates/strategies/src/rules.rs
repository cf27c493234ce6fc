use core_types::MarketSnapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Spread at or above this percentage means the market is too thin.
pub const MAX_SPREAD_PCT: Decimal = dec!(0.08);
/// The fast EMA must lead the slow EMA by at least this factor.
pub const MIN_EMA_LEAD: Decimal = dec!(1.0003);
/// Price may sit at most this far under VWAP.
pub const VWAP_DISCOUNT_BAND: Decimal = dec!(0.9995);
pub const MIN_VOLUME_RATIO: Decimal = dec!(1.1);

/// The outcome of each entry clause for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryCheck {
    pub tight_spread: bool,
    pub ema_momentum: bool,
    pub above_vwap_band: bool,
    pub volume_surge: bool,
}

impl EntryCheck {
    pub fn passed(&self) -> bool {
        self.tight_spread && self.ema_momentum && self.above_vwap_band && self.volume_surge
    }
}

/// Evaluates every entry clause independently.
pub fn evaluate_entry(snapshot: &MarketSnapshot) -> EntryCheck {
    EntryCheck {
        tight_spread: snapshot.spread_pct < MAX_SPREAD_PCT,
        ema_momentum: snapshot.ema_9 >= snapshot.ema_21 * MIN_EMA_LEAD,
        above_vwap_band: snapshot.price >= snapshot.vwap * VWAP_DISCOUNT_BAND,
        volume_surge: snapshot.volume_ratio >= MIN_VOLUME_RATIO,
    }
}

/// Strict momentum and liquidity filter: true only when all four clauses hold.
pub fn entry_conditions(snapshot: &MarketSnapshot) -> bool {
    evaluate_entry(snapshot).passed()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn qualifying_snapshot(symbol: &str) -> MarketSnapshot {
        MarketSnapshot {
            symbol: symbol.to_string(),
            price: dec!(100),
            ema_9: dec!(100.1),
            ema_21: dec!(100),
            vwap: dec!(99.9),
            volume_ratio: dec!(1.5),
            spread_pct: dec!(0.01),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn accepts_snapshot_meeting_every_clause() {
        assert!(entry_conditions(&qualifying_snapshot("BTCUSDT")));
    }

    #[test]
    fn each_clause_fails_independently() {
        let mut wide = qualifying_snapshot("A");
        wide.spread_pct = dec!(0.08);
        let check = evaluate_entry(&wide);
        assert!(!check.tight_spread);
        assert!(check.ema_momentum && check.above_vwap_band && check.volume_surge);
        assert!(!entry_conditions(&wide));

        let mut flat = qualifying_snapshot("B");
        flat.ema_9 = dec!(100.02); // below 100 * 1.0003
        let check = evaluate_entry(&flat);
        assert!(!check.ema_momentum);
        assert!(check.tight_spread && check.above_vwap_band && check.volume_surge);

        let mut cheap = qualifying_snapshot("C");
        cheap.vwap = dec!(100.1); // 100 < 100.1 * 0.9995 = 100.04995
        let check = evaluate_entry(&cheap);
        assert!(!check.above_vwap_band);
        assert!(check.tight_spread && check.ema_momentum && check.volume_surge);

        let mut quiet = qualifying_snapshot("D");
        quiet.volume_ratio = dec!(1.09);
        let check = evaluate_entry(&quiet);
        assert!(!check.volume_surge);
        assert!(check.tight_spread && check.ema_momentum && check.above_vwap_band);
    }

    #[test]
    fn thresholds_are_inclusive_where_the_rule_says_so() {
        let mut edge = qualifying_snapshot("E");
        edge.ema_9 = dec!(100.03);
        edge.vwap = dec!(100.05); // 100.05 * 0.9995 = 99.999975
        edge.volume_ratio = dec!(1.1);
        edge.spread_pct = dec!(0.0799);
        assert!(entry_conditions(&edge));
    }

    #[test]
    fn evaluation_is_pure() {
        let snapshot = qualifying_snapshot("F");
        assert_eq!(evaluate_entry(&snapshot), evaluate_entry(&snapshot));
    }
}
