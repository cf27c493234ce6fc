use core_types::Trade;

pub fn trade_open_message(trade: &Trade) -> String {
    format!(
        "📈 Trade Opened\nSymbol: {}\nEntry: {}\nTP: {}\nSL: {}",
        trade.symbol, trade.entry_price, trade.take_profit, trade.stop_loss
    )
}

/// A trade without a realised PnL (still open) reports `n/a`.
pub fn trade_close_message(trade: &Trade) -> String {
    let pnl = trade
        .pnl
        .map(|p| p.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    format!("📉 Trade Closed\nSymbol: {}\nPnL: {}", trade.symbol, pnl)
}

pub fn engine_started_message() -> String {
    "✅ Scalper Engine Started".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn open_message_lists_levels() {
        let trade = Trade::open("ETHUSDT", dec!(2000), dec!(0.02), dec!(2018), dec!(1987), Utc::now());
        assert_eq!(
            trade_open_message(&trade),
            "📈 Trade Opened\nSymbol: ETHUSDT\nEntry: 2000\nTP: 2018\nSL: 1987"
        );
    }

    #[test]
    fn close_message_reports_pnl() {
        let mut trade = Trade::open("ETHUSDT", dec!(2000), dec!(0.02), dec!(2018), dec!(1987), Utc::now());
        assert!(trade_close_message(&trade).ends_with("PnL: n/a"));

        trade.close(dec!(2018), dec!(0.31), Utc::now()).unwrap();
        assert_eq!(trade_close_message(&trade), "📉 Trade Closed\nSymbol: ETHUSDT\nPnL: 0.31");
    }
}
