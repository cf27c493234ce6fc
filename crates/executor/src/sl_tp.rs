use rust_decimal::Decimal;

pub fn calculate_take_profit(entry_price: Decimal, tp_pct: Decimal) -> Decimal {
    entry_price * (Decimal::ONE + tp_pct)
}

pub fn calculate_stop_loss(entry_price: Decimal, sl_pct: Decimal) -> Decimal {
    entry_price * (Decimal::ONE - sl_pct)
}
