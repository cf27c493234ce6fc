use crate::error::EngineError;
use api_client::MarketData;
use chrono::Utc;
use core_types::MarketSnapshot;
use futures::future::join_all;
use std::time::Duration;
use strategies::build_snapshot;

/// Fetches candles and quote for one symbol concurrently and builds its snapshot.
///
/// Any failure (transport, parse, timeout or insufficient data) yields `None`; the
/// symbol is simply absent from this round.
pub async fn fetch_snapshot(
    market: &dyn MarketData,
    symbol: &str,
    timeout: Duration,
) -> Option<MarketSnapshot> {
    match try_fetch_snapshot(market, symbol, timeout).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::debug!(symbol, error = %e, "Dropping symbol from this scan.");
            None
        }
    }
}

async fn try_fetch_snapshot(
    market: &dyn MarketData,
    symbol: &str,
    timeout: Duration,
) -> Result<MarketSnapshot, EngineError> {
    let fetch = async { tokio::join!(market.fetch_candles(symbol), market.fetch_quote(symbol)) };
    let (candles, quote) = tokio::time::timeout(timeout, fetch)
        .await
        .map_err(|_| EngineError::FetchTimeout {
            symbol: symbol.to_string(),
            timeout_ms: timeout.as_millis(),
        })?;

    Ok(build_snapshot(symbol, &candles?, &quote?, Utc::now())?)
}

/// Scans every symbol concurrently. Order follows `symbols`; failed symbols are dropped.
pub async fn fetch_snapshots(
    market: &dyn MarketData,
    symbols: &[String],
    timeout: Duration,
) -> Vec<MarketSnapshot> {
    let fetches = symbols.iter().map(|symbol| fetch_snapshot(market, symbol, timeout));
    let snapshots: Vec<MarketSnapshot> = join_all(fetches).await.into_iter().flatten().collect();

    tracing::debug!(requested = symbols.len(), received = snapshots.len(), "Scan complete.");
    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::MockMarket;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn drops_failing_symbols_and_keeps_order() {
        let market = MockMarket::new(&[("ETHUSDT", dec!(2000)), ("BTCUSDT", dec!(60000))]);
        let symbols: Vec<String> = ["BTCUSDT", "DOGEUSDT", "ETHUSDT"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let snapshots = fetch_snapshots(&market, &symbols, Duration::from_secs(1)).await;
        let names: Vec<&str> = snapshots.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(snapshots[0].price, dec!(60000));
    }

    #[tokio::test]
    async fn short_history_is_dropped() {
        let market = MockMarket::new(&[("BTCUSDT", dec!(100))]).with_bars(5);
        assert!(fetch_snapshot(&market, "BTCUSDT", Duration::from_secs(1)).await.is_none());
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        let market = MockMarket::new(&[("BTCUSDT", dec!(100))]).with_delay(Duration::from_millis(200));
        let snapshot = fetch_snapshot(&market, "BTCUSDT", Duration::from_millis(10)).await;
        assert!(snapshot.is_none());
    }
}
