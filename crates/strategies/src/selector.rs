use core_types::MarketSnapshot;
use rust_decimal::prelude::ToPrimitive;

/// Simple, explainable ranking: volume surge plus EMA lead.
pub fn momentum_score(snapshot: &MarketSnapshot) -> f64 {
    (snapshot.volume_ratio + (snapshot.ema_9 - snapshot.ema_21))
        .to_f64()
        .unwrap_or(f64::NEG_INFINITY)
}

/// Returns the highest-scoring candidate. On a tie the first one seen wins.
pub fn select_best(candidates: &[MarketSnapshot]) -> Option<&MarketSnapshot> {
    let mut best: Option<(&MarketSnapshot, f64)> = None;

    for candidate in candidates {
        let score = momentum_score(candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    best.map(|(snapshot, _)| snapshot)
}
