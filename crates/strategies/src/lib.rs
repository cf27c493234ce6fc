//! # Scalper Strategy Library
//!
//! Pure decision logic for the momentum scalper: indicator maths, the per-symbol
//! snapshot builder, the entry rule and the candidate selector. Nothing in this
//! crate performs I/O or keeps state between calls.
//!
//! ## Public API
//!
//! - `build_snapshot`: turns candles and a quote into a `MarketSnapshot`.
//! - `entry_conditions` / `evaluate_entry`: does a snapshot qualify for entry.
//! - `select_best`: picks the single highest-scoring candidate.
//! - `StrategyError`: bad or insufficient market data.

pub mod error;
pub mod indicators;
pub mod rules;
pub mod selector;
pub mod snapshot;

pub use error::StrategyError;
pub use rules::{entry_conditions, evaluate_entry, EntryCheck};
pub use selector::{momentum_score, select_best};
pub use snapshot::{build_snapshot, FAST_EMA_PERIOD, SLOW_EMA_PERIOD};
