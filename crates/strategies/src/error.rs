use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StrategyError {
    #[error("Not enough market data: {required} bars required, {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error("An indicator was asked to work on an empty window")]
    EmptyWindow,

    #[error("Best bid must be positive, got {0}")]
    NonPositiveBid(Decimal),
}
