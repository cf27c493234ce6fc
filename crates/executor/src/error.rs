use api_client::error::ApiError;
use core_types::CoreError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Not enough balance to open trade. Required: {required}, Available: {available}")]
    InsufficientBalance { required: Decimal, available: Decimal },

    #[error("Active trade already exists")]
    ActiveTradeExists,

    #[error("No active trade")]
    NoActiveTrade,

    #[error("Price must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("Computed order quantity is zero for notional {notional} at price {price}")]
    ZeroQuantity { notional: Decimal, price: Decimal },

    #[error("Order for {0} was not filled")]
    Unfilled(String),

    #[error("Trade state error: {0}")]
    Trade(#[from] CoreError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl ExecutorError {
    /// True for errors that mean the single-active-trade bookkeeping was violated.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ExecutorError::ActiveTradeExists | ExecutorError::NoActiveTrade | ExecutorError::Trade(_)
        )
    }
}
