use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("API client error: {0}")]
    ApiClient(#[from] api_client::error::ApiError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Execution error: {0}")]
    Executor(#[from] executor::ExecutorError),

    #[error("Market data for '{symbol}' did not arrive within {timeout_ms} ms")]
    FetchTimeout { symbol: String, timeout_ms: u128 },

    #[error("Engine is stopped")]
    Stopped,
}

impl EngineError {
    /// True when the error means the active-trade bookkeeping is inconsistent. The run
    /// loop still continues after one of these, but logs it as an error.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            EngineError::Executor(e) => e.is_invariant_violation(),
            _ => false,
        }
    }
}
