//! # Scalper Executor Crate
//!
//! Trade execution for the single-position bot. `TradeExecutor` owns the one active
//! trade, sizes new positions from a fixed notional and decides when to exit. The
//! actual fills are delegated to a `Wallet`: `PaperWallet` simulates them with flat
//! fee and slippage rates, `LiveWallet` places real market orders.
//!
//! ## Public API
//!
//! - `Wallet`: the fill interface every wallet implements.
//! - `PaperWallet` / `LiveWallet`: the two wallet variants.
//! - `TradeExecutor`: the active-trade owner used by the engine.
//! - `calculate_take_profit` / `calculate_stop_loss`: exit level helpers.
//! - `ExecutorError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod live;
pub mod paper;
pub mod sl_tp;
pub mod trade_executor;
pub mod wallet;

// Re-export the key components to provide a clean, public-facing API.
pub use error::ExecutorError;
pub use live::LiveWallet;
pub use paper::PaperWallet;
pub use sl_tp::{calculate_stop_loss, calculate_take_profit};
pub use trade_executor::{ExitReason, TradeExecutor};
pub use wallet::Wallet;
