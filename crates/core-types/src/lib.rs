pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{BotState, EventType, OrderSide, TradingMode};
pub use error::CoreError;
pub use structs::{Candle, MarketSnapshot, Quote, Trade};
