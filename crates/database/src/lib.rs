//! # Scalper Database Crate
//!
//! Persistence for closed trades and bot events. The engine only sees the
//! `TradeStore` trait; this crate provides the PostgreSQL (`DbRepository`),
//! Supabase (`SupabaseRepository`) and disabled (`NullStore`) backends.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: PostgreSQL pool setup and schema migration.
//! - `open_store`: builds the backend selected in `[database]`.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod store;
pub mod supabase;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, DbTrade};
pub use store::{NullStore, TradeStore};
pub use supabase::SupabaseRepository;

use configuration::{DatabaseBackend, DatabaseConfig};
use std::sync::Arc;

/// Builds the store selected by configuration, connecting and migrating PostgreSQL if needed.
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn TradeStore>, DbError> {
    match config.backend {
        DatabaseBackend::None => {
            tracing::info!("Persistence disabled.");
            Ok(Arc::new(NullStore))
        }
        DatabaseBackend::Postgres => {
            tracing::info!("Using PostgreSQL persistence.");
            let pool = connect(&config.url).await?;
            run_migrations(&pool).await?;
            Ok(Arc::new(DbRepository::new(pool)))
        }
        DatabaseBackend::Supabase => {
            tracing::info!("Using Supabase persistence.");
            Ok(Arc::new(SupabaseRepository::new(
                &config.supabase_url,
                &config.supabase_key,
            )?))
        }
    }
}
