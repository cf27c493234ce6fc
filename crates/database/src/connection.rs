use crate::error::DbError;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// An empty `database_url` falls back to the `DATABASE_URL` environment variable.
pub async fn connect(database_url: &str) -> Result<PgPool, DbError> {
    let database_url = if database_url.is_empty() {
        env::var("DATABASE_URL").map_err(|_e| {
            DbError::ConnectionConfigError("database.url or DATABASE_URL must be set.".to_string())
        })?
    } else {
        database_url.to_string()
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations so the `trades` and `bot_events` tables exist.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
