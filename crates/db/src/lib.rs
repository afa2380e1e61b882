//! Persistence layer for hookrelay.
//!
//! - [`models`] — subscription and delivery rows plus request DTOs.
//! - [`store`] — the [`WebhookStore`](store::WebhookStore) trait with a
//!   Postgres implementation (sqlx) and an in-memory implementation used
//!   by tests and embedded deployments.

pub mod models;
pub mod store;

pub use store::memory::MemoryWebhookStore;
pub use store::postgres::PgWebhookStore;
pub use store::{StoreError, WebhookStore};

/// Postgres connection pool used across the service.
pub type DbPool = sqlx::PgPool;

/// Create a connection pool against the given database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Cheap connectivity check (`SELECT 1`).
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
