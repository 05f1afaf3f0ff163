//! Shared setup for the Postgres-backed tests

use crate::{create_pool, ensure_schema};
use sqlx::PgPool;
use teleusage_core::config::DatabaseConfig;
use tokio::sync::{Mutex, MutexGuard};

/// Tests that truncate share the tables, so they take turns
static TABLES: Mutex<()> = Mutex::const_new(());

/// Pool against `DATABASE_URL` with the schema in place
pub async fn pool() -> PgPool {
    let config = DatabaseConfig {
        url: Some(
            std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/teleusage".to_string()),
        ),
        max_connections: 10,
    };

    let pool = create_pool(&config).await.unwrap();
    ensure_schema(&pool).await.unwrap();
    pool
}

/// Pool over emptied tables with id sequences restarted
///
/// Keep the guard alive for the whole test.
pub async fn clean_pool() -> (MutexGuard<'static, ()>, PgPool) {
    let guard = TABLES.lock().await;
    let pool = pool().await;
    sqlx::query("TRUNCATE call_records, subscribers RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .unwrap();
    (guard, pool)
}
