//! Schema bootstrap
//!
//! Creates the subscriber and call record tables if they are missing. Safe to
//! run from several processes at once: the DDL runs under an advisory lock.

use sqlx::PgPool;
use teleusage_core::{AppError, AppResult};
use tracing::{error, info, instrument};

/// Advisory lock key serializing schema creation
const SCHEMA_LOCK_KEY: i64 = 0x7465_6c65_0001;

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS subscribers (
        seq BIGSERIAL NOT NULL,
        msisdn VARCHAR(11) PRIMARY KEY
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS call_records (
        id BIGSERIAL PRIMARY KEY,
        call_type VARCHAR(8) NOT NULL CHECK (call_type IN ('OUTGOING', 'INCOMING')),
        calling_msisdn VARCHAR(11) NOT NULL REFERENCES subscribers (msisdn),
        receiving_msisdn VARCHAR(11) NOT NULL REFERENCES subscribers (msisdn),
        call_start TIMESTAMP NOT NULL,
        call_end TIMESTAMP NOT NULL,
        CHECK (calling_msisdn <> receiving_msisdn),
        CHECK (call_end > call_start)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_call_records_calling ON call_records (calling_msisdn, call_start)",
    "CREATE INDEX IF NOT EXISTS idx_call_records_receiving ON call_records (receiving_msisdn, call_start)",
];

/// Round-trip a trivial query so a bad URL or dead server fails at startup
pub async fn verify_connection(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1").execute(pool).await.map_err(|e| {
        error!("Database health check failed: {}", e);
        AppError::Database(format!("Database health check failed: {}", e))
    })?;

    Ok(())
}

/// Create tables and indexes if they do not exist
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> AppResult<()> {
    verify_connection(pool).await?;

    let mut tx = pool.begin().await.map_err(|e| {
        error!("Failed to start transaction: {}", e);
        AppError::Transaction(format!("Failed to start transaction: {}", e))
    })?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(format!("Failed to acquire schema lock: {}", e)))?;

    for statement in SCHEMA_STATEMENTS.iter().copied() {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Schema statement failed: {}", e);
                AppError::Database(format!("Failed to create schema: {}", e))
            })?;
    }

    tx.commit().await.map_err(|e| {
        error!("Failed to commit transaction: {}", e);
        AppError::Transaction(format!("Failed to commit transaction: {}", e))
    })?;

    info!("Database schema ready");

    Ok(())
}
