//! Connection pool for the postgres storage backend

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use teleusage_core::{config::DatabaseConfig, AppError, AppResult};
use tracing::{info, warn};

/// Seconds to wait for a free connection before a store call fails
const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Idle connections above the minimum are closed after this many seconds
const IDLE_TIMEOUT_SECS: u64 = 600;

/// Open a pool against `database.url`
///
/// Fails with `Config` when no URL is set and with `Pool` when the server
/// cannot be reached. Schema bootstrap is left to [`crate::ensure_schema`].
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    let url = config.url.as_deref().ok_or_else(|| {
        AppError::Config("database.url must be set for the postgres backend".to_string())
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
        .idle_timeout(Some(Duration::from_secs(IDLE_TIMEOUT_SECS)))
        .test_before_acquire(true)
        .connect(url)
        .await
        .map_err(|e| {
            warn!("Failed to connect to record store: {}", e);
            AppError::Pool(format!("Failed to connect to database: {}", e))
        })?;

    info!(
        "Record store pool open, up to {} connections",
        config.max_connections
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_url_is_config_error() {
        let result = create_pool(&DatabaseConfig::default()).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_create_pool() {
        let config = DatabaseConfig {
            url: Some(
                std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/teleusage".to_string()),
            ),
            max_connections: 2,
        };

        let pool = create_pool(&config).await.unwrap();
        assert_eq!(pool.options().get_max_connections(), 2);
    }
}
