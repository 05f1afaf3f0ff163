//! Subscriber directory repository implementation
//!
//! PostgreSQL-backed directory keyed by MSISDN. Seeding takes a
//! transaction-scoped advisory lock so concurrent process starts insert the
//! seed set at most once.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use teleusage_core::{
    models::{Msisdn, Subscriber},
    traits::SubscriberRepository,
    AppError, AppResult,
};
use tracing::{debug, error, info, instrument};

/// Advisory lock key serializing the seed step
const SEED_LOCK_KEY: i64 = 0x7465_6c65_0002;

/// PostgreSQL implementation of SubscriberRepository
pub struct PgSubscriberRepository {
    pool: PgPool,
}

impl PgSubscriberRepository {
    /// Create a new subscriber repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Build an insert-if-absent statement for a batch of subscribers
fn insert_ignoring_duplicates(subscribers: &[Subscriber]) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new("INSERT INTO subscribers (msisdn) ");
    builder.push_values(subscribers, |mut row, subscriber| {
        row.push_bind(subscriber.msisdn.as_str());
    });
    builder.push(" ON CONFLICT (msisdn) DO NOTHING");
    builder
}

#[async_trait]
impl SubscriberRepository for PgSubscriberRepository {
    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscribers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting subscribers: {}", e);
                AppError::Database(format!("Failed to count subscribers: {}", e))
            })?;

        Ok(result.0)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> AppResult<Vec<Subscriber>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT msisdn FROM subscribers ORDER BY seq")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error fetching subscribers: {}", e);
                AppError::Database(format!("Failed to fetch subscribers: {}", e))
            })?;

        rows.into_iter()
            .map(|(msisdn,)| Msisdn::try_from(msisdn).map(Subscriber::new))
            .collect()
    }

    #[instrument(skip(self))]
    async fn exists(&self, msisdn: &Msisdn) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM subscribers WHERE msisdn = $1)")
                .bind(msisdn.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Database error checking subscriber {}: {}", msisdn, e);
                    AppError::Database(format!("Failed to check subscriber: {}", e))
                })?;

        Ok(result.0)
    }

    #[instrument(skip(self, subscribers), fields(count = subscribers.len()))]
    async fn save_all(&self, subscribers: &[Subscriber]) -> AppResult<u64> {
        if subscribers.is_empty() {
            return Ok(0);
        }

        let mut builder = insert_ignoring_duplicates(subscribers);
        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error saving subscribers: {}", e);
                AppError::Database(format!("Failed to save subscribers: {}", e))
            })?;

        debug!("Saved {} new subscribers", result.rows_affected());

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, subscribers), fields(count = subscribers.len()))]
    async fn seed_if_empty(&self, subscribers: &[Subscriber]) -> AppResult<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to acquire seed lock: {}", e)))?;

        let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscribers")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count subscribers: {}", e)))?;

        let inserted = if existing.0 == 0 && !subscribers.is_empty() {
            let mut builder = insert_ignoring_duplicates(subscribers);
            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Database error seeding subscribers: {}", e);
                    AppError::Database(format!("Failed to seed subscribers: {}", e))
                })?
                .rows_affected()
        } else {
            0
        };

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        if inserted > 0 {
            info!("Seeded {} subscribers", inserted);
        } else {
            debug!("Subscriber directory already populated, seed skipped");
        }

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_db;
    use std::sync::Arc;

    const A: &str = "79001112233";
    const B: &str = "79002223344";
    const C: &str = "79003334455";

    fn numbers(subscribers: Vec<Subscriber>) -> Vec<String> {
        subscribers
            .into_iter()
            .map(|s| s.msisdn.to_string())
            .collect()
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_seed_runs_only_once() {
        let (_guard, pool) = test_db::clean_pool().await;
        let repo = PgSubscriberRepository::new(pool);
        let seed = Subscriber::from_numbers([A, B]).unwrap();

        assert_eq!(repo.seed_if_empty(&seed).await.unwrap(), 2);
        assert_eq!(repo.seed_if_empty(&seed).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_seed_skipped_when_directory_has_entries() {
        let (_guard, pool) = test_db::clean_pool().await;
        let repo = PgSubscriberRepository::new(pool);
        repo.save_all(&Subscriber::from_numbers([C]).unwrap())
            .await
            .unwrap();

        let seed = Subscriber::from_numbers([A, B]).unwrap();
        assert_eq!(repo.seed_if_empty(&seed).await.unwrap(), 0);
        assert!(!repo.exists(&Msisdn::parse(A).unwrap()).await.unwrap());
        assert!(repo.exists(&Msisdn::parse(C).unwrap()).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_concurrent_seeding_inserts_once() {
        let (_guard, pool) = test_db::clean_pool().await;
        let repo = Arc::new(PgSubscriberRepository::new(pool));
        let seed = Subscriber::from_numbers([A, B, C]).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                let seed = seed.clone();
                tokio::spawn(async move { repo.seed_if_empty(&seed).await.unwrap() })
            })
            .collect();

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }

        assert_eq!(total, 3);
        assert_eq!(numbers(repo.find_all().await.unwrap()), vec![A, B, C]);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_save_all_ignores_duplicates_and_keeps_order() {
        let (_guard, pool) = test_db::clean_pool().await;
        let repo = PgSubscriberRepository::new(pool);
        repo.save_all(&Subscriber::from_numbers([B, A]).unwrap())
            .await
            .unwrap();

        let inserted = repo
            .save_all(&Subscriber::from_numbers([A, C]).unwrap())
            .await
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(numbers(repo.find_all().await.unwrap()), vec![B, A, C]);
    }
}
