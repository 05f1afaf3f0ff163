//! Subscriber directory seeding

use std::sync::Arc;
use teleusage_core::{models::Subscriber, traits::SubscriberRepository, AppResult};
use tracing::{info, instrument};

/// Populates an empty directory with the configured subscriber pool
pub struct SubscriberSeeder {
    subscribers: Arc<dyn SubscriberRepository>,
    pool: Vec<Subscriber>,
}

impl SubscriberSeeder {
    pub fn new(subscribers: Arc<dyn SubscriberRepository>, pool: Vec<Subscriber>) -> Self {
        Self { subscribers, pool }
    }

    /// Seed the directory if it holds no subscribers
    ///
    /// Safe to call from concurrent starts; the store performs the emptiness
    /// check and the insert as one step. Returns the number inserted.
    #[instrument(skip(self), fields(pool = self.pool.len()))]
    pub async fn seed(&self) -> AppResult<u64> {
        let inserted = self.subscribers.seed_if_empty(&self.pool).await?;
        let total = self.subscribers.count().await?;

        info!(
            "Subscriber directory ready: {} subscribers ({} seeded)",
            total, inserted
        );

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teleusage_core::config::DEFAULT_SEED_MSISDNS;
    use teleusage_db::InMemorySubscriberRepository;

    #[tokio::test]
    async fn test_seed_runs_once() {
        let repo = Arc::new(InMemorySubscriberRepository::new());
        let seeder = SubscriberSeeder::new(
            repo.clone(),
            Subscriber::from_numbers(DEFAULT_SEED_MSISDNS).unwrap(),
        );

        assert_eq!(seeder.seed().await.unwrap(), 10);
        assert_eq!(seeder.seed().await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_concurrent_seeding_inserts_once() {
        let repo = Arc::new(InMemorySubscriberRepository::new());
        let pool = Subscriber::from_numbers(DEFAULT_SEED_MSISDNS).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let seeder = SubscriberSeeder::new(repo.clone(), pool.clone());
                tokio::spawn(async move { seeder.seed().await.unwrap() })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            inserted += handle.await.unwrap();
        }

        assert_eq!(inserted, 10);
        assert_eq!(repo.count().await.unwrap(), 10);
    }
}
