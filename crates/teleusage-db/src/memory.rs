//! In-process storage backend
//!
//! Same query semantics as the PostgreSQL repositories, backed by
//! `parking_lot` locks. Nothing survives a restart. Used as the default
//! backend and throughout the service tests.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime};
use parking_lot::RwLock;
use teleusage_core::{
    models::{CallRecord, CallType, Msisdn, NewCallRecord, Subscriber},
    traits::{CdrRepository, SubscriberRepository},
    AppResult,
};
use tracing::{debug, info, instrument};

/// Subscriber directory held in memory, in insertion order
#[derive(Debug, Default)]
pub struct InMemorySubscriberRepository {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with the given subscribers
    pub fn with_subscribers(subscribers: Vec<Subscriber>) -> Self {
        let repo = Self::new();
        insert_missing(&mut repo.subscribers.write(), &subscribers);
        repo
    }
}

fn insert_missing(directory: &mut Vec<Subscriber>, subscribers: &[Subscriber]) -> u64 {
    let mut inserted = 0;
    for subscriber in subscribers {
        if !directory.iter().any(|s| s.msisdn == subscriber.msisdn) {
            directory.push(subscriber.clone());
            inserted += 1;
        }
    }
    inserted
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn count(&self) -> AppResult<i64> {
        Ok(self.subscribers.read().len() as i64)
    }

    async fn find_all(&self) -> AppResult<Vec<Subscriber>> {
        Ok(self.subscribers.read().clone())
    }

    async fn exists(&self, msisdn: &Msisdn) -> AppResult<bool> {
        Ok(self.subscribers.read().iter().any(|s| &s.msisdn == msisdn))
    }

    async fn save_all(&self, subscribers: &[Subscriber]) -> AppResult<u64> {
        Ok(insert_missing(&mut self.subscribers.write(), subscribers))
    }

    #[instrument(skip(self, subscribers), fields(count = subscribers.len()))]
    async fn seed_if_empty(&self, subscribers: &[Subscriber]) -> AppResult<u64> {
        let mut directory = self.subscribers.write();
        if !directory.is_empty() {
            debug!("Subscriber directory already populated, seed skipped");
            return Ok(0);
        }

        let inserted = insert_missing(&mut directory, subscribers);
        info!("Seeded {} subscribers", inserted);
        Ok(inserted)
    }
}

#[derive(Debug, Default)]
struct CdrTable {
    next_id: i64,
    records: Vec<CallRecord>,
}

/// Append-only call record store held in memory
#[derive(Debug, Default)]
pub struct InMemoryCdrRepository {
    table: RwLock<CdrTable>,
}

impl InMemoryCdrRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.table.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select<F>(&self, predicate: F) -> Vec<CallRecord>
    where
        F: Fn(&CallRecord) -> bool,
    {
        let mut matched: Vec<CallRecord> = self
            .table
            .read()
            .records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        matched.sort_by_key(|r| (r.call_start, r.id));
        matched
    }
}

#[async_trait]
impl CdrRepository for InMemoryCdrRepository {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn bulk_insert(&self, records: &[NewCallRecord]) -> AppResult<u64> {
        let mut table = self.table.write();
        table.records.reserve(records.len());
        for record in records {
            table.next_id += 1;
            let id = table.next_id;
            table.records.push(CallRecord::from_new(id, record.clone()));
        }

        debug!("Inserted {} call records", records.len());
        Ok(records.len() as u64)
    }

    async fn find_by_participant_and_time_range(
        &self,
        msisdn: &Msisdn,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<Vec<CallRecord>> {
        Ok(self.select(|r| r.involves(msisdn) && r.call_start >= start && r.call_start <= end))
    }

    async fn find_by_caller(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
    ) -> AppResult<Vec<CallRecord>> {
        Ok(self.select(|r| &r.calling == msisdn && r.call_type == call_type))
    }

    async fn find_by_caller_in_month(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
        month: u32,
    ) -> AppResult<Vec<CallRecord>> {
        Ok(self.select(|r| {
            &r.calling == msisdn && r.call_type == call_type && r.call_start.month() == month
        }))
    }

    async fn find_by_receiver(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
    ) -> AppResult<Vec<CallRecord>> {
        Ok(self.select(|r| &r.receiving == msisdn && r.call_type == call_type))
    }

    async fn find_by_receiver_in_month(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
        month: u32,
    ) -> AppResult<Vec<CallRecord>> {
        Ok(self.select(|r| {
            &r.receiving == msisdn && r.call_type == call_type && r.call_start.month() == month
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn msisdn(s: &str) -> Msisdn {
        Msisdn::parse(s).unwrap()
    }

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn call(call_type: CallType, from: &str, to: &str, start: NaiveDateTime) -> NewCallRecord {
        NewCallRecord::new(
            call_type,
            msisdn(from),
            msisdn(to),
            start,
            start + Duration::seconds(60),
        )
        .unwrap()
    }

    const A: &str = "79001112233";
    const B: &str = "79002223344";
    const C: &str = "79003334455";

    #[tokio::test]
    async fn test_seed_if_empty_only_once() {
        let repo = InMemorySubscriberRepository::new();
        let seed = Subscriber::from_numbers([A, B]).unwrap();

        assert_eq!(repo.seed_if_empty(&seed).await.unwrap(), 2);
        assert_eq!(repo.seed_if_empty(&seed).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_seed_skipped_when_directory_has_entries() {
        let repo = InMemorySubscriberRepository::with_subscribers(
            Subscriber::from_numbers([C]).unwrap(),
        );
        let seed = Subscriber::from_numbers([A, B]).unwrap();

        assert_eq!(repo.seed_if_empty(&seed).await.unwrap(), 0);
        assert!(!repo.exists(&msisdn(A)).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_all_ignores_duplicates_and_keeps_order() {
        let repo = InMemorySubscriberRepository::new();
        repo.save_all(&Subscriber::from_numbers([B, A]).unwrap())
            .await
            .unwrap();
        let inserted = repo
            .save_all(&Subscriber::from_numbers([A, C]).unwrap())
            .await
            .unwrap();

        assert_eq!(inserted, 1);
        let all: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.msisdn.to_string())
            .collect();
        assert_eq!(all, vec![B, A, C]);
    }

    #[tokio::test]
    async fn test_bulk_insert_assigns_sequential_ids() {
        let repo = InMemoryCdrRepository::new();
        let batch = vec![
            call(CallType::Outgoing, A, B, at(2024, 1, 1, 9)),
            call(CallType::Incoming, B, A, at(2024, 1, 2, 9)),
        ];

        assert_eq!(repo.bulk_insert(&batch).await.unwrap(), 2);
        assert_eq!(repo.bulk_insert(&batch[..1]).await.unwrap(), 1);
        assert_eq!(repo.len(), 3);

        let records = repo.find_by_caller(&msisdn(A), CallType::Outgoing).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_participant_range_is_inclusive_and_ordered() {
        let repo = InMemoryCdrRepository::new();
        repo.bulk_insert(&[
            call(CallType::Outgoing, A, B, at(2024, 3, 10, 12)),
            call(CallType::Incoming, C, A, at(2024, 3, 1, 0)),
            call(CallType::Outgoing, B, C, at(2024, 3, 5, 0)),
            call(CallType::Outgoing, A, C, at(2024, 4, 1, 0)),
        ])
        .await
        .unwrap();

        let found = repo
            .find_by_participant_and_time_range(&msisdn(A), at(2024, 3, 1, 0), at(2024, 3, 10, 12))
            .await
            .unwrap();

        let starts: Vec<NaiveDateTime> = found.iter().map(|r| r.call_start).collect();
        assert_eq!(starts, vec![at(2024, 3, 1, 0), at(2024, 3, 10, 12)]);
    }

    #[tokio::test]
    async fn test_month_filter_matches_any_year() {
        let repo = InMemoryCdrRepository::new();
        repo.bulk_insert(&[
            call(CallType::Incoming, B, A, at(2023, 5, 20, 8)),
            call(CallType::Incoming, C, A, at(2024, 5, 2, 8)),
            call(CallType::Incoming, C, A, at(2024, 6, 2, 8)),
            call(CallType::Outgoing, C, A, at(2024, 5, 3, 8)),
        ])
        .await
        .unwrap();

        let may = repo
            .find_by_receiver_in_month(&msisdn(A), CallType::Incoming, 5)
            .await
            .unwrap();
        assert_eq!(may.len(), 2);
        assert_eq!(may[0].call_start, at(2023, 5, 20, 8));

        let all = repo
            .find_by_receiver(&msisdn(A), CallType::Incoming)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let outgoing = repo
            .find_by_caller_in_month(&msisdn(C), CallType::Outgoing, 5)
            .await
            .unwrap();
        assert_eq!(outgoing.len(), 1);
    }
}
