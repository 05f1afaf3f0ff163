//! Store traits
//!
//! Abstractions over the subscriber directory and the call record store.
//! Implementations live in `teleusage-db`.

use crate::error::AppError;
use crate::models::{CallRecord, CallType, Msisdn, NewCallRecord, Subscriber};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Subscriber directory
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Count known subscribers
    async fn count(&self) -> Result<i64, AppError>;

    /// All subscribers, in insertion order
    async fn find_all(&self) -> Result<Vec<Subscriber>, AppError>;

    /// Check whether a subscriber exists
    async fn exists(&self, msisdn: &Msisdn) -> Result<bool, AppError>;

    /// Insert subscribers, ignoring ones already present
    ///
    /// Returns the number of rows actually inserted.
    async fn save_all(&self, subscribers: &[Subscriber]) -> Result<u64, AppError>;

    /// Insert the given subscribers only if the directory is empty
    ///
    /// The emptiness check and the insert happen atomically, so concurrent
    /// callers never seed twice. Returns the number of rows inserted.
    async fn seed_if_empty(&self, subscribers: &[Subscriber]) -> Result<u64, AppError>;
}

/// Append-only call record store
///
/// Every query returns records ordered by `call_start` ascending.
#[async_trait]
pub trait CdrRepository: Send + Sync {
    /// Persist a batch in a single write, keeping its order
    async fn bulk_insert(&self, records: &[NewCallRecord]) -> Result<u64, AppError>;

    /// Records where the subscriber is caller or receiver and
    /// `start <= call_start <= end`
    async fn find_by_participant_and_time_range(
        &self,
        msisdn: &Msisdn,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CallRecord>, AppError>;

    /// Records placed by the subscriber with the given direction tag
    async fn find_by_caller(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
    ) -> Result<Vec<CallRecord>, AppError>;

    /// Records placed by the subscriber with the given tag, starting in `month`
    async fn find_by_caller_in_month(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
        month: u32,
    ) -> Result<Vec<CallRecord>, AppError>;

    /// Records received by the subscriber with the given direction tag
    async fn find_by_receiver(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
    ) -> Result<Vec<CallRecord>, AppError>;

    /// Records received by the subscriber with the given tag, starting in `month`
    async fn find_by_receiver_in_month(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
        month: u32,
    ) -> Result<Vec<CallRecord>, AppError>;
}
