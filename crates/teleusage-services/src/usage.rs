//! Usage aggregation (UDR)
//!
//! Totals a subscriber's talk time from stored call records.
//!
//! # Attribution
//!
//! A call record carries a single direction tag, drawn independently of who
//! called whom. Incoming time is the sum over records where the subscriber
//! is the *receiving* party and the tag is `INCOMING`; outgoing time is the
//! sum over records where the subscriber is the *calling* party and the tag
//! is `OUTGOING`. The opposite party of a record never counts it toward its
//! own totals, so a subscriber who placed many calls can still report zero
//! outgoing time when those records were tagged `INCOMING`.

use std::sync::Arc;
use teleusage_core::{
    models::{CallType, Msisdn, UsageSummary},
    traits::{CdrRepository, SubscriberRepository},
    validation::{validate_month, validate_optional_month},
    AppError, AppResult,
};
use tracing::{debug, info, instrument, warn};

/// Computes usage summaries from the record store
pub struct UsageAggregator {
    subscribers: Arc<dyn SubscriberRepository>,
    cdrs: Arc<dyn CdrRepository>,
}

impl UsageAggregator {
    pub fn new(subscribers: Arc<dyn SubscriberRepository>, cdrs: Arc<dyn CdrRepository>) -> Self {
        Self { subscribers, cdrs }
    }

    /// Usage summary for one subscriber, optionally limited to a calendar month
    ///
    /// The month matches the month of the call start in any year.
    #[instrument(skip(self))]
    pub async fn summarize(&self, msisdn: &str, month: Option<u32>) -> AppResult<UsageSummary> {
        let msisdn = Msisdn::parse(msisdn).map_err(|e| {
            warn!("Rejected usage request: {}", e);
            e
        })?;
        validate_optional_month(month)?;

        if !self.subscribers.exists(&msisdn).await? {
            warn!("Subscriber {} not found", msisdn);
            return Err(AppError::SubscriberNotFound(msisdn.to_string()));
        }

        self.summarize_known(msisdn, month).await
    }

    /// Usage summaries for every subscriber with traffic in `month`
    ///
    /// Subscribers without matching records are omitted. Any other failure
    /// aborts the whole batch.
    #[instrument(skip(self))]
    pub async fn summarize_all(&self, month: u32) -> AppResult<Vec<UsageSummary>> {
        validate_month(month)?;

        let subscribers = self.subscribers.find_all().await?;
        let mut summaries = Vec::with_capacity(subscribers.len());

        for subscriber in subscribers {
            match self.summarize_known(subscriber.msisdn, Some(month)).await {
                Ok(summary) => summaries.push(summary),
                Err(e) if e.is_not_found() => debug!("Skipping: {}", e),
                Err(e) => return Err(e),
            }
        }

        info!("Built {} usage summaries for month {}", summaries.len(), month);

        Ok(summaries)
    }

    async fn summarize_known(&self, msisdn: Msisdn, month: Option<u32>) -> AppResult<UsageSummary> {
        let (incoming, outgoing) = match month {
            Some(month) => (
                self.cdrs
                    .find_by_receiver_in_month(&msisdn, CallType::Incoming, month)
                    .await?,
                self.cdrs
                    .find_by_caller_in_month(&msisdn, CallType::Outgoing, month)
                    .await?,
            ),
            None => (
                self.cdrs
                    .find_by_receiver(&msisdn, CallType::Incoming)
                    .await?,
                self.cdrs
                    .find_by_caller(&msisdn, CallType::Outgoing)
                    .await?,
            ),
        };

        if incoming.is_empty() && outgoing.is_empty() {
            return Err(AppError::NoUsageData(msisdn.to_string()));
        }

        debug!(
            "{} incoming and {} outgoing records for {}",
            incoming.len(),
            outgoing.len(),
            msisdn
        );

        Ok(UsageSummary::from_records(msisdn, &incoming, &outgoing))
    }
}
