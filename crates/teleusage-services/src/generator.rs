//! Synthetic traffic generator
//!
//! Produces a random batch of call records between known subscribers and
//! appends it to the record store in one bulk write.

use chrono::{Duration, Local, Months, NaiveDateTime, Timelike};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use teleusage_core::{
    config::GeneratorConfig,
    models::{CallType, NewCallRecord, Subscriber},
    traits::{CdrRepository, SubscriberRepository},
    AppError, AppResult,
};
use tracing::{debug, info, instrument, warn};

/// Generates and stores random call traffic
pub struct TrafficGenerator {
    subscribers: Arc<dyn SubscriberRepository>,
    cdrs: Arc<dyn CdrRepository>,
    config: GeneratorConfig,
}

impl TrafficGenerator {
    /// Create a new traffic generator
    pub fn new(
        subscribers: Arc<dyn SubscriberRepository>,
        cdrs: Arc<dyn CdrRepository>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            subscribers,
            cdrs,
            config,
        }
    }

    /// Generate one batch over the current directory and persist it
    ///
    /// Returns the number of records written.
    #[instrument(skip(self))]
    pub async fn generate(&self) -> AppResult<u64> {
        let population = self.subscribers.find_all().await?;
        let now = Local::now().naive_local();

        let batch = generate_batch(
            &population,
            now,
            &self.config,
            &mut StdRng::from_entropy(),
        )
        .map_err(|e| {
            warn!("Traffic generation rejected: {}", e);
            e
        })?;

        if let (Some(first), Some(last)) = (batch.first(), batch.last()) {
            debug!(
                "Batch spans {} .. {}",
                first.call_start, last.call_start
            );
        }

        let written = self.cdrs.bulk_insert(&batch).await?;

        info!(
            "Generated {} call records across {} subscribers",
            written,
            population.len()
        );

        Ok(written)
    }
}

/// Build a random batch of call records, sorted by call start
///
/// The batch size, call durations and trailing window all come from
/// `config`. Caller and receiver are always distinct subscribers and the
/// direction tag is drawn independently of who called whom.
pub fn generate_batch<R: Rng>(
    subscribers: &[Subscriber],
    now: NaiveDateTime,
    config: &GeneratorConfig,
    rng: &mut R,
) -> AppResult<Vec<NewCallRecord>> {
    config.validate()?;

    match subscribers.len() {
        0 => return Err(AppError::EmptyPopulation),
        1 => return Err(AppError::PopulationTooSmall(1)),
        _ => {}
    }

    let now = now.with_nanosecond(0).unwrap_or(now);
    let window_start = now
        .checked_sub_months(Months::new(config.window_months))
        .ok_or_else(|| {
            AppError::Config(format!(
                "generator window of {} months is out of range",
                config.window_months
            ))
        })?;
    let window_seconds = (now - window_start).num_seconds();

    let count = rng.gen_range(config.min_records..=config.max_records);
    let mut batch = Vec::with_capacity(count);

    for _ in 0..count {
        let caller = rng.gen_range(0..subscribers.len());
        let mut receiver = rng.gen_range(0..subscribers.len());
        while receiver == caller {
            receiver = rng.gen_range(0..subscribers.len());
        }

        let call_start = window_start + Duration::seconds(rng.gen_range(0..=window_seconds));
        let duration = rng.gen_range(config.min_call_seconds..=config.max_call_seconds);
        let call_type = if rng.gen_bool(0.5) {
            CallType::Outgoing
        } else {
            CallType::Incoming
        };

        batch.push(NewCallRecord::new(
            call_type,
            subscribers[caller].msisdn.clone(),
            subscribers[receiver].msisdn.clone(),
            call_start,
            call_start + Duration::seconds(duration),
        )?);
    }

    // stable: equal starts keep generation order
    batch.sort_by_key(|record| record.call_start);

    Ok(batch)
}
