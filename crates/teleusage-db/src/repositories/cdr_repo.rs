//! CDR (Call Detail Record) repository implementation
//!
//! Provides PostgreSQL-backed storage for call records with the role,
//! direction and time-window queries the usage and report services need.
//! Uses runtime queries (not compile-time macros) to avoid requiring
//! database connection at build time.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres, QueryBuilder};
use teleusage_core::{
    models::{CallRecord, CallType, Msisdn, NewCallRecord},
    traits::CdrRepository,
    AppError, AppResult,
};
use tracing::{debug, error, info, instrument};

/// Rows per INSERT statement during bulk writes
const INSERT_CHUNK_SIZE: usize = 1000;

/// PostgreSQL implementation of CdrRepository
pub struct PgCdrRepository {
    pool: PgPool,
}

impl PgCdrRepository {
    /// Create a new CDR repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(
        &self,
        query: QueryAs<'_, Postgres, CallRecordRow, PgArguments>,
        context: &str,
    ) -> AppResult<Vec<CallRecord>> {
        let rows = query.fetch_all(&self.pool).await.map_err(|e| {
            error!("Database error fetching {}: {}", context, e);
            AppError::Database(format!("Failed to fetch {}: {}", context, e))
        })?;

        debug!("Fetched {} records for {}", rows.len(), context);

        rows.into_iter().map(CallRecord::try_from).collect()
    }
}

const CDR_SELECT_COLUMNS: &str = r#"
    id, call_type,
    calling_msisdn, receiving_msisdn,
    call_start, call_end
"#;

#[async_trait]
impl CdrRepository for PgCdrRepository {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn bulk_insert(&self, records: &[NewCallRecord]) -> AppResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let mut inserted = 0;
        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO call_records (call_type, calling_msisdn, receiving_msisdn, call_start, call_end) ",
            );
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.call_type.as_db_str())
                    .push_bind(record.calling.as_str())
                    .push_bind(record.receiving.as_str())
                    .push_bind(record.call_start)
                    .push_bind(record.call_end);
            });

            let result = builder.build().execute(&mut *tx).await.map_err(|e| {
                error!("Database error inserting call records: {}", e);
                AppError::Database(format!("Failed to insert call records: {}", e))
            })?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!("Inserted {} call records", inserted);

        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn find_by_participant_and_time_range(
        &self,
        msisdn: &Msisdn,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<Vec<CallRecord>> {
        let query = format!(
            r#"
            SELECT {} FROM call_records
            WHERE (calling_msisdn = $1 OR receiving_msisdn = $1)
              AND call_start >= $2 AND call_start <= $3
            ORDER BY call_start, id
            "#,
            CDR_SELECT_COLUMNS
        );

        let q = sqlx::query_as::<Postgres, CallRecordRow>(&query)
            .bind(msisdn.as_str())
            .bind(start)
            .bind(end);
        self.fetch(q, "call records by participant").await
    }

    #[instrument(skip(self))]
    async fn find_by_caller(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
    ) -> AppResult<Vec<CallRecord>> {
        let query = format!(
            "SELECT {} FROM call_records WHERE calling_msisdn = $1 AND call_type = $2 ORDER BY call_start, id",
            CDR_SELECT_COLUMNS
        );

        let q = sqlx::query_as::<Postgres, CallRecordRow>(&query)
            .bind(msisdn.as_str())
            .bind(call_type.as_db_str());
        self.fetch(q, "call records by caller").await
    }

    #[instrument(skip(self))]
    async fn find_by_caller_in_month(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
        month: u32,
    ) -> AppResult<Vec<CallRecord>> {
        let query = format!(
            r#"
            SELECT {} FROM call_records
            WHERE calling_msisdn = $1 AND call_type = $2
              AND EXTRACT(MONTH FROM call_start)::INT = $3
            ORDER BY call_start, id
            "#,
            CDR_SELECT_COLUMNS
        );

        let q = sqlx::query_as::<Postgres, CallRecordRow>(&query)
            .bind(msisdn.as_str())
            .bind(call_type.as_db_str())
            .bind(month as i32);
        self.fetch(q, "call records by caller and month").await
    }

    #[instrument(skip(self))]
    async fn find_by_receiver(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
    ) -> AppResult<Vec<CallRecord>> {
        let query = format!(
            "SELECT {} FROM call_records WHERE receiving_msisdn = $1 AND call_type = $2 ORDER BY call_start, id",
            CDR_SELECT_COLUMNS
        );

        let q = sqlx::query_as::<Postgres, CallRecordRow>(&query)
            .bind(msisdn.as_str())
            .bind(call_type.as_db_str());
        self.fetch(q, "call records by receiver").await
    }

    #[instrument(skip(self))]
    async fn find_by_receiver_in_month(
        &self,
        msisdn: &Msisdn,
        call_type: CallType,
        month: u32,
    ) -> AppResult<Vec<CallRecord>> {
        let query = format!(
            r#"
            SELECT {} FROM call_records
            WHERE receiving_msisdn = $1 AND call_type = $2
              AND EXTRACT(MONTH FROM call_start)::INT = $3
            ORDER BY call_start, id
            "#,
            CDR_SELECT_COLUMNS
        );

        let q = sqlx::query_as::<Postgres, CallRecordRow>(&query)
            .bind(msisdn.as_str())
            .bind(call_type.as_db_str())
            .bind(month as i32);
        self.fetch(q, "call records by receiver and month").await
    }
}

/// Helper struct for mapping database rows to domain model
#[derive(Debug, sqlx::FromRow)]
struct CallRecordRow {
    id: i64,
    call_type: String,
    calling_msisdn: String,
    receiving_msisdn: String,
    call_start: NaiveDateTime,
    call_end: NaiveDateTime,
}

impl TryFrom<CallRecordRow> for CallRecord {
    type Error = AppError;

    fn try_from(row: CallRecordRow) -> Result<Self, Self::Error> {
        let call_type = CallType::from_db_str(&row.call_type).ok_or_else(|| {
            AppError::Database(format!(
                "Unknown call type '{}' on record {}",
                row.call_type, row.id
            ))
        })?;

        Ok(Self {
            id: row.id,
            call_type,
            calling: Msisdn::try_from(row.calling_msisdn)?,
            receiving: Msisdn::try_from(row.receiving_msisdn)?,
            call_start: row.call_start,
            call_end: row.call_end,
        })
    }
}
