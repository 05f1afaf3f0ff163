//! CDR report export
//!
//! Writes a subscriber's call records for a date range to a CSV file under
//! the reports directory. Files are written to a temporary file in the same
//! directory and renamed into place, so a report is either complete or absent.

use chrono::{Local, NaiveDateTime};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use teleusage_core::{
    models::{CallRecord, Msisdn, CSV_DATETIME_FORMAT},
    traits::{CdrRepository, SubscriberRepository},
    validation::validate_date_range,
    AppError, AppResult,
};
use tempfile::NamedTempFile;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Exports call records to CSV report files
pub struct ReportExporter {
    subscribers: Arc<dyn SubscriberRepository>,
    cdrs: Arc<dyn CdrRepository>,
    reports_dir: PathBuf,
}

impl ReportExporter {
    /// Create an exporter, creating the reports directory if it is missing
    pub fn new(
        subscribers: Arc<dyn SubscriberRepository>,
        cdrs: Arc<dyn CdrRepository>,
        reports_dir: impl Into<PathBuf>,
    ) -> AppResult<Self> {
        let reports_dir = reports_dir.into();
        std::fs::create_dir_all(&reports_dir).map_err(|e| {
            error!("Cannot create reports directory {}: {}", reports_dir.display(), e);
            AppError::ReportGenerationFailed(format!(
                "Cannot create reports directory {}: {}",
                reports_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            subscribers,
            cdrs,
            reports_dir,
        })
    }

    /// Directory reports are written to
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Path of the report for a subscriber and request id
    pub fn report_path(&self, msisdn: &Msisdn, request_id: Uuid) -> PathBuf {
        self.reports_dir
            .join(format!("{}_{}.csv", msisdn, request_id))
    }

    /// Export all records the subscriber took part in between `start` and
    /// `end` (inclusive, by call start)
    ///
    /// Returns the request id embedded in the report file name.
    pub async fn export(
        &self,
        msisdn: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> AppResult<Uuid> {
        self.export_at(msisdn, start, end, Local::now().naive_local())
            .await
    }

    /// Same as [`export`](Self::export) with an explicit notion of "now"
    #[instrument(skip(self, now))]
    pub async fn export_at(
        &self,
        msisdn: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> AppResult<Uuid> {
        let msisdn = Msisdn::parse(msisdn).map_err(|e| {
            warn!("Rejected report request: {}", e);
            e
        })?;
        let (start, end) = validate_date_range(start, end, now).map_err(|e| {
            warn!("Rejected report request for {}: {}", msisdn, e);
            e
        })?;

        if !self.subscribers.exists(&msisdn).await? {
            warn!("Subscriber {} not found", msisdn);
            return Err(AppError::SubscriberNotFound(msisdn.to_string()));
        }

        let request_id = Uuid::new_v4();

        let records = self
            .cdrs
            .find_by_participant_and_time_range(&msisdn, start, end)
            .await?;

        if records.is_empty() {
            return Err(AppError::NoRecordsInRange {
                msisdn: msisdn.to_string(),
                start: start.format(CSV_DATETIME_FORMAT).to_string(),
                end: end.format(CSV_DATETIME_FORMAT).to_string(),
            });
        }

        let contents = render_csv(&records);
        let dir = self.reports_dir.clone();
        let path = self.report_path(&msisdn, request_id);

        let written = tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &contents))
            .await
            .map_err(|e| {
                AppError::ReportGenerationFailed(format!("Report writer failed: {}", e))
            })?;

        match written {
            Ok(path) => {
                info!(
                    "Wrote CDR report {} with {} records",
                    path.display(),
                    records.len()
                );
                Ok(request_id)
            }
            Err(e) => {
                error!("Failed to write CDR report for {}: {}", msisdn, e);
                Err(AppError::ReportGenerationFailed(e.to_string()))
            }
        }
    }
}

/// Render records as CSV rows, one per line, no header
pub fn render_csv(records: &[CallRecord]) -> String {
    let mut out = String::with_capacity(records.len() * 64);
    for record in records {
        out.push_str(&record.to_csv_row());
        out.push('\n');
    }
    out
}

fn write_atomically(dir: &Path, path: &Path, contents: &str) -> std::io::Result<PathBuf> {
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(path.to_path_buf())
}
