//! CDR report handlers

use crate::dto::{ReportRequest, ReportResponse};
use actix_web::{web, HttpResponse};
use teleusage_core::AppError;
use teleusage_services::ReportExporter;
use tracing::{info, instrument};

/// Export a subscriber's call records for a date range to a CSV report
///
/// POST /api/cdr/generate
///
/// ```text
/// {"msisdn": "79001112233", "startDate": "2024-03-01T00:00:00", "endDate": "2024-03-31T23:59:59"}
/// ```
#[instrument(skip(exporter, body))]
pub async fn generate_report(
    exporter: web::Data<ReportExporter>,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let msisdn = request.msisdn.as_deref().unwrap_or_default();

    let request_id = exporter
        .export(msisdn, request.start_date, request.end_date)
        .await?;

    info!("CDR report {} generated for {}", request_id, msisdn);

    Ok(HttpResponse::Ok().json(ReportResponse::from(request_id)))
}

/// Configure CDR routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/cdr").route("/generate", web::post().to(generate_report)));
}
