//! Usage (UDR) handlers

use crate::dto::{UdrResponse, UsageQuery};
use actix_web::{web, HttpResponse};
use teleusage_core::AppError;
use teleusage_services::UsageAggregator;
use tracing::{debug, instrument};

/// Talk time for one subscriber, optionally limited to a calendar month
///
/// GET /api/udr/subscriber/{msisdn}?month=3
#[instrument(skip(aggregator))]
pub async fn get_usage(
    aggregator: web::Data<UsageAggregator>,
    path: web::Path<String>,
    query: web::Query<UsageQuery>,
) -> Result<HttpResponse, AppError> {
    let msisdn = path.into_inner();
    let summary = aggregator.summarize(&msisdn, query.month).await?;

    Ok(HttpResponse::Ok().json(UdrResponse::from(summary)))
}

/// Talk time for every subscriber with traffic in a calendar month
///
/// GET /api/udr/month/{month}
#[instrument(skip(aggregator))]
pub async fn get_all_usage(
    aggregator: web::Data<UsageAggregator>,
    path: web::Path<u32>,
) -> Result<HttpResponse, AppError> {
    let month = path.into_inner();
    let summaries = aggregator.summarize_all(month).await?;

    debug!("Returning {} usage summaries", summaries.len());

    let response: Vec<UdrResponse> = summaries.into_iter().map(UdrResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// Configure UDR routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/udr")
            .route("/subscriber/{msisdn}", web::get().to(get_usage))
            .route("/month/{month}", web::get().to(get_all_usage)),
    );
}
