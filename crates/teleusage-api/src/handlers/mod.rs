//! HTTP request handlers

pub mod cdr;
pub mod health;
pub mod udr;

use actix_web::{error, web};
use teleusage_core::AppError;

pub use cdr::configure as configure_cdr;
pub use health::health_check;
pub use udr::configure as configure_udr;

/// Configure every route under `/api`
///
/// Body, query and path extraction failures are answered with the same
/// error body as domain errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                rejected("request body", err.to_string())
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                rejected("query", err.to_string())
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                rejected("path", err.to_string())
            }))
            .route("/health", web::get().to(health_check))
            .configure(configure_cdr)
            .configure(configure_udr),
    );
}

fn rejected(part: &str, message: String) -> error::Error {
    tracing::warn!("Invalid {}: {}", part, message);
    AppError::Validation(format!("Invalid {}: {}", part, message)).into()
}
