//! Health check

use actix_web::HttpResponse;

/// Health check endpoint
///
/// GET /api/health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "teleusage",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
