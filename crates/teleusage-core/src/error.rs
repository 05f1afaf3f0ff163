//! Unified error handling for TeleUsage
//!
//! This module provides a comprehensive error type that covers all possible
//! failure scenarios in the application, with automatic HTTP response mapping.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Main application error type
///
/// All errors in the application should be converted to this type.
/// It implements `ResponseError` for automatic HTTP response generation.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Validation Errors ====================
    #[error("Invalid MSISDN: {0}")]
    InvalidMsisdn(String),

    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ==================== Not Found Errors ====================
    #[error("Subscriber not found: {0}")]
    SubscriberNotFound(String),

    #[error("No usage data found for subscriber {0}")]
    NoUsageData(String),

    #[error("No call records for subscriber {msisdn} in range {start} - {end}")]
    NoRecordsInRange {
        msisdn: String,
        start: String,
        end: String,
    },

    // ==================== Precondition Errors ====================
    #[error("No subscribers found, cannot generate call records")]
    EmptyPopulation,

    #[error("At least 2 subscribers are required to generate call records, found {0}")]
    PopulationTooSmall(usize),

    // ==================== Report Errors ====================
    #[error("Failed to generate CDR report: {0}")]
    ReportGenerationFailed(String),

    // ==================== Database Errors ====================
    #[error("Database error: {0}")]
    Database(String),

    #[error("Database pool error: {0}")]
    Pool(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::InvalidMsisdn(_)
            | AppError::InvalidMonth(_)
            | AppError::InvalidDateRange(_)
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::SubscriberNotFound(_)
            | AppError::NoUsageData(_)
            | AppError::NoRecordsInRange { .. } => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidMsisdn(_) => "invalid_msisdn",
            AppError::InvalidMonth(_) => "invalid_month",
            AppError::InvalidDateRange(_) => "invalid_date_range",
            AppError::Validation(_) => "validation_error",
            AppError::SubscriberNotFound(_) => "subscriber_not_found",
            AppError::NoUsageData(_) => "no_usage_data",
            AppError::NoRecordsInRange { .. } => "no_records_in_range",
            AppError::EmptyPopulation => "empty_population",
            AppError::PopulationTooSmall(_) => "population_too_small",
            AppError::ReportGenerationFailed(_) => "report_generation_failed",
            AppError::Database(_) => "database_error",
            AppError::Pool(_) => "pool_error",
            AppError::Transaction(_) => "transaction_error",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether this error is a "not found" outcome
    ///
    /// Batch usage queries skip subscribers failing with one of these.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == StatusCode::NOT_FOUND
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = json!({
            "error": self.error_code(),
            "message": self.to_string(),
            "status": status.as_u16(),
        });

        HttpResponse::build(status).json(body)
    }
}

// ==================== From implementations ====================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::ReportGenerationFailed(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
