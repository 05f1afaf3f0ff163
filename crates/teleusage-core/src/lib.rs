//! TeleUsage Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the TeleUsage system. It includes:
//!
//! - Domain models (Subscriber, CallRecord, UsageSummary)
//! - Domain validation rules (MSISDN format, month, report date range)
//! - Store traits for the subscriber directory and the record store
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;
pub mod validation;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
