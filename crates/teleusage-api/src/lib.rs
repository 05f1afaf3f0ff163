//! API layer for TeleUsage
//!
//! HTTP handlers exposing CDR report generation and usage (UDR) queries.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

pub use dto::{CallStats, ReportRequest, ReportResponse, UdrResponse, UsageQuery};
pub use handlers::configure;
