//! Domain models for TeleUsage
//!
//! This module contains all the core domain models used throughout the application.

pub mod cdr;
pub mod subscriber;
pub mod usage;

pub use cdr::{CallRecord, CallType, NewCallRecord, CSV_DATETIME_FORMAT};
pub use subscriber::{Msisdn, Subscriber};
pub use usage::{format_duration, total_duration, UsageSummary};
