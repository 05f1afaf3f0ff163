//! Business logic services for TeleUsage
//!
//! This crate contains the services that sit between the HTTP layer and the
//! record store: synthetic traffic generation, subscriber seeding, usage
//! aggregation and CDR report export.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service holds its stores as `Arc<dyn ...Repository>` so the
//!   PostgreSQL and in-memory backends are interchangeable at runtime
//! - Services are shared across actix workers behind `web::Data`
//! - All operations are instrumented with tracing
//!
//! # Services
//!
//! - `TrafficGenerator` - Random call batches between known subscribers
//! - `SubscriberSeeder` - One-time population of an empty directory
//! - `UsageAggregator` - Per-subscriber incoming/outgoing talk time (UDR)
//! - `ReportExporter` - CSV export of a subscriber's calls in a date range (CDR)

pub mod generator;
pub mod report;
pub mod seeding;
pub mod usage;

pub use generator::{generate_batch, TrafficGenerator};
pub use report::{render_csv, ReportExporter};
pub use seeding::SubscriberSeeder;
pub use usage::UsageAggregator;
