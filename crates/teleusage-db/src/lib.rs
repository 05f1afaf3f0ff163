//! TeleUsage Database Layer
//!
//! This crate provides the record store and subscriber directory used by the
//! TeleUsage engine. It includes:
//!
//! - Connection pool management with sqlx
//! - Idempotent schema bootstrap for PostgreSQL
//! - PostgreSQL repository implementations
//! - An in-process memory backend with the same query semantics

pub mod memory;
pub mod pool;
pub mod repositories;
pub mod schema;

#[cfg(test)]
mod test_db;

pub use memory::{InMemoryCdrRepository, InMemorySubscriberRepository};
pub use pool::create_pool;
pub use repositories::*;
pub use schema::ensure_schema;

// Re-export commonly used types
pub use sqlx::PgPool;
pub use teleusage_core::{AppError, AppResult};
