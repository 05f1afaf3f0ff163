//! Repository implementations
//!
//! This module contains concrete implementations of the store traits
//! defined in teleusage-core, using sqlx for PostgreSQL access.

pub mod cdr_repo;
pub mod subscriber_repo;

pub use cdr_repo::PgCdrRepository;
pub use subscriber_repo::PgSubscriberRepository;
