//! Data Transfer Objects (DTOs) for API requests and responses

pub mod cdr;
pub mod udr;

pub use cdr::*;
pub use udr::*;
