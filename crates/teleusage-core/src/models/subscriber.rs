//! Subscriber model
//!
//! A subscriber is nothing more than its mobile number (MSISDN), which is
//! also its primary key in the directory.

use crate::{validation::validate_msisdn, AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mobile Subscriber ISDN Number
///
/// Always holds a validated `7XXXXXXXXXX` string (country code 7 followed by
/// exactly 10 digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Msisdn(String);

impl Msisdn {
    /// Parse and validate an MSISDN
    pub fn parse(value: &str) -> AppResult<Self> {
        validate_msisdn(value)?;
        Ok(Self(value.to_string()))
    }

    /// Borrow the number as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Msisdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Msisdn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Msisdn {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Msisdn {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_msisdn(&value)?;
        Ok(Self(value))
    }
}

impl From<Msisdn> for String {
    fn from(msisdn: Msisdn) -> Self {
        msisdn.0
    }
}

/// Subscriber known to the directory
///
/// Immutable once created and never deleted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscriber {
    /// Subscriber number, unique key
    pub msisdn: Msisdn,
}

impl Subscriber {
    /// Create a subscriber for an already validated number
    pub fn new(msisdn: Msisdn) -> Self {
        Self { msisdn }
    }

    /// Build subscribers from raw numbers, failing on the first invalid one
    pub fn from_numbers<I, S>(numbers: I) -> AppResult<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        numbers
            .into_iter()
            .map(|n| Msisdn::parse(n.as_ref()).map(Self::new))
            .collect()
    }
}
