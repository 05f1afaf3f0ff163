//! CDR (Call Detail Record) model
//!
//! Represents completed calls between two known subscribers.

use super::subscriber::Msisdn;
use crate::{AppError, AppResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout used in exported reports (ISO-8601 local date-time)
pub const CSV_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Call direction tag
///
/// The tag is stored once per record and does not depend on which party is
/// being looked at: an `Incoming` record only counts for its receiving
/// subscriber, an `Outgoing` record only for its calling subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallType {
    /// Attributed from the calling party's perspective
    Outgoing,
    /// Attributed from the receiving party's perspective
    Incoming,
}

impl CallType {
    /// Two-digit code written to CDR reports
    pub fn code(&self) -> &'static str {
        match self {
            CallType::Outgoing => "01",
            CallType::Incoming => "02",
        }
    }

    /// Database string value
    pub fn as_db_str(&self) -> &'static str {
        match self {
            CallType::Outgoing => "OUTGOING",
            CallType::Incoming => "INCOMING",
        }
    }

    /// Parse from database string value
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "OUTGOING" => Some(CallType::Outgoing),
            "INCOMING" => Some(CallType::Incoming),
            _ => None,
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Call record that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCallRecord {
    /// Direction tag
    pub call_type: CallType,

    /// Calling subscriber
    pub calling: Msisdn,

    /// Receiving subscriber
    pub receiving: Msisdn,

    /// Call start (second resolution)
    pub call_start: NaiveDateTime,

    /// Call end, strictly after start
    pub call_end: NaiveDateTime,
}

impl NewCallRecord {
    /// Build a record, enforcing the per-record invariants
    pub fn new(
        call_type: CallType,
        calling: Msisdn,
        receiving: Msisdn,
        call_start: NaiveDateTime,
        call_end: NaiveDateTime,
    ) -> AppResult<Self> {
        if calling == receiving {
            return Err(AppError::Validation(format!(
                "Subscriber {} cannot call itself",
                calling
            )));
        }
        if call_end <= call_start {
            return Err(AppError::Validation(format!(
                "Call end {} must be after call start {}",
                call_end, call_start
            )));
        }

        Ok(Self {
            call_type,
            calling,
            receiving,
            call_start,
            call_end,
        })
    }

    /// Call duration in whole seconds
    #[inline]
    pub fn duration_seconds(&self) -> i64 {
        (self.call_end - self.call_start).num_seconds()
    }
}

/// Stored call record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Store-assigned identifier
    pub id: i64,

    /// Direction tag
    pub call_type: CallType,

    /// Calling subscriber
    pub calling: Msisdn,

    /// Receiving subscriber
    pub receiving: Msisdn,

    /// Call start
    pub call_start: NaiveDateTime,

    /// Call end
    pub call_end: NaiveDateTime,
}

impl CallRecord {
    /// Attach a store-assigned id to a new record
    pub fn from_new(id: i64, record: NewCallRecord) -> Self {
        Self {
            id,
            call_type: record.call_type,
            calling: record.calling,
            receiving: record.receiving,
            call_start: record.call_start,
            call_end: record.call_end,
        }
    }

    /// Call duration in whole seconds
    #[inline]
    pub fn duration_seconds(&self) -> i64 {
        (self.call_end - self.call_start).num_seconds()
    }

    /// Whether the subscriber is the caller or the receiver
    pub fn involves(&self, msisdn: &Msisdn) -> bool {
        &self.calling == msisdn || &self.receiving == msisdn
    }

    /// Render as a CSV report row (no trailing newline)
    ///
    /// Columns: direction code, calling MSISDN, receiving MSISDN, start, end.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.call_type.code(),
            self.calling,
            self.receiving,
            self.call_start.format(CSV_DATETIME_FORMAT),
            self.call_end.format(CSV_DATETIME_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn msisdn(s: &str) -> Msisdn {
        Msisdn::parse(s).unwrap()
    }

    #[test]
    fn test_call_type_codes() {
        assert_eq!(CallType::Outgoing.code(), "01");
        assert_eq!(CallType::Incoming.code(), "02");
        assert_eq!(CallType::Incoming.to_string(), "02");
    }

    #[test]
    fn test_call_type_db_strings() {
        for call_type in [CallType::Outgoing, CallType::Incoming] {
            assert_eq!(CallType::from_db_str(call_type.as_db_str()), Some(call_type));
        }
        assert_eq!(CallType::from_db_str("OUTCOMING"), None);
    }

    #[test]
    fn test_new_record_rejects_self_call() {
        let result = NewCallRecord::new(
            CallType::Outgoing,
            msisdn("79001112233"),
            msisdn("79001112233"),
            at(10, 0, 0),
            at(10, 1, 0),
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_record_rejects_non_positive_duration() {
        let result = NewCallRecord::new(
            CallType::Incoming,
            msisdn("79001112233"),
            msisdn("79002223344"),
            at(10, 0, 0),
            at(10, 0, 0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duration_and_csv_row() {
        let record = NewCallRecord::new(
            CallType::Outgoing,
            msisdn("79001112233"),
            msisdn("79002223344"),
            at(9, 5, 0),
            at(9, 7, 30),
        )
        .unwrap();
        assert_eq!(record.duration_seconds(), 150);

        let stored = CallRecord::from_new(7, record);
        assert_eq!(stored.id, 7);
        assert!(stored.involves(&msisdn("79002223344")));
        assert!(!stored.involves(&msisdn("79003334455")));
        assert_eq!(
            stored.to_csv_row(),
            "01,79001112233,79002223344,2024-03-15T09:05:00,2024-03-15T09:07:30"
        );
    }
}
