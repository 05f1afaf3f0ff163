//! Usage summary (UDR) model
//!
//! Derived per-subscriber talk time, never persisted.

use super::cdr::CallRecord;
use super::subscriber::Msisdn;
use serde::Serialize;

/// Aggregated talk time for one subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    /// Subscriber the totals belong to
    pub msisdn: Msisdn,

    /// Seconds on records where the subscriber receives and the tag is INCOMING
    pub incoming_seconds: i64,

    /// Seconds on records where the subscriber calls and the tag is OUTGOING
    pub outgoing_seconds: i64,
}

impl UsageSummary {
    /// Build a summary from the two attributed record sets
    pub fn from_records(msisdn: Msisdn, incoming: &[CallRecord], outgoing: &[CallRecord]) -> Self {
        Self {
            msisdn,
            incoming_seconds: total_duration(incoming),
            outgoing_seconds: total_duration(outgoing),
        }
    }

    /// Incoming total as `HH:MM:SS`
    pub fn incoming_total_time(&self) -> String {
        format_duration(self.incoming_seconds)
    }

    /// Outgoing total as `HH:MM:SS`
    pub fn outgoing_total_time(&self) -> String {
        format_duration(self.outgoing_seconds)
    }
}

/// Sum of record durations in whole seconds
pub fn total_duration(records: &[CallRecord]) -> i64 {
    records.iter().map(CallRecord::duration_seconds).sum()
}

/// Format seconds as zero-padded `HH:MM:SS`
///
/// Truncates, never rounds. Hours grow past two digits instead of wrapping.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(30), "00:00:30");
        assert_eq!(format_duration(60), "00:01:00");
        assert_eq!(format_duration(5445), "01:30:45");
        assert_eq!(format_duration(45296), "12:34:56");
    }

    #[test]
    fn test_format_duration_past_99_hours() {
        assert_eq!(format_duration(100 * 3600 + 61), "100:01:01");
    }

    #[test]
    fn test_summary_totals() {
        let summary = UsageSummary {
            msisdn: Msisdn::parse("79001112233").unwrap(),
            incoming_seconds: 120,
            outgoing_seconds: 300,
        };
        assert_eq!(summary.incoming_total_time(), "00:02:00");
        assert_eq!(summary.outgoing_total_time(), "00:05:00");
    }

    proptest! {
        #[test]
        fn prop_format_duration_truncates(seconds in 0i64..10_000_000) {
            let formatted = format_duration(seconds);
            let parts: Vec<i64> = formatted
                .split(':')
                .map(|p| p.parse().unwrap())
                .collect();

            prop_assert_eq!(parts.len(), 3);
            prop_assert!(parts[1] < 60);
            prop_assert!(parts[2] < 60);
            prop_assert_eq!(parts[0] * 3600 + parts[1] * 60 + parts[2], seconds);
        }
    }
}
