//! Domain validation rules
//!
//! Checks shared by the usage and report operations. Each check fails with the
//! matching validation variant of `AppError`.

use crate::{AppError, AppResult};
use chrono::NaiveDateTime;

/// Country code every MSISDN starts with
pub const MSISDN_COUNTRY_CODE: char = '7';

/// Digits following the country code
pub const MSISDN_SUBSCRIBER_DIGITS: usize = 10;

/// Validate the `7XXXXXXXXXX` MSISDN format
pub fn validate_msisdn(msisdn: &str) -> AppResult<()> {
    if msisdn.is_empty() {
        return Err(AppError::InvalidMsisdn(
            "MSISDN cannot be null or empty".to_string(),
        ));
    }

    let mut chars = msisdn.chars();
    let well_formed = chars.next() == Some(MSISDN_COUNTRY_CODE)
        && msisdn.len() == MSISDN_SUBSCRIBER_DIGITS + 1
        && chars.all(|c| c.is_ascii_digit());

    if !well_formed {
        return Err(AppError::InvalidMsisdn(format!(
            "MSISDN should be in format 7XXXXXXXXXX, got '{}'",
            msisdn
        )));
    }

    Ok(())
}

/// Validate a calendar month in `[1, 12]`
pub fn validate_month(month: u32) -> AppResult<()> {
    if !(1..=12).contains(&month) {
        return Err(AppError::InvalidMonth(month));
    }
    Ok(())
}

/// Validate an optional month filter
pub fn validate_optional_month(month: Option<u32>) -> AppResult<()> {
    month.map_or(Ok(()), validate_month)
}

/// Validate a report date range against `now`
///
/// Both bounds must be present, `start <= end`, and `end` must not be in the
/// future. Returns the unwrapped bounds.
pub fn validate_date_range(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> AppResult<(NaiveDateTime, NaiveDateTime)> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(AppError::InvalidDateRange(
                "Start date and end date cannot be null".to_string(),
            ))
        }
    };

    if start > end {
        return Err(AppError::InvalidDateRange(
            "Start date cannot be after end date".to_string(),
        ));
    }

    if end > now {
        return Err(AppError::InvalidDateRange(
            "End date cannot be in the future".to_string(),
        ));
    }

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_validate_msisdn() {
        assert!(validate_msisdn("79001112233").is_ok());
        assert!(matches!(
            validate_msisdn(""),
            Err(AppError::InvalidMsisdn(msg)) if msg.contains("empty")
        ));
        assert!(validate_msisdn("69001112233").is_err());
        assert!(validate_msisdn("7900111223").is_err());
        assert!(validate_msisdn("+79001112233").is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(matches!(validate_month(0), Err(AppError::InvalidMonth(0))));
        assert!(matches!(validate_month(13), Err(AppError::InvalidMonth(13))));
        assert!(validate_optional_month(None).is_ok());
        assert!(validate_optional_month(Some(14)).is_err());
    }

    #[test]
    fn test_validate_date_range() {
        let start = now() - Duration::days(30);
        let end = now() - Duration::days(1);

        assert_eq!(
            validate_date_range(Some(start), Some(end), now()).unwrap(),
            (start, end)
        );
        assert!(validate_date_range(Some(end), Some(end), now()).is_ok());
        assert!(validate_date_range(Some(start), Some(now()), now()).is_ok());
    }

    #[test]
    fn test_validate_date_range_failures() {
        let start = now() - Duration::days(30);
        let end = now() - Duration::days(1);

        assert!(matches!(
            validate_date_range(None, Some(end), now()),
            Err(AppError::InvalidDateRange(_))
        ));
        assert!(matches!(
            validate_date_range(Some(end), Some(start), now()),
            Err(AppError::InvalidDateRange(msg)) if msg.contains("after")
        ));
        assert!(matches!(
            validate_date_range(Some(start), Some(now() + Duration::seconds(1)), now()),
            Err(AppError::InvalidDateRange(msg)) if msg.contains("future")
        ));
    }
}
