use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Utc};
use thiserror::Error;

use crate::models::DateRange;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid timestamp: {0}. Expected RFC 3339, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD")]
    InvalidTimestamp(String),

    #[error("Invalid transaction type: {0}. Must be 'credit' or 'debit'")]
    InvalidTransactionType(String),
}

/// Which side of an inclusive range a bare date is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// Parse a timestamp. Values without an offset are taken as UTC and a bare
/// date means midnight. Precision is cut to milliseconds.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    parse_with_bound(raw, Bound::Start)
}

fn parse_with_bound(raw: &str, bound: Bound) -> Result<DateTime<Utc>, ValidationError> {
    // SQLite date() and julianday() work in milliseconds
    parse_untruncated(raw, bound).map(|at| at.trunc_subsecs(3))
}

fn parse_untruncated(raw: &str, bound: Bound) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::InvalidTimestamp(raw.to_string()));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidTimestamp(raw.to_string()))?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_string()))?,
    };

    Ok(date.and_time(time).and_utc())
}

/// Build the analytics date window from the optional query parameters.
pub fn validate_date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateRange, ValidationError> {
    let start = start
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_with_bound(s, Bound::Start))
        .transpose()?;
    let end = end
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_with_bound(s, Bound::End))
        .transpose()?;

    Ok(DateRange::new(start, end))
}

pub fn validate_page(page: i64) -> Result<i64, ValidationError> {
    if page < 1 {
        return Err(ValidationError::InvalidParameter(format!(
            "page must be at least 1, got {}",
            page
        )));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset() {
        let parsed = parse_timestamp("2024-11-10T12:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 11, 10, 10, 30, 0).unwrap());
    }

    #[test]
    fn parses_naive_and_bare_dates_as_utc() {
        assert_eq!(
            parse_timestamp("2024-11-10T08:00:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 11, 10, 8, 0, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("2024-11-10").unwrap(),
            Utc.with_ymd_and_hms(2024, 11, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn bare_end_date_covers_the_whole_day() {
        let range = validate_date_range(Some("2024-11-10"), Some("2024-11-10")).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 11, 10, 23, 59, 59).unwrap();
        assert!(range.contains(&evening));
        assert!(!range.contains(&Utc.with_ymd_and_hms(2024, 11, 11, 0, 0, 0).unwrap()));
    }

    #[test]
    fn rejects_garbage_and_bad_pages() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(ValidationError::InvalidTimestamp(_))
        ));
        assert!(validate_page(0).is_err());
        assert_eq!(validate_page(3), Ok(3));
    }

    #[test]
    fn sub_millisecond_precision_is_truncated() {
        let parsed = parse_timestamp("2024-02-29T23:59:59.9996Z").unwrap();
        assert_eq!(parsed, parse_timestamp("2024-02-29T23:59:59.999Z").unwrap());
        assert_eq!(parsed.timestamp_subsec_nanos(), 999_000_000);
    }

    #[test]
    fn empty_bounds_are_open() {
        assert_eq!(validate_date_range(Some(""), None).unwrap(), DateRange::default());
    }
}
