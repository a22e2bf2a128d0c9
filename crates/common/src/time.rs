//! Timestamp helpers shared by the create, update, filter and projection paths.
//!
//! Every timestamp that reaches the store is normalised to UTC (`+00:00`) and
//! truncated to microseconds, which is the precision PostgreSQL keeps. Values
//! read back from the store therefore compare equal to the ones written.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use thiserror::Error;

/// Timestamp type stored in the database (`timestamptz`).
pub type Timestamp = DateTime<FixedOffset>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid ISO-8601 timestamp: {0}")]
    Invalid(String),
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Years every supported store can hold and compare correctly.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

fn normalize(dt: DateTime<Utc>) -> Timestamp {
    dt.trunc_subsecs(6).fixed_offset()
}

/// Whether `ts` lies within the years the store can hold.
pub fn is_storable(ts: &Timestamp) -> bool {
    STORABLE_YEARS.contains(&ts.with_timezone(&Utc).year())
}

/// Current instant in store precision.
pub fn now() -> Timestamp {
    normalize(Utc::now())
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2023-02-27T00:00:00Z`, `2023-02-27T08:00:00+08:00`),
/// offset-less date-times (`2023-02-27T00:00:00`, read as UTC) and bare dates
/// (`2023-02-27`, read as UTC midnight). Instants outside years 1 to 9999
/// are rejected.
pub fn parse_iso8601(input: &str) -> Result<Timestamp, TimeError> {
    parse_any(input.trim())
        .filter(is_storable)
        .ok_or_else(|| TimeError::Invalid(input.to_string()))
}

fn parse_any(s: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(normalize(dt.with_timezone(&Utc)));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(normalize(naive.and_utc()));
        }
    }
    let midnight = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)?;
    Some(normalize(midnight.and_utc()))
}

/// Render a timestamp as RFC 3339 in UTC with a `Z` suffix.
pub fn format_iso8601(ts: &Timestamp) -> String {
    ts.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Upper bound for a deadline window of `days` days from `from`.
///
/// Returns `None` when the bound falls outside the storable years.
pub fn window_cutoff(from: Timestamp, days: i64) -> Option<Timestamp> {
    let span = Duration::try_days(days)?;
    from.checked_add_signed(span).filter(is_storable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_naive_datetime_as_utc() {
        let ts = parse_iso8601("2023-02-27T00:00:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!((ts.year(), ts.month(), ts.day(), ts.hour()), (2023, 2, 27, 0));
    }

    #[test]
    fn parses_offset_and_converts_to_utc() {
        let ts = parse_iso8601("2023-02-27T08:30:00+08:00").unwrap();
        assert_eq!(format_iso8601(&ts), "2023-02-27T00:30:00Z");
    }

    #[test]
    fn parses_bare_date_and_fractional_seconds() {
        let d = parse_iso8601("2024-01-05").unwrap();
        assert_eq!(format_iso8601(&d), "2024-01-05T00:00:00Z");
        let f = parse_iso8601("2024-01-05T10:11:12.123456789").unwrap();
        assert_eq!(format_iso8601(&f), "2024-01-05T10:11:12.123456Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(parse_iso8601("next tuesday"), Err(TimeError::Invalid(_))));
        assert!(parse_iso8601("").is_err());
        assert!(parse_iso8601("2024-13-01").is_err());
        assert!(parse_iso8601("+10000-01-01T00:00:00").is_err());
    }

    #[test]
    fn now_is_utc_microsecond_precision() {
        let n = now();
        assert_eq!(n.offset().local_minus_utc(), 0);
        assert_eq!(n.nanosecond() % 1_000, 0);
    }

    #[test]
    fn window_cutoff_adds_days() {
        let from = parse_iso8601("2024-01-01T00:00:00Z").unwrap();
        let cut = window_cutoff(from, 7).unwrap();
        assert_eq!(format_iso8601(&cut), "2024-01-08T00:00:00Z");
        let back = window_cutoff(from, -1).unwrap();
        assert_eq!(format_iso8601(&back), "2023-12-31T00:00:00Z");
        assert!(window_cutoff(from, i64::MAX).is_none());
        assert!(window_cutoff(from, 100_000_000).is_none());
        assert!(window_cutoff(from, 3_000_000).is_none());
        assert!(window_cutoff(from, -1_000_000).is_none());
    }
}
