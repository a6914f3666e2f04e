//! ISO-8601 timestamp canonicalization.
//!
//! Timestamps cross the record boundary as strings of the form
//! `YYYY-MM-DDTHH:mm:ss.sssZ`: always UTC, always exactly three fractional
//! digits. Parsing accepts any RFC 3339 precision and offset; formatting
//! normalizes to UTC and truncates or pads to milliseconds.

use bson::DateTime;
use chrono::{SecondsFormat, Utc};

use crate::error::BuildError;

/// Renders a datetime as a canonical ISO-8601 string.
pub fn to_iso_string(datetime: DateTime) -> String {
    datetime
        .to_chrono()
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an ISO-8601 / RFC 3339 string into a millisecond-precision datetime.
///
/// # Errors
///
/// Returns [`BuildError::InvalidTimestamp`] when the string is not a valid
/// RFC 3339 datetime.
pub fn parse_iso_string(value: &str) -> Result<DateTime, BuildError> {
    let parsed = chrono::DateTime::parse_from_rfc3339(value)
        .map_err(|_| BuildError::InvalidTimestamp(value.to_string()))?;

    Ok(DateTime::from_chrono(parsed.with_timezone(&Utc)))
}

/// The current instant as a canonical ISO-8601 string.
pub fn now_iso_string() -> String {
    to_iso_string(DateTime::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Timelike, Utc};

    fn utc_with_nanos(nanos: u32) -> DateTime {
        let chrono_time = Utc
            .with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
            .unwrap()
            .with_nanosecond(nanos)
            .unwrap();

        DateTime::from_chrono(chrono_time)
    }

    #[test]
    fn iso_string_always_has_three_fractional_digits() {
        let cases = [
            (0, "2023-01-01T00:00:00.000Z"),
            (1, "2023-01-01T00:00:00.000Z"),
            (999_999, "2023-01-01T00:00:00.000Z"),
            (1_000_000, "2023-01-01T00:00:00.001Z"),
            (1_000_001, "2023-01-01T00:00:00.001Z"),
            (999_999_999, "2023-01-01T00:00:00.999Z"),
        ];

        for (nanos, expected) in cases {
            assert_eq!(to_iso_string(utc_with_nanos(nanos)), expected);
        }
    }

    #[test]
    fn iso_string_normalizes_to_utc() {
        let kolkata = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let local = kolkata.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(
            to_iso_string(DateTime::from_chrono(local)),
            "2022-12-31T18:30:00.000Z"
        );
    }

    #[test]
    fn parse_accepts_offsets_and_sub_millisecond_precision() {
        let parsed = parse_iso_string("2023-01-01T10:10:10.123456+05:30").unwrap();
        assert_eq!(to_iso_string(parsed), "2023-01-01T04:40:10.123Z");

        let parsed = parse_iso_string("2023-01-01T00:00:00Z").unwrap();
        assert_eq!(to_iso_string(parsed), "2023-01-01T00:00:00.000Z");
    }

    #[test]
    fn parse_rejects_malformed_strings() {
        for input in ["", "2023-01-01", "not a date", "2023-01-01 00:00:00"] {
            assert!(matches!(
                parse_iso_string(input),
                Err(BuildError::InvalidTimestamp(_))
            ));
        }
    }

    #[test]
    fn round_trip_is_stable_at_millisecond_precision() {
        let original = "2023-01-01T04:40:10.123Z";
        let parsed = parse_iso_string(original).unwrap();
        assert_eq!(to_iso_string(parsed), original);
    }
}
