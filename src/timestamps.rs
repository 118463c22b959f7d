//! Timestamps on the wire
//!
//! Storage keeps UTC `NaiveDateTime`s, the outside world sees `YYYY-MM-DD HH:MM:SS` in the
//! configured display timezone

use chrono::FixedOffset;
use chrono::NaiveDateTime;
use chrono::TimeZone;

/// Format used for every timestamp leaving or entering the service
pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a stored (UTC) timestamp in the display timezone
pub fn format(timestamp: &NaiveDateTime, timezone: &FixedOffset) -> String {
    timestamp
        .and_utc()
        .with_timezone(timezone)
        .format(WIRE_FORMAT)
        .to_string()
}

/// Parse a wire timestamp given in the display timezone back to UTC
///
/// Returns `None` for anything not matching [`WIRE_FORMAT`]
pub fn parse(value: &str, timezone: &FixedOffset) -> Option<NaiveDateTime> {
    let local = NaiveDateTime::parse_from_str(value.trim(), WIRE_FORMAT).ok()?;

    timezone
        .from_local_datetime(&local)
        .single()
        .map(|timestamp| timestamp.naive_utc())
}

/// Whole seconds between two timestamps, sub-second parts are ignored
pub fn seconds_between(a: &NaiveDateTime, b: &NaiveDateTime) -> i64 {
    (a.and_utc().timestamp() - b.and_utc().timestamp()).abs()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn timestamp(hour: u32, min: u32, sec: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_micro_opt(hour, min, sec, micro)
            .unwrap()
    }

    #[test]
    fn test_format_in_timezone() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let value = timestamp(23, 30, 5, 999_999);

        assert_eq!("2024-03-01 23:30:05", format(&value, &utc));
        assert_eq!("2024-03-02 01:30:05", format(&value, &plus_two));
    }

    #[test]
    fn test_parse_back_to_utc() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let parsed = parse("2024-03-02 01:30:05", &plus_two).unwrap();
        assert_eq!(timestamp(23, 30, 5, 0), parsed);

        assert!(parse("yesterday", &plus_two).is_none());
        assert!(parse("2024-03-02T01:30:05", &plus_two).is_none());
    }

    #[test]
    fn test_seconds_between_ignores_fractions() {
        let a = timestamp(10, 0, 0, 900_000);
        let b = timestamp(10, 0, 1, 100_000);

        assert_eq!(1, seconds_between(&a, &b));
        assert_eq!(1, seconds_between(&b, &a));
        assert_eq!(0, seconds_between(&a, &a));
    }
}
