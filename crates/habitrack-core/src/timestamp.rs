//! Parsing and formatting of user-entered and stored timestamps.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::TrackingError;

/// Format used when writing timestamps to storage.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a timestamp, most specific format first.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM`, `YYYY-MM-DD HH`,
/// `YYYY-MM-DD` (midnight) and the ISO `T` separator.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, TrackingError> {
    let input = input.trim();
    for format in ACCEPTED_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(ts);
        }
    }
    // chrono cannot parse an hour without minutes
    if let Some((date, hour)) = input.split_once(' ') {
        if let (Ok(date), Ok(hour)) = (NaiveDate::parse_from_str(date, "%Y-%m-%d"), hour.parse::<u32>()) {
            if let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) {
                return Ok(date.and_time(time));
            }
        }
    }
    if let Ok(date) = parse_date(input) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(TrackingError::InvalidValue {
        field: "timestamp",
        message: format!(
            "'{input}' is not a valid timestamp; use YYYY-MM-DD, YYYY-MM-DD HH, YYYY-MM-DD HH:MM or YYYY-MM-DD HH:MM:SS"
        ),
    })
}

pub fn parse_date(input: &str) -> Result<NaiveDate, TrackingError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| TrackingError::InvalidValue {
        field: "date",
        message: format!("'{}' is not a valid date; use YYYY-MM-DD", input.trim()),
    })
}

/// Drop seconds and sub-second precision. Checkoffs and creation times are
/// kept at this resolution.
pub fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .and_hms_opt(ts.hour(), ts.minute(), 0)
        .unwrap_or(ts)
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn parses_all_granularities() {
        assert_eq!(parse_timestamp("2024-01-05 18:15:30").unwrap(), dt(5, 18, 15, 30));
        assert_eq!(parse_timestamp("2024-01-05 18:15").unwrap(), dt(5, 18, 15, 0));
        assert_eq!(parse_timestamp("2024-01-05 18").unwrap(), dt(5, 18, 0, 0));
        assert_eq!(parse_timestamp(" 2024-01-05 ").unwrap(), dt(5, 0, 0, 0));
        assert_eq!(parse_timestamp("2024-01-05T07:00:00").unwrap(), dt(5, 7, 0, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2024-13-01").is_err());
        assert!(parse_timestamp("2024-01-05 25").is_err());
        assert!(parse_date("05.01.2024").is_err());
    }

    #[test]
    fn truncation_drops_seconds_and_nanos() {
        let ts = dt(5, 18, 15, 30) + chrono::Duration::nanoseconds(257_085_164);
        assert_eq!(truncate_to_minute(ts), dt(5, 18, 15, 0));
        assert_eq!(truncate_to_minute(dt(5, 18, 15, 0)), dt(5, 18, 15, 0));
    }

    #[test]
    fn storage_format_roundtrips() {
        let ts = dt(30, 19, 0, 0);
        assert_eq!(format_timestamp(ts), "2024-01-30 19:00:00");
        assert_eq!(parse_timestamp(&format_timestamp(ts)).unwrap(), ts);
    }
}
