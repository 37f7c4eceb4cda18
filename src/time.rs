//! Timestamp handling. Every instant in the system is UTC, truncated to whole
//! seconds before it reaches storage so stored text sorts chronologically.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 date-time. Offsets are honoured; naive values are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc).trunc_subsecs(0));
    }
    // Drop fractional seconds on naive input, e.g. "2024-05-01T10:00:00.250".
    let naive = raw.split('.').next().unwrap_or(raw);
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|dt| Utc.from_utc_datetime(&dt))
}

pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Inclusive `[00:00:00, 23:59:59]` window of `date`.
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    let end = date.and_hms_opt(23, 59, 59).unwrap_or_default();
    (Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end))
}

pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_offsets_into_utc() {
        let parsed = parse_timestamp("2024-05-01T12:30:00+02:00").expect("rfc3339");
        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn naive_values_are_taken_as_utc() {
        let spaced = parse_timestamp("2024-05-01 09:15:00").expect("space separated");
        let short = parse_timestamp("2024-05-01T09:15").expect("no seconds");
        assert_eq!(spaced, short);
        assert_eq!(spaced.hour(), 9);
    }

    #[test]
    fn subseconds_are_dropped() {
        let parsed = parse_timestamp("2024-05-01T09:15:00.750Z").expect("fractional");
        assert_eq!(parsed.nanosecond(), 0);
        let naive = parse_timestamp("2024-05-01T09:15:00.123456").expect("naive fractional");
        assert_eq!(naive, parsed);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_timestamp("tomorrow-ish").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn day_window_covers_the_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
        let (start, end) = day_window(date);
        assert_eq!(start.to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-05-01T23:59:59+00:00");
    }
}
