//! Timestamp and value formatting for the report.
//!
//! Readings arrive in UTC; they are shown in the station's local time.

use chrono::{DateTime, TimeZone, Utc};
use std::fmt::Display;

/// `HH:MM, DD Month` in the given zone, e.g. `09:05, 01 March`.
pub fn format_date_time<Tz>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.with_timezone(tz).format("%H:%M, %d %B").to_string()
}

/// `HH:MM` in the given zone.
pub fn format_time<Tz>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.with_timezone(tz).format("%H:%M").to_string()
}

/// Tide height with two decimals.
pub fn format_value(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::London;

    fn march_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, 1, 9, 5, 0).unwrap()
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(&march_morning(), &London), "09:05");
        assert_eq!(format_time(&march_morning(), &Utc), "09:05");
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(format_date_time(&march_morning(), &London), "09:05, 01 March");
    }

    #[test]
    fn test_format_follows_summer_time() {
        // BST is UTC+1
        let ts = Utc.with_ymd_and_hms(2023, 7, 4, 23, 30, 0).unwrap();
        assert_eq!(format_date_time(&ts, &London), "00:30, 05 July");
        assert_eq!(format_date_time(&ts, &Utc), "23:30, 04 July");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(-0.8), "-0.80");
        assert_eq!(format_value(-1.234), "-1.23");
        assert_eq!(format_value(0.0), "0.00");
    }
}
