//! Time range utilities for business time zone conversion
//!
//! All date to timestamp conversion happens at the handler/service
//! layer; repositories only see `i64` Unix millis and `YYYY-MM-DD` day
//! strings. Every function here is pure and takes explicit instants:
//! "now" is resolved once at the request boundary and passed down.

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// Half-open `[start_ms, end_ms)` window in Unix millis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Parse a month string (YYYY-MM) into the first day of that month
pub fn parse_month(month: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid month format: {}", month)))
}

/// Date + hour/min/sec → Unix millis in the business zone.
///
/// DST gap fallback: if the local time does not exist, fall back to
/// interpreting the naive time as UTC. The business zone (UTC+5:30)
/// has no DST, so the fallback never fires there.
pub fn date_hms_to_millis(date: NaiveDate, hour: u32, min: u32, sec: u32, tz: Tz) -> i64 {
    let naive = date.and_hms_opt(hour, min, sec).unwrap_or_else(|| {
        date.and_hms_opt(0, 0, 0)
            .expect("midnight is always representable")
    });
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of day (00:00:00) → Unix millis in the business zone
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 0, 0, 0, tz)
}

/// End of day → next day 00:00:00 Unix millis; callers use `< end`
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_hms_to_millis(next_day, 0, 0, 0, tz)
}

/// `[startOfDay, startOfNextDay)` for one calendar day
pub fn day_window(date: NaiveDate, tz: Tz) -> TimeWindow {
    TimeWindow {
        start_ms: day_start_millis(date, tz),
        end_ms: day_end_millis(date, tz),
    }
}

/// `[startOfMonth, startOfNextMonth)` for the month containing `date`
pub fn month_window(date: NaiveDate, tz: Tz) -> TimeWindow {
    let first = first_of_month(date);
    let next_first = first_of_next_month(date);
    TimeWindow {
        start_ms: day_start_millis(first, tz),
        end_ms: day_start_millis(next_first, tz),
    }
}

/// First day of the month containing `date`
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Calendar day of an instant in the business zone
pub fn business_date(now_ms: i64, tz: Tz) -> NaiveDate {
    millis_to_zoned(now_ms, tz).date_naive()
}

/// Format an instant as business-zone wall clock, `YYYY-MM-DD HH:mm:ss`.
/// The call-analytics vendor consumes exactly this shape; emails reuse it.
pub fn format_local_datetime(ms: i64, tz: Tz) -> String {
    millis_to_zoned(ms, tz).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn millis_to_zoned(ms: i64, tz: Tz) -> chrono::DateTime<Tz> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or_else(Utc::now)
        .with_timezone(&tz)
}

/// Elapsed hours between two instants, rounded to 2 decimals
pub fn hours_between(start_ms: i64, end_ms: i64) -> f64 {
    round2((end_ms - start_ms) as f64 / 3_600_000.0)
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2025-13-01").is_err());
        assert!(parse_date("19-06-2025").is_err());
        assert!(parse_date("").is_err());
        assert!(parse_date("2025-06-19").is_ok());
    }

    #[test]
    fn parse_month_accepts_year_month_only() {
        assert_eq!(parse_month("2025-06").unwrap(), d("2025-06-01"));
        assert!(parse_month("2025").is_err());
        assert!(parse_month("2025-06-19").is_err());
    }

    #[test]
    fn day_window_spans_exactly_24_hours() {
        let w = day_window(d("2025-06-19"), Kolkata);
        assert_eq!(w.end_ms - w.start_ms, 24 * 3_600_000);
        // 2025-06-19T00:00:00+05:30 == 2025-06-18T18:30:00Z
        assert_eq!(w.start_ms, 1_750_271_400_000);
    }

    #[test]
    fn month_window_covers_whole_month() {
        let w = month_window(d("2025-06-19"), Kolkata);
        assert_eq!(w.start_ms, day_start_millis(d("2025-06-01"), Kolkata));
        assert_eq!(w.end_ms, day_start_millis(d("2025-07-01"), Kolkata));
        assert_eq!(w.end_ms - w.start_ms, 30 * 24 * 3_600_000);
    }

    #[test]
    fn month_rollover_at_december() {
        assert_eq!(first_of_next_month(d("2025-12-15")), d("2026-01-01"));
        assert_eq!(first_of_month(d("2025-12-15")), d("2025-12-01"));
    }

    #[test]
    fn business_date_flips_at_local_midnight() {
        // 2025-06-19T18:30:00Z is exactly midnight June 20 in Kolkata
        let utc_evening = 1_750_271_400_000 + 24 * 3_600_000;
        assert_eq!(business_date(utc_evening, Kolkata), d("2025-06-20"));
        assert_eq!(business_date(utc_evening - 1, Kolkata), d("2025-06-19"));
    }

    #[test]
    fn full_workday_is_eight_and_a_half_hours() {
        // login 2025-06-19T09:00:00+05:30, logout 17:30 same day
        let login = date_hms_to_millis(d("2025-06-19"), 9, 0, 0, Kolkata);
        let logout = date_hms_to_millis(d("2025-06-19"), 17, 30, 0, Kolkata);
        assert_eq!(hours_between(login, logout), 8.5);
    }

    #[test]
    fn hours_round_to_two_decimals() {
        // 7 minutes = 0.11666..h
        assert_eq!(hours_between(0, 7 * 60_000), 0.12);
        assert_eq!(round2(0.10000000000000009), 0.1);
        assert_eq!(round2(1.005 - 0.005), 1.0);
    }

    #[test]
    fn local_datetime_formats_in_business_zone() {
        let login = date_hms_to_millis(d("2025-06-19"), 9, 0, 0, Kolkata);
        assert_eq!(format_local_datetime(login, Kolkata), "2025-06-19 09:00:00");
    }
}
