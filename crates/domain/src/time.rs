//! Time and calendar helpers.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// UTC timestamp used for `recorded_at`, `created_at`, etc.
pub type Timestamp = DateTime<Utc>;

/// Calendar date without time zone (maintenance dates).
pub type Date = NaiveDate;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Return today's date in UTC.
#[must_use]
pub fn today() -> Date {
    Utc::now().date_naive()
}

/// Number of days in the given month (1-based), accounting for leap years.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_count_days_in_february_of_leap_year() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
    }

    #[test]
    fn should_count_days_in_december() {
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn should_count_days_in_thirty_day_month() {
        assert_eq!(days_in_month(2025, 4), 30);
    }
}
