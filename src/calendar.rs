//! Month arithmetic for due dates.
//!
//! Adding months clamps to the last day of the target month instead of
//! overflowing into the next one: Jan 31 + 1 month is Feb 29 in a leap
//! year and Feb 28 otherwise. Due dates are always computed from the
//! investment date (`start + n months`), never by chaining, so a Jan 31
//! start yields Feb 29, Mar 31, Apr 30.

use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{EngineError, Result};

/// add calendar months with end-of-month clamping
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| EngineError::InvalidDate {
            message: format!("{} + {} months is out of range", date, months),
        })
}

/// whole months elapsed from `start` to `end`, treating a clamped month end
/// as a full month (Jan 31 -> Feb 29 counts as one month)
pub fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }

    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() && !is_last_day_of_month(end) {
        months -= 1;
    }
    months.max(0) as u32
}

pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_end_of_month_clamping() {
        let start = date(2024, 1, 31);
        assert_eq!(add_months(start, 1).unwrap(), date(2024, 2, 29));
        assert_eq!(add_months(start, 2).unwrap(), date(2024, 3, 31));
        assert_eq!(add_months(start, 3).unwrap(), date(2024, 4, 30));
        assert_eq!(add_months(start, 13).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_add_months_year_rollover() {
        assert_eq!(add_months(date(2024, 11, 15), 3).unwrap(), date(2025, 2, 15));
        assert_eq!(add_months(date(2024, 6, 1), 12).unwrap(), date(2025, 6, 1));
    }

    #[test]
    fn test_whole_months_between() {
        assert_eq!(whole_months_between(date(2024, 1, 1), date(2025, 1, 1)), 12);
        assert_eq!(whole_months_between(date(2024, 1, 31), date(2024, 2, 29)), 1);
        assert_eq!(whole_months_between(date(2024, 1, 15), date(2024, 2, 14)), 0);
        assert_eq!(whole_months_between(date(2024, 1, 15), date(2024, 2, 15)), 1);
        assert_eq!(whole_months_between(date(2024, 3, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_last_day_of_month() {
        assert!(is_last_day_of_month(date(2023, 2, 28)));
        assert!(!is_last_day_of_month(date(2024, 2, 28)));
        assert!(is_last_day_of_month(date(2024, 2, 29)));
        assert!(is_last_day_of_month(date(1900, 2, 28)));
        assert!(!is_last_day_of_month(date(2000, 2, 28)));
        assert!(is_last_day_of_month(date(2024, 4, 30)));
        assert!(is_last_day_of_month(date(2024, 12, 31)));
        assert!(is_last_day_of_month(NaiveDate::MAX));
    }

    #[test]
    fn test_whole_months_from_leap_day() {
        assert_eq!(whole_months_between(date(2024, 2, 29), date(2025, 2, 28)), 12);
        assert_eq!(whole_months_between(date(2023, 1, 31), date(2023, 2, 28)), 1);
    }
}
