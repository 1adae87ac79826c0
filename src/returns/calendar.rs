//! Calendar boundary arithmetic for calendar-aligned return windows
//!
//! Pure date functions framed by the argument's own year/month, never by a
//! process-wide "now". The MTD/QTD/YTD windows for an instrument anchor to
//! that instrument's last observed date, so these take the anchor date as
//! the frame of reference.

use chrono::{Datelike, Days, NaiveDate};

/// Last calendar day of the month prior to `date`'s month.
pub fn end_of_prior_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?.checked_sub_days(Days::new(1))
}

/// Last calendar day of the quarter prior to `date`'s quarter.
///
/// Quarters start in months 1, 4, 7 and 10.
pub fn end_of_prior_quarter(date: NaiveDate) -> Option<NaiveDate> {
    let quarter_start_month = ((date.month() - 1) / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), quarter_start_month, 1)?.checked_sub_days(Days::new(1))
}

/// December 31 of the year prior to `date`'s year.
pub fn end_of_prior_year(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year() - 1, 12, 31)
}
