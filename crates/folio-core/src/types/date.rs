//! Date type for ledger calculations.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FolioError, FolioResult};

/// A calendar date.
///
/// This is a newtype wrapper around `chrono::NaiveDate` providing the
/// operations the ledger and the reporting ranges need and ensuring type
/// safety at the crate boundaries.
///
/// # Example
///
/// ```rust
/// use folio_core::types::Date;
///
/// let date = Date::from_ymd(2024, 5, 31).unwrap();
/// assert_eq!(date.sub_months(1), Date::from_ymd(2024, 4, 30).unwrap());
/// assert_eq!(date.to_string(), "2024-05-31");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> FolioResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| FolioError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Creates a date from an ISO 8601 string (YYYY-MM-DD).
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> FolioResult<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|_| FolioError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Returns today's date.
    #[must_use]
    pub fn today() -> Self {
        Date(chrono::Local::now().date_naive())
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Adds a number of days to the date (negative moves backward).
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Subtracts a number of days from the date.
    #[must_use]
    pub fn sub_days(&self, days: i64) -> Self {
        self.add_days(-days)
    }

    /// Returns the previous calendar day.
    #[must_use]
    pub fn pred(&self) -> Self {
        self.sub_days(1)
    }

    /// Subtracts a number of weeks from the date.
    #[must_use]
    pub fn sub_weeks(&self, weeks: i64) -> Self {
        self.sub_days(weeks * 7)
    }

    /// Subtracts a number of months from the date.
    ///
    /// If the resulting day would be invalid (e.g., May 31 minus 1 month),
    /// it rolls back to the last valid day of the month.
    #[must_use]
    pub fn sub_months(&self, months: i32) -> Self {
        let total_months = self.year() * 12 + self.month() as i32 - 1 - months;
        let new_year = total_months.div_euclid(12);
        let new_month = (total_months.rem_euclid(12) + 1) as u32;

        // Clamp day to valid range for new month
        let max_day = days_in_month(new_year, new_month);
        let new_day = self.day().min(max_day);

        // Always valid after clamping
        Date(NaiveDate::from_ymd_opt(new_year, new_month, new_day).unwrap())
    }

    /// Subtracts a number of years from the date, clamping Feb 29.
    #[must_use]
    pub fn sub_years(&self, years: i32) -> Self {
        let new_year = self.year() - years;
        let max_day = days_in_month(new_year, self.month());
        let new_day = self.day().min(max_day);

        Date(NaiveDate::from_ymd_opt(new_year, self.month(), new_day).unwrap())
    }

    /// Returns the number of calendar days from `self` to `other`.
    #[must_use]
    pub fn days_until(&self, other: Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Formats the date for chart labels, e.g. `Jun 3, 2024`.
    #[must_use]
    pub fn format_long(&self) -> String {
        self.0.format("%b %-d, %Y").to_string()
    }

    /// Returns the underlying `chrono::NaiveDate`.
    #[must_use]
    pub fn inner(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Returns the number of days in the given month.
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 1, 1).is_some_and(|d| d.leap_year()) => 29,
        2 => 28,
        _ => unreachable!(),
    }
}
