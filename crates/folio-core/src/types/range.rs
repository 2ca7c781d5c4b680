//! Named reporting ranges.
//!
//! A [`DateRange`] is a plain `{kind, start, end}` value constructed fresh
//! per call. The trailing variants are computed relative to today at the
//! moment they are built; the custom variants anchor on a caller-supplied
//! end date. There is no shared mutable state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FolioError, FolioResult};
use crate::types::Date;

/// The fixed reporting-span categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeKind {
    /// Seven calendar days.
    Week,
    /// One calendar month.
    Month,
    /// One calendar year.
    Year,
    /// Five calendar years.
    FiveYears,
    /// Ten calendar years.
    TenYears,
}

impl RangeKind {
    /// Sampling step in days used by the performance chart.
    #[must_use]
    pub fn step_days(&self) -> i64 {
        match self {
            RangeKind::Week => 1,
            RangeKind::Month => 2,
            RangeKind::Year => 30,
            RangeKind::FiveYears => 152,
            RangeKind::TenYears => 300,
        }
    }

    /// Returns the start date for a span of this kind ending at `end`.
    #[must_use]
    fn start_before(&self, end: Date) -> Date {
        match self {
            RangeKind::Week => end.sub_weeks(1),
            RangeKind::Month => end.sub_months(1),
            RangeKind::Year => end.sub_years(1),
            RangeKind::FiveYears => end.sub_years(5),
            RangeKind::TenYears => end.sub_years(10),
        }
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RangeKind::Week => "week",
            RangeKind::Month => "month",
            RangeKind::Year => "year",
            RangeKind::FiveYears => "five years",
            RangeKind::TenYears => "ten years",
        };
        write!(f, "{label}")
    }
}

/// A named date span used for performance reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The span category.
    pub kind: RangeKind,
    /// First date of the span (inclusive).
    pub start: Date,
    /// Last date of the span (inclusive).
    pub end: Date,
}

impl DateRange {
    /// Builds the trailing span of the given kind ending today.
    #[must_use]
    pub fn trailing(kind: RangeKind) -> Self {
        let end = Date::today();
        DateRange {
            kind,
            start: kind.start_before(end),
            end,
        }
    }

    /// Builds a custom span of the given kind anchored on `end`.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::FutureDate` if `end` is after today.
    pub fn ending_at(kind: RangeKind, end: Date) -> FolioResult<Self> {
        if end > Date::today() {
            return Err(FolioError::FutureDate { date: end });
        }
        Ok(DateRange {
            kind,
            start: kind.start_before(end),
            end,
        })
    }
}
