//! # Folio Core
//!
//! Foundational types for the Folio portfolio ledger.
//!
//! This crate provides the building blocks shared by the quote sources and
//! the ledger engine:
//!
//! - [`types::Date`] - calendar date newtype with the arithmetic the ledger
//!   and the range categories need
//! - [`types::DateRange`] / [`types::RangeKind`] - named reporting spans
//!   (week, month, year, five years, ten years)
//! - [`types::DailyBar`] - one trading day of open/high/low/close/volume
//! - [`FolioError`] - shared error type for date and history validation
//!
//! ## Example
//!
//! ```rust
//! use folio_core::types::{Date, DateRange, RangeKind};
//!
//! let end = Date::from_ymd(2024, 6, 3).unwrap();
//! let range = DateRange::ending_at(RangeKind::Week, end).unwrap();
//! assert_eq!(range.start, Date::from_ymd(2024, 5, 27).unwrap());
//! assert_eq!(range.kind.step_days(), 1);
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;

pub use error::{FolioError, FolioResult};
pub use types::{DailyBar, Date, DateRange, RangeKind};
