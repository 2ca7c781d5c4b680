//! Core types for the Folio ledger.

mod bar;
mod date;
mod range;

pub use bar::DailyBar;
pub use date::Date;
pub use range::{DateRange, RangeKind};
