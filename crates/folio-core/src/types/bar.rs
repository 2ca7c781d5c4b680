//! Daily price bar.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Date;

/// One trading day of price history for a ticker.
///
/// Field order matches the cache-file CSV layout
/// (`timestamp,open,high,low,close,volume`), so the `csv` crate can
/// serialize and deserialize records directly. The ledger itself only
/// reads `close`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBar {
    /// The trading date.
    #[serde(rename = "timestamp")]
    pub date: Date,
    /// Price at market open.
    pub open: Decimal,
    /// Highest traded price of the day.
    pub high: Decimal,
    /// Lowest traded price of the day.
    pub low: Decimal,
    /// Price at market close.
    pub close: Decimal,
    /// Shares traded.
    pub volume: u64,
}

impl DailyBar {
    /// Creates a bar with the given date and close, zeroing the rest.
    ///
    /// Intended for tests and synthetic histories where only the closing
    /// price matters.
    #[must_use]
    pub fn at_close(date: Date, close: Decimal) -> Self {
        DailyBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}
