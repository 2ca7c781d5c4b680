//! The quote source capability and closing-price lookup.

use std::collections::HashMap;

use rust_decimal::Decimal;

use folio_core::{DailyBar, Date, FolioError};

use crate::error::{QuoteError, QuoteResult};

/// A provider of daily price history.
///
/// Implementations return bars **most-recent-first**, matching the order
/// the upstream CSV feeds deliver them in. The ledger only reads `close`.
pub trait QuoteSource {
    /// Returns the full daily history for `ticker`, most-recent-first.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticker is unknown to this source or the
    /// history cannot be read.
    fn history(&self, ticker: &str) -> QuoteResult<Vec<DailyBar>>;
}

/// Looks up the closing price for the most recent trading day on or
/// before `date`.
///
/// Walks backward one calendar day at a time so weekend and holiday
/// queries resolve to the previous market day.
///
/// # Errors
///
/// - `FolioError::FutureDate` if `date` is after today
/// - `FolioError::BeforeHistory` if `date` precedes the earliest bar
/// - `QuoteError::TickerNotFound` if `bars` is empty
pub fn closing_price_on(bars: &[DailyBar], ticker: &str, date: Date) -> QuoteResult<Decimal> {
    let earliest = bars
        .last()
        .ok_or_else(|| QuoteError::ticker_not_found(ticker))?;

    if date > Date::today() {
        return Err(FolioError::FutureDate { date }.into());
    }
    if earliest.date > date {
        return Err(FolioError::before_history(ticker, date).into());
    }

    let mut cursor = date;
    loop {
        if let Some(bar) = bars.iter().find(|b| b.date == cursor) {
            return Ok(bar.close);
        }
        // Guaranteed to terminate: the earliest bar is on or before `date`
        cursor = cursor.pred();
    }
}

/// A fixed in-memory quote source.
///
/// Used by tests and demos that want deterministic histories without any
/// file or network access.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    histories: HashMap<String, Vec<DailyBar>>,
}

impl StaticSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a history for `ticker`. Bars are sorted most-recent-first
    /// regardless of input order.
    pub fn insert(&mut self, ticker: impl Into<String>, mut bars: Vec<DailyBar>) {
        bars.sort_by(|a, b| b.date.cmp(&a.date));
        self.histories.insert(ticker.into().to_uppercase(), bars);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, ticker: impl Into<String>, bars: Vec<DailyBar>) -> Self {
        self.insert(ticker, bars);
        self
    }
}

impl QuoteSource for StaticSource {
    fn history(&self, ticker: &str) -> QuoteResult<Vec<DailyBar>> {
        self.histories
            .get(&ticker.to_uppercase())
            .cloned()
            .ok_or_else(|| QuoteError::ticker_not_found(ticker))
    }
}
