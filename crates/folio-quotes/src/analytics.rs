//! Single-pass price analytics.
//!
//! Gain/loss over a range, N-day moving averages, and crossover detection.
//! These consume price history directly and never touch the ledger.

use rust_decimal::Decimal;

use folio_core::{DailyBar, Date, FolioError};

use crate::error::{QuoteError, QuoteResult};
use crate::source::{closing_price_on, QuoteSource};

/// Change in closing price from `start` to `end` (positive = gain).
///
/// # Errors
///
/// Rejects ranges whose start is after their end, dates in the future,
/// and a start before the ticker's earliest record.
pub fn gain_loss<S: QuoteSource + ?Sized>(
    source: &S,
    ticker: &str,
    start: Date,
    end: Date,
) -> QuoteResult<Decimal> {
    check_range(start, end)?;

    let bars = source.history(ticker)?;
    let start_price = closing_price_on(&bars, ticker, start)?;
    let end_price = closing_price_on(&bars, ticker, end)?;

    Ok(end_price - start_price)
}

/// Mean of the last `days` closing prices on or before `date`.
///
/// Only trading days count toward the window; if fewer than `days` records
/// exist, the available ones are averaged.
///
/// # Errors
///
/// Rejects a zero-day window, future dates, and dates with no history on
/// or before them.
pub fn moving_average<S: QuoteSource + ?Sized>(
    source: &S,
    ticker: &str,
    date: Date,
    days: u32,
) -> QuoteResult<Decimal> {
    if days == 0 {
        return Err(QuoteError::InvalidWindow);
    }
    if date > Date::today() {
        return Err(FolioError::FutureDate { date }.into());
    }

    let bars = source.history(ticker)?;
    average_before(&bars, ticker, date, days)
}

/// Dates within `[start, end]` whose closing price exceeds the `days`-day
/// moving average, ascending.
///
/// # Errors
///
/// Same validation as [`gain_loss`] and [`moving_average`].
pub fn crossovers<S: QuoteSource + ?Sized>(
    source: &S,
    ticker: &str,
    start: Date,
    end: Date,
    days: u32,
) -> QuoteResult<Vec<Date>> {
    if days == 0 {
        return Err(QuoteError::InvalidWindow);
    }
    check_range(start, end)?;

    let bars = source.history(ticker)?;
    let mut found = Vec::new();

    // Bars arrive most-recent-first; walk them oldest-first
    for bar in bars.iter().rev() {
        if bar.date < start || bar.date > end {
            continue;
        }
        let average = average_before(&bars, ticker, bar.date, days)?;
        if bar.close > average {
            found.push(bar.date);
        }
    }
    Ok(found)
}

fn check_range(start: Date, end: Date) -> QuoteResult<()> {
    if start > end {
        return Err(QuoteError::InvalidRange { start, end });
    }
    if end > Date::today() {
        return Err(FolioError::FutureDate { date: end }.into());
    }
    Ok(())
}

fn average_before(bars: &[DailyBar], ticker: &str, date: Date, days: u32) -> QuoteResult<Decimal> {
    let mut sum = Decimal::ZERO;
    let mut count = 0u32;

    for bar in bars {
        if bar.date <= date && count < days {
            sum += bar.close;
            count += 1;
        }
    }

    if count == 0 {
        return Err(FolioError::before_history(ticker, date).into());
    }
    Ok(sum / Decimal::from(count))
}
