//! Error types shared across the Folio workspace.
//!
//! Temporal validation (future dates, dates before the start of a ticker's
//! price history) happens in several places, so those variants live here.

use thiserror::Error;

use crate::types::Date;

/// A specialized Result type for core operations.
pub type FolioResult<T> = Result<T, FolioError>;

/// Errors raised by the core date and history validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FolioError {
    /// Error constructing or parsing a date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// A query or mutation was dated in the future.
    #[error("Date {date} is in the future")]
    FutureDate {
        /// The offending date.
        date: Date,
    },

    /// A query or mutation predates the earliest available price record.
    #[error("No price history for {ticker} on or before {date}")]
    BeforeHistory {
        /// The ticker whose history was queried.
        ticker: String,
        /// The offending date.
        date: Date,
    },
}

impl FolioError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates a before-history error.
    #[must_use]
    pub fn before_history(ticker: impl Into<String>, date: Date) -> Self {
        Self::BeforeHistory {
            ticker: ticker.into(),
            date,
        }
    }
}
