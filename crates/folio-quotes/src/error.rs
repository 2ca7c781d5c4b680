//! Error types for quote sources.

use thiserror::Error;

use folio_core::FolioError;

/// Result type for quote operations.
pub type QuoteResult<T> = Result<T, QuoteError>;

/// Errors raised while fetching or querying price history.
#[derive(Error, Debug, Clone)]
pub enum QuoteError {
    /// Date validation failure (future date, before history).
    #[error(transparent)]
    Temporal(#[from] FolioError),

    /// No history file or remote record for the ticker.
    #[error("No price history found for '{ticker}'")]
    TickerNotFound {
        /// The ticker that was requested.
        ticker: String,
    },

    /// The source file could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),

    /// A history record could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The remote service could not be reached or returned garbage.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// A moving-average window of zero days.
    #[error("Moving average window must be at least one day")]
    InvalidWindow,

    /// A range whose start falls after its end.
    #[error("Range start {start} is after end {end}")]
    InvalidRange {
        /// The start of the range.
        start: folio_core::Date,
        /// The end of the range.
        end: folio_core::Date,
    },
}

impl QuoteError {
    /// Creates a ticker-not-found error.
    #[must_use]
    pub fn ticker_not_found(ticker: impl Into<String>) -> Self {
        Self::TickerNotFound {
            ticker: ticker.into(),
        }
    }

    /// Creates an I/O error from anything displayable.
    #[must_use]
    pub fn io(err: impl std::fmt::Display) -> Self {
        Self::Io(err.to_string())
    }

    /// Creates a parse error from anything displayable.
    #[must_use]
    pub fn parse(err: impl std::fmt::Display) -> Self {
        Self::Parse(err.to_string())
    }
}
