//! Error types for ledger and portfolio operations.
//!
//! The taxonomy follows the engine's failure classes: validation,
//! temporal, lookup, state, and I/O. Every mutating operation validates
//! fully before touching the ledger, so none of these errors ever leaves
//! a half-applied transaction behind.

use thiserror::Error;

use folio_core::{Date, FolioError};
use folio_quotes::QuoteError;

/// Result type for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

/// Errors that can occur during ledger and portfolio operations.
#[derive(Error, Debug, Clone)]
pub enum PortfolioError {
    /// Date validation failure (future date, before history).
    #[error(transparent)]
    Temporal(#[from] FolioError),

    /// The price history source failed.
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// A transaction with a zero share delta.
    #[error("A transaction must add or subtract shares")]
    ZeroDelta,

    /// The mutation would take net shares below zero at some date.
    #[error("You cannot have negative shares of {ticker}")]
    NegativeShares {
        /// The affected ticker.
        ticker: String,
    },

    /// Fractional shares where only whole shares are allowed.
    #[error("Fractional shares are not allowed for simple portfolios")]
    FractionalShares,

    /// A rebalance weight that is negative or not a whole number.
    #[error("Distributions must be whole numbers")]
    NonWholeWeight,

    /// More than one weight for a single-holding composition.
    #[error("Too many distributions for one stock")]
    TooManyWeights,

    /// Weight count does not match the composition.
    #[error("Expected {expected} distributions, got {got}")]
    WeightCountMismatch {
        /// Holdings in the composition.
        expected: usize,
        /// Weights supplied.
        got: usize,
    },

    /// Every supplied weight was zero.
    #[error("At least one distribution must be positive")]
    ZeroWeightTotal,

    /// A liquidation walk could not free enough value.
    #[error("Not enough shares of {ticker} to rebalance on {date}")]
    InsufficientShares {
        /// The affected ticker.
        ticker: String,
        /// The rebalance date.
        date: Date,
    },

    /// Every holding nets to zero shares on the queried date.
    #[error("No stocks in portfolio on {date}")]
    NoStocksOnDate {
        /// The queried date.
        date: Date,
    },

    /// The portfolio has never held any instrument.
    #[error("Portfolio has no holdings")]
    EmptyPortfolio,

    /// No portfolio with the given name.
    #[error("No such portfolio found: {name}")]
    PortfolioNotFound {
        /// The requested name.
        name: String,
    },

    /// A portfolio with the given name already exists.
    #[error("A portfolio named '{name}' already exists")]
    DuplicatePortfolio {
        /// The conflicting name.
        name: String,
    },

    /// The persisted portfolio file does not exist.
    #[error("Portfolio file not found for '{name}'")]
    FileNotFound {
        /// The requested portfolio name.
        name: String,
    },

    /// A file exists but its name differs in case.
    #[error("Portfolio file for '{name}' not found with exact case-sensitive name")]
    FileCaseMismatch {
        /// The requested portfolio name.
        name: String,
    },

    /// A persisted row that cannot be replayed.
    #[error("Portfolio file is not properly formatted: {reason}")]
    MalformedFile {
        /// What was wrong with the file.
        reason: String,
    },

    /// Reading or writing a portfolio file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl PortfolioError {
    /// Creates a negative-shares error.
    #[must_use]
    pub fn negative_shares(ticker: impl Into<String>) -> Self {
        Self::NegativeShares {
            ticker: ticker.into(),
        }
    }

    /// Creates a portfolio-not-found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::PortfolioNotFound { name: name.into() }
    }

    /// Creates a malformed-file error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedFile {
            reason: reason.into(),
        }
    }

    /// Creates an I/O error from anything displayable.
    #[must_use]
    pub fn io(err: impl std::fmt::Display) -> Self {
        Self::Io(err.to_string())
    }
}
