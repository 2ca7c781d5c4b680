//! # Folio Quotes
//!
//! Daily price history for the Folio ledger.
//!
//! The [`QuoteSource`] trait is the single capability the ledger consumes:
//! given a ticker, return its daily bars most-recent-first. Three
//! implementations are provided and compose by plain polymorphism:
//!
//! - [`CsvFileSource`] - reads `<TICKER>.csv` cache files from a directory
//! - [`AlphaVantageSource`] - downloads the full daily history over HTTP
//!   and refreshes the cache directory
//! - [`RefreshingSource`] - tries the cache first, falls through to the
//!   remote source on a miss or when the cache is stale
//!
//! [`StaticSource`] backs tests with fixed in-memory histories.
//!
//! Closing-price lookup walks backward one calendar day at a time, so
//! weekend and holiday queries resolve to the previous trading day.
//!
//! The [`analytics`] module holds the single-pass price calculations
//! (gain/loss over a range, N-day moving average, crossover detection).
//! They consume price history directly and never touch the ledger.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
mod alpha_vantage;
mod csv_file;
pub mod error;
mod refresh;
mod source;

pub use alpha_vantage::AlphaVantageSource;
pub use csv_file::CsvFileSource;
pub use error::{QuoteError, QuoteResult};
pub use refresh::RefreshingSource;
pub use source::{closing_price_on, QuoteSource, StaticSource};
