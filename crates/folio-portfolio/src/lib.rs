//! # Folio Portfolio
//!
//! Point-in-time portfolio ledger, proportional rebalancer, and text
//! performance chart.
//!
//! The central type is [`Portfolio`]: a set of per-ticker [`Holding`]s,
//! each an append-only transaction log plus date-bucketed lots. History
//! is never mutated; every correction is a new transaction, and every
//! valuation re-prices holdings at the query date through a
//! [`QuoteSource`](folio_quotes::QuoteSource).
//!
//! - [`Portfolio::adjust`] records share purchases and sales
//! - [`Portfolio::total_value`], [`Portfolio::composition`], and
//!   [`Portfolio::distribution`] answer as-of-date queries
//! - [`Portfolio::rebalance`] moves the portfolio to target weights
//!   while preserving its total value on the rebalance date
//! - [`Portfolio::chart`] renders sampled value over a
//!   [`DateRange`](folio_core::DateRange) as an asterisk bar chart
//!
//! [`SimplePortfolio`] is the whole-share flavor without a transaction
//! log. [`PortfolioManager`] keys portfolios by name and persists their
//! ledgers as CSV, reloading them by replaying rows through the same
//! validation as live adjustments.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use folio_core::Date;
//! use folio_portfolio::Portfolio;
//! use folio_quotes::CsvFileSource;
//! use rust_decimal_macros::dec;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(CsvFileSource::new("stockcsvs"));
//! let mut portfolio = Portfolio::new("Tech", source);
//! portfolio.adjust("AAPL", dec!(10), Date::from_ymd(2024, 6, 3)?)?;
//! let value = portfolio.total_value(Date::from_ymd(2024, 6, 5)?)?;
//! println!("{value}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod chart;
pub mod error;
mod holding;
mod manager;
mod portfolio;
mod simple;

pub use error::{PortfolioError, PortfolioResult};
pub use holding::{Holding, TradeKind, Transaction, TransactionRow};
pub use manager::PortfolioManager;
pub use portfolio::{CompositionEntry, DistributionEntry, Portfolio};
pub use simple::SimplePortfolio;
