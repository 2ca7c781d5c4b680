//! The dated portfolio: an ordered, ticker-keyed collection of ledgers.
//!
//! Holdings are created lazily on first transaction and **never removed**,
//! even at zero net shares - point-in-time queries for earlier dates must
//! still find them. (The non-date-aware flavor that does remove them lives
//! in [`crate::simple`].)

use std::fmt;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::info;

use folio_core::{Date, FolioError};
use folio_quotes::QuoteSource;

use crate::error::{PortfolioError, PortfolioResult};
use crate::holding::{Holding, RebalanceStep, TransactionRow};

/// One line of a composition report: a holding's net shares on a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionEntry {
    /// The holding's ticker.
    pub ticker: String,
    /// Net shares on the queried date.
    pub shares: Decimal,
}

impl fmt::Display for CompositionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} shares", self.ticker, self.shares.normalize())
    }
}

/// One line of a distribution report: a holding's value and its share of
/// the portfolio total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionEntry {
    /// The holding's ticker.
    pub ticker: String,
    /// Mark-to-market value on the queried date.
    pub value: Decimal,
    /// Whole-number percentage of the portfolio total (half-up rounded).
    pub percent: Decimal,
}

impl fmt::Display for DistributionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ${} — {}%",
            self.ticker,
            self.value.normalize(),
            self.percent
        )
    }
}

/// A named, date-aware portfolio of holdings.
#[derive(Clone)]
pub struct Portfolio {
    name: String,
    holdings: Vec<Holding>,
    source: Arc<dyn QuoteSource>,
}

impl fmt::Debug for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Portfolio")
            .field("name", &self.name)
            .field("holdings", &self.holdings)
            .finish_non_exhaustive()
    }
}

impl Portfolio {
    /// Creates an empty portfolio that prices holdings via `source`.
    #[must_use]
    pub fn new(name: impl Into<String>, source: Arc<dyn QuoteSource>) -> Self {
        Portfolio {
            name: name.into(),
            holdings: Vec::new(),
            source,
        }
    }

    /// The portfolio's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the portfolio.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The holdings in creation order.
    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// True if no instrument has ever been held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Returns the holding for `ticker`, if one was ever created.
    #[must_use]
    pub fn find(&self, ticker: &str) -> Option<&Holding> {
        let ticker = ticker.to_uppercase();
        self.holdings.iter().find(|h| h.ticker() == ticker)
    }

    /// Buys or sells `delta` shares of `ticker` on `date`, creating the
    /// holding (and fetching its price history) on first use.
    ///
    /// # Errors
    ///
    /// Propagates quote-source failures and every ledger validation from
    /// [`Holding::adjust_on`]; a failed first transaction leaves no empty
    /// holding behind.
    pub fn adjust(&mut self, ticker: &str, delta: Decimal, date: Date) -> PortfolioResult<()> {
        let ticker = ticker.to_uppercase();
        let existing = self.holdings.iter().position(|h| h.ticker() == ticker);

        let (index, created) = match existing {
            Some(index) => (index, false),
            None => {
                let history = self.source.history(&ticker)?;
                self.holdings.push(Holding::new(&ticker, history));
                (self.holdings.len() - 1, true)
            }
        };

        match self.holdings[index].adjust_on(delta, date) {
            Ok(()) => Ok(()),
            Err(err) => {
                if created {
                    self.holdings.pop();
                }
                Err(err)
            }
        }
    }

    /// Total mark-to-market value on `date`; 0 for an empty portfolio.
    ///
    /// # Errors
    ///
    /// Rejects future dates; propagates per-holding valuation errors.
    pub fn total_value(&self, date: Date) -> PortfolioResult<Decimal> {
        if date > Date::today() {
            return Err(FolioError::FutureDate { date }.into());
        }
        let mut total = Decimal::ZERO;
        for holding in &self.holdings {
            total += holding.value_on(date)?;
        }
        Ok(total)
    }

    /// Net shares per holding on `date`, in creation order, skipping
    /// holdings that net to zero.
    ///
    /// # Errors
    ///
    /// - `EmptyPortfolio` if no holding was ever created
    /// - `NoStocksOnDate` if every holding nets to zero on `date`
    /// - `FutureDate` for a future `date`
    pub fn composition(&self, date: Date) -> PortfolioResult<Vec<CompositionEntry>> {
        let entries = self
            .active_indices(date)?
            .into_iter()
            .map(|i| CompositionEntry {
                ticker: self.holdings[i].ticker().to_string(),
                shares: self.holdings[i].shares_on(date),
            })
            .collect();
        Ok(entries)
    }

    /// Value and percentage per holding on `date`, omitting zero-value
    /// holdings; percentages are half-up rounded whole numbers.
    ///
    /// # Errors
    ///
    /// `NoStocksOnDate` when nothing has value on `date`; temporal errors
    /// as for [`total_value`](Self::total_value).
    pub fn distribution(&self, date: Date) -> PortfolioResult<Vec<DistributionEntry>> {
        let total = self.total_value(date)?;
        let mut entries = Vec::new();

        for holding in &self.holdings {
            let value = holding.value_on(date)?;
            if value.is_zero() {
                continue;
            }
            let percent = (value / total * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            entries.push(DistributionEntry {
                ticker: holding.ticker().to_string(),
                value,
                percent,
            });
        }

        if entries.is_empty() {
            return Err(PortfolioError::NoStocksOnDate { date });
        }
        Ok(entries)
    }

    /// Renders [`distribution`](Self::distribution) as report text, one
    /// holding per line, or the "no stocks" message when nothing has
    /// value on `date`.
    ///
    /// # Errors
    ///
    /// Temporal and quote errors still propagate.
    pub fn distribution_report(&self, date: Date) -> PortfolioResult<String> {
        match self.distribution(date) {
            Ok(entries) => Ok(entries
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")),
            Err(PortfolioError::NoStocksOnDate { .. }) => {
                Ok(format!("** NO STOCKS IN {} ON {date} **", self.name))
            }
            Err(err) => Err(err),
        }
    }

    /// Rebalances holdings so their relative values match `weights`,
    /// which align positionally with [`composition`](Self::composition)
    /// on `date`. Total portfolio value is unchanged.
    ///
    /// A single-holding composition given exactly one weight is left
    /// unchanged by design. All corrections are planned before any ledger
    /// mutation, so a failure applies nothing.
    ///
    /// # Errors
    ///
    /// - `NonWholeWeight` for negative or fractional weights
    /// - `TooManyWeights` for >1 weight against a one-holding composition
    /// - `WeightCountMismatch` / `ZeroWeightTotal` for malformed weights
    /// - `InsufficientShares` when a liquidation walk cannot cover its
    ///   deficit
    pub fn rebalance(&mut self, date: Date, weights: &[Decimal]) -> PortfolioResult<()> {
        for weight in weights {
            if weight.fract() != Decimal::ZERO || *weight < Decimal::ZERO {
                return Err(PortfolioError::NonWholeWeight);
            }
        }

        let active = self.active_indices(date)?;
        if active.len() == 1 {
            if weights.len() > 1 {
                return Err(PortfolioError::TooManyWeights);
            }
            // One holding already owns 100% of the value
            return Ok(());
        }
        if weights.len() != active.len() {
            return Err(PortfolioError::WeightCountMismatch {
                expected: active.len(),
                got: weights.len(),
            });
        }

        let total_weight: Decimal = weights.iter().sum();
        if total_weight.is_zero() {
            return Err(PortfolioError::ZeroWeightTotal);
        }

        let original = self.total_value(date)?;

        // Plan every correction before applying any of them
        let mut plans: Vec<(usize, RebalanceStep)> = Vec::with_capacity(active.len());
        for (slot, &index) in active.iter().enumerate() {
            let target = original * weights[slot] / total_weight;
            let step = self.holdings[index].plan_rebalance(target, date)?;
            plans.push((index, step));
        }
        for (index, step) in plans {
            self.holdings[index].apply_rebalance(step, date);
        }

        info!(portfolio = %self.name, %date, holdings = active.len(), "rebalanced");
        Ok(())
    }

    /// Every holding's export rows, holdings in creation order and each
    /// holding's rows in append order.
    #[must_use]
    pub fn transaction_rows(&self) -> Vec<TransactionRow> {
        self.holdings
            .iter()
            .flat_map(Holding::transaction_rows)
            .collect()
    }

    /// Indices of holdings with non-zero shares on `date`.
    fn active_indices(&self, date: Date) -> PortfolioResult<Vec<usize>> {
        if date > Date::today() {
            return Err(FolioError::FutureDate { date }.into());
        }
        if self.holdings.is_empty() {
            return Err(PortfolioError::EmptyPortfolio);
        }
        let active: Vec<usize> = (0..self.holdings.len())
            .filter(|&i| !self.holdings[i].shares_on(date).is_zero())
            .collect();
        if active.is_empty() {
            return Err(PortfolioError::NoStocksOnDate { date });
        }
        Ok(active)
    }
}
