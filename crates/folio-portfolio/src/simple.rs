//! Whole-share portfolio without transaction history.
//!
//! [`SimplePortfolio`] tracks only current share counts. It accepts
//! whole shares, allows selling back down to zero (at which point the
//! position disappears), and values positions mark-to-market. There is
//! no ledger, so no point-in-time composition queries and no rebalance.

use std::sync::Arc;

use rust_decimal::Decimal;

use folio_core::{DailyBar, Date};
use folio_quotes::{closing_price_on, QuoteSource};

use crate::error::{PortfolioError, PortfolioResult};

/// A single whole-share position.
#[derive(Debug, Clone)]
struct SimplePosition {
    ticker: String,
    history: Vec<DailyBar>,
    shares: Decimal,
}

impl SimplePosition {
    fn price_on(&self, date: Date) -> PortfolioResult<Decimal> {
        Ok(closing_price_on(&self.history, &self.ticker, date)?)
    }
}

/// A portfolio of whole-share positions with no transaction log.
///
/// Unlike [`Portfolio`](crate::Portfolio), mutations here change the
/// position in place. The trade-off: cheaper bookkeeping, but queries
/// only reflect the present state, never a past date.
pub struct SimplePortfolio {
    name: String,
    positions: Vec<SimplePosition>,
    source: Arc<dyn QuoteSource>,
}

impl std::fmt::Debug for SimplePortfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplePortfolio")
            .field("name", &self.name)
            .field("positions", &self.positions)
            .finish_non_exhaustive()
    }
}

impl SimplePortfolio {
    /// Creates an empty simple portfolio.
    #[must_use]
    pub fn new(name: impl Into<String>, source: Arc<dyn QuoteSource>) -> Self {
        Self {
            name: name.into(),
            positions: Vec::new(),
            source,
        }
    }

    /// The portfolio's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if no position is currently held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Adds or removes whole shares of `ticker`.
    ///
    /// A position that reaches exactly zero shares is dropped. The
    /// first purchase of a ticker fetches its price history.
    ///
    /// # Errors
    ///
    /// `FractionalShares` for a non-integral delta, `ZeroDelta` for a
    /// zero one, `NegativeShares` if the sale exceeds the position.
    pub fn adjust(&mut self, ticker: &str, delta: Decimal) -> PortfolioResult<()> {
        if delta.is_zero() {
            return Err(PortfolioError::ZeroDelta);
        }
        if !delta.fract().is_zero() {
            return Err(PortfolioError::FractionalShares);
        }

        let ticker = ticker.trim().to_uppercase();
        match self.positions.iter_mut().find(|p| p.ticker == ticker) {
            Some(position) => {
                let next = position.shares + delta;
                if next < Decimal::ZERO {
                    return Err(PortfolioError::negative_shares(ticker));
                }
                position.shares = next;
                if position.shares.is_zero() {
                    self.positions.retain(|p| !p.shares.is_zero());
                }
            }
            None => {
                if delta < Decimal::ZERO {
                    return Err(PortfolioError::negative_shares(ticker));
                }
                let history = self.source.history(&ticker)?;
                self.positions.push(SimplePosition {
                    ticker,
                    history,
                    shares: delta,
                });
            }
        }
        Ok(())
    }

    /// Shares currently held of `ticker`, zero if not held.
    #[must_use]
    pub fn shares(&self, ticker: &str) -> Decimal {
        let ticker = ticker.trim().to_uppercase();
        self.positions
            .iter()
            .find(|p| p.ticker == ticker)
            .map_or(Decimal::ZERO, |p| p.shares)
    }

    /// Current positions as `(ticker, shares)` pairs, in purchase order.
    #[must_use]
    pub fn positions(&self) -> Vec<(String, Decimal)> {
        self.positions
            .iter()
            .map(|p| (p.ticker.clone(), p.shares))
            .collect()
    }

    /// Marks every position to market at `date` and sums.
    ///
    /// # Errors
    ///
    /// Propagates pricing errors for any held ticker.
    pub fn value_on(&self, date: Date) -> PortfolioResult<Decimal> {
        let mut total = Decimal::ZERO;
        for position in &self.positions {
            total += position.shares * position.price_on(date)?;
        }
        Ok(total)
    }
}
