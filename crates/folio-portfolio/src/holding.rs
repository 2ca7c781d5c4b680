//! The per-instrument ledger.
//!
//! A [`Holding`] owns one ticker's append-only transaction log plus a
//! date-bucketed net-share index (`lots`). The log answers point-in-time
//! share and value queries; the lots exist only to order rebalancing
//! liquidations oldest-first. History is never edited: every correction,
//! including a rebalance, appends new transactions.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use folio_core::{DailyBar, Date};
use folio_quotes::closing_price_on;

use crate::error::{PortfolioError, PortfolioResult};

/// One immutable ledger entry.
///
/// `recorded_price` is the cash value of the entry at its own date,
/// computed once at append time for audit and export. Valuation never
/// reads it back; value queries always re-price at the query date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Signed share delta (positive = buy, negative = sell).
    pub delta_shares: Decimal,
    /// The date the entry applies to.
    pub date: Date,
    /// `delta_shares x close(date)` at append time.
    pub recorded_price: Decimal,
}

/// Buy/sell label derived from a transaction's sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeKind {
    /// Positive share delta.
    Buy,
    /// Negative share delta.
    Sell,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Buy => write!(f, "Buy"),
            TradeKind::Sell => write!(f, "Sell"),
        }
    }
}

/// One export row of the append-ordered log.
///
/// `running_total` is a running sum over the export order, recomputed at
/// export time; it is written for human readability and never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    /// The holding's ticker.
    pub ticker: String,
    /// Buy or Sell, from the delta's sign.
    pub kind: TradeKind,
    /// Signed share delta.
    pub shares: Decimal,
    /// Running share total over the export order.
    pub running_total: Decimal,
    /// The transaction's date.
    pub date: Date,
}

/// A planned correction for one holding, computed before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RebalanceStep {
    /// Already at target.
    Hold,
    /// Buy `shares` at the rebalance date.
    Buy {
        /// Shares to add.
        shares: Decimal,
        /// Closing price at the rebalance date.
        price: Decimal,
    },
    /// Liquidate lot slices, oldest first.
    Sell {
        /// `(lot_date, negative share delta)` per touched bucket.
        slices: Vec<(Date, Decimal)>,
        /// Closing price at the rebalance date.
        price: Decimal,
    },
}

/// One instrument's append-only ledger.
#[derive(Debug, Clone)]
pub struct Holding {
    ticker: String,
    history: Vec<DailyBar>,
    transactions: Vec<Transaction>,
    lots: BTreeMap<Date, Decimal>,
}

impl Holding {
    /// Creates an empty ledger for `ticker` backed by its daily history
    /// (most-recent-first).
    #[must_use]
    pub fn new(ticker: impl Into<String>, history: Vec<DailyBar>) -> Self {
        Holding {
            ticker: ticker.into().to_uppercase(),
            history,
            transactions: Vec::new(),
            lots: BTreeMap::new(),
        }
    }

    /// The holding's ticker.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// The append-ordered transaction log.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Closing price for the most recent trading day on or before `date`.
    ///
    /// # Errors
    ///
    /// Rejects future dates and dates before the earliest price record.
    pub fn price_on(&self, date: Date) -> PortfolioResult<Decimal> {
        Ok(closing_price_on(&self.history, &self.ticker, date)?)
    }

    /// Net shares held as of `date` (0 if nothing was held yet).
    #[must_use]
    pub fn shares_on(&self, date: Date) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.date <= date)
            .map(|t| t.delta_shares)
            .sum()
    }

    /// Mark-to-market value as of `date`: every share held on `date` is
    /// priced at `date`'s close, never at its purchase price.
    ///
    /// # Errors
    ///
    /// Rejects future dates and dates before the earliest price record,
    /// even when no shares were held.
    pub fn value_on(&self, date: Date) -> PortfolioResult<Decimal> {
        let price = self.price_on(date)?;
        Ok(self.shares_on(date) * price)
    }

    /// Appends a share adjustment dated `date`.
    ///
    /// # Errors
    ///
    /// - `ZeroDelta` for a zero share delta
    /// - temporal errors for future dates or dates before the history
    /// - `NegativeShares` if the running total at `date` or any later
    ///   transaction date would go negative
    pub fn adjust_on(&mut self, delta: Decimal, date: Date) -> PortfolioResult<()> {
        if delta.is_zero() {
            return Err(PortfolioError::ZeroDelta);
        }
        let price = self.price_on(date)?;
        self.check_non_negative(delta, date)?;

        self.append(delta, date, date, price);
        debug!(ticker = %self.ticker, %delta, %date, "shares adjusted");
        Ok(())
    }

    /// Exports the log as rows for persistence, in append order.
    #[must_use]
    pub fn transaction_rows(&self) -> Vec<TransactionRow> {
        let mut running = Decimal::ZERO;
        self.transactions
            .iter()
            .map(|t| {
                running += t.delta_shares;
                TransactionRow {
                    ticker: self.ticker.clone(),
                    kind: if t.delta_shares < Decimal::ZERO {
                        TradeKind::Sell
                    } else {
                        TradeKind::Buy
                    },
                    shares: t.delta_shares,
                    running_total: running,
                    date: t.date,
                }
            })
            .collect()
    }

    /// Plans the correction that brings this holding to `target` value on
    /// `date`, without mutating anything.
    ///
    /// A deficit is covered by walking the lots in ascending date order:
    /// whole buckets while the remaining deficit covers them, then a
    /// fractional slice of the last. If the buckets cannot cover the
    /// deficit the plan fails with `InsufficientShares` - the ledger is
    /// never left partially liquidated or overdrawn.
    pub(crate) fn plan_rebalance(
        &self,
        target: Decimal,
        date: Date,
    ) -> PortfolioResult<RebalanceStep> {
        let price = self.price_on(date)?;
        let delta = target - self.shares_on(date) * price;

        if delta.is_zero() {
            return Ok(RebalanceStep::Hold);
        }
        if delta > Decimal::ZERO {
            return Ok(RebalanceStep::Buy {
                shares: delta / price,
                price,
            });
        }

        let mut remaining = delta;
        let mut slices = Vec::new();
        for (&lot_date, &lot_shares) in &self.lots {
            if remaining.is_zero() {
                break;
            }
            if lot_shares <= Decimal::ZERO {
                continue;
            }
            let lot_value = lot_shares * price;
            if remaining + lot_value > Decimal::ZERO {
                // This bucket more than covers the deficit; take a slice
                // (remaining/lot_value of the bucket, i.e. remaining/price)
                slices.push((lot_date, remaining / price));
                remaining = Decimal::ZERO;
                break;
            }
            slices.push((lot_date, -lot_shares));
            remaining += lot_value;
        }

        if !remaining.is_zero() {
            return Err(PortfolioError::InsufficientShares {
                ticker: self.ticker.clone(),
                date,
            });
        }

        let total: Decimal = slices.iter().map(|(_, s)| *s).sum();
        self.check_non_negative(total, date)?;

        Ok(RebalanceStep::Sell { slices, price })
    }

    /// Applies a previously planned correction.
    ///
    /// Liquidation transactions are dated `date` (so value queries on the
    /// rebalance date see them) while their lot buckets are decremented
    /// under the original purchase date (so a later walk still liquidates
    /// oldest-first).
    pub(crate) fn apply_rebalance(&mut self, step: RebalanceStep, date: Date) {
        match step {
            RebalanceStep::Hold => {}
            RebalanceStep::Buy { shares, price } => {
                self.append(shares, date, date, price);
                debug!(ticker = %self.ticker, %shares, %date, "rebalance buy");
            }
            RebalanceStep::Sell { slices, price } => {
                for (lot_date, shares) in slices {
                    self.append(shares, date, lot_date, price);
                    debug!(ticker = %self.ticker, %shares, %lot_date, %date, "rebalance sell");
                }
            }
        }
    }

    /// Appends a transaction dated `txn_date` whose lot attribution lands
    /// under `lot_date`. The two differ only for rebalance liquidations.
    fn append(&mut self, delta: Decimal, txn_date: Date, lot_date: Date, price: Decimal) {
        self.transactions.push(Transaction {
            delta_shares: delta,
            date: txn_date,
            recorded_price: delta * price,
        });
        *self.lots.entry(lot_date).or_insert(Decimal::ZERO) += delta;
    }

    /// Verifies that adding `delta` at `date` keeps the running total
    /// non-negative at `date` and at every later transaction date.
    fn check_non_negative(&self, delta: Decimal, date: Date) -> PortfolioResult<()> {
        let later = self
            .transactions
            .iter()
            .map(|t| t.date)
            .filter(|d| *d > date);
        for checkpoint in std::iter::once(date).chain(later) {
            if self.shares_on(checkpoint) + delta < Decimal::ZERO {
                return Err(PortfolioError::negative_shares(&self.ticker));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::FolioError;
    use folio_quotes::QuoteError;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> Date {
        Date::from_ymd(2024, 6, d).unwrap()
    }

    /// AAPL closes 100, 110, 120, ... for Jun 3..7.
    fn holding() -> Holding {
        let bars = (0..5)
            .map(|i| DailyBar::at_close(day(3 + i), dec!(100) + Decimal::from(i * 10)))
            .rev()
            .collect();
        Holding::new("aapl", bars)
    }

    #[test]
    fn test_ticker_uppercased() {
        assert_eq!(holding().ticker(), "AAPL");
    }

    #[test]
    fn test_adjust_and_shares_on() {
        let mut h = holding();
        h.adjust_on(dec!(10), day(3)).unwrap();
        h.adjust_on(dec!(-4), day(5)).unwrap();

        assert_eq!(h.shares_on(day(3)), dec!(10));
        assert_eq!(h.shares_on(day(4)), dec!(10));
        assert_eq!(h.shares_on(day(5)), dec!(6));
        assert_eq!(h.shares_on(day(2)), Decimal::ZERO);
    }

    #[test]
    fn test_value_marks_to_query_date() {
        let mut h = holding();
        h.adjust_on(dec!(10), day(3)).unwrap();

        // 10 shares at day-4 close 110, not the 100 paid
        assert_eq!(h.value_on(day(4)).unwrap(), dec!(1100));
        assert_eq!(h.value_on(day(3)).unwrap(), dec!(1000));
    }

    #[test]
    fn test_recorded_price_frozen_at_append() {
        let mut h = holding();
        h.adjust_on(dec!(10), day(3)).unwrap();
        assert_eq!(h.transactions()[0].recorded_price, dec!(1000));

        // Later valuation does not touch it
        let _ = h.value_on(day(7)).unwrap();
        assert_eq!(h.transactions()[0].recorded_price, dec!(1000));
    }

    #[test]
    fn test_zero_delta_rejected() {
        let mut h = holding();
        let err = h.adjust_on(Decimal::ZERO, day(3)).unwrap_err();
        assert!(matches!(err, PortfolioError::ZeroDelta));
    }

    #[test]
    fn test_negative_total_rejected() {
        let mut h = holding();
        h.adjust_on(dec!(5), day(3)).unwrap();
        let err = h.adjust_on(dec!(-6), day(4)).unwrap_err();
        assert!(matches!(err, PortfolioError::NegativeShares { .. }));
        // Nothing was applied
        assert_eq!(h.transactions().len(), 1);
    }

    #[test]
    fn test_backdated_sell_checks_later_dates() {
        let mut h = holding();
        h.adjust_on(dec!(5), day(3)).unwrap();
        h.adjust_on(dec!(-4), day(6)).unwrap();

        // Selling 2 on day 4 leaves day 6 at -1 even though day 4 would
        // still be positive
        let err = h.adjust_on(dec!(-2), day(4)).unwrap_err();
        assert!(matches!(err, PortfolioError::NegativeShares { .. }));

        // Selling 1 keeps every later running total at zero or above
        h.adjust_on(dec!(-1), day(4)).unwrap();
        assert_eq!(h.shares_on(day(6)), Decimal::ZERO);
    }

    #[test]
    fn test_future_date_rejected() {
        let mut h = holding();
        let err = h.adjust_on(dec!(1), Date::today().add_days(1)).unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::Quote(QuoteError::Temporal(FolioError::FutureDate { .. }))
        ));
    }

    #[test]
    fn test_before_history_rejected() {
        let mut h = holding();
        let err = h.adjust_on(dec!(1), day(1)).unwrap_err();
        assert!(matches!(
            err,
            PortfolioError::Quote(QuoteError::Temporal(FolioError::BeforeHistory { .. }))
        ));
    }

    #[test]
    fn test_value_before_history_rejected_even_with_no_shares() {
        let h = holding();
        assert!(h.value_on(day(1)).is_err());
    }

    #[test]
    fn test_transaction_rows_running_total() {
        let mut h = holding();
        h.adjust_on(dec!(10), day(3)).unwrap();
        h.adjust_on(dec!(-4), day(5)).unwrap();
        h.adjust_on(dec!(2), day(4)).unwrap();

        let rows = h.transaction_rows();
        assert_eq!(rows.len(), 3);
        // Export preserves append order, not date order
        assert_eq!(rows[0].date, day(3));
        assert_eq!(rows[1].date, day(5));
        assert_eq!(rows[2].date, day(4));
        assert_eq!(rows[0].kind, TradeKind::Buy);
        assert_eq!(rows[1].kind, TradeKind::Sell);
        assert_eq!(rows[0].running_total, dec!(10));
        assert_eq!(rows[1].running_total, dec!(6));
        assert_eq!(rows[2].running_total, dec!(8));
    }

    #[test]
    fn test_plan_rebalance_hold_at_target() {
        let mut h = holding();
        h.adjust_on(dec!(10), day(3)).unwrap();
        // Worth 1100 on day 4
        let step = h.plan_rebalance(dec!(1100), day(4)).unwrap();
        assert_eq!(step, RebalanceStep::Hold);
    }

    #[test]
    fn test_plan_rebalance_buy() {
        let mut h = holding();
        h.adjust_on(dec!(10), day(3)).unwrap();
        // Needs 220 more on day 4 at price 110 -> 2 shares
        let step = h.plan_rebalance(dec!(1320), day(4)).unwrap();
        match step {
            RebalanceStep::Buy { shares, price } => {
                assert_eq!(shares, dec!(2));
                assert_eq!(price, dec!(110));
            }
            other => panic!("expected buy, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_rebalance_sells_oldest_first() {
        let mut h = holding();
        h.adjust_on(dec!(10), day(3)).unwrap();
        h.adjust_on(dec!(10), day(4)).unwrap();

        // Worth 2400 on day 5 (20 x 120); cut to 1080 -> sell 11 shares:
        // all 10 from the Jun 3 lot plus 1 from Jun 4
        let step = h.plan_rebalance(dec!(1080), day(5)).unwrap();
        match step {
            RebalanceStep::Sell { slices, price } => {
                assert_eq!(price, dec!(120));
                assert_eq!(slices, vec![(day(3), dec!(-10)), (day(4), dec!(-1))]);
            }
            other => panic!("expected sell, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_rebalance_dual_dating() {
        let mut h = holding();
        h.adjust_on(dec!(10), day(3)).unwrap();
        h.adjust_on(dec!(10), day(4)).unwrap();

        let step = h.plan_rebalance(dec!(1080), day(5)).unwrap();
        h.apply_rebalance(step, day(5));

        // Both liquidations are dated the rebalance date
        let rows = h.transaction_rows();
        assert_eq!(rows[2].date, day(5));
        assert_eq!(rows[3].date, day(5));
        // ...so day-5 queries see them immediately
        assert_eq!(h.shares_on(day(5)), dec!(9));
        assert_eq!(h.value_on(day(5)).unwrap(), dec!(1080));
        // ...but the lot index was decremented under the purchase dates
        assert_eq!(h.lots[&day(3)], Decimal::ZERO);
        assert_eq!(h.lots[&day(4)], dec!(9));
        assert!(!h.lots.contains_key(&day(5)));
    }

    #[test]
    fn test_plan_rebalance_insufficient_shares() {
        let mut h = holding();
        h.adjust_on(dec!(10), day(3)).unwrap();

        // Target of -1 asks for more liquidation than the lots hold
        let err = h.plan_rebalance(dec!(-1), day(4)).unwrap_err();
        assert!(matches!(err, PortfolioError::InsufficientShares { .. }));
        // Planning never mutates
        assert_eq!(h.transactions().len(), 1);
    }
}
