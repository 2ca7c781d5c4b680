//! Performance sampling and text chart rendering.
//!
//! Samples a portfolio's total value across a [`DateRange`] at the
//! range's step size and renders one asterisk bar per sample.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use folio_core::{Date, DateRange};

use crate::error::{PortfolioError, PortfolioResult};
use crate::portfolio::Portfolio;

/// Extra spaces between the longest date label and its bar.
const LABEL_PADDING: usize = 5;

/// Horizontal scale: the largest sample renders as about this many stars.
const MAX_STARS: Decimal = dec!(30);

impl Portfolio {
    /// Renders the portfolio's value over `range` as a text bar chart.
    ///
    /// Values are sampled at `range.start`, stepping by the range kind's
    /// step size, with the exact start and end always included. One line
    /// per sample; the footer reports the dollar value of one asterisk.
    ///
    /// # Errors
    ///
    /// `EmptyPortfolio` if no instrument was ever held; valuation errors
    /// propagate from [`total_value`](Self::total_value).
    pub fn chart(&self, range: DateRange) -> PortfolioResult<String> {
        let samples = self.sample_values(range)?;
        if samples.is_empty() {
            return Ok("No data available for the given date range.".to_string());
        }
        Ok(render(&samples, range))
    }

    /// Total value at `start, start+step, ...` while within the range,
    /// then the exact start and end re-recorded (overwriting duplicates),
    /// ascending by date.
    fn sample_values(&self, range: DateRange) -> PortfolioResult<BTreeMap<Date, Decimal>> {
        if self.is_empty() {
            return Err(PortfolioError::EmptyPortfolio);
        }

        let step = range.kind.step_days();
        let mut samples = BTreeMap::new();

        let mut cursor = range.start;
        while cursor <= range.end {
            samples.insert(cursor, self.total_value(cursor)?);
            cursor = cursor.add_days(step);
        }
        samples.insert(range.start, self.total_value(range.start)?);
        samples.insert(range.end, self.total_value(range.end)?);

        Ok(samples)
    }
}

fn render(samples: &BTreeMap<Date, Decimal>, range: DateRange) -> String {
    let max = samples.values().copied().max().unwrap_or(Decimal::ZERO);
    let units = units_per_star(max);

    let labels: Vec<(String, Decimal)> = samples
        .iter()
        .map(|(date, value)| (date.format_long(), *value))
        .collect();
    let width = labels
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0)
        + LABEL_PADDING;

    let mut out = format!(
        "Performance of portfolio from {} to {}\n\n",
        range.start, range.end
    );
    for (label, value) in &labels {
        let stars = (value / units).floor().to_usize().unwrap_or(0);
        out.push_str(&format!("{label:<width$}: {}\n", "*".repeat(stars)));
    }
    out.push('\n');
    out.push_str(&format!("Scale: * = ${}", units.normalize()));
    out
}

/// Dollar value of one asterisk: `max / 30` rounded half-up to the
/// nearest 10, floored at 5 when rounding hits zero.
fn units_per_star(max: Decimal) -> Decimal {
    let rounded = (max / MAX_STARS / dec!(10))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * dec!(10);
    if rounded.is_zero() {
        dec!(5)
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{DailyBar, RangeKind};
    use folio_quotes::{QuoteSource, StaticSource};
    use std::sync::Arc;

    fn day(d: u32) -> Date {
        Date::from_ymd(2024, 6, d).unwrap()
    }

    #[test]
    fn test_units_per_star_rounds_to_tens() {
        assert_eq!(units_per_star(dec!(3000)), dec!(100));
        assert_eq!(units_per_star(dec!(2222)), dec!(70));
        // 100/30/10 = 0.33 rounds to zero, floor kicks in
        assert_eq!(units_per_star(dec!(100)), dec!(5));
        assert_eq!(units_per_star(Decimal::ZERO), dec!(5));
    }

    #[test]
    fn test_chart_empty_portfolio_errors() {
        let source: Arc<dyn QuoteSource> = Arc::new(StaticSource::new());
        let p = Portfolio::new("Empty", source);
        let range = DateRange::ending_at(RangeKind::Week, day(10)).unwrap();
        assert!(matches!(
            p.chart(range).unwrap_err(),
            PortfolioError::EmptyPortfolio
        ));
    }

    #[test]
    fn test_week_chart_has_eight_bars_and_footer() {
        // Flat $10 close for Jun 3..12
        let bars = (0..10).map(|i| DailyBar::at_close(day(3 + i), dec!(10))).collect();
        let source: Arc<dyn QuoteSource> =
            Arc::new(StaticSource::new().with("AAPL", bars));
        let mut p = Portfolio::new("Tech", source);
        p.adjust("AAPL", dec!(30), day(3)).unwrap();

        // Jun 3 .. Jun 10 inclusive: 8 daily samples
        let range = DateRange::ending_at(RangeKind::Week, day(10)).unwrap();
        let chart = p.chart(range).unwrap();

        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0], "Performance of portfolio from 2024-06-03 to 2024-06-10");
        assert_eq!(lines.len(), 2 + 8 + 2);
        assert_eq!(*lines.last().unwrap(), "Scale: * = $10");

        // Constant $300 value, $10 per star: 30 stars per bar
        let bar_line = lines[2];
        assert!(bar_line.starts_with("Jun 3, 2024"));
        assert!(bar_line.ends_with(&"*".repeat(30)));
    }

    #[test]
    fn test_sample_map_overwrites_duplicate_endpoints() {
        let bars = (0..10).map(|i| DailyBar::at_close(day(3 + i), dec!(10))).collect();
        let source: Arc<dyn QuoteSource> =
            Arc::new(StaticSource::new().with("AAPL", bars));
        let mut p = Portfolio::new("Tech", source);
        p.adjust("AAPL", dec!(1), day(3)).unwrap();

        let range = DateRange::ending_at(RangeKind::Week, day(10)).unwrap();
        let samples = p.sample_values(range).unwrap();
        assert_eq!(samples.len(), 8);
        assert_eq!(*samples.first_key_value().unwrap().0, day(3));
        assert_eq!(*samples.last_key_value().unwrap().0, day(10));
    }
}
