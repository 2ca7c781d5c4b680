//! Cache-then-remote composition.

use tracing::debug;

use folio_core::{DailyBar, Date};

use crate::error::QuoteResult;
use crate::source::QuoteSource;

/// Tries a cache source first and falls through to a remote source when
/// the cache misses or is stale.
///
/// A cached history is stale when its latest bar is older than today; the
/// remote source is expected to refresh the cache as a side effect (see
/// [`AlphaVantageSource::with_cache_dir`](crate::AlphaVantageSource::with_cache_dir)).
#[derive(Debug, Clone)]
pub struct RefreshingSource<C, R> {
    cache: C,
    remote: R,
}

impl<C: QuoteSource, R: QuoteSource> RefreshingSource<C, R> {
    /// Composes `cache` over `remote`.
    #[must_use]
    pub fn new(cache: C, remote: R) -> Self {
        RefreshingSource { cache, remote }
    }
}

impl<C: QuoteSource, R: QuoteSource> QuoteSource for RefreshingSource<C, R> {
    fn history(&self, ticker: &str) -> QuoteResult<Vec<DailyBar>> {
        match self.cache.history(ticker) {
            Ok(bars) if is_fresh(&bars) => Ok(bars),
            Ok(_) => {
                debug!(ticker, "cache stale, fetching remote history");
                self.remote.history(ticker)
            }
            Err(err) => {
                debug!(ticker, %err, "cache miss, fetching remote history");
                self.remote.history(ticker)
            }
        }
    }
}

fn is_fresh(bars: &[DailyBar]) -> bool {
    bars.first().is_some_and(|bar| bar.date >= Date::today())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticSource;
    use rust_decimal_macros::dec;

    fn bar(date: Date) -> DailyBar {
        DailyBar::at_close(date, dec!(100))
    }

    #[test]
    fn test_fresh_cache_wins() {
        let cache = StaticSource::new().with("AAPL", vec![bar(Date::today())]);
        let remote = StaticSource::new().with("AAPL", vec![bar(Date::today().sub_days(5))]);
        let source = RefreshingSource::new(cache, remote);

        let history = source.history("AAPL").unwrap();
        assert_eq!(history[0].date, Date::today());
    }

    #[test]
    fn test_stale_cache_falls_through() {
        let stale_day = Date::today().sub_days(10);
        let cache = StaticSource::new().with("AAPL", vec![bar(stale_day)]);
        let remote = StaticSource::new().with("AAPL", vec![bar(Date::today())]);
        let source = RefreshingSource::new(cache, remote);

        let history = source.history("AAPL").unwrap();
        assert_eq!(history[0].date, Date::today());
    }

    #[test]
    fn test_cache_miss_falls_through() {
        let cache = StaticSource::new();
        let remote = StaticSource::new().with("AAPL", vec![bar(Date::today())]);
        let source = RefreshingSource::new(cache, remote);

        assert!(source.history("AAPL").is_ok());
    }

    #[test]
    fn test_miss_everywhere_propagates_remote_error() {
        let source = RefreshingSource::new(StaticSource::new(), StaticSource::new());
        assert!(source.history("AAPL").is_err());
    }
}
