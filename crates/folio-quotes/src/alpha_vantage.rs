//! Alpha Vantage remote source.
//!
//! Downloads the full `TIME_SERIES_DAILY` history as CSV and optionally
//! refreshes a local cache directory with the raw feed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use folio_core::DailyBar;

use crate::csv_file::read_bars;
use crate::error::{QuoteError, QuoteResult};
use crate::source::QuoteSource;

const ENDPOINT: &str = "https://www.alphavantage.co/query";

/// Remote daily-history source backed by the Alpha Vantage HTTP API.
#[derive(Debug, Clone)]
pub struct AlphaVantageSource {
    api_key: String,
    cache_dir: Option<PathBuf>,
    client: reqwest::blocking::Client,
}

impl AlphaVantageSource {
    /// Creates a source with the given API key and no cache directory.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        AlphaVantageSource {
            api_key: api_key.into(),
            cache_dir: None,
            client: reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Writes each downloaded feed into `dir` so the local CSV source can
    /// serve it next time.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    fn refresh_cache(&self, ticker: &str, body: &str) {
        let Some(dir) = &self.cache_dir else {
            return;
        };
        let path = dir.join(format!("{}.csv", ticker.to_uppercase()));
        let result = std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&path, body));
        match result {
            // A failed refresh only costs a re-download next time
            Err(err) => warn!(ticker, %err, "failed to refresh cache file"),
            Ok(()) => debug!(ticker, path = %path.display(), "cache file refreshed"),
        }
    }
}

impl QuoteSource for AlphaVantageSource {
    fn history(&self, ticker: &str) -> QuoteResult<Vec<DailyBar>> {
        let ticker = ticker.to_uppercase();
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("outputsize", "full"),
                ("symbol", ticker.as_str()),
                ("apikey", self.api_key.as_str()),
                ("datatype", "csv"),
            ])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| QuoteError::Fetch(e.to_string()))?;

        let body = response
            .text()
            .map_err(|e| QuoteError::Fetch(e.to_string()))?;

        // An unknown symbol comes back as a JSON error blob, which fails
        // to parse as the CSV feed
        let bars =
            read_bars(body.as_bytes()).map_err(|_| QuoteError::ticker_not_found(&ticker))?;

        self.refresh_cache(&ticker, &body);
        Ok(bars)
    }
}
