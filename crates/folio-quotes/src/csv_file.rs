//! Local CSV cache source.
//!
//! One file per ticker, named `<TICKER>.csv`, with the upstream feed's
//! column layout (`timestamp,open,high,low,close,volume`) and rows
//! most-recent-first. Users may drop their own files into the cache
//! directory; the remote source refreshes them.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use folio_core::DailyBar;

use crate::error::{QuoteError, QuoteResult};
use crate::source::QuoteSource;

/// Reads daily-history CSV sources from a local directory.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    dir: PathBuf,
}

impl CsvFileSource {
    /// Creates a source rooted at `dir`. The directory does not have to
    /// exist yet; it is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        CsvFileSource {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The cache directory this source reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache file for `ticker`.
    fn file_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.to_uppercase()))
    }

    /// Writes `bars` as the cache file for `ticker`, replacing any
    /// existing file.
    ///
    /// # Errors
    ///
    /// Returns `QuoteError::Io` if the directory or file cannot be written.
    pub fn write_history(&self, ticker: &str, bars: &[DailyBar]) -> QuoteResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(QuoteError::io)?;
        let path = self.file_for(ticker);
        let mut writer = csv::Writer::from_path(&path).map_err(QuoteError::io)?;
        for bar in bars {
            writer.serialize(bar).map_err(QuoteError::io)?;
        }
        writer.flush().map_err(QuoteError::io)?;
        debug!(ticker, path = %path.display(), rows = bars.len(), "cache file written");
        Ok(())
    }
}

impl QuoteSource for CsvFileSource {
    fn history(&self, ticker: &str) -> QuoteResult<Vec<DailyBar>> {
        let path = self.file_for(ticker);
        if !path.exists() {
            return Err(QuoteError::ticker_not_found(ticker));
        }
        let file = std::fs::File::open(&path).map_err(QuoteError::io)?;
        read_bars(file)
    }
}

/// Parses a daily-history CSV stream into bars, preserving row order.
pub(crate) fn read_bars<R: Read>(reader: R) -> QuoteResult<Vec<DailyBar>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();
    for record in csv_reader.deserialize() {
        let bar: DailyBar = record.map_err(QuoteError::parse)?;
        bars.push(bar);
    }
    Ok(bars)
}
