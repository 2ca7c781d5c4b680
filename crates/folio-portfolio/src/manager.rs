//! Named portfolio collection with CSV persistence.
//!
//! [`PortfolioManager`] owns a set of uniquely named [`Portfolio`]s and
//! a directory of saved ledgers. Saving exports the transaction log as
//! CSV; loading replays each row through [`Portfolio::adjust`], so a
//! loaded portfolio passes through exactly the same validation as a
//! live one.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use folio_core::{Date, DateRange};
use folio_quotes::QuoteSource;

use crate::error::{PortfolioError, PortfolioResult};
use crate::portfolio::{CompositionEntry, DistributionEntry, Portfolio};

/// Column order of a persisted ledger file.
const CSV_HEADER: [&str; 5] = ["Ticker", "Transaction", "Shares", "TotalShares", "Date"];

/// Owns named portfolios and their on-disk CSV ledgers.
pub struct PortfolioManager {
    source: Arc<dyn QuoteSource>,
    dir: PathBuf,
    portfolios: Vec<Portfolio>,
}

impl std::fmt::Debug for PortfolioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioManager")
            .field("dir", &self.dir)
            .field("portfolios", &self.names())
            .finish_non_exhaustive()
    }
}

impl PortfolioManager {
    /// Creates a manager persisting to the `portfolios` directory.
    #[must_use]
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            dir: PathBuf::from("portfolios"),
            portfolios: Vec::new(),
        }
    }

    /// Overrides the persistence directory.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Names of the in-memory portfolios, in creation order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.portfolios.iter().map(|p| p.name().to_string()).collect()
    }

    /// Creates a new empty portfolio.
    ///
    /// # Errors
    ///
    /// `DuplicatePortfolio` if the name is already taken.
    pub fn add(&mut self, name: &str) -> PortfolioResult<()> {
        self.check_free(name)?;
        info!(portfolio = name, "creating portfolio");
        self.portfolios
            .push(Portfolio::new(name, self.source.clone()));
        Ok(())
    }

    /// Drops the named portfolio from memory. Saved files are untouched.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound` if no such portfolio exists.
    pub fn remove(&mut self, name: &str) -> PortfolioResult<()> {
        let idx = self.index_of(name)?;
        self.portfolios.remove(idx);
        Ok(())
    }

    /// Renames a portfolio, keeping names unique.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound` for an unknown name, `DuplicatePortfolio` if
    /// the new name is taken.
    pub fn rename(&mut self, name: &str, new_name: &str) -> PortfolioResult<()> {
        let idx = self.index_of(name)?;
        if name != new_name {
            self.check_free(new_name)?;
        }
        self.portfolios[idx].set_name(new_name);
        Ok(())
    }

    /// Borrows the named portfolio.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound` if no such portfolio exists.
    pub fn get(&self, name: &str) -> PortfolioResult<&Portfolio> {
        self.portfolios
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| PortfolioError::not_found(name))
    }

    /// Mutably borrows the named portfolio.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound` if no such portfolio exists.
    pub fn get_mut(&mut self, name: &str) -> PortfolioResult<&mut Portfolio> {
        self.portfolios
            .iter_mut()
            .find(|p| p.name() == name)
            .ok_or_else(|| PortfolioError::not_found(name))
    }

    /// Records a share adjustment in the named portfolio.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound`, or any [`Portfolio::adjust`] failure.
    pub fn adjust(
        &mut self,
        name: &str,
        ticker: &str,
        delta: Decimal,
        date: Date,
    ) -> PortfolioResult<()> {
        self.get_mut(name)?.adjust(ticker, delta, date)
    }

    /// Total value of the named portfolio on `date`.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound`, or any valuation failure.
    pub fn total_value(&self, name: &str, date: Date) -> PortfolioResult<Decimal> {
        self.get(name)?.total_value(date)
    }

    /// Share composition of the named portfolio on `date`.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound`, or any composition failure.
    pub fn composition(&self, name: &str, date: Date) -> PortfolioResult<Vec<CompositionEntry>> {
        self.get(name)?.composition(date)
    }

    /// Value distribution of the named portfolio on `date`.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound`, or any valuation failure.
    pub fn distribution(&self, name: &str, date: Date) -> PortfolioResult<Vec<DistributionEntry>> {
        self.get(name)?.distribution(date)
    }

    /// Value distribution report for the named portfolio on `date`.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound`, or any valuation failure.
    pub fn distribution_report(&self, name: &str, date: Date) -> PortfolioResult<String> {
        self.get(name)?.distribution_report(date)
    }

    /// Performance chart of the named portfolio over `range`.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound`, or any [`Portfolio::chart`] failure.
    pub fn chart(&self, name: &str, range: DateRange) -> PortfolioResult<String> {
        self.get(name)?.chart(range)
    }

    /// Tickers ever held by the named portfolio, in first-purchase order.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound` if no such portfolio exists.
    pub fn list_holdings(&self, name: &str) -> PortfolioResult<Vec<String>> {
        Ok(self
            .get(name)?
            .holdings()
            .iter()
            .map(|h| h.ticker().to_string())
            .collect())
    }

    /// Rebalances the named portfolio to the given weights on `date`.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound`, or any [`Portfolio::rebalance`] failure.
    pub fn rebalance(&mut self, name: &str, date: Date, weights: &[Decimal]) -> PortfolioResult<()> {
        self.get_mut(name)?.rebalance(date, weights)
    }

    /// Writes the named portfolio's transaction log as CSV.
    ///
    /// The file lands at `<dir>/<name>.csv` with the header
    /// `Ticker,Transaction,Shares,TotalShares,Date`, one row per
    /// transaction, grouped by holding in insertion order.
    ///
    /// # Errors
    ///
    /// `PortfolioNotFound`, or `Io` on any filesystem failure.
    pub fn save(&self, name: &str) -> PortfolioResult<()> {
        let portfolio = self.get(name)?;

        fs::create_dir_all(&self.dir).map_err(PortfolioError::io)?;
        let path = self.dir.join(format!("{name}.csv"));
        let mut writer = csv::Writer::from_path(&path).map_err(PortfolioError::io)?;

        writer.write_record(CSV_HEADER).map_err(PortfolioError::io)?;
        for row in portfolio.transaction_rows() {
            writer
                .write_record([
                    row.ticker.as_str(),
                    &row.kind.to_string(),
                    &row.shares.normalize().to_string(),
                    &row.running_total.normalize().to_string(),
                    &row.date.to_string(),
                ])
                .map_err(PortfolioError::io)?;
        }
        writer.flush().map_err(PortfolioError::io)?;

        info!(portfolio = name, path = %path.display(), "saved portfolio");
        Ok(())
    }

    /// Loads `<dir>/<name>.csv` into a new in-memory portfolio.
    ///
    /// Rows are replayed in file order through [`Portfolio::adjust`],
    /// using the ticker, shares, and date columns. The filename must
    /// match `name` exactly, including case.
    ///
    /// # Errors
    ///
    /// `DuplicatePortfolio` if the name is already loaded,
    /// `FileNotFound` / `FileCaseMismatch` for missing or
    /// differently-cased files, `MalformedFile` for unparseable rows,
    /// and any replay failure from [`Portfolio::adjust`].
    pub fn load(&mut self, name: &str) -> PortfolioResult<()> {
        self.check_free(name)?;

        let file_name = format!("{name}.csv");
        let path = self.dir.join(&file_name);
        if !path.exists() {
            return Err(PortfolioError::FileNotFound {
                name: name.to_string(),
            });
        }
        if !self.listed_exactly(&file_name)? {
            return Err(PortfolioError::FileCaseMismatch {
                name: name.to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(PortfolioError::io)?;

        let mut portfolio = Portfolio::new(name, self.source.clone());
        for record in reader.records() {
            let record = record.map_err(PortfolioError::io)?;
            if record.len() != 5 {
                return Err(PortfolioError::malformed(format!(
                    "expected 5 fields per row, found {}",
                    record.len()
                )));
            }
            let ticker = record[0].trim();
            let shares = Decimal::from_str(record[2].trim())
                .map_err(|e| PortfolioError::malformed(format!("bad share count: {e}")))?;
            let date = Date::parse(&record[4])
                .map_err(|e| PortfolioError::malformed(format!("bad date: {e}")))?;
            debug!(portfolio = name, ticker, %shares, %date, "replaying transaction");
            portfolio.adjust(ticker, shares, date)?;
        }

        self.portfolios.push(portfolio);
        info!(portfolio = name, "loaded portfolio");
        Ok(())
    }

    /// Names of the saved ledgers in the persistence directory.
    ///
    /// A missing directory reads as empty.
    #[must_use]
    pub fn saved_names(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|e| {
                let path = e.path();
                if path.extension().is_some_and(|ext| ext == "csv") {
                    path.file_stem().map(|s| s.to_string_lossy().into_owned())
                } else {
                    None
                }
            })
            .collect();
        names.sort();
        names
    }

    /// Confirms the directory listing contains `file_name` byte for
    /// byte. Case-insensitive filesystems resolve paths that differ in
    /// case, so a plain existence check is not enough.
    fn listed_exactly(&self, file_name: &str) -> PortfolioResult<bool> {
        let entries = fs::read_dir(&self.dir).map_err(PortfolioError::io)?;
        for entry in entries {
            let entry = entry.map_err(PortfolioError::io)?;
            if entry.file_name().to_string_lossy() == file_name {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn index_of(&self, name: &str) -> PortfolioResult<usize> {
        self.portfolios
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| PortfolioError::not_found(name))
    }

    fn check_free(&self, name: &str) -> PortfolioResult<()> {
        if self.portfolios.iter().any(|p| p.name() == name) {
            return Err(PortfolioError::DuplicatePortfolio {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::DailyBar;
    use folio_quotes::StaticSource;
    use rust_decimal_macros::dec;
    use std::io::Write as _;

    fn day(d: u32) -> Date {
        Date::from_ymd(2024, 6, d).unwrap()
    }

    fn source() -> Arc<dyn QuoteSource> {
        let aapl = (0..10)
            .map(|i| DailyBar::at_close(day(3 + i), dec!(100)))
            .collect();
        let goog = (0..10)
            .map(|i| DailyBar::at_close(day(3 + i), dec!(50)))
            .collect();
        Arc::new(StaticSource::new().with("AAPL", aapl).with("GOOG", goog))
    }

    fn manager(dir: &std::path::Path) -> PortfolioManager {
        PortfolioManager::new(source()).with_dir(dir)
    }

    #[test]
    fn test_add_remove_rename() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager(dir.path());

        m.add("Tech").unwrap();
        assert!(matches!(
            m.add("Tech").unwrap_err(),
            PortfolioError::DuplicatePortfolio { .. }
        ));

        m.add("Energy").unwrap();
        assert!(matches!(
            m.rename("Energy", "Tech").unwrap_err(),
            PortfolioError::DuplicatePortfolio { .. }
        ));
        m.rename("Energy", "Utilities").unwrap();
        assert_eq!(m.names(), vec!["Tech", "Utilities"]);

        m.remove("Utilities").unwrap();
        assert!(matches!(
            m.get("Utilities").unwrap_err(),
            PortfolioError::PortfolioNotFound { .. }
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager(dir.path());

        m.add("Tech").unwrap();
        m.adjust("Tech", "AAPL", dec!(10), day(3)).unwrap();
        m.adjust("Tech", "GOOG", dec!(8), day(4)).unwrap();
        m.adjust("Tech", "AAPL", dec!(-4), day(5)).unwrap();
        m.save("Tech").unwrap();
        assert_eq!(m.saved_names(), vec!["Tech"]);

        let mut fresh = manager(dir.path());
        fresh.load("Tech").unwrap();

        let original = m.get("Tech").unwrap();
        let loaded = fresh.get("Tech").unwrap();
        assert_eq!(
            loaded.total_value(day(6)).unwrap(),
            original.total_value(day(6)).unwrap()
        );
        assert_eq!(
            loaded.find("AAPL").unwrap().shares_on(day(6)),
            dec!(6)
        );
        assert_eq!(loaded.find("GOOG").unwrap().shares_on(day(6)), dec!(8));
    }

    #[test]
    fn test_save_writes_expected_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager(dir.path());
        m.add("Tech").unwrap();
        m.adjust("Tech", "AAPL", dec!(2), day(3)).unwrap();
        m.adjust("Tech", "AAPL", dec!(-1), day(4)).unwrap();
        m.save("Tech").unwrap();

        let text = fs::read_to_string(dir.path().join("Tech.csv")).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Ticker,Transaction,Shares,TotalShares,Date"
        );
        assert_eq!(lines.next().unwrap(), "AAPL,Buy,2,2,2024-06-03");
        assert_eq!(lines.next().unwrap(), "AAPL,Sell,-1,1,2024-06-04");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager(dir.path());
        assert!(matches!(
            m.load("Nope").unwrap_err(),
            PortfolioError::FileNotFound { .. }
        ));
    }

    #[test]
    fn test_load_duplicate_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = manager(dir.path());
        m.add("Tech").unwrap();
        m.adjust("Tech", "AAPL", dec!(1), day(3)).unwrap();
        m.save("Tech").unwrap();
        assert!(matches!(
            m.load("Tech").unwrap_err(),
            PortfolioError::DuplicatePortfolio { .. }
        ));
    }

    #[test]
    fn test_load_malformed_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("Bad.csv")).unwrap();
        writeln!(file, "Ticker,Transaction,Shares,TotalShares,Date").unwrap();
        writeln!(file, "AAPL,Buy,2,2024-06-03").unwrap();
        drop(file);

        let mut m = manager(dir.path());
        assert!(matches!(
            m.load("Bad").unwrap_err(),
            PortfolioError::MalformedFile { .. }
        ));
        assert!(m.names().is_empty());
    }

    #[test]
    fn test_load_unparseable_shares() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("Bad.csv")).unwrap();
        writeln!(file, "Ticker,Transaction,Shares,TotalShares,Date").unwrap();
        writeln!(file, "AAPL,Buy,many,2,2024-06-03").unwrap();
        drop(file);

        let mut m = manager(dir.path());
        assert!(matches!(
            m.load("Bad").unwrap_err(),
            PortfolioError::MalformedFile { .. }
        ));
    }

    #[test]
    fn test_saved_names_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        fs::write(dir.path().join("A.csv"), "").unwrap();
        fs::write(dir.path().join("B.csv"), "").unwrap();
        let m = manager(dir.path());
        assert_eq!(m.saved_names(), vec!["A", "B"]);
    }
}
