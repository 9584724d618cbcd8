//! Price history loading for the runner.
//!
//! `CsvDirectoryProvider` reads one `<SYMBOL>.csv` per symbol from a
//! directory, with header `date,open,high,low,close,volume`. `load_pool`
//! fetches every configured symbol through any `PriceHistoryProvider` and
//! returns the pool together with a dataset hash for the report.
//!
//! Rows must already be in ascending date order: an out-of-order file is an
//! upstream data bug and fails the load instead of being re-sorted.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use quantpulse_core::collaborators::{PriceHistoryProvider, ProviderError};
use quantpulse_core::domain::{PriceBar, PricePool, PriceSeries};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("load '{symbol}' from {provider}: {source}")]
    Provider {
        symbol: String,
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("no symbols requested")]
    NoSymbols,

    #[error("write '{path}': {reason}")]
    Write { path: String, reason: String },
}

/// One CSV row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CsvBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl From<CsvBar> for PriceBar {
    fn from(row: CsvBar) -> Self {
        PriceBar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

impl From<&PriceBar> for CsvBar {
    fn from(bar: &PriceBar) -> Self {
        CsvBar {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

/// Reads `<dir>/<SYMBOL>.csv` files.
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    dir: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    /// Symbols with a CSV file in the directory, sorted.
    pub fn available_symbols(&self) -> Result<Vec<String>, ProviderError> {
        let mut symbols: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        symbols.sort();
        Ok(symbols)
    }
}

impl PriceHistoryProvider for CsvDirectoryProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str, lookback_days: usize) -> Result<PriceSeries, ProviderError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(ProviderError::NotFound(symbol.to_string()));
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| ProviderError::Malformed {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        })?;
        let mut bars = Vec::new();
        for (line, row) in reader.deserialize::<CsvBar>().enumerate() {
            let row = row.map_err(|e| ProviderError::Malformed {
                symbol: symbol.to_string(),
                reason: format!("row {}: {e}", line + 1),
            })?;
            bars.push(PriceBar::from(row));
        }

        // Validate the whole file before trimming to the lookback window.
        let series = PriceSeries::new(symbol, bars)?;
        tracing::debug!(symbol, bars = series.len(), path = %path.display(), "loaded csv");
        if series.len() <= lookback_days {
            return Ok(series);
        }
        Ok(PriceSeries::new(symbol, series.tail(lookback_days).to_vec())?)
    }
}

/// Write a series as `<dir>/<SYMBOL>.csv` in the format the provider reads.
pub fn write_series_csv(dir: &Path, series: &PriceSeries) -> Result<PathBuf, LoadError> {
    let path = dir.join(format!("{}.csv", series.symbol()));
    let write_err = |reason: String| LoadError::Write {
        path: path.display().to_string(),
        reason,
    };

    let mut writer = csv::Writer::from_path(&path).map_err(|e| write_err(e.to_string()))?;
    for bar in series.bars() {
        writer
            .serialize(CsvBar::from(bar))
            .map_err(|e| write_err(e.to_string()))?;
    }
    writer.flush().map_err(|e| write_err(e.to_string()))?;
    Ok(path)
}

/// A loaded pool plus its content hash.
#[derive(Debug, Clone)]
pub struct LoadedPool {
    pub pool: PricePool,
    /// BLAKE3 over all bars in sorted symbol order.
    pub dataset_hash: String,
}

/// Fetch every symbol into one pool. Any failure aborts the load.
pub fn load_pool(
    provider: &dyn PriceHistoryProvider,
    symbols: &[String],
    lookback_days: usize,
) -> Result<LoadedPool, LoadError> {
    if symbols.is_empty() {
        return Err(LoadError::NoSymbols);
    }

    let mut pool = PricePool::new();
    for symbol in symbols {
        let series =
            provider
                .fetch(symbol, lookback_days)
                .map_err(|source| LoadError::Provider {
                    symbol: symbol.clone(),
                    provider: provider.name().to_string(),
                    source,
                })?;
        pool.insert(series);
    }

    let dataset_hash = compute_dataset_hash(&pool);
    tracing::info!(symbols = pool.len(), provider = provider.name(), "price pool loaded");
    Ok(LoadedPool { pool, dataset_hash })
}

/// Deterministic BLAKE3 hash over all bar data.
///
/// Covers dates and OHLCV values in sorted symbol order (the pool iterates
/// sorted), so it is identical regardless of load order.
pub fn compute_dataset_hash(pool: &PricePool) -> String {
    let mut hasher = blake3::Hasher::new();
    for (symbol, series) in pool.iter() {
        hasher.update(symbol.as_bytes());
        for bar in series.bars() {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantpulse_core::domain::SeriesError;

    const HEADER: &str = "date,open,high,low,close,volume\n";

    fn write(dir: &Path, symbol: &str, body: &str) {
        std::fs::write(dir.join(format!("{symbol}.csv")), format!("{HEADER}{body}")).unwrap();
    }

    fn rows(n: usize) -> String {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let d = base + chrono::Duration::days(i as i64);
                let c = 100.0 + i as f64;
                format!("{d},{c},{},{},{c},1000\n", c + 1.0, c - 1.0)
            })
            .collect()
    }

    #[test]
    fn fetch_reads_and_truncates_to_lookback() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SPY", &rows(10));
        let provider = CsvDirectoryProvider::new(dir.path());

        let full = provider.fetch("SPY", 100).unwrap();
        assert_eq!(full.len(), 10);
        assert_eq!(full.last_close(), 109.0);

        let tail = provider.fetch("SPY", 4).unwrap();
        assert_eq!(tail.len(), 4);
        assert_eq!(tail.bars()[0].close, 106.0);
    }

    #[test]
    fn bad_rows_outside_lookback_still_fail() {
        let dir = tempfile::tempdir().unwrap();
        let body = "2024-01-05,100,101,99,100,1000\n\
                    2024-01-01,100,101,99,NaN,1000\n\
                    2024-01-08,101,102,100,101,1000\n\
                    2024-01-09,102,103,101,102,1000\n";
        write(dir.path(), "ORD", body);
        let provider = CsvDirectoryProvider::new(dir.path());
        let err = provider.fetch("ORD", 2).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Series(SeriesError::NonFinitePrice { .. })
        ));

        // Same story for a date that goes backwards with finite prices.
        let body = "2024-01-05,100,101,99,100,1000\n\
                    2024-01-01,100,101,99,100,1000\n\
                    2024-01-08,101,102,100,101,1000\n\
                    2024-01-09,102,103,101,102,1000\n";
        write(dir.path(), "ORD", body);
        let err = provider.fetch("ORD", 2).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Series(SeriesError::NonChronological { .. })
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvDirectoryProvider::new(dir.path());
        let err = provider.fetch("NOPE", 10).unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(s) if s == "NOPE"));
    }

    #[test]
    fn malformed_row_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "BAD", "2024-01-01,1,2,0.5,1.5,100\nnot-a-date,1,2,0.5,1.5,100\n");
        let provider = CsvDirectoryProvider::new(dir.path());
        let err = provider.fetch("BAD", 10).unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");
    }

    #[test]
    fn out_of_order_rows_fail_fast() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "ORD", "2024-01-02,1,2,0.5,1.5,100\n2024-01-01,1,2,0.5,1.5,100\n");
        let provider = CsvDirectoryProvider::new(dir.path());
        let err = provider.fetch("ORD", 10).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Series(SeriesError::NonChronological { .. })
        ));
    }

    #[test]
    fn header_only_file_is_empty_series_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "EMPTY", "");
        let provider = CsvDirectoryProvider::new(dir.path());
        let err = provider.fetch("EMPTY", 10).unwrap_err();
        assert!(matches!(err, ProviderError::Series(SeriesError::Empty { .. })));
    }

    #[test]
    fn write_then_fetch_preserves_bars() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SRC", &rows(5));
        let provider = CsvDirectoryProvider::new(dir.path());
        let series = provider.fetch("SRC", 100).unwrap();

        let out = tempfile::tempdir().unwrap();
        let path = write_series_csv(out.path(), &series).unwrap();
        assert!(path.ends_with("SRC.csv"));
        let reloaded = CsvDirectoryProvider::new(out.path()).fetch("SRC", 100).unwrap();
        assert_eq!(reloaded, series);
    }

    #[test]
    fn available_symbols_lists_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "MSFT", &rows(2));
        write(dir.path(), "AAPL", &rows(2));
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let provider = CsvDirectoryProvider::new(dir.path());
        assert_eq!(provider.available_symbols().unwrap(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn load_pool_fails_on_any_missing_symbol() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "AAPL", &rows(3));
        let provider = CsvDirectoryProvider::new(dir.path());

        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
        let err = load_pool(&provider, &symbols, 10).unwrap_err();
        assert!(err.to_string().contains("MSFT"));

        assert!(matches!(load_pool(&provider, &[], 10), Err(LoadError::NoSymbols)));
    }

    #[test]
    fn dataset_hash_is_order_independent() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "AAPL", &rows(3));
        write(dir.path(), "MSFT", &rows(4));
        let provider = CsvDirectoryProvider::new(dir.path());

        let a = load_pool(&provider, &["AAPL".into(), "MSFT".into()], 10).unwrap();
        let b = load_pool(&provider, &["MSFT".into(), "AAPL".into()], 10).unwrap();
        assert_eq!(a.dataset_hash, b.dataset_hash);
        assert_eq!(a.pool.len(), 2);

        let c = load_pool(&provider, &["AAPL".into()], 10).unwrap();
        assert_ne!(a.dataset_hash, c.dataset_hash);
    }
}
