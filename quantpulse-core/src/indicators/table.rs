//! Indicator precompute: named series container and the per-bar row table.
//!
//! `compute_indicators` runs every indicator once over the full series,
//! stores the raw series in `IndicatorValues`, then assembles one
//! `IndicatorRow` per bar. Downstream consumers only see the table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Atr, Bollinger, Indicator, Macd, Rsi, Sma};
use crate::domain::{PriceBar, PriceSeries};

pub const MA_SHORT_PERIOD: usize = 5;
/// The 20-bar average is the baseline trend line.
pub const MA_MID_PERIOD: usize = 20;
pub const MA_LONG_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULTIPLIER: f64 = 2.0;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const ATR_PERIOD: usize = 14;

/// Below this many bars the early rows are mostly undefined.
pub const RECOMMENDED_MIN_BARS: usize = 30;

/// Band position reported when the band is undefined or has zero width.
pub const NEUTRAL_BAND_POSITION: f64 = 50.0;

/// Container for precomputed indicator series, keyed by indicator name.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named indicator series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Value at a bar index; `None` when missing, out of range, or undefined (NaN).
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
            .filter(|v| !v.is_nan())
    }

    /// Get the full series for a named indicator.
    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    /// Run each indicator over `bars` and store its series under its name.
    pub fn precompute(bars: &[PriceBar], indicators: &[Box<dyn Indicator>]) -> Self {
        let mut values = Self::new();
        for indicator in indicators {
            values.insert(indicator.name(), indicator.compute(bars));
        }
        values
    }

    /// Number of indicator series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Indicator state at one bar. `None` means undefined (inside a warm-up window,
/// or RSI with zero average loss).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: chrono::NaiveDate,
    pub close: f64,
    /// 5-bar simple moving average.
    pub ma_short: Option<f64>,
    /// 20-bar simple moving average (baseline trend line).
    pub ma_mid: Option<f64>,
    /// 50-bar simple moving average.
    pub ma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub atr: Option<f64>,
}

impl IndicatorRow {
    /// RSI with undefined read as neutral (50).
    pub fn rsi_or_neutral(&self) -> f64 {
        self.rsi.unwrap_or(super::rsi::NEUTRAL_RSI)
    }

    /// Close position inside the Bollinger band in percent (0 = lower, 100 = upper).
    ///
    /// Undefined or zero-width bands give 50. Not clamped: a close outside the
    /// band reads below 0 or above 100.
    pub fn bb_position(&self) -> f64 {
        match (self.bb_upper, self.bb_lower) {
            (Some(upper), Some(lower)) if upper - lower > 0.0 => {
                (self.close - lower) / (upper - lower) * 100.0
            }
            _ => NEUTRAL_BAND_POSITION,
        }
    }

    /// Bollinger band width (upper - lower), when defined.
    pub fn bb_width(&self) -> Option<f64> {
        Some(self.bb_upper? - self.bb_lower?)
    }
}

/// Immutable per-bar indicator table for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorTable {
    symbol: String,
    rows: Vec<IndicatorRow>,
}

impl IndicatorTable {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&IndicatorRow> {
        self.rows.get(index)
    }

    /// Row for the most recent bar.
    pub fn latest(&self) -> &IndicatorRow {
        // One row per bar and a series is never empty.
        &self.rows[self.rows.len() - 1]
    }

    /// Row for the bar before the most recent one, if any.
    pub fn previous(&self) -> Option<&IndicatorRow> {
        self.rows.len().checked_sub(2).map(|i| &self.rows[i])
    }

    /// The last `n` rows (or all of them).
    pub fn tail(&self, n: usize) -> &[IndicatorRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Standard indicator set, in the order the table reads them.
fn standard_indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(Sma::new(MA_SHORT_PERIOD)),
        Box::new(Sma::new(MA_MID_PERIOD)),
        Box::new(Sma::new(MA_LONG_PERIOD)),
        Box::new(Rsi::new(RSI_PERIOD)),
        Box::new(Bollinger::upper(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER)),
        Box::new(Bollinger::lower(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER)),
        Box::new(Macd::line(MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
        Box::new(Macd::signal(MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
        Box::new(Macd::histogram(MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
        Box::new(Atr::new(ATR_PERIOD)),
    ]
}

/// Compute the full indicator table for a series.
///
/// Total over every valid series: short histories produce rows whose
/// windowed fields are `None` rather than an error.
pub fn compute_indicators(series: &PriceSeries) -> IndicatorTable {
    if series.len() < RECOMMENDED_MIN_BARS {
        tracing::debug!(
            symbol = series.symbol(),
            bars = series.len(),
            "short history, early indicator rows will be undefined"
        );
    }

    let indicators = standard_indicators();
    let values = IndicatorValues::precompute(series.bars(), &indicators);
    let names: Vec<&str> = indicators.iter().map(|i| i.name()).collect();
    let [ma_short, ma_mid, ma_long, rsi, bb_upper, bb_lower, macd, macd_signal, macd_hist, atr] =
        names[..]
    else {
        unreachable!("standard indicator set has ten entries");
    };

    let rows = series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            date: bar.date,
            close: bar.close,
            ma_short: values.get(ma_short, i),
            ma_mid: values.get(ma_mid, i),
            ma_long: values.get(ma_long, i),
            rsi: values.get(rsi, i),
            bb_upper: values.get(bb_upper, i),
            bb_lower: values.get(bb_lower, i),
            macd: values.get(macd, i),
            macd_signal: values.get(macd_signal, i),
            macd_hist: values.get(macd_hist, i),
            atr: values.get(atr, i),
        })
        .collect();

    IndicatorTable {
        symbol: series.symbol().to_string(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, make_flat_bars};

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new("TEST", make_bars(closes)).unwrap()
    }

    #[test]
    fn indicator_values_insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert(
            "sma_20",
            vec![f64::NAN; 19]
                .into_iter()
                .chain(vec![100.0, 101.0])
                .collect(),
        );
        assert_eq!(iv.get("sma_20", 0), None); // NaN reads as undefined
        assert_eq!(iv.get("sma_20", 19), Some(100.0));
        assert_eq!(iv.get("sma_20", 20), Some(101.0));
        assert_eq!(iv.get("sma_20", 21), None); // out of bounds
        assert_eq!(iv.get("nonexistent", 0), None);
        assert_eq!(iv.get_series("sma_20").map(|s| s.len()), Some(21));
    }

    #[test]
    fn precompute_stores_every_indicator() {
        let values = IndicatorValues::precompute(&make_bars(&[1.0, 2.0]), &standard_indicators());
        assert_eq!(values.len(), 10);
        assert!(!values.is_empty());
    }

    #[test]
    fn one_row_per_bar() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        let table = compute_indicators(&series(&closes));
        assert_eq!(table.len(), 40);
        assert_eq!(table.symbol(), "TEST");
        assert_eq!(table.latest().close, closes[39]);
        assert_eq!(table.previous().unwrap().close, closes[38]);
    }

    #[test]
    fn warmup_rows_are_undefined() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.5).collect();
        let table = compute_indicators(&series(&closes));
        let first = table.row(0).unwrap();
        assert_eq!(first.ma_short, None);
        assert_eq!(first.ma_mid, None);
        assert_eq!(first.bb_upper, None);
        assert_eq!(first.atr, None);
        assert_eq!(first.rsi, None);
        // MACD is seeded on the first bar
        assert_eq!(first.macd, Some(0.0));

        assert!(table.row(4).unwrap().ma_short.is_some());
        assert!(table.row(18).unwrap().ma_mid.is_none());
        assert!(table.row(19).unwrap().ma_mid.is_some());
        assert!(table.row(13).unwrap().atr.is_some());
        // 50-bar average never defined on 30 bars
        assert!(table.latest().ma_long.is_none());
    }

    #[test]
    fn single_bar_series_has_no_previous() {
        let table = compute_indicators(&series(&[100.0]));
        assert_eq!(table.len(), 1);
        assert!(table.previous().is_none());
    }

    #[test]
    fn constant_series_collapses_bands() {
        let s = PriceSeries::new("FLAT", make_flat_bars(&[100.0; 25])).unwrap();
        let table = compute_indicators(&s);
        let row = table.latest();
        assert_eq!(row.ma_short, Some(100.0));
        assert_eq!(row.ma_mid, Some(100.0));
        assert_eq!(row.bb_upper, Some(100.0));
        assert_eq!(row.bb_lower, Some(100.0));
        assert_eq!(row.bb_width(), Some(0.0));
        assert_eq!(row.macd, Some(0.0));
        assert_eq!(row.atr, Some(0.0));
        assert_eq!(row.rsi, None);
        assert_eq!(row.rsi_or_neutral(), 50.0);
        assert_eq!(row.bb_position(), 50.0);
    }

    #[test]
    fn bb_position_inside_band() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + (i % 5) as f64).collect();
        let table = compute_indicators(&series(&closes));
        let row = table.latest();
        let (upper, lower) = (row.bb_upper.unwrap(), row.bb_lower.unwrap());
        assert_approx(
            row.bb_position(),
            (row.close - lower) / (upper - lower) * 100.0,
            1e-9,
        );
        assert!(row.bb_position() > 0.0 && row.bb_position() < 100.0);
    }
}
