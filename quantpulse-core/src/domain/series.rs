//! PriceSeries — validated, chronologically ordered bars for one symbol.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::PriceBar;

/// Caller contract violations detected while building a series.
///
/// These indicate an upstream data bug, not a market condition, so they
/// fail fast instead of degrading to a neutral result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series for '{symbol}' is empty")]
    Empty { symbol: String },

    #[error(
        "price series for '{symbol}' is not strictly chronological at index {index}: {date} follows {previous}"
    )]
    NonChronological {
        symbol: String,
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("price series for '{symbol}' has a non-finite price on {date}")]
    NonFinitePrice { symbol: String, date: NaiveDate },

    #[error("price series for '{symbol}' has a non-positive close on {date}")]
    NonPositiveClose { symbol: String, date: NaiveDate },
}

/// Ordered daily bars for a single instrument.
///
/// Invariants (checked by [`PriceSeries::new`]):
/// - at least one bar
/// - dates strictly increasing (gaps allowed, never filled)
/// - all prices finite, closes strictly positive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }

        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_finite() {
                return Err(SeriesError::NonFinitePrice {
                    symbol,
                    date: bar.date,
                });
            }
            if bar.close <= 0.0 {
                return Err(SeriesError::NonPositiveClose {
                    symbol,
                    date: bar.date,
                });
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(SeriesError::NonChronological {
                    symbol,
                    index: i,
                    previous: bars[i - 1].date,
                    date: bar.date,
                });
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for slice-like ergonomics.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The most recent bar.
    pub fn last(&self) -> &PriceBar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn last_close(&self) -> f64 {
        self.last().close
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last().date
    }

    /// Close prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The last `n` bars (or all of them if the series is shorter).
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Fractional close-to-close returns; length is `len() - 1`.
    pub fn daily_returns(&self) -> Vec<f64> {
        self.bars
            .windows(2)
            .map(|w| (w[1].close - w[0].close) / w[0].close)
            .collect()
    }

    /// A copy holding only the first `len` bars, or `None` when `len` is 0
    /// or exceeds the series length.
    pub fn truncated(&self, len: usize) -> Option<PriceSeries> {
        if len == 0 || len > self.bars.len() {
            return None;
        }
        Some(PriceSeries {
            symbol: self.symbol.clone(),
            bars: self.bars[..len].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = PriceSeries::new("AAPL", vec![]).unwrap_err();
        assert_eq!(
            err,
            SeriesError::Empty {
                symbol: "AAPL".into()
            }
        );
    }

    #[test]
    fn duplicate_date_is_rejected() {
        let err = PriceSeries::new("AAPL", vec![bar(2, 100.0), bar(2, 101.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonChronological { index: 1, .. }));
    }

    #[test]
    fn out_of_order_is_rejected() {
        let err = PriceSeries::new("AAPL", vec![bar(3, 100.0), bar(2, 101.0)]).unwrap_err();
        assert!(err.to_string().contains("not strictly chronological"));
    }

    #[test]
    fn nan_close_is_rejected() {
        let mut b = bar(2, 100.0);
        b.close = f64::NAN;
        let err = PriceSeries::new("AAPL", vec![b]).unwrap_err();
        assert!(matches!(err, SeriesError::NonFinitePrice { .. }));
    }

    #[test]
    fn zero_close_is_rejected() {
        let err = PriceSeries::new("AAPL", vec![bar(2, 0.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonPositiveClose { .. }));
    }

    #[test]
    fn gaps_are_allowed() {
        let series = PriceSeries::new("AAPL", vec![bar(2, 100.0), bar(9, 101.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
    }

    #[test]
    fn daily_returns_are_fractional() {
        let series =
            PriceSeries::new("AAPL", vec![bar(2, 100.0), bar(3, 110.0), bar(4, 99.0)]).unwrap();
        let r = series.daily_returns();
        assert_eq!(r.len(), 2);
        assert!((r[0] - 0.10).abs() < 1e-12);
        assert!((r[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn tail_and_truncated() {
        let series =
            PriceSeries::new("AAPL", vec![bar(2, 100.0), bar(3, 110.0), bar(4, 99.0)]).unwrap();
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.tail(10).len(), 3);
        let head = series.truncated(2).unwrap();
        assert_eq!(head.last_close(), 110.0);
        assert!(series.truncated(0).is_none());
        assert!(series.truncated(4).is_none());
    }
}
