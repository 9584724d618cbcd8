//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = EMA[t-1] + alpha * (close[t] - EMA[t-1])
//! alpha = 2 / (span + 1).
//! Seed: EMA[0] = close[0], so the series is defined from the first bar.
//! Lookback: 0.

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, self.span)
    }
}

/// EMA of a pre-extracted f64 slice, seeded with its first value.
///
/// Used by MACD for both the fast/slow lines and the signal line.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut result = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return result;
    };

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = first;
    result.push(first);
    for &v in &values[1..] {
        let ema = prev + alpha * (v - prev);
        result.push(ema);
        prev = ema;
    }
    result
}
