//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rolling_mean(&closes, self.period)
    }
}

/// Rolling mean of an arbitrary series; `NaN` until `period` values exist.
///
/// Windows are summed directly (no running sum): constant input stays exact.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        result[i] = window.iter().sum::<f64>() / period as f64;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn five_bar_baseline() {
        let result = Sma::new(5).compute(&make_bars(&[2.0, 4.0, 6.0, 8.0, 10.0, 30.0]));
        assert!(result[3].is_nan());
        assert_approx(result[4], 6.0, DEFAULT_EPSILON);
        assert_approx(result[5], 11.6, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_works_on_any_series() {
        let out = rolling_mean(&[1.0, -1.0, 3.0, 5.0], 2);
        assert!(out[0].is_nan());
        assert_eq!(&out[1..], &[0.0, 1.0, 4.0]);
        assert!(rolling_mean(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn fewer_bars_than_period() {
        let result = Sma::new(50).compute(&make_bars(&[10.0; 49]));
        assert_eq!(result.len(), 49);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn flat_window_is_exact() {
        assert_eq!(rolling_mean(&[187.25; 30], 20)[29], 187.25);
        assert_eq!(Sma::new(20).name(), "sma_20");
        assert_eq!(Sma::new(20).lookback(), 19);
    }
}
