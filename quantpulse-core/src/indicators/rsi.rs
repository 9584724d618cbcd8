//! Relative Strength Index (RSI).
//!
//! Simple rolling means (not Wilder smoothing) of gains and losses over the
//! last `period` close-to-close deltas.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (needs period+1 closes for period deltas).
//! Edge case: avg_loss == 0 → undefined (NaN); consumers read it as 50.

use super::Indicator;
use crate::domain::PriceBar;

/// Value consumers substitute for an undefined RSI.
pub const NEUTRAL_RSI: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        if n < self.period + 1 {
            return result;
        }

        // changes[i] = close[i] - close[i-1], defined for i >= 1
        let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

        for i in self.period..n {
            // Deltas ending at bar i: changes[i - period .. i]
            let window = &changes[(i - self.period)..i];
            let mut gain = 0.0;
            let mut loss = 0.0;
            for &ch in window {
                if ch > 0.0 {
                    gain += ch;
                } else {
                    loss -= ch;
                }
            }
            let avg_gain = gain / self.period as f64;
            let avg_loss = loss / self.period as f64;

            if avg_loss > 0.0 {
                result[i] = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn alternating_tape() {
        // deltas: +1, -0.5, +1, -0.5, +1
        let bars = make_bars(&[20.0, 21.0, 20.5, 21.5, 21.0, 22.0]);
        let rsi = Rsi::new(3).compute(&bars);
        assert!(rsi[..3].iter().all(|v| v.is_nan()));
        assert_approx(rsi[3], 80.0, DEFAULT_EPSILON); // RS = 2 / 0.5
        assert_approx(rsi[4], 50.0, DEFAULT_EPSILON); // RS = 1 / 1
        assert_approx(rsi[5], 80.0, DEFAULT_EPSILON);
    }

    #[test]
    fn only_losses_pin_to_zero() {
        let rsi = Rsi::new(3).compute(&make_bars(&[30.0, 29.0, 28.0, 27.0, 26.0]));
        assert_eq!(rsi[3], 0.0);
        assert_eq!(rsi[4], 0.0);
    }

    #[test]
    fn no_losses_is_undefined() {
        // avg_loss == 0 for both a rising and a flat tape
        let rising = Rsi::new(3).compute(&make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let flat = Rsi::new(3).compute(&make_bars(&[7.0; 6]));
        assert!(rising.iter().chain(&flat).all(|v| v.is_nan()));
    }

    #[test]
    fn stays_within_zero_and_hundred() {
        let bars = make_bars(&[50.0, 58.0, 41.0, 63.0, 37.0, 70.0, 33.0, 72.0, 30.0]);
        for v in Rsi::new(4).compute(&bars).into_iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn warm_up_needs_period_plus_one_closes() {
        assert_eq!(Rsi::new(14).lookback(), 14);
        assert!(Rsi::new(14).compute(&make_bars(&[1.0; 14])).iter().all(|v| v.is_nan()));
    }
}
