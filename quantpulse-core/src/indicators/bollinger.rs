//! Bollinger bands around the 20-bar baseline.
//!
//! band = rolling_mean(close) + direction * k * population_std(close)
//!
//! with direction +1 / 0 / -1 for upper / middle / lower. Each band is its
//! own `Indicator` instance; the middle band equals `Sma` of the same period
//! bit for bit, since both use `rolling_mean`.

use super::sma::rolling_mean;
use super::Indicator;
use crate::domain::PriceBar;
use crate::quant::stats::population_std;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

impl BollingerBand {
    fn direction(self) -> f64 {
        match self {
            Self::Upper => 1.0,
            Self::Middle => 0.0,
            Self::Lower => -1.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Middle => "middle",
            Self::Lower => "lower",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    width: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, width: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            width,
            band,
            name: format!("bb_{}_{period}_{width}", band.label()),
        }
    }

    pub fn upper(period: usize, width: f64) -> Self {
        Self::new(period, width, BollingerBand::Upper)
    }

    pub fn middle(period: usize, width: f64) -> Self {
        Self::new(period, width, BollingerBand::Middle)
    }

    pub fn lower(period: usize, width: f64) -> Self {
        Self::new(period, width, BollingerBand::Lower)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut bands = rolling_mean(&closes, self.period);
        let direction = self.band.direction();
        if direction == 0.0 {
            return bands;
        }

        for (i, value) in bands.iter_mut().enumerate().skip(self.period - 1) {
            let window = &closes[(i + 1 - self.period)..=i];
            if let Some(sd) = population_std(window) {
                *value += direction * self.width * sd;
            }
        }
        bands
    }
}
