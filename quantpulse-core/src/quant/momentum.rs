//! Risk-adjusted momentum (time-series momentum over 20 bars).
//!
//! raw = (close[n-1] - close[n-20]) / close[n-20]
//! vol = sample std of the last 20 daily returns (0.01 when zero or undefined)
//! score = raw / vol

use super::stats::sample_std;
use crate::domain::PriceSeries;

pub const MOMENTUM_WINDOW: usize = 20;

/// Volatility substituted when the trailing std is zero or undefined.
pub const VOL_FLOOR: f64 = 0.01;

/// Signed momentum score; 0 with fewer than `MOMENTUM_WINDOW` bars.
pub fn momentum_score(series: &PriceSeries) -> f64 {
    let n = series.len();
    if n < MOMENTUM_WINDOW {
        tracing::debug!(symbol = series.symbol(), bars = n, "momentum: insufficient history");
        return 0.0;
    }
    let bars = series.bars();
    let past = bars[n - MOMENTUM_WINDOW].close;
    let raw_return = (bars[n - 1].close - past) / past;

    let returns = series.daily_returns();
    let vol = if returns.len() >= MOMENTUM_WINDOW {
        sample_std(&returns[returns.len() - MOMENTUM_WINDOW..])
    } else {
        None
    };
    let vol = match vol {
        Some(v) if v > 0.0 => v,
        _ => VOL_FLOOR,
    };
    raw_return / vol
}
