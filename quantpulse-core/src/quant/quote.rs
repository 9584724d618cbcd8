//! Quote levels — volatility-scaled passive bid/ask around the last close.
//!
//! daily_vol = sample std of daily returns over the whole series
//! bid = price * (1 - daily_vol * risk_aversion * 2)
//! ask = price * (1 + daily_vol * risk_aversion * 2)

use serde::{Deserialize, Serialize};

use super::stats::sample_std;
use crate::domain::PriceSeries;

/// Minimum history (bars) for a quote.
pub const MIN_BARS: usize = 20;

pub const DEFAULT_RISK_AVERSION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteLevels {
    pub bid_limit: f64,
    pub ask_limit: f64,
    /// Fractional daily standard deviation of returns.
    pub realized_volatility: f64,
}

impl QuoteLevels {
    pub fn spread(&self) -> f64 {
        self.ask_limit - self.bid_limit
    }
}

/// Quote levels for the last close, or `None` with fewer than `MIN_BARS` bars.
pub fn quote_levels(series: &PriceSeries, risk_aversion: f64) -> Option<QuoteLevels> {
    if series.len() < MIN_BARS {
        tracing::debug!(
            symbol = series.symbol(),
            bars = series.len(),
            "quote: insufficient history"
        );
        return None;
    }
    let daily_vol = sample_std(&series.daily_returns())?;
    let price = series.last_close();
    let offset = daily_vol * risk_aversion * 2.0;
    Some(QuoteLevels {
        bid_limit: price * (1.0 - offset),
        ask_limit: price * (1.0 + offset),
        realized_volatility: daily_vol,
    })
}
