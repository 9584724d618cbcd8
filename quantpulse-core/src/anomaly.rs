//! Anomaly scorer — robust (MAD-based) deviation of the latest price move.
//!
//! score = |current_pct - median(returns)| / (1.4826 * MAD(returns))
//!
//! Works on fractional returns, so the score does not depend on the price
//! level. Severity tiers are a separate threshold map over the score.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;
use crate::quant::stats::{median, median_absolute_deviation};

/// Minimum history (bars) before a score is computed.
pub const MIN_BARS: usize = 20;

/// MAD substituted when the observed MAD is zero.
pub const MAD_FLOOR: f64 = 1e-6;

/// Scales MAD to a standard-deviation estimate under normality.
pub const MAD_SCALE: f64 = 1.4826;

pub const CRITICAL_THRESHOLD: f64 = 4.5;
pub const WARNING_THRESHOLD: f64 = 3.0;
pub const NOTICE_THRESHOLD: f64 = 2.0;

/// Anomaly score for one (symbol, evaluation time) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Unitless robust deviation, >= 0.
    pub score: f64,
    /// Signed move of the current price against the previous close, in percent.
    pub percent_change: f64,
}

impl AnomalyResult {
    /// The neutral result returned for insufficient history.
    pub const NEUTRAL: AnomalyResult = AnomalyResult {
        score: 0.0,
        percent_change: 0.0,
    };

    pub fn severity(&self) -> AnomalySeverity {
        AnomalySeverity::from_score(self.score)
    }
}

/// Alert tier derived from an anomaly score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    #[default]
    Normal,
    Notice,
    Warning,
    Critical,
}

impl AnomalySeverity {
    /// Inclusive lower bounds, checked from the top down.
    pub fn from_score(score: f64) -> Self {
        if score >= CRITICAL_THRESHOLD {
            Self::Critical
        } else if score >= WARNING_THRESHOLD {
            Self::Warning
        } else if score >= NOTICE_THRESHOLD {
            Self::Notice
        } else {
            Self::Normal
        }
    }

    /// Ordinal level: 0 = Normal .. 3 = Critical.
    pub fn level(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Notice => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::Normal),
            1 => Some(Self::Notice),
            2 => Some(Self::Warning),
            3 => Some(Self::Critical),
            _ => None,
        }
    }

    /// True when this severity is above Normal and strictly above the
    /// previously stored one (no stored value reads as Normal).
    pub fn is_escalation(self, previous: Option<AnomalySeverity>) -> bool {
        self != Self::Normal && self > previous.unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score `current_price` against a series of completed bars.
///
/// The previous close is the series' last close. Fewer than `MIN_BARS`
/// bars, or a non-finite current price, give `AnomalyResult::NEUTRAL`.
pub fn score_anomaly(series: &PriceSeries, current_price: f64) -> AnomalyResult {
    if series.len() < MIN_BARS {
        tracing::debug!(
            symbol = series.symbol(),
            bars = series.len(),
            "anomaly: insufficient history, neutral score"
        );
        return AnomalyResult::NEUTRAL;
    }
    if !current_price.is_finite() {
        tracing::debug!(symbol = series.symbol(), "anomaly: non-finite current price");
        return AnomalyResult::NEUTRAL;
    }

    let returns = series.daily_returns();
    let Some(median_return) = median(&returns) else {
        return AnomalyResult::NEUTRAL;
    };
    let raw_mad = median_absolute_deviation(&returns, median_return).unwrap_or(0.0);

    let mad = if raw_mad == 0.0 {
        tracing::debug!(symbol = series.symbol(), "anomaly: zero MAD, using floor");
        MAD_FLOOR
    } else {
        raw_mad
    };
    let robust_sigma = MAD_SCALE * mad;

    let previous_close = series.last_close();
    let current_pct = (current_price - previous_close) / previous_close;

    AnomalyResult {
        score: (current_pct - median_return).abs() / robust_sigma,
        percent_change: current_pct * 100.0,
    }
}

/// Score when the series' last bar is the in-progress session.
///
/// The last bar is excluded from the return history, and the previous close
/// is the second-to-last close.
pub fn score_anomaly_intraday(series: &PriceSeries, current_price: f64) -> AnomalyResult {
    match series.truncated(series.len() - 1) {
        Some(history) => score_anomaly(&history, current_price),
        None => AnomalyResult::NEUTRAL,
    }
}
