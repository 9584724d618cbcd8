//! Collaborator seams — price history, severity state and narrative text.
//!
//! The core never performs I/O itself; an orchestrator fetches data through
//! these traits before calling the pure functions, and hands the results to
//! them afterwards.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anomaly::{AnomalyResult, AnomalySeverity};
use crate::domain::{PriceSeries, SeriesError};
use crate::indicators::IndicatorRow;
use crate::quant::CrossSection;
use crate::signals::Classification;

/// Failure reported by an external collaborator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no data for symbol '{0}'")]
    NotFound(String),

    #[error("malformed data for '{symbol}': {reason}")]
    Malformed { symbol: String, reason: String },

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Source of daily price history.
pub trait PriceHistoryProvider: Send + Sync {
    /// Human-readable provider name (for logs).
    fn name(&self) -> &str;

    /// The most recent `lookback_days` bars for `symbol` (all bars if fewer).
    fn fetch(&self, symbol: &str, lookback_days: usize) -> Result<PriceSeries, ProviderError>;
}

/// Last recorded alert state for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityRecord {
    pub date: NaiveDate,
    pub severity: AnomalySeverity,
    pub price: f64,
    pub score: f64,
}

/// Persistence of the last-known severity per symbol.
pub trait SeverityStore: Send + Sync {
    fn last_severity(&self, symbol: &str) -> Option<AnomalySeverity>;

    /// Upsert the state for `symbol`.
    fn record(&self, symbol: &str, date: NaiveDate, severity: AnomalySeverity, price: f64, score: f64);
}

/// Process-local `SeverityStore`.
#[derive(Debug, Default)]
pub struct InMemorySeverityStore {
    states: RwLock<HashMap<String, SeverityRecord>>,
}

impl InMemorySeverityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: &str) -> Option<SeverityRecord> {
        let states = self.states.read().unwrap_or_else(|e| e.into_inner());
        states.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.states.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SeverityStore for InMemorySeverityStore {
    fn last_severity(&self, symbol: &str) -> Option<AnomalySeverity> {
        self.get(symbol).map(|r| r.severity)
    }

    fn record(&self, symbol: &str, date: NaiveDate, severity: AnomalySeverity, price: f64, score: f64) {
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        states.insert(
            symbol.to_string(),
            SeverityRecord {
                date,
                severity,
                price,
                score,
            },
        );
    }
}

/// Structured inputs handed to a narrative provider.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeRequest<'a> {
    pub symbol: &'a str,
    pub percent_change: f64,
    pub latest: &'a IndicatorRow,
    pub classification: &'a Classification,
    pub anomaly: &'a AnomalyResult,
    pub cross_section: &'a CrossSection,
}

/// Free-text commentary: a one-line summary and one view per signal side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    pub summary: String,
    pub left_side_analysis: String,
    pub right_side_analysis: String,
}

/// Producer of narrative text (typically a language model).
pub trait NarrativeProvider: Send + Sync {
    fn summarize(&self, request: &NarrativeRequest<'_>) -> Result<Narrative, ProviderError>;
}

/// Fallback provider used when no model is configured: echoes the
/// deterministic signals instead of generating prose.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticNarrative;

impl NarrativeProvider for StaticNarrative {
    fn summarize(&self, request: &NarrativeRequest<'_>) -> Result<Narrative, ProviderError> {
        let c = request.classification;
        Ok(Narrative {
            summary: format!(
                "{} moved {:+.2}% (anomaly score {:.2}, {})",
                request.symbol,
                request.percent_change,
                request.anomaly.score,
                request.anomaly.severity()
            ),
            left_side_analysis: format!("{}: {}", c.left.action, c.left.rationale),
            right_side_analysis: format!("{}: {}", c.right.action, c.right.rationale),
        })
    }
}
