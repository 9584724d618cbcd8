//! Pool evaluation — one report per symbol, computed from scratch each cycle.
//!
//! Per symbol: indicator table, signal classification, anomaly score and
//! severity, and the cross-sectional outputs. The pure part runs in parallel
//! (rayon) when enabled; severity escalation against the store then runs
//! sequentially in sorted symbol order so store writes are deterministic.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use quantpulse_core::anomaly::{score_anomaly, score_anomaly_intraday, AnomalyResult, AnomalySeverity};
use quantpulse_core::collaborators::{
    Narrative, NarrativeProvider, NarrativeRequest, SeverityStore, StaticNarrative,
};
use quantpulse_core::domain::{PricePool, PriceSeries};
use quantpulse_core::indicators::{compute_indicators, IndicatorRow};
use quantpulse_core::quant::{cross_section, CrossSection};
use quantpulse_core::signals::{classify_table, Classification};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::data_loader::compute_dataset_hash;

/// Current schema version for serialized reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from pool evaluation.
#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("price pool is empty")]
    EmptyPool,

    #[error("symbol '{0}' not found in pool")]
    SymbolNotFound(String),

    #[error("current price for '{symbol}' must be finite and positive, got {price}")]
    InvalidPrice { symbol: String, price: f64 },
}

/// Everything computed for one symbol in one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    /// Date of the last bar in the series.
    pub as_of: NaiveDate,
    /// Price the anomaly was scored against.
    pub current_price: f64,
    pub bars: usize,
    pub latest: IndicatorRow,
    /// Close position inside the Bollinger band, percent.
    pub bb_position: f64,
    pub classification: Classification,
    pub anomaly: AnomalyResult,
    pub severity: AnomalySeverity,
    /// Severity stored before this cycle.
    pub previous_severity: Option<AnomalySeverity>,
    /// Severity rose above the stored level.
    pub escalated: bool,
    pub cross_section: CrossSection,
    pub narrative: Option<Narrative>,
}

/// Result of one evaluation cycle over a pool.
#[derive(Debug, Clone, Serialize)]
pub struct PoolReport {
    pub schema_version: u32,
    pub config_hash: String,
    pub dataset_hash: String,
    pub evaluated_at: DateTime<Utc>,
    /// Sorted by symbol.
    pub reports: Vec<SymbolReport>,
}

impl PoolReport {
    pub fn get(&self, symbol: &str) -> Option<&SymbolReport> {
        self.reports.iter().find(|r| r.symbol == symbol)
    }

    /// Reports whose severity escalated this cycle.
    pub fn escalations(&self) -> impl Iterator<Item = &SymbolReport> {
        self.reports.iter().filter(|r| r.escalated)
    }
}

/// Compute the store-independent part of a symbol report.
///
/// `current_price`: the live quote, if any. Without one, the last close is
/// scored as the current observation against the bars before it.
pub fn evaluate_symbol(
    pool: &PricePool,
    symbol: &str,
    config: &EngineConfig,
    current_price: Option<f64>,
) -> Result<SymbolReport, EvaluateError> {
    let series = pool
        .get(symbol)
        .ok_or_else(|| EvaluateError::SymbolNotFound(symbol.to_string()))?;

    let table = compute_indicators(series);
    let classification = classify_table(&config.classifier, &table);
    let (current_price, anomaly) = score_current(series, current_price, config.anomaly.intraday);
    let cross = cross_section(
        pool,
        symbol,
        config.quant.risk_aversion,
        &config.quant.pair_params(),
    )
    .ok_or_else(|| EvaluateError::SymbolNotFound(symbol.to_string()))?;

    let latest = *table.latest();
    Ok(SymbolReport {
        symbol: symbol.to_string(),
        as_of: series.last_date(),
        current_price,
        bars: series.len(),
        latest,
        bb_position: latest.bb_position(),
        classification,
        severity: anomaly.severity(),
        anomaly,
        previous_severity: None,
        escalated: false,
        cross_section: cross,
        narrative: None,
    })
}

fn score_current(series: &PriceSeries, quote: Option<f64>, intraday: bool) -> (f64, AnomalyResult) {
    match quote {
        Some(price) if intraday => (price, score_anomaly_intraday(series, price)),
        Some(price) => (price, score_anomaly(series, price)),
        None => {
            let last = series.last_close();
            (last, score_anomaly_intraday(series, last))
        }
    }
}

/// Evaluate every symbol in the pool and apply severity escalation.
///
/// `current_prices` maps symbol → live quote; symbols without one use their
/// last close. Each symbol's new severity is recorded in `store`.
pub fn evaluate_pool(
    pool: &PricePool,
    config: &EngineConfig,
    current_prices: &HashMap<String, f64>,
    store: &dyn SeverityStore,
) -> Result<PoolReport, EvaluateError> {
    config.validate()?;
    if pool.is_empty() {
        return Err(EvaluateError::EmptyPool);
    }
    for (symbol, &price) in current_prices {
        if !price.is_finite() || price <= 0.0 {
            return Err(EvaluateError::InvalidPrice {
                symbol: symbol.clone(),
                price,
            });
        }
        if !pool.contains(symbol) {
            tracing::warn!(symbol, "current price given for a symbol outside the pool");
        }
    }

    let symbols: Vec<&str> = pool.symbols().collect();
    let evaluate = |symbol: &&str| {
        evaluate_symbol(pool, symbol, config, current_prices.get(*symbol).copied())
    };
    let mut reports: Vec<SymbolReport> = if config.engine.parallel {
        symbols
            .par_iter()
            .map(evaluate)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        symbols.iter().map(evaluate).collect::<Result<Vec<_>, _>>()?
    };
    reports.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    for report in &mut reports {
        apply_severity(report, store);
    }

    let escalated = reports.iter().filter(|r| r.escalated).count();
    tracing::info!(
        symbols = reports.len(),
        escalated,
        parallel = config.engine.parallel,
        "pool evaluated"
    );

    Ok(PoolReport {
        schema_version: SCHEMA_VERSION,
        config_hash: config.config_hash()?,
        dataset_hash: compute_dataset_hash(pool),
        evaluated_at: Utc::now(),
        reports,
    })
}

/// Compare against the stored severity, then record the new one.
fn apply_severity(report: &mut SymbolReport, store: &dyn SeverityStore) {
    let previous = store.last_severity(&report.symbol);
    report.previous_severity = previous;
    report.escalated = report.severity.is_escalation(previous);
    if report.escalated {
        tracing::info!(
            symbol = %report.symbol,
            severity = %report.severity,
            score = report.anomaly.score,
            percent_change = report.anomaly.percent_change,
            "severity escalated"
        );
    }
    store.record(
        &report.symbol,
        report.as_of,
        report.severity,
        report.current_price,
        report.anomaly.score,
    );
}

/// Fill each report's narrative from `provider`.
///
/// A provider failure falls back to `StaticNarrative` for that symbol and is
/// logged; returns the number of fallbacks.
pub fn attach_narratives(report: &mut PoolReport, provider: &dyn NarrativeProvider) -> usize {
    let mut fallbacks = 0;
    for r in &mut report.reports {
        let request = NarrativeRequest {
            symbol: &r.symbol,
            percent_change: r.anomaly.percent_change,
            latest: &r.latest,
            classification: &r.classification,
            anomaly: &r.anomaly,
            cross_section: &r.cross_section,
        };
        let narrative = match provider.summarize(&request) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(symbol = %r.symbol, error = %e, "narrative provider failed, using static text");
                fallbacks += 1;
                // StaticNarrative never fails.
                match StaticNarrative.summarize(&request) {
                    Ok(n) => n,
                    Err(_) => continue,
                }
            }
        };
        r.narrative = Some(narrative);
    }
    fallbacks
}
