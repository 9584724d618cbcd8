//! QuantPulse Core — pure computation over daily price history.
//!
//! - Domain types (bars, validated series, the per-cycle pool)
//! - Indicator calculator: SMA, RSI, Bollinger, MACD, ATR into an immutable table
//! - Signal classifier: left-side and right-side rule chains plus trade setup
//! - Anomaly scorer: MAD-based robust deviation and severity tiers
//! - Cross-sectional quant layer: pair divergence, quote levels, momentum
//! - Collaborator traits for price history, severity state and narratives
//!
//! Nothing here performs I/O or holds mutable state between calls.

pub mod anomaly;
pub mod collaborators;
pub mod domain;
pub mod indicators;
pub mod quant;
pub mod signals;

pub use anomaly::{score_anomaly, score_anomaly_intraday, AnomalyResult, AnomalySeverity};
pub use domain::{PriceBar, PricePool, PriceSeries, SeriesError};
pub use indicators::{compute_indicators, IndicatorRow, IndicatorTable};
pub use quant::{cross_section, find_pair_opportunity, momentum_score, quote_levels, CrossSection};
pub use signals::{classify_signals, Classification, Signal, SignalAction, SignalTier, TradeSetup};
