//! Engine configuration, loaded from TOML.
//!
//! ```toml
//! [engine]
//! symbols = ["AAPL", "MSFT", "NVDA"]
//! lookback_days = 120
//! parallel = true
//!
//! [classifier]
//! conservative_tier = false
//!
//! [quant]
//! risk_aversion = 0.5
//! pair_min_correlation = 0.8
//! divergence_z = 2.0
//!
//! [anomaly]
//! intraday = false
//! ```
//!
//! Every section and field is optional; missing values take the defaults above.

use std::path::Path;

use quantpulse_core::quant::{PairParams, DEFAULT_RISK_AVERSION};
use quantpulse_core::signals::ClassifierConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pair screening needs at least this many bars per symbol.
pub const MIN_USEFUL_LOOKBACK: usize = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Symbols evaluated together as one pool.
    pub symbols: Vec<String>,
    /// Most recent bars kept per symbol.
    pub lookback_days: usize,
    /// Evaluate symbols on the rayon pool.
    pub parallel: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".into(), "MSFT".into(), "NVDA".into()],
            lookback_days: 120,
            parallel: true,
        }
    }
}

/// `[quant]` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantSection {
    pub risk_aversion: f64,
    pub pair_min_correlation: f64,
    pub divergence_z: f64,
}

impl Default for QuantSection {
    fn default() -> Self {
        let pair = PairParams::default();
        Self {
            risk_aversion: DEFAULT_RISK_AVERSION,
            pair_min_correlation: pair.min_correlation,
            divergence_z: pair.divergence_z,
        }
    }
}

impl QuantSection {
    pub fn pair_params(&self) -> PairParams {
        PairParams {
            min_correlation: self.pair_min_correlation,
            divergence_z: self.divergence_z,
        }
    }
}

/// `[anomaly]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalySection {
    /// Treat the last bar of each series as the in-progress session.
    pub intraday: bool,
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub engine: EngineSection,
    pub classifier: ClassifierConfig,
    pub quant: QuantSection,
    pub anomaly: AnomalySection,
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(format!("serialize: {e}")))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.symbols.is_empty() {
            return Err(ConfigError::Invalid("engine.symbols is empty".into()));
        }
        if let Some(blank) = self.engine.symbols.iter().find(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("blank symbol {blank:?}")));
        }
        if self.engine.lookback_days == 0 {
            return Err(ConfigError::Invalid("engine.lookback_days must be > 0".into()));
        }
        let q = &self.quant;
        if !q.risk_aversion.is_finite() || q.risk_aversion < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "quant.risk_aversion must be >= 0, got {}",
                q.risk_aversion
            )));
        }
        if !(0.0..=1.0).contains(&q.pair_min_correlation) {
            return Err(ConfigError::Invalid(format!(
                "quant.pair_min_correlation must be in [0, 1], got {}",
                q.pair_min_correlation
            )));
        }
        if !q.divergence_z.is_finite() || q.divergence_z <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "quant.divergence_z must be > 0, got {}",
                q.divergence_z
            )));
        }
        if self.engine.lookback_days < MIN_USEFUL_LOOKBACK {
            tracing::warn!(
                lookback_days = self.engine.lookback_days,
                "lookback below {MIN_USEFUL_LOOKBACK} bars: pair screening will find nothing"
            );
        }
        Ok(())
    }

    /// Deterministic BLAKE3 hash of the configuration.
    ///
    /// Two evaluations with identical configs share the same hash.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self)
            .map_err(|e| ConfigError::Invalid(format!("serialize: {e}")))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
