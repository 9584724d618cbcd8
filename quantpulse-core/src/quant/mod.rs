//! Cross-sectional quant layer over a read-only `PricePool`.
//!
//! Pair opportunity, quote levels and momentum are independent of each other
//! and never mutate the pool.

pub mod momentum;
pub mod pair;
pub mod quote;
pub mod stats;

use serde::Serialize;

use crate::domain::PricePool;
pub use momentum::momentum_score;
pub use pair::{find_pair_opportunity, find_pair_opportunity_with, PairOpportunity, PairParams};
pub use quote::{quote_levels, QuoteLevels, DEFAULT_RISK_AVERSION};

/// All three cross-sectional outputs for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossSection {
    pub pair: Option<PairOpportunity>,
    pub quote: Option<QuoteLevels>,
    pub momentum: f64,
}

/// Cross-sectional outputs for `target`, or `None` when it is not pooled.
pub fn cross_section(
    pool: &PricePool,
    target: &str,
    risk_aversion: f64,
    pair_params: &PairParams,
) -> Option<CrossSection> {
    let series = pool.get(target)?;
    Some(CrossSection {
        pair: find_pair_opportunity_with(pool, target, pair_params),
        quote: quote_levels(series, risk_aversion),
        momentum: momentum_score(series),
    })
}
