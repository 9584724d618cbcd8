//! Pair opportunity — the most correlated peer and the z-score of the
//! target/peer price ratio.
//!
//! 1. Align target and peer closes on common dates (intersection).
//! 2. Pearson correlation of the last 60 aligned closes; keep the peer with
//!    the highest |correlation|.
//! 3. Ratio = target / peer over all common dates; z-score of the last ratio
//!    against its 20-point rolling mean and sample std.

use serde::{Deserialize, Serialize};

use super::stats::{mean, pearson, sample_std};
use crate::domain::{PricePool, PriceSeries};

/// Closes used for the correlation screen.
pub const CORRELATION_WINDOW: usize = 60;
/// Window for the ratio's rolling mean and std.
pub const SPREAD_WINDOW: usize = 20;
pub const DEFAULT_MIN_CORRELATION: f64 = 0.8;
pub const DEFAULT_DIVERGENCE_Z: f64 = 2.0;

/// Best correlated peer for a target symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairOpportunity {
    pub peer_symbol: String,
    /// Pearson correlation over the last 60 aligned closes, in [-1, 1].
    pub correlation: f64,
    pub spread_z_score: f64,
    /// |z| above the divergence threshold.
    pub divergence_flag: bool,
}

/// Thresholds for the pair screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairParams {
    /// Peers below this |correlation| give no opportunity.
    pub min_correlation: f64,
    /// |z| strictly above this sets the divergence flag.
    pub divergence_z: f64,
}

impl Default for PairParams {
    fn default() -> Self {
        Self {
            min_correlation: DEFAULT_MIN_CORRELATION,
            divergence_z: DEFAULT_DIVERGENCE_Z,
        }
    }
}

/// Closes of `a` and `b` on the dates both series share, in date order.
pub fn aligned_closes(a: &PriceSeries, b: &PriceSeries) -> (Vec<f64>, Vec<f64>) {
    let (a_bars, b_bars) = (a.bars(), b.bars());
    let mut left = Vec::new();
    let mut right = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a_bars.len() && j < b_bars.len() {
        match a_bars[i].date.cmp(&b_bars[j].date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                left.push(a_bars[i].close);
                right.push(b_bars[j].close);
                i += 1;
                j += 1;
            }
        }
    }
    (left, right)
}

fn last_n(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

/// Pair opportunity with the default thresholds (0.8 correlation, |z| > 2).
pub fn find_pair_opportunity(pool: &PricePool, target: &str) -> Option<PairOpportunity> {
    find_pair_opportunity_with(pool, target, &PairParams::default())
}

/// Pair opportunity with explicit thresholds.
///
/// `None` when the target is missing or short, no peer shares 60 dates with
/// it, the best |correlation| is below `min_correlation`, or the ratio's
/// rolling std is zero.
pub fn find_pair_opportunity_with(
    pool: &PricePool,
    target: &str,
    params: &PairParams,
) -> Option<PairOpportunity> {
    let target_series = pool.get(target)?;
    if target_series.len() < CORRELATION_WINDOW {
        tracing::debug!(
            symbol = target,
            bars = target_series.len(),
            "pair: insufficient history"
        );
        return None;
    }

    // (peer, correlation, aligned target closes, aligned peer closes)
    let mut best: Option<(&str, f64, Vec<f64>, Vec<f64>)> = None;
    for (peer, peer_series) in pool.iter() {
        if peer == target {
            continue;
        }
        let (t, p) = aligned_closes(target_series, peer_series);
        if t.len() < CORRELATION_WINDOW {
            tracing::debug!(symbol = target, peer, common = t.len(), "pair: peer skipped, short overlap");
            continue;
        }
        let Some(correlation) = pearson(
            last_n(&t, CORRELATION_WINDOW),
            last_n(&p, CORRELATION_WINDOW),
        ) else {
            tracing::debug!(symbol = target, peer, "pair: peer skipped, undefined correlation");
            continue;
        };
        let better = best
            .as_ref()
            .map_or(true, |(_, c, _, _)| correlation.abs() > c.abs());
        if better {
            best = Some((peer, correlation, t, p));
        }
    }

    let (peer, correlation, t, p) = best?;
    if correlation.abs() < params.min_correlation {
        return None;
    }

    let ratio: Vec<f64> = t.iter().zip(&p).map(|(a, b)| a / b).collect();
    if ratio.len() < SPREAD_WINDOW {
        return None;
    }
    let window = last_n(&ratio, SPREAD_WINDOW);
    let rolling_mean = mean(window)?;
    let rolling_std = sample_std(window)?;
    if rolling_std == 0.0 {
        tracing::debug!(symbol = target, peer, "pair: zero ratio std");
        return None;
    }

    let current = ratio[ratio.len() - 1];
    let spread_z_score = (current - rolling_mean) / rolling_std;
    Some(PairOpportunity {
        peer_symbol: peer.to_string(),
        correlation,
        spread_z_score,
        divergence_flag: spread_z_score.abs() > params.divergence_z,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;
    use chrono::NaiveDate;

    fn series_from(symbol: &str, start_day: i64, closes: &[f64]) -> PriceSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar {
                date: base + chrono::Duration::days(start_day + i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 10,
            })
            .collect();
        PriceSeries::new(symbol, bars).unwrap()
    }

    fn wave(n: usize, level: f64) -> Vec<f64> {
        (0..n)
            .map(|i| level + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn aligned_closes_intersects_dates() {
        let a = series_from("A", 0, &[1.0, 2.0, 3.0, 4.0]);
        let b = series_from("B", 2, &[30.0, 40.0, 50.0]);
        let (x, y) = aligned_closes(&a, &b);
        assert_eq!(x, vec![3.0, 4.0]);
        assert_eq!(y, vec![30.0, 40.0]);
    }

    #[test]
    fn single_symbol_pool_has_no_pair() {
        let pool: PricePool = [series_from("A", 0, &wave(80, 100.0))].into_iter().collect();
        assert_eq!(find_pair_opportunity(&pool, "A"), None);
        assert_eq!(find_pair_opportunity(&pool, "MISSING"), None);
    }

    #[test]
    fn short_target_has_no_pair() {
        let pool: PricePool = [
            series_from("A", 0, &wave(59, 100.0)),
            series_from("B", 0, &wave(59, 50.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(find_pair_opportunity(&pool, "A"), None);
    }

    #[test]
    fn picks_most_correlated_peer() {
        let base = wave(80, 100.0);
        let tracker: Vec<f64> = base.iter().map(|c| c * 0.5 + 1.0).collect();
        let noise: Vec<f64> = (0..80).map(|i| 50.0 + ((i * 13) % 7) as f64).collect();
        let pool: PricePool = [
            series_from("A", 0, &base),
            series_from("B", 0, &noise),
            series_from("C", 0, &tracker),
        ]
        .into_iter()
        .collect();

        let pair = find_pair_opportunity(&pool, "A").unwrap();
        assert_eq!(pair.peer_symbol, "C");
        assert!(pair.correlation > 0.99);
        assert!(pair.spread_z_score.is_finite());
    }

    #[test]
    fn weak_correlation_gives_none() {
        let base = wave(80, 100.0);
        let noise: Vec<f64> = (0..80).map(|i| 50.0 + ((i * 13) % 7) as f64).collect();
        let pool: PricePool = [series_from("A", 0, &base), series_from("B", 0, &noise)]
            .into_iter()
            .collect();
        assert_eq!(find_pair_opportunity(&pool, "A"), None);
    }

    #[test]
    fn proportional_peer_has_zero_ratio_std() {
        // Exact multiple → constant ratio → no opportunity.
        let base = wave(80, 100.0);
        let double: Vec<f64> = base.iter().map(|c| c * 2.0).collect();
        let pool: PricePool = [series_from("A", 0, &base), series_from("B", 0, &double)]
            .into_iter()
            .collect();
        assert_eq!(find_pair_opportunity(&pool, "A"), None);
    }

    #[test]
    fn late_jump_flags_divergence() {
        let base = wave(80, 100.0);
        let mut peer: Vec<f64> = base.iter().map(|c| c * 0.5 + 1.0).collect();
        // Peer drops 10% on the last day: target/peer ratio spikes.
        let last = peer.len() - 1;
        peer[last] *= 0.9;
        let pool: PricePool = [series_from("A", 0, &base), series_from("B", 0, &peer)]
            .into_iter()
            .collect();

        let pair = find_pair_opportunity(&pool, "A").unwrap();
        assert!(pair.spread_z_score > 2.0);
        assert!(pair.divergence_flag);

        let lenient = PairParams {
            divergence_z: 100.0,
            ..PairParams::default()
        };
        let pair = find_pair_opportunity_with(&pool, "A", &lenient).unwrap();
        assert!(!pair.divergence_flag);
    }
}
