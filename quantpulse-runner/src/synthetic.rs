//! Synthetic price history for demos and tests.
//!
//! Geometric random walk on weekdays. Each symbol's daily log-return mixes
//! a shared market shock with its own idiosyncratic shock:
//!
//! r = drift + vol * (w * z_market + sqrt(1 - w^2) * z_symbol)
//!
//! so `market_weight` controls how correlated the generated symbols are.
//! Seeded from `(seed, symbol)`: identical inputs give identical bars.

use chrono::{Datelike, NaiveDate, Weekday};
use quantpulse_core::domain::{PriceBar, PricePool, PriceSeries, SeriesError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Shape of the generated walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    pub bars: usize,
    pub start: NaiveDate,
    pub start_price: f64,
    /// Mean daily log-return.
    pub drift: f64,
    /// Daily log-return standard deviation.
    pub volatility: f64,
    /// Weight of the shared market shock, in [0, 1].
    pub market_weight: f64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            bars: 120,
            start: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or_default(),
            start_price: 100.0,
            drift: 0.0003,
            volatility: 0.015,
            market_weight: 0.9,
        }
    }
}

fn rng_for(seed: u64, label: &str) -> StdRng {
    let digest = blake3::hash(format!("{seed}:{label}").as_bytes());
    StdRng::from_seed(*digest.as_bytes())
}

/// Standard normal draw (Box-Muller).
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// The first `n` weekdays on or after `start`.
pub fn weekdays_from(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    start
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(n)
        .collect()
}

fn build_series(
    symbol: &str,
    spec: &SyntheticSpec,
    dates: &[NaiveDate],
    market: &[f64],
    rng: &mut StdRng,
) -> Result<PriceSeries, SeriesError> {
    let w = spec.market_weight.clamp(0.0, 1.0);
    let idio_weight = (1.0 - w * w).sqrt();

    let mut price = spec.start_price;
    let bars = dates
        .iter()
        .zip(market)
        .map(|(&date, &z_market)| {
            let shock = w * z_market + idio_weight * standard_normal(rng);
            let open = price;
            let close = price * (spec.drift + spec.volatility * shock).exp();
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            price = close;
            PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume: rng.gen_range(500_000..5_000_000u64),
            }
        })
        .collect();
    PriceSeries::new(symbol, bars)
}

/// One synthetic series with no market factor shared with anything else.
pub fn synthetic_series(symbol: &str, spec: &SyntheticSpec, seed: u64) -> Result<PriceSeries, SeriesError> {
    let mut rng = rng_for(seed, symbol);
    let dates = weekdays_from(spec.start, spec.bars);
    let market: Vec<f64> = dates.iter().map(|_| standard_normal(&mut rng)).collect();
    build_series(symbol, spec, &dates, &market, &mut rng)
}

/// A pool of symbols driven by one shared market factor.
pub fn synthetic_pool(symbols: &[String], spec: &SyntheticSpec, seed: u64) -> Result<PricePool, SeriesError> {
    let dates = weekdays_from(spec.start, spec.bars);
    let mut market_rng = rng_for(seed, "__market__");
    let market: Vec<f64> = dates.iter().map(|_| standard_normal(&mut market_rng)).collect();

    symbols
        .iter()
        .map(|symbol| {
            let mut rng = rng_for(seed, symbol);
            build_series(symbol, spec, &dates, &market, &mut rng)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|series| series.into_iter().collect())
}
