//! PricePool — the read-only cross-section of series evaluated in one cycle.

use std::collections::BTreeMap;

use super::PriceSeries;

/// Symbol → series map shared read-only by the cross-sectional queries.
///
/// Backed by a `BTreeMap` so iteration (and therefore tie-breaking between
/// equally correlated peers) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct PricePool {
    series: BTreeMap<String, PriceSeries>,
}

impl PricePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series under its own symbol, replacing any previous entry.
    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.series.contains_key(symbol)
    }

    /// Symbols in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|s| s.as_str())
    }

    /// `(symbol, series)` pairs in sorted symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PriceSeries)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<PriceSeries> for PricePool {
    fn from_iter<I: IntoIterator<Item = PriceSeries>>(iter: I) -> Self {
        let mut pool = PricePool::new();
        for series in iter {
            pool.insert(series);
        }
        pool
    }
}
