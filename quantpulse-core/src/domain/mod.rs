//! Domain types: bars, series, and the per-cycle pool.

pub mod bar;
pub mod pool;
pub mod series;

pub use bar::PriceBar;
pub use pool::PricePool;
pub use series::{PriceSeries, SeriesError};
