//! QuantPulse Runner — pool evaluation on top of `quantpulse-core`.
//!
//! This crate provides:
//! - TOML engine configuration with validation and a config hash
//! - CSV price loading through the `PriceHistoryProvider` seam
//! - Seeded synthetic price pools for demos and tests
//! - Per-symbol evaluation over a pool (parallel via rayon) with severity
//!   escalation against a `SeverityStore`
//! - JSON and Markdown reports

pub mod config;
pub mod data_loader;
pub mod evaluate;
pub mod report;
pub mod synthetic;

pub use config::{ConfigError, EngineConfig};
pub use data_loader::{
    compute_dataset_hash, load_pool, write_series_csv, CsvDirectoryProvider, LoadError,
    LoadedPool,
};
pub use evaluate::{
    attach_narratives, evaluate_pool, evaluate_symbol, EvaluateError, PoolReport, SymbolReport,
    SCHEMA_VERSION,
};
pub use report::{
    export_json, render_markdown, save_artifacts, JsonSink, MarkdownSink, ReportSink, SinkError,
};
pub use synthetic::{synthetic_pool, synthetic_series, SyntheticSpec};
