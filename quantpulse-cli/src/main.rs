//! QuantPulse CLI — evaluate, indicators, and synthetic data commands.
//!
//! Commands:
//! - `evaluate` — score every symbol of a CSV pool and print the report
//! - `indicators` — print the tail of one symbol's indicator table
//! - `synthetic` — write a seeded synthetic pool as CSV files
//!
//! Logs go to stderr so `evaluate --output json` stays pipeable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use quantpulse_core::collaborators::{InMemorySeverityStore, PriceHistoryProvider, StaticNarrative};
use quantpulse_core::indicators::{compute_indicators, IndicatorRow};
use quantpulse_runner::{
    attach_narratives, evaluate_pool, load_pool, save_artifacts, synthetic_pool,
    write_series_csv, CsvDirectoryProvider, EngineConfig, JsonSink, PoolReport, ReportSink,
    SyntheticSpec,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "quantpulse",
    about = "QuantPulse CLI — technical signals, anomaly alerts and pair screening"
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every configured symbol of a CSV price pool.
    ///
    /// Severity levels are not persisted between runs: each run starts from
    /// Normal, so any Notice or higher result is reported as ESCALATED.
    Evaluate {
        /// Directory holding one <SYMBOL>.csv per symbol.
        #[arg(long)]
        data_dir: PathBuf,

        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to evaluate (overrides the config).
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Current price for a symbol, as SYM=PRICE. Repeatable.
        #[arg(long = "price", value_parser = parse_price)]
        prices: Vec<(String, f64)>,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
        output: OutputFormat,

        /// Also save report.json and report.md into this directory.
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Print the most recent rows of one symbol's indicator table.
    Indicators {
        /// Directory holding one <SYMBOL>.csv per symbol.
        #[arg(long)]
        data_dir: PathBuf,

        #[arg(long)]
        symbol: String,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Most recent bars to load.
        #[arg(long, default_value_t = 120)]
        lookback_days: usize,
    },
    /// Write a seeded synthetic pool as CSV files.
    Synthetic {
        /// Output directory (created if missing).
        #[arg(long)]
        out_dir: PathBuf,

        #[arg(long, num_args = 1.., default_values = ["AAPL", "MSFT", "NVDA"])]
        symbols: Vec<String>,

        /// Bars per symbol.
        #[arg(long, default_value_t = 250)]
        bars: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// First bar date (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    match cli.command {
        Commands::Evaluate {
            data_dir,
            config,
            symbols,
            prices,
            output,
            report_dir,
        } => run_evaluate(&data_dir, config, symbols, prices, output, report_dir),
        Commands::Indicators {
            data_dir,
            symbol,
            rows,
            lookback_days,
        } => run_indicators(&data_dir, &symbol, rows, lookback_days),
        Commands::Synthetic {
            out_dir,
            symbols,
            bars,
            seed,
            start,
        } => run_synthetic(&out_dir, &symbols, bars, seed, start.as_deref()),
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn parse_price(arg: &str) -> Result<(String, f64), String> {
    let (symbol, price) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected SYM=PRICE, got '{arg}'"))?;
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(format!("empty symbol in '{arg}'"));
    }
    let price: f64 = price
        .trim()
        .parse()
        .map_err(|e| format!("bad price in '{arg}': {e}"))?;
    if !price.is_finite() || price <= 0.0 {
        return Err(format!("price must be positive in '{arg}'"));
    }
    Ok((symbol.to_string(), price))
}

fn run_evaluate(
    data_dir: &Path,
    config_path: Option<PathBuf>,
    symbols: Vec<String>,
    prices: Vec<(String, f64)>,
    output: OutputFormat,
    report_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => EngineConfig::from_file(&path)?,
        None => EngineConfig::default(),
    };
    if !symbols.is_empty() {
        config.engine.symbols = symbols;
    }
    config.validate()?;

    let provider = CsvDirectoryProvider::new(data_dir);
    let loaded = load_pool(&provider, &config.engine.symbols, config.engine.lookback_days)?;

    let current_prices: HashMap<String, f64> = prices.into_iter().collect();
    for symbol in current_prices.keys() {
        if !loaded.pool.contains(symbol) {
            bail!("--price given for '{symbol}', which is not in the evaluated symbols");
        }
    }

    // Fresh per run; see the `evaluate` help text.
    let store = InMemorySeverityStore::new();
    let mut report = evaluate_pool(&loaded.pool, &config, &current_prices, &store)?;
    attach_narratives(&mut report, &StaticNarrative);

    match output {
        OutputFormat::Json => {
            let mut sink = JsonSink::new(std::io::stdout().lock());
            sink.deliver(&report).context("failed to write JSON report")?;
        }
        OutputFormat::Summary => print_summary(&report),
    }

    if let Some(dir) = report_dir {
        save_artifacts(&report, &dir)?;
        eprintln!("Report saved to: {}", dir.display());
    }
    Ok(())
}

fn run_indicators(data_dir: &Path, symbol: &str, rows: usize, lookback_days: usize) -> Result<()> {
    let provider = CsvDirectoryProvider::new(data_dir);
    let series = provider
        .fetch(symbol, lookback_days)
        .with_context(|| format!("failed to load '{symbol}' from {}", data_dir.display()))?;
    let table = compute_indicators(&series);

    println!(
        "{} — {} bars, {} to {}",
        symbol,
        series.len(),
        series.first_date(),
        series.last_date()
    );
    println!(
        "{:<10} {:>9} {:>9} {:>9} {:>9} {:>7} {:>9} {:>9} {:>8} {:>8}",
        "Date", "Close", "MA5", "MA20", "MA50", "RSI", "BB Up", "BB Low", "MACD", "ATR"
    );
    println!("{}", "-".repeat(96));
    for row in table.tail(rows) {
        print_row(row);
    }
    Ok(())
}

fn cell(value: Option<f64>, width: usize) -> String {
    match value {
        Some(v) => format!("{v:>width$.2}"),
        None => format!("{:>width$}", "-"),
    }
}

fn print_row(row: &IndicatorRow) {
    println!(
        "{:<10} {:>9.2} {} {} {} {} {} {} {} {}",
        row.date,
        row.close,
        cell(row.ma_short, 9),
        cell(row.ma_mid, 9),
        cell(row.ma_long, 9),
        cell(row.rsi, 7),
        cell(row.bb_upper, 9),
        cell(row.bb_lower, 9),
        cell(row.macd, 8),
        cell(row.atr, 8),
    );
}

fn run_synthetic(
    out_dir: &Path,
    symbols: &[String],
    bars: usize,
    seed: u64,
    start: Option<&str>,
) -> Result<()> {
    if bars == 0 {
        bail!("--bars must be at least 1");
    }
    let mut spec = SyntheticSpec {
        bars,
        ..SyntheticSpec::default()
    };
    if let Some(start) = start {
        spec.start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .with_context(|| format!("invalid --start date '{start}'"))?;
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let pool = synthetic_pool(symbols, &spec, seed)?;
    for (symbol, series) in pool.iter() {
        let path = write_series_csv(out_dir, series)?;
        println!("{symbol}: {} bars → {}", series.len(), path.display());
    }
    Ok(())
}

fn print_summary(report: &PoolReport) {
    println!();
    println!("=== Signal Report ===");
    println!("Evaluated:      {}", report.evaluated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Symbols:        {}", report.reports.len());
    println!("Escalations:    {}", report.escalations().count());
    println!("Config Hash:    {}", &report.config_hash[..12.min(report.config_hash.len())]);
    println!();

    for r in &report.reports {
        let c = &r.classification;
        println!("--- {} ({}) ---", r.symbol, r.as_of);
        println!(
            "Price:          {:.2} ({:+.2}%)",
            r.current_price, r.anomaly.percent_change
        );
        println!(
            "Anomaly:        {:.2} [{}]{}",
            r.anomaly.score,
            r.severity,
            if r.escalated { "  ESCALATED" } else { "" }
        );
        println!(
            "RSI:            {}",
            r.latest.rsi.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
        );
        println!("Band Position:  {:.1}%", r.bb_position);
        println!("Left Side:      {} — {}", c.left.action, c.left.rationale);
        println!("Right Side:     {} — {}", c.right.action, c.right.rationale);
        println!(
            "Stop Loss:      {:.2} (ATR {:.2})",
            c.setup.stop_loss_price, c.setup.atr_used
        );
        println!(
            "Re-entry:       {:.2} ({})",
            c.setup.re_entry_target_price, c.setup.re_entry_description
        );
        println!("Momentum:       {:.2}", r.cross_section.momentum);
        if let Some(q) = &r.cross_section.quote {
            println!("Quotes:         bid {:.2} / ask {:.2}", q.bid_limit, q.ask_limit);
        }
        if let Some(p) = &r.cross_section.pair {
            println!(
                "Pair:           {} (ρ {:.3}, z {:+.2}){}",
                p.peer_symbol,
                p.correlation,
                p.spread_z_score,
                if p.divergence_flag { "  DIVERGING" } else { "" }
            );
        }
        println!();
    }
}
