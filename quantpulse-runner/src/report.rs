//! Report rendering and delivery — JSON and Markdown.
//!
//! - **JSON**: the full `PoolReport`, schema-versioned, for downstream tools
//! - **Markdown**: one overview table plus a section per symbol
//!
//! Delivery goes through [`ReportSink`]; the CLI writes to stdout, but any
//! `Write` target works.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use quantpulse_core::signals::Signal;
use thiserror::Error;

use crate::evaluate::{PoolReport, SymbolReport};

/// Failure while delivering a report.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for a finished evaluation.
pub trait ReportSink {
    fn deliver(&mut self, report: &PoolReport) -> Result<(), SinkError>;
}

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize a `PoolReport` to pretty JSON.
pub fn export_json(report: &PoolReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize PoolReport to JSON")
}

/// Write pretty JSON to any writer.
#[derive(Debug)]
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn deliver(&mut self, report: &PoolReport) -> Result<(), SinkError> {
        serde_json::to_writer_pretty(&mut self.out, report)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

// ─── Markdown ───────────────────────────────────────────────────────

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "—".to_string(), |v| format!("{v:.2}"))
}

fn fmt_signal(signal: &Signal) -> String {
    format!("{} ({:?})", signal.action, signal.tier)
}

/// Render a `PoolReport` as Markdown.
pub fn render_markdown(report: &PoolReport) -> String {
    let mut md = String::new();

    md.push_str("# Signal Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Evaluated | {} |\n",
        report.evaluated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("| Symbols | {} |\n", report.reports.len()));
    md.push_str(&format!("| Escalations | {} |\n", report.escalations().count()));
    md.push_str(&format!("| Config Hash | {} |\n", report.config_hash));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    md.push('\n');

    md.push_str("## Overview\n\n");
    md.push_str("| Symbol | Price | Move | Score | Severity | Left | Right | Momentum |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- |\n");
    for r in &report.reports {
        let severity = if r.escalated {
            format!("**{}** ↑", r.severity)
        } else {
            r.severity.to_string()
        };
        md.push_str(&format!(
            "| {} | {:.2} | {:+.2}% | {:.2} | {} | {} | {} | {:.2} |\n",
            r.symbol,
            r.current_price,
            r.anomaly.percent_change,
            r.anomaly.score,
            severity,
            r.classification.left.action,
            r.classification.right.action,
            r.cross_section.momentum,
        ));
    }
    md.push('\n');

    for r in &report.reports {
        md.push_str(&render_symbol(r));
    }
    md
}

fn render_symbol(r: &SymbolReport) -> String {
    let mut md = String::new();
    let row = &r.latest;

    md.push_str(&format!("## {} ({})\n\n", r.symbol, r.as_of));

    md.push_str("| Indicator | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Close | {:.2} |\n", row.close));
    md.push_str(&format!(
        "| MA5 / MA20 / MA50 | {} / {} / {} |\n",
        fmt_opt(row.ma_short),
        fmt_opt(row.ma_mid),
        fmt_opt(row.ma_long)
    ));
    md.push_str(&format!("| RSI | {} |\n", fmt_opt(row.rsi)));
    md.push_str(&format!(
        "| Bollinger | {} – {} ({:.1}%) |\n",
        fmt_opt(row.bb_lower),
        fmt_opt(row.bb_upper),
        r.bb_position
    ));
    md.push_str(&format!(
        "| MACD / Signal | {} / {} |\n",
        fmt_opt(row.macd),
        fmt_opt(row.macd_signal)
    ));
    md.push_str(&format!("| ATR | {} |\n", fmt_opt(row.atr)));
    md.push('\n');

    let c = &r.classification;
    md.push_str("| Side | Signal | Rationale |\n");
    md.push_str("| --- | --- | --- |\n");
    md.push_str(&format!("| Left | {} | {} |\n", fmt_signal(&c.left), c.left.rationale));
    md.push_str(&format!("| Right | {} | {} |\n", fmt_signal(&c.right), c.right.rationale));
    md.push('\n');

    let s = &c.setup;
    md.push_str(&format!(
        "Setup: stop {:.2} (ATR {:.2}), support {:.2} ({}), re-entry {:.2} ({})\n\n",
        s.stop_loss_price,
        s.atr_used,
        s.support_reference_price,
        s.support_description,
        s.re_entry_target_price,
        s.re_entry_description
    ));

    match &r.cross_section.pair {
        Some(p) => md.push_str(&format!(
            "Pair: {} (ρ {:.3}, spread z {:+.2}{})\n\n",
            p.peer_symbol,
            p.correlation,
            p.spread_z_score,
            if p.divergence_flag { ", **diverging**" } else { "" }
        )),
        None => md.push_str("Pair: none\n\n"),
    }
    if let Some(q) = &r.cross_section.quote {
        md.push_str(&format!(
            "Quotes: bid {:.2} / ask {:.2} (daily vol {:.2}%)\n\n",
            q.bid_limit,
            q.ask_limit,
            q.realized_volatility * 100.0
        ));
    }
    if let Some(n) = &r.narrative {
        md.push_str(&format!(
            "> {}\n>\n> Left: {}\n>\n> Right: {}\n\n",
            n.summary, n.left_side_analysis, n.right_side_analysis
        ));
    }
    md
}

/// Write Markdown to any writer.
#[derive(Debug)]
pub struct MarkdownSink<W: Write> {
    out: W,
}

impl<W: Write> MarkdownSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for MarkdownSink<W> {
    fn deliver(&mut self, report: &PoolReport) -> Result<(), SinkError> {
        self.out.write_all(render_markdown(report).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Save the JSON and Markdown artifacts into `dir` as `report.json` / `report.md`.
pub fn save_artifacts(report: &PoolReport, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    std::fs::write(dir.join("report.json"), export_json(report)?)
        .context("failed to write report.json")?;
    std::fs::write(dir.join("report.md"), render_markdown(report))
        .context("failed to write report.md")?;
    Ok(())
}
