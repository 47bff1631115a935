//! Export: JSON, CSV and Markdown artifacts for a screen run.
//!
//! - **JSON**: the full [`ScreenOutcome`] in a versioned envelope
//! - **CSV**: one row per screened symbol for spreadsheet review
//! - **Markdown**: regime, funnel and the ranked buy list
//!
//! Unknown (newer) schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use swingscan_core::{ScreenOutcome, ScreenerResult, Signal, SnapshotSummary};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub schema_version: u32,
    pub digest: String,
    pub outcome: ScreenOutcome,
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an outcome to pretty JSON.
pub fn export_json(outcome: &ScreenOutcome) -> Result<String> {
    let envelope = ExportEnvelope {
        schema_version: SCHEMA_VERSION,
        digest: outcome.digest(),
        outcome: outcome.clone(),
    };
    serde_json::to_string_pretty(&envelope).context("failed to serialize ScreenOutcome to JSON")
}

/// Deserialize an exported outcome, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ScreenOutcome> {
    let envelope: ExportEnvelope =
        serde_json::from_str(json).context("failed to deserialize exported screen")?;
    if envelope.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            envelope.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(envelope.outcome)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| format!("{x:.decimals$}")).unwrap_or_default()
}

/// One row per result, in input order.
///
/// Columns: symbol, exchange, sector, signal, overall_score, sector_bonus,
/// phase1..phase5, last_price, rsi, adx, volume_ratio, atr_percent,
/// relative_strength_3m, entry_price, stop_loss, target, risk_reward_ratio,
/// quantity, capital_at_risk
pub fn export_results_csv(results: &[ScreenerResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "exchange",
        "sector",
        "signal",
        "overall_score",
        "sector_bonus",
        "phase1",
        "phase2",
        "phase3",
        "phase4",
        "phase5",
        "last_price",
        "rsi",
        "adx",
        "volume_ratio",
        "atr_percent",
        "relative_strength_3m",
        "entry_price",
        "stop_loss",
        "target",
        "risk_reward_ratio",
        "quantity",
        "capital_at_risk",
    ])?;

    for r in results {
        let ind = &r.indicators;
        let risk = &r.phase6;
        wtr.write_record([
            r.stock.symbol.as_str(),
            r.stock.exchange.as_str(),
            r.stock.sector.as_str(),
            r.signal.label(),
            &r.overall_score.to_string(),
            &r.sector_bonus.to_string(),
            &r.phase1.to_string(),
            &r.phase2.to_string(),
            &r.phase3.to_string(),
            &r.phase4.to_string(),
            &r.phase5.to_string(),
            &format!("{:.2}", r.stock.last_price),
            &opt(ind.rsi, 2),
            &opt(ind.directional.adx, 2),
            &opt(ind.volume_ratio, 2),
            &opt(ind.atr_percent, 2),
            &opt(ind.relative_strength_3m, 2),
            &format!("{:.2}", risk.entry_price),
            &format!("{:.2}", risk.stop_loss),
            &format!("{:.2}", risk.target),
            &format!("{:.2}", risk.risk_reward_ratio),
            &risk.quantity.to_string(),
            &format!("{:.2}", risk.capital_at_risk),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Markdown summary: regime, thresholds in force, funnel, buy list.
pub fn generate_report(outcome: &ScreenOutcome) -> String {
    let mut md = String::with_capacity(2048);
    md.push_str("# Momentum Screen\n\n");

    let r = &outcome.regime;
    md.push_str("## Market Regime\n\n");
    md.push_str(&format!("**{}**: {}\n\n", r.regime, r.description));

    let t = &outcome.thresholds;
    md.push_str("## Thresholds\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Min turnover | {:.0} |\n", t.min_turnover));
    md.push_str(&format!("| Min ADX | {:.1} |\n", t.min_adx));
    md.push_str(&format!("| RSI band | {:.1} to {:.1} |\n", t.rsi_min, t.rsi_max));
    md.push_str(&format!("| MFI band | {:.1} to {:.1} |\n", t.mfi_min, t.mfi_max));
    md.push_str(&format!("| Volume multiplier | {:.2} |\n", t.volume_multiplier));
    md.push_str(&format!("| Max ATR % | {:.2} |\n", t.max_atr_percent));
    md.push_str(&format!("| Min R:R | {:.2} |\n", t.min_risk_reward));
    md.push('\n');

    let f = &outcome.funnel;
    md.push_str("## Phase Funnel\n\n");
    md.push_str("| Stage | Symbols |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Screened | {} |\n", f.total));
    for (i, n) in [f.phase1, f.phase2, f.phase3, f.phase4, f.phase5]
        .iter()
        .enumerate()
    {
        md.push_str(&format!("| Phase {} | {} |\n", i + 1, n));
    }
    md.push('\n');

    md.push_str("## Signals\n\n");
    for signal in Signal::ALL {
        md.push_str(&format!(
            "- {}: {}\n",
            signal,
            outcome.signal_counts.get(signal)
        ));
    }
    md.push('\n');

    let summary = SnapshotSummary::from_outcome(outcome, outcome.results.len());
    let buys: Vec<_> = summary.top.iter().filter(|e| e.signal.is_buy()).collect();
    if !buys.is_empty() {
        md.push_str("## Buy Candidates\n\n");
        md.push_str("| Symbol | Sector | Signal | Score | Entry | Stop | Target | R:R |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- |\n");
        for e in buys {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
                e.symbol,
                e.sector,
                e.signal,
                e.overall_score,
                e.entry_price,
                e.stop_loss,
                e.target,
                e.risk_reward_ratio
            ));
        }
        md.push('\n');
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `screen.json`, `screen.csv` and `report.md` into `output_dir`.
///
/// Returns the paths written.
pub fn write_exports(outcome: &ScreenOutcome, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create export dir: {}", output_dir.display()))?;

    let artifacts = [
        ("screen.json", export_json(outcome)?),
        ("screen.csv", export_results_csv(&outcome.results)?),
        ("report.md", generate_report(outcome)),
    ];

    let mut written = Vec::with_capacity(artifacts.len());
    for (name, content) in artifacts {
        let path = output_dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
