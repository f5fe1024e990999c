//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! This is the presentation boundary: every figure is rounded here and only
//! here. Provides:
//! - **JSON**: `AnalysisReport` with schema versioning and config fingerprint
//! - **CSV**: raw trial outcomes and per-day percentile bands
//! - **Markdown**: human-readable summary
//!
//! Unknown (newer) schema versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use esglab_core::AnalysisConfig;

use crate::analysis::{PortfolioAnalysis, SimulationResult};
use crate::metrics::{BenchmarkComparison, PortfolioMetrics};
use crate::stats::{OutcomeStats, PathBands};

/// Current report schema version. Bump on breaking field changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Decimal places for percent figures in reports.
pub const REPORT_DECIMALS: u32 = 2;

/// Decimal places for the Sharpe-like ratio.
pub const RATIO_DECIMALS: u32 = 3;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

fn r2(value: f64) -> f64 {
    round_to(value, REPORT_DECIMALS)
}

// ─── Report ─────────────────────────────────────────────────────────

/// Rounded, self-describing view of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub config_fingerprint: String,
    pub holdings: usize,
    pub total_value: f64,
    pub weighted_esg_score: f64,
    pub defaulted_scores: usize,
    pub metrics: PortfolioMetrics,
    pub benchmark: BenchmarkComparison,
    /// Summary statistics only; outcomes and bands go to CSV.
    pub simulation: SimulationResult,
}

impl AnalysisReport {
    pub fn new(analysis: &PortfolioAnalysis, config: &AnalysisConfig) -> Self {
        let summary = &analysis.summary;
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            config_fingerprint: config.fingerprint(),
            holdings: summary.holdings.len(),
            total_value: r2(summary.total_value),
            weighted_esg_score: r2(summary.weighted_esg_score),
            defaulted_scores: summary.defaulted_scores,
            metrics: round_metrics(&analysis.metrics),
            benchmark: round_benchmark(&analysis.benchmark),
            simulation: round_simulation(&analysis.simulation),
        }
    }
}

fn round_metrics(m: &PortfolioMetrics) -> PortfolioMetrics {
    PortfolioMetrics {
        expected_return: r2(m.expected_return),
        volatility: r2(m.volatility),
        sharpe_ratio: m.sharpe_ratio.map(|s| round_to(s, RATIO_DECIMALS)),
        var_95: r2(m.var_95),
        esg_adjusted_return: r2(m.esg_adjusted_return),
        esg_bonus: r2(m.esg_bonus),
        weighted_esg_score: r2(m.weighted_esg_score),
    }
}

fn round_benchmark(b: &BenchmarkComparison) -> BenchmarkComparison {
    BenchmarkComparison {
        benchmark_return: r2(b.benchmark_return),
        portfolio_return: r2(b.portfolio_return),
        excess_return: r2(b.excess_return),
        alpha: r2(b.alpha),
        outperformance: b.outperformance,
    }
}

fn round_simulation(s: &SimulationResult) -> SimulationResult {
    let st = &s.stats;
    SimulationResult {
        stats: OutcomeStats {
            count: st.count,
            mean: r2(st.mean),
            std_dev: r2(st.std_dev),
            min: r2(st.min),
            max: r2(st.max),
            median: r2(st.median),
            percentile_5: r2(st.percentile_5),
            percentile_95: r2(st.percentile_95),
            prob_positive: r2(st.prob_positive),
            var_95: r2(st.var_95),
            cvar_95: r2(st.cvar_95),
        },
        esg_bonus_applied: r2(s.esg_bonus_applied),
        trials: s.trials,
        seed: s.seed,
        outcomes: None,
        bands: None,
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export trial outcomes as CSV with trial and outcome (percent) columns.
pub fn export_outcomes_csv(outcomes: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trial", "outcome"])?;
    for (i, outcome) in outcomes.iter().enumerate() {
        wtr.write_record([&i.to_string(), &format!("{:.2}", outcome)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export percentile bands as CSV. Day numbering starts at 1.
pub fn export_bands_csv(bands: &PathBands) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["day", "p5", "p50", "p95"])?;
    for (day, ((p5, p50), p95)) in bands
        .p5
        .iter()
        .zip(&bands.p50)
        .zip(&bands.p95)
        .enumerate()
    {
        wtr.write_record([
            &(day + 1).to_string(),
            &format!("{:.2}", p5),
            &format!("{:.2}", p50),
            &format!("{:.2}", p95),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one analysis.
///
/// Creates `analysis_{timestamp}/` under `output_dir` containing:
/// - `report.json` — the rounded `AnalysisReport`
/// - `outcomes.csv` — every trial outcome (when outcomes were kept)
/// - `bands.csv` — per-day percentile bands (when paths were recorded)
/// - `report.md` — Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(
    analysis: &PortfolioAnalysis,
    config: &AnalysisConfig,
    output_dir: &Path,
) -> Result<PathBuf> {
    let report = AnalysisReport::new(analysis, config);
    let dirname = format!("analysis_{}", report.generated_at.format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(&report)?;
    std::fs::write(run_dir.join("report.json"), &json)?;

    if let Some(outcomes) = &analysis.simulation.outcomes {
        std::fs::write(run_dir.join("outcomes.csv"), export_outcomes_csv(outcomes)?)?;
    }

    if let Some(bands) = &analysis.simulation.bands {
        std::fs::write(run_dir.join("bands.csv"), export_bands_csv(bands)?)?;
    }

    std::fs::write(run_dir.join("report.md"), render_markdown(&report))?;

    log::debug!("wrote artifacts to {}", run_dir.display());
    Ok(run_dir)
}

/// Load an `AnalysisReport` from an artifact directory's report.json.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown summary of a report.
pub fn render_markdown(report: &AnalysisReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Portfolio Analysis\n\n");

    md.push_str("## Portfolio\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Holdings | {} |\n", report.holdings));
    md.push_str(&format!("| Total Value | {:.2} |\n", report.total_value));
    md.push_str(&format!(
        "| Weighted ESG Score | {:.2} |\n",
        report.weighted_esg_score
    ));
    if report.defaulted_scores > 0 {
        md.push_str(&format!(
            "| Defaulted Scores | {} |\n",
            report.defaulted_scores
        ));
    }
    md.push_str(&format!("| Generated | {} |\n", report.generated_at.to_rfc3339()));
    md.push_str(&format!("| Config | {} |\n", report.config_fingerprint));
    md.push('\n');

    let m = &report.metrics;
    md.push_str("## Expected Performance\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Expected Return | {:.2}% |\n", m.expected_return));
    md.push_str(&format!("| ESG Bonus | +{:.2}pp |\n", m.esg_bonus));
    md.push_str(&format!(
        "| ESG-Adjusted Return | {:.2}% |\n",
        m.esg_adjusted_return
    ));
    md.push_str(&format!("| Volatility | {:.2}% |\n", m.volatility));
    match m.sharpe_ratio {
        Some(s) => md.push_str(&format!("| Sharpe | {:.3} |\n", s)),
        None => md.push_str("| Sharpe | n/a |\n"),
    }
    md.push_str(&format!("| VaR 95% (analytic) | {:.2}% |\n", m.var_95));
    md.push('\n');

    let b = &report.benchmark;
    md.push_str("## Benchmark\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Benchmark Return | {:.2}% |\n", b.benchmark_return));
    md.push_str(&format!("| Excess Return | {:+.2}% |\n", b.excess_return));
    md.push_str(&format!("| Alpha | {:+.2}% |\n", b.alpha));
    md.push_str(&format!(
        "| Outperforms | {} |\n",
        if b.outperformance { "yes" } else { "no" }
    ));
    md.push('\n');

    let s = &report.simulation;
    let st = &s.stats;
    md.push_str("## Monte Carlo\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Trials | {} |\n", s.trials));
    md.push_str(&format!("| Seed | {} |\n", s.seed));
    md.push_str(&format!("| Mean | {:.2}% |\n", st.mean));
    md.push_str(&format!("| Median | {:.2}% |\n", st.median));
    md.push_str(&format!("| Std Dev | {:.2}% |\n", st.std_dev));
    md.push_str(&format!("| Min / Max | {:.2}% / {:.2}% |\n", st.min, st.max));
    md.push_str(&format!(
        "| 5th / 95th Percentile | {:.2}% / {:.2}% |\n",
        st.percentile_5, st.percentile_95
    ));
    md.push_str(&format!(
        "| Probability Positive | {:.2}% |\n",
        st.prob_positive
    ));
    md.push_str(&format!("| VaR 95% (simulated) | {:.2}% |\n", st.var_95));
    md.push_str(&format!("| CVaR 95% | {:.2}% |\n", st.cvar_95));
    md.push_str(&format!(
        "| ESG Bonus Applied | +{:.2}pp |\n",
        s.esg_bonus_applied
    ));
    md.push('\n');

    md
}
