//! ESGLab CLI — portfolio analysis, configuration and return prediction.
//!
//! Commands:
//! - `analyze` — run closed-form metrics and the Monte Carlo simulation for a portfolio file
//! - `config` — print the default configuration as TOML
//! - `predict` — single-company return estimate from an ESG score and sector

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use esglab_core::{AnalysisConfig, EsgPolicy, Portfolio, ReturnPredictor};
use esglab_runner::{analyze_portfolio, save_artifacts, PortfolioAnalysis};

#[derive(Parser)]
#[command(
    name = "esglab",
    about = "ESGLab CLI — ESG-aware portfolio risk/return simulation"
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a portfolio file (JSON or TOML with a `holdings` list).
    Analyze {
        /// Path to the portfolio file.
        #[arg(long)]
        portfolio: PathBuf,

        /// Path to a TOML config file. Defaults to built-in assumptions.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Master seed for a reproducible run.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of Monte Carlo trials.
        #[arg(long)]
        trials: Option<usize>,

        /// JSON map of ticker → ESG score for holdings without one.
        #[arg(long)]
        scores: Option<PathBuf>,

        /// Estimate missing expected returns from ESG score and sector.
        #[arg(long, default_value_t = false)]
        predict_returns: bool,

        /// Record daily paths and export percentile bands.
        #[arg(long, default_value_t = false)]
        bands: bool,

        /// Output directory for report artifacts.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    Config {
        /// Use the graduated ESG bonus schedule.
        #[arg(long, default_value_t = false)]
        graduated: bool,
    },
    /// Predict one company's annual return from its ESG score.
    Predict {
        /// Composite ESG score (0–100).
        #[arg(long)]
        score: f64,

        /// Sector name, e.g. "Technology" or "Renewable Energy".
        #[arg(long)]
        sector: Option<String>,

        /// Add seeded noise to the estimate.
        #[arg(long)]
        noise_seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs)?;

    match cli.command {
        Commands::Analyze {
            portfolio,
            config,
            seed,
            trials,
            scores,
            predict_returns,
            bands,
            output_dir,
        } => run_analyze(
            &portfolio,
            config.as_deref(),
            seed,
            trials,
            scores.as_deref(),
            predict_returns,
            bands,
            output_dir.as_deref(),
        ),
        Commands::Config { graduated } => run_config(graduated),
        Commands::Predict {
            score,
            sector,
            noise_seed,
        } => run_predict(score, sector.as_deref(), noise_seed),
    }
}

fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    portfolio_path: &Path,
    config_path: Option<&Path>,
    seed: Option<u64>,
    trials: Option<usize>,
    scores_path: Option<&Path>,
    predict_returns: bool,
    bands: bool,
    output_dir: Option<&Path>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if let Some(trials) = trials {
        config = config.with_trials(trials);
    }
    if bands {
        config.simulation.record_paths = true;
    }
    config.validate()?;

    let mut portfolio = load_portfolio(portfolio_path)?;
    tracing::info!(
        holdings = portfolio.len(),
        path = %portfolio_path.display(),
        "loaded portfolio"
    );

    if let Some(path) = scores_path {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let scores: HashMap<String, f64> =
            serde_json::from_str(&text).context("scores file must be a JSON map of ticker to score")?;
        let filled = portfolio.fill_scores(&scores);
        tracing::info!(filled, "applied ESG scores");
    }

    if predict_returns {
        let filled =
            portfolio.fill_predicted_returns(&ReturnPredictor::default(), config.esg.default_score);
        tracing::info!(filled, "predicted expected returns");
    }

    let analysis = analyze_portfolio(&portfolio, &config).context("analysis failed")?;
    print_summary(&analysis);

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&analysis, &config, dir)?;
        println!("\nArtifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn load_portfolio(path: &Path) -> Result<Portfolio> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read portfolio {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text).context("invalid portfolio JSON"),
        Some("toml") => toml::from_str(&text).context("invalid portfolio TOML"),
        _ => bail!(
            "unsupported portfolio format: {} (expected .json or .toml)",
            path.display()
        ),
    }
}

fn print_summary(a: &PortfolioAnalysis) {
    let m = &a.metrics;
    let b = &a.benchmark;
    let s = &a.simulation.stats;

    println!("=== Portfolio Analysis ===");
    println!("Holdings:            {}", a.summary.holdings.len());
    println!("Total value:         {:.2}", a.summary.total_value);
    println!("Weighted ESG:        {:.2}", a.summary.weighted_esg_score);
    println!();
    println!("Expected return:     {:.2}%", m.expected_return);
    println!("ESG bonus:           +{:.2}pp", m.esg_bonus);
    println!("ESG-adjusted return: {:.2}%", m.esg_adjusted_return);
    println!("Volatility:          {:.2}%", m.volatility);
    match m.sharpe_ratio {
        Some(sharpe) => println!("Sharpe:              {:.3}", sharpe),
        None => println!("Sharpe:              n/a"),
    }
    println!("VaR 95% (analytic):  {:.2}%", m.var_95);
    println!();
    println!("Benchmark:           {:.2}%", b.benchmark_return);
    println!("Excess return:       {:+.2}%", b.excess_return);
    println!("Alpha:               {:+.2}%", b.alpha);
    println!(
        "Outperforms:         {}",
        if b.outperformance { "yes" } else { "no" }
    );
    println!();
    println!(
        "Monte Carlo:         {} trials (seed {})",
        a.simulation.trials, a.simulation.seed
    );
    println!("Mean / median:       {:.2}% / {:.2}%", s.mean, s.median);
    println!("Std dev:             {:.2}%", s.std_dev);
    println!(
        "5th / 95th pct:      {:.2}% / {:.2}%",
        s.percentile_5, s.percentile_95
    );
    println!("Min / max:           {:.2}% / {:.2}%", s.min, s.max);
    println!("P(return > 0):       {:.2}%", s.prob_positive);
    println!("VaR 95% (simulated): {:.2}%", s.var_95);
    println!("CVaR 95%:            {:.2}%", s.cvar_95);
}

fn run_config(graduated: bool) -> Result<()> {
    let config = if graduated {
        AnalysisConfig {
            esg: EsgPolicy::graduated(),
            ..AnalysisConfig::default()
        }
    } else {
        AnalysisConfig::default()
    };
    print!("{}", config.to_toml()?);
    Ok(())
}

fn run_predict(score: f64, sector: Option<&str>, noise_seed: Option<u64>) -> Result<()> {
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        bail!("--score must be within 0..=100, got {score}");
    }
    let predictor = ReturnPredictor::default();
    predictor.validate()?;
    let prediction = match noise_seed {
        Some(seed) => {
            predictor.predict_with_noise(score, sector, &mut StdRng::seed_from_u64(seed))?
        }
        None => predictor.predict(score, sector),
    };
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(())
}
