//! Analysis entry point: one portfolio in, one combined result out.
//!
//! Pipeline: validate config → summarize portfolio (weights, weighted ESG,
//! drift/volatility) → closed-form metrics → benchmark comparison → Monte
//! Carlo trials → outcome statistics. Validation happens before the random
//! source is touched.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use esglab_core::{AnalysisConfig, Portfolio, PortfolioSummary};

use crate::error::{AnalysisError, SimulationError};
use crate::metrics::{BenchmarkComparison, PortfolioMetrics};
use crate::simulation::MonteCarlo;
use crate::stats::{OutcomeStats, PathBands};

/// Aggregate view over every trial of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(flatten)]
    pub stats: OutcomeStats,
    /// Bonus added to every trial, percentage points.
    pub esg_bonus_applied: f64,
    pub trials: usize,
    /// Master seed the trials were derived from.
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<PathBands>,
}

/// Combined result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub summary: PortfolioSummary,
    pub metrics: PortfolioMetrics,
    pub benchmark: BenchmarkComparison,
    pub simulation: SimulationResult,
}

/// Analyze with the configured seed, or OS entropy when none is set.
pub fn analyze_portfolio(
    portfolio: &Portfolio,
    config: &AnalysisConfig,
) -> Result<PortfolioAnalysis, AnalysisError> {
    let mut rng = match config.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    analyze_with_rng(portfolio, config, &mut rng)
}

/// Analyze drawing the master seed from an injected random source.
///
/// Exactly one `u64` is drawn from `rng`, and only after validation passes.
pub fn analyze_with_rng<R: RngCore + ?Sized>(
    portfolio: &Portfolio,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<PortfolioAnalysis, AnalysisError> {
    config.validate()?;
    let summary = portfolio.summarize(&config.market, config.esg.default_score)?;

    let metrics = PortfolioMetrics::compute(&summary, config);
    let benchmark = BenchmarkComparison::compare(&metrics, config.market.benchmark_return * 100.0);

    let master_seed = rng.next_u64();
    let run = MonteCarlo::new(config).run_summary(&summary, master_seed)?;
    let stats = OutcomeStats::from_outcomes(&run.outcomes).ok_or(SimulationError::NoOutcomes)?;
    let bands = run.paths.as_deref().and_then(PathBands::from_paths);

    log::info!(
        "analyzed {} holdings: expected {:.2}%, simulated mean {:.2}% over {} trials (seed {})",
        summary.holdings.len(),
        metrics.expected_return,
        stats.mean,
        stats.count,
        master_seed,
    );

    let simulation = SimulationResult {
        trials: stats.count,
        stats,
        esg_bonus_applied: run.esg_bonus,
        seed: master_seed,
        outcomes: config.simulation.keep_outcomes.then_some(run.outcomes),
        bands,
    };

    Ok(PortfolioAnalysis {
        summary,
        metrics,
        benchmark,
        simulation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use esglab_core::Holding;

    fn sample() -> Portfolio {
        Portfolio::new(vec![
            Holding::new("AAA", 10.0, 100.0).with_esg(72.0),
            Holding::new("BBB", 5.0, 200.0).with_esg(76.0),
        ])
    }

    #[test]
    fn seeded_analysis_is_reproducible() {
        let config = AnalysisConfig::default().with_trials(200).with_seed(11);
        let a = analyze_portfolio(&sample(), &config).unwrap();
        let b = analyze_portfolio(&sample(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn keep_outcomes_false_drops_sequence() {
        let mut config = AnalysisConfig::default().with_trials(50).with_seed(1);
        config.simulation.keep_outcomes = false;
        let a = analyze_portfolio(&sample(), &config).unwrap();
        assert!(a.simulation.outcomes.is_none());
        assert_eq!(a.simulation.trials, 50);
    }

    #[test]
    fn record_paths_yields_bands() {
        let mut config = AnalysisConfig::default().with_trials(40).with_seed(2);
        config.simulation.record_paths = true;
        config.simulation.trading_days = 30;
        let a = analyze_portfolio(&sample(), &config).unwrap();
        let bands = a.simulation.bands.unwrap();
        assert_eq!(bands.len(), 30);
        for t in 0..bands.len() {
            assert!(bands.p5[t] <= bands.p50[t] && bands.p50[t] <= bands.p95[t]);
        }
    }

    #[test]
    fn bonus_reported_on_both_sides() {
        let config = AnalysisConfig::default().with_trials(20).with_seed(3);
        let a = analyze_portfolio(&sample(), &config).unwrap();
        assert_eq!(a.simulation.esg_bonus_applied, a.metrics.esg_bonus);
        assert!((a.metrics.esg_bonus - 2.0).abs() < 1e-12);
    }

    #[test]
    fn result_serializes_flat_stats() {
        let config = AnalysisConfig::default().with_trials(10).with_seed(4);
        let a = analyze_portfolio(&sample(), &config).unwrap();
        let json = serde_json::to_value(&a.simulation).unwrap();
        assert!(json.get("mean").is_some());
        assert!(json.get("percentile_95").is_some());
        let back: SimulationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, a.simulation);
    }
}
