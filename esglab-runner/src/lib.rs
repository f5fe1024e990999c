//! ESGLab Runner — Monte Carlo simulation, statistics, metrics, reports.
//!
//! This crate builds on `esglab-core` to provide:
//! - Normal daily-return generator and geometric single-trial compounding
//! - Monte Carlo orchestrator with injected randomness and rayon fan-out
//! - Outcome statistics (percentiles, VaR, CVaR) and per-day path bands
//! - Closed-form portfolio metrics and benchmark comparison
//! - `analyze_portfolio`, the single entry point combining all of the above
//! - JSON/CSV/Markdown export

pub mod analysis;
pub mod error;
pub mod export;
pub mod metrics;
pub mod simulation;
pub mod stats;

pub use analysis::{analyze_portfolio, analyze_with_rng, PortfolioAnalysis, SimulationResult};
pub use error::{AnalysisError, ErrorKind, SimulationError};
pub use export::{
    export_bands_csv, export_json, export_outcomes_csv, import_json, load_artifacts,
    render_markdown, save_artifacts, AnalysisReport, REPORT_DECIMALS, SCHEMA_VERSION,
};
pub use metrics::{BenchmarkComparison, PortfolioMetrics, VAR_95_Z};
pub use simulation::{simulate_path, simulate_trial, MonteCarlo, ReturnGenerator, TrialOutcomes};
pub use stats::{OutcomeStats, PathBands};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn analysis_is_send_sync() {
        assert_send::<PortfolioAnalysis>();
        assert_sync::<PortfolioAnalysis>();
    }

    #[test]
    fn simulation_result_is_send_sync() {
        assert_send::<SimulationResult>();
        assert_sync::<SimulationResult>();
        assert_send::<TrialOutcomes>();
        assert_sync::<TrialOutcomes>();
    }

    #[test]
    fn generator_is_send_sync() {
        assert_send::<ReturnGenerator>();
        assert_sync::<ReturnGenerator>();
    }

    #[test]
    fn orchestrator_is_send_sync() {
        assert_send::<MonteCarlo<'static>>();
        assert_sync::<MonteCarlo<'static>>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<AnalysisError>();
        assert_sync::<AnalysisError>();
    }

    #[test]
    fn report_is_send_sync() {
        assert_send::<AnalysisReport>();
        assert_sync::<AnalysisReport>();
    }
}
