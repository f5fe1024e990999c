//! Monte Carlo orchestrator — fans N independent trials out over the rayon
//! pool and joins their outcomes.
//!
//! Randomness is injected: the caller's RNG supplies exactly one master seed,
//! drawn only after the portfolio and configuration validate. Each trial then
//! owns a generator derived from `(master seed, trial index)`, so no trial
//! shares mutable state with another and a seeded run is reproducible
//! regardless of thread count.

use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use esglab_core::{AnalysisConfig, Portfolio, PortfolioSummary, TrialSeeds};

use super::generator::ReturnGenerator;
use super::path::{simulate_path, simulate_trial};
use crate::error::{AnalysisError, SimulationError};

/// Raw output of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcomes {
    /// Horizon return of each trial in percent, ESG bonus included.
    pub outcomes: Vec<f64>,
    /// Cumulative percent return per period for each trial, without bonus.
    pub paths: Option<Vec<Vec<f64>>>,
    /// Bonus added to every outcome, percentage points.
    pub esg_bonus: f64,
    pub master_seed: u64,
    pub daily_drift: f64,
    pub daily_volatility: f64,
}

/// Runs the configured number of trials for a portfolio.
#[derive(Debug, Clone, Copy)]
pub struct MonteCarlo<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> MonteCarlo<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Validate, draw one master seed from `rng`, and run every trial.
    ///
    /// Invalid configuration or portfolio input fails before `rng` is touched.
    pub fn run<R: RngCore + ?Sized>(
        &self,
        portfolio: &Portfolio,
        rng: &mut R,
    ) -> Result<TrialOutcomes, AnalysisError> {
        self.config.validate()?;
        let summary = portfolio.summarize(&self.config.market, self.config.esg.default_score)?;
        let master_seed = rng.next_u64();
        Ok(self.run_summary(&summary, master_seed)?)
    }

    /// Run every trial for an already-validated summary.
    pub fn run_summary(
        &self,
        summary: &PortfolioSummary,
        master_seed: u64,
    ) -> Result<TrialOutcomes, SimulationError> {
        let sim = &self.config.simulation;
        let horizon = sim.trading_days;
        let generator =
            ReturnGenerator::from_annual(summary.expected_return, summary.volatility, horizon)?;
        let esg_bonus = self.config.esg.bonus_for(summary.weighted_esg_score) * 100.0;
        let seeds = TrialSeeds::new(master_seed);

        log::debug!(
            "running {} trials x {} periods (drift {:.6}, vol {:.6}, bonus {:.2}pp, parallel {})",
            sim.trials,
            horizon,
            generator.daily_drift(),
            generator.daily_volatility(),
            esg_bonus,
            sim.parallel,
        );

        let (outcomes, paths) = if sim.record_paths {
            let paths = self.map_trials(|trial| {
                let mut rng = seeds.rng_for(trial);
                simulate_path(&generator, horizon, &mut rng)
            });
            let outcomes = paths
                .iter()
                .map(|path| path.last().copied().unwrap_or(0.0) + esg_bonus)
                .collect();
            (outcomes, Some(paths))
        } else {
            let outcomes = self.map_trials(|trial| {
                let mut rng = seeds.rng_for(trial);
                simulate_trial(&generator, horizon, &mut rng) + esg_bonus
            });
            (outcomes, None)
        };

        if outcomes.is_empty() {
            return Err(SimulationError::NoOutcomes);
        }

        Ok(TrialOutcomes {
            outcomes,
            paths,
            esg_bonus,
            master_seed,
            daily_drift: generator.daily_drift(),
            daily_volatility: generator.daily_volatility(),
        })
    }

    /// Apply `trial_fn` to every trial index, in index order.
    fn map_trials<T, F>(&self, trial_fn: F) -> Vec<T>
    where
        T: Send,
        F: Fn(u64) -> T + Sync + Send,
    {
        let trials = self.config.simulation.trials;
        if self.config.simulation.parallel {
            (0..trials)
                .into_par_iter()
                .map(|i| trial_fn(i as u64))
                .collect()
        } else {
            (0..trials).map(|i| trial_fn(i as u64)).collect()
        }
    }
}
