//! Analysis configuration — market assumptions, simulation settings and ESG
//! policy, loadable from TOML.
//!
//! Rates are annual fractions (0.12 = 12%). Every section defaults, so an
//! empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::esg::EsgPolicy;

/// Trading periods in one holding-period year.
pub const TRADING_DAYS_PER_YEAR: usize = 252;

/// Monte Carlo trials per analysis.
pub const DEFAULT_TRIALS: usize = 1000;

pub const DEFAULT_EXPECTED_RETURN: f64 = 0.12;
pub const DEFAULT_VOLATILITY: f64 = 0.15;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.05;
pub const DEFAULT_BENCHMARK_RETURN: f64 = 0.11;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Market-wide assumptions used where a holding carries no override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketAssumptions {
    pub expected_return: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub benchmark_return: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            expected_return: DEFAULT_EXPECTED_RETURN,
            volatility: DEFAULT_VOLATILITY,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            benchmark_return: DEFAULT_BENCHMARK_RETURN,
        }
    }
}

/// Monte Carlo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub trials: usize,
    pub trading_days: usize,
    /// Fixed master seed. `None` seeds from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Run trials on the rayon pool.
    pub parallel: bool,
    /// Keep every trial outcome in the result.
    pub keep_outcomes: bool,
    /// Record per-day paths and reduce them to percentile bands.
    pub record_paths: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            trading_days: TRADING_DAYS_PER_YEAR,
            seed: None,
            parallel: true,
            keep_outcomes: true,
            record_paths: false,
        }
    }
}

/// Complete configuration for one analysis call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub market: MarketAssumptions,
    pub simulation: SimulationConfig,
    pub esg: EsgPolicy,
}

impl AnalysisConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.simulation.seed = Some(seed);
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.simulation.trials = trials;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.trials == 0 {
            return Err(ConfigError::Invalid("simulation.trials must be > 0".into()));
        }
        if sim.trading_days == 0 {
            return Err(ConfigError::Invalid(
                "simulation.trading_days must be > 0".into(),
            ));
        }

        let m = &self.market;
        if !m.expected_return.is_finite() || m.expected_return <= -1.0 {
            return Err(ConfigError::Invalid(format!(
                "market.expected_return must be > -1, got {}",
                m.expected_return
            )));
        }
        if !m.volatility.is_finite() || m.volatility < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "market.volatility must be >= 0, got {}",
                m.volatility
            )));
        }
        if !m.risk_free_rate.is_finite() {
            return Err(ConfigError::Invalid("market.risk_free_rate must be finite".into()));
        }
        if !m.benchmark_return.is_finite() {
            return Err(ConfigError::Invalid("market.benchmark_return must be finite".into()));
        }

        self.esg.validate()
    }

    /// BLAKE3 hex digest of the canonical JSON form.
    ///
    /// Two analyses with the same fingerprint ran under identical assumptions.
    pub fn fingerprint(&self) -> String {
        // Struct fields serialize in declaration order, so the JSON is canonical.
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
