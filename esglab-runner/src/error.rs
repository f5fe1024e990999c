//! Error taxonomy for an analysis call.

use esglab_core::{ConfigError, PortfolioError};
use thiserror::Error;

/// Failures inside the simulation itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid return distribution: drift {drift}, volatility {volatility}")]
    InvalidDistribution { drift: f64, volatility: f64 },
    #[error("simulation produced no outcomes")]
    NoOutcomes,
}

/// Every way an analysis call can fail. Each is raised before any trial runs,
/// except `Simulation`.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Portfolio(#[from] PortfolioError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Coarse classification for the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidPortfolio,
    InvalidHolding,
    InvalidConfig,
    Simulation,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Portfolio(PortfolioError::InvalidHolding { .. }) => ErrorKind::InvalidHolding,
            Self::Portfolio(_) => ErrorKind::InvalidPortfolio,
            Self::Config(_) => ErrorKind::InvalidConfig,
            Self::Simulation(_) => ErrorKind::Simulation,
        }
    }

    /// True for errors caused by caller input rather than the engine.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Simulation(_))
    }
}
