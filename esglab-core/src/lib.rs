//! ESGLab Core — domain types, configuration, ESG policy and seeding for the
//! portfolio analysis engine.
//!
//! This crate contains everything the simulation needs as input:
//! - Holdings and portfolios, with the validation gate `Portfolio::summarize`
//! - ESG bonus policy, score sources and the single-company return heuristic
//! - `AnalysisConfig` (market assumptions, simulation settings, ESG policy) loaded from TOML
//! - Deterministic per-trial seed derivation

pub mod config;
pub mod domain;
pub mod esg;
pub mod rng;

pub use config::{AnalysisConfig, ConfigError, MarketAssumptions, SimulationConfig};
pub use domain::{Holding, HoldingWeight, Portfolio, PortfolioError, PortfolioSummary};
pub use esg::{
    EsgBreakdown, EsgPolicy, EsgScoreSource, EsgScorer, EsgTier, ReturnPrediction,
    ReturnPredictor, ScorerError,
};
pub use rng::TrialSeeds;
