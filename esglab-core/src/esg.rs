//! ESG policy — score-to-bonus mapping, score sources, and the single-company
//! return heuristic.
//!
//! The bonus schedule is business policy, not derived: every threshold and
//! magnitude is a named constant or a configurable tier so tests can assert
//! on them directly.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;

/// Weighted ESG score at or above which the default bonus applies.
pub const ESG_BONUS_THRESHOLD: f64 = 70.0;

/// Default annual return bonus (fraction) for portfolios at or above the threshold.
pub const ESG_BONUS: f64 = 0.02;

/// Score used for holdings that arrive without one.
pub const DEFAULT_ESG_SCORE: f64 = 50.0;

/// Composite weights applied to the three sub-scores.
pub const ENVIRONMENTAL_WEIGHT: f64 = 0.35;
pub const SOCIAL_WEIGHT: f64 = 0.30;
pub const GOVERNANCE_WEIGHT: f64 = 0.35;

// ─── Bonus policy ────────────────────────────────────────────────────

/// One step of the bonus schedule: scores `>= min_score` earn `bonus`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EsgTier {
    pub min_score: f64,
    /// Annual return bonus as a fraction.
    pub bonus: f64,
}

/// Maps a weighted ESG score to an additive annual return bonus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EsgPolicy {
    pub tiers: Vec<EsgTier>,
    /// Score assumed for holdings without one.
    pub default_score: f64,
}

impl Default for EsgPolicy {
    fn default() -> Self {
        Self {
            tiers: vec![EsgTier {
                min_score: ESG_BONUS_THRESHOLD,
                bonus: ESG_BONUS,
            }],
            default_score: DEFAULT_ESG_SCORE,
        }
    }
}

impl EsgPolicy {
    /// Graduated schedule: 80+ → 5%, 70+ → 3.5%, 60+ → 2%.
    pub fn graduated() -> Self {
        Self {
            tiers: vec![
                EsgTier { min_score: 80.0, bonus: 0.05 },
                EsgTier { min_score: 70.0, bonus: 0.035 },
                EsgTier { min_score: 60.0, bonus: 0.02 },
            ],
            default_score: DEFAULT_ESG_SCORE,
        }
    }

    /// A policy that never pays a bonus.
    pub fn none() -> Self {
        Self {
            tiers: Vec::new(),
            default_score: DEFAULT_ESG_SCORE,
        }
    }

    /// Bonus of the highest tier whose threshold the score meets, else 0.
    pub fn bonus_for(&self, score: f64) -> f64 {
        self.tiers
            .iter()
            .filter(|t| score >= t.min_score)
            .max_by(|a, b| a.min_score.total_cmp(&b.min_score))
            .map_or(0.0, |t| t.bonus)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_score.is_finite() || !(0.0..=100.0).contains(&self.default_score) {
            return Err(ConfigError::Invalid(format!(
                "esg.default_score must be within 0..=100, got {}",
                self.default_score
            )));
        }
        for tier in &self.tiers {
            if !tier.min_score.is_finite() || !(0.0..=100.0).contains(&tier.min_score) {
                return Err(ConfigError::Invalid(format!(
                    "esg tier min_score must be within 0..=100, got {}",
                    tier.min_score
                )));
            }
            if !tier.bonus.is_finite() || tier.bonus < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "esg tier bonus must be >= 0, got {}",
                    tier.bonus
                )));
            }
        }
        Ok(())
    }
}

// ─── Score sources ───────────────────────────────────────────────────

/// Environmental, social and governance sub-scores (each 0–100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EsgBreakdown {
    pub environmental: f64,
    pub social: f64,
    pub governance: f64,
}

impl EsgBreakdown {
    pub fn composite(&self) -> f64 {
        self.environmental * ENVIRONMENTAL_WEIGHT
            + self.social * SOCIAL_WEIGHT
            + self.governance * GOVERNANCE_WEIGHT
    }
}

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("scorer unavailable: {0}")]
    Unavailable(String),
    #[error("malformed scorer response: {0}")]
    Malformed(String),
}

/// Text-based ESG scorer (an external classification service).
pub trait EsgScorer: Send + Sync {
    fn score(&self, company: &str, text: &str) -> Result<EsgBreakdown, ScorerError>;
}

/// Lookup of precomputed composite scores by ticker.
pub trait EsgScoreSource {
    fn esg_score(&self, ticker: &str) -> Option<f64>;
}

impl EsgScoreSource for HashMap<String, f64> {
    fn esg_score(&self, ticker: &str) -> Option<f64> {
        self.get(ticker).copied()
    }
}

impl EsgScoreSource for BTreeMap<String, f64> {
    fn esg_score(&self, ticker: &str) -> Option<f64> {
        self.get(ticker).copied()
    }
}

// ─── Single-company return heuristic ─────────────────────────────────

/// Heuristic return estimate for one company.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPrediction {
    /// Predicted annual return, percent.
    pub predicted_return: f64,
    /// Predicted return minus the benchmark, percentage points.
    pub benchmark_delta: f64,
    /// Confidence in the estimate, percent (capped at 95).
    pub confidence: f64,
}

/// Predicts a company's annual return from its ESG score and sector.
///
/// predicted = base + premium(score) × sector multiplier, all in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReturnPredictor {
    pub base_return: f64,
    /// Premium steps in percent, checked from the highest threshold down.
    pub premiums: Vec<EsgTier>,
    /// Premium for scores below every step.
    pub floor_premium: f64,
    pub sector_multipliers: BTreeMap<String, f64>,
    pub benchmark_return: f64,
    /// Standard deviation of the optional noise term, percent.
    pub noise_std: f64,
}

impl Default for ReturnPredictor {
    fn default() -> Self {
        let sector_multipliers = [
            ("Technology", 1.2),
            ("Finance", 0.9),
            ("Energy", 0.85),
            ("Renewable Energy", 1.3),
            ("Healthcare", 1.1),
            ("Consumer", 1.0),
            ("Manufacturing", 0.95),
        ]
        .into_iter()
        .map(|(name, m)| (name.to_string(), m))
        .collect();

        Self {
            base_return: 8.0,
            premiums: vec![
                EsgTier { min_score: 80.0, bonus: 5.0 },
                EsgTier { min_score: 70.0, bonus: 3.5 },
                EsgTier { min_score: 60.0, bonus: 2.0 },
                EsgTier { min_score: 50.0, bonus: 0.5 },
            ],
            floor_premium: -1.0,
            sector_multipliers,
            benchmark_return: 11.0,
            noise_std: 1.5,
        }
    }
}

impl ReturnPredictor {
    pub fn premium(&self, score: f64) -> f64 {
        self.premiums
            .iter()
            .filter(|t| score >= t.min_score)
            .max_by(|a, b| a.min_score.total_cmp(&b.min_score))
            .map_or(self.floor_premium, |t| t.bonus)
    }

    /// Unknown or absent sectors use a multiplier of 1.0.
    pub fn sector_multiplier(&self, sector: Option<&str>) -> f64 {
        sector
            .and_then(|s| self.sector_multipliers.get(s))
            .copied()
            .unwrap_or(1.0)
    }

    /// Deterministic estimate (no noise term).
    pub fn predict(&self, score: f64, sector: Option<&str>) -> ReturnPrediction {
        let predicted = self.base_return + self.premium(score) * self.sector_multiplier(sector);
        self.finish(predicted, score)
    }

    /// Estimate with a N(0, noise_std) term drawn from `rng`.
    ///
    /// Fails when `noise_std` is negative or not finite.
    pub fn predict_with_noise<R: Rng + ?Sized>(
        &self,
        score: f64,
        sector: Option<&str>,
        rng: &mut R,
    ) -> Result<ReturnPrediction, ConfigError> {
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "predictor.noise_std must be >= 0, got {}",
                self.noise_std
            )));
        }
        let dist = Normal::new(0.0, self.noise_std)
            .map_err(|e| ConfigError::Invalid(format!("predictor noise: {e}")))?;
        let base = self.predict(score, sector).predicted_return;
        Ok(self.finish(base + dist.sample(rng), score))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("base_return", self.base_return),
            ("floor_premium", self.floor_premium),
            ("benchmark_return", self.benchmark_return),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "predictor.{name} must be finite, got {value}"
                )));
            }
        }
        for tier in &self.premiums {
            if !tier.min_score.is_finite() || !tier.bonus.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "predictor premium step must be finite, got {} at {}",
                    tier.bonus, tier.min_score
                )));
            }
        }
        for (sector, m) in &self.sector_multipliers {
            if !m.is_finite() || *m < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "predictor multiplier for {sector} must be >= 0, got {m}"
                )));
            }
        }
        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "predictor.noise_std must be >= 0, got {}",
                self.noise_std
            )));
        }
        Ok(())
    }

    fn finish(&self, predicted: f64, score: f64) -> ReturnPrediction {
        ReturnPrediction {
            predicted_return: predicted,
            benchmark_delta: predicted - self.benchmark_return,
            confidence: (70.0 + (score - 50.0) * 0.5).min(95.0),
        }
    }
}
