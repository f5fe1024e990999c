//! A single position submitted for analysis.

use serde::{Deserialize, Serialize};

use super::portfolio::PortfolioError;
use crate::esg::EsgBreakdown;

/// A single position: ticker, share count, average cost basis and optional
/// ESG score. Holdings are immutable inputs to analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    /// Average cost basis per share, in currency units.
    pub avg_cost: f64,
    /// Composite ESG score (0–100). Absent scores fall back to the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esg_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Expected annual return as a fraction. Overrides the market assumption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_return: Option<f64>,
    /// Annual volatility as a fraction. Overrides the market assumption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, shares: f64, avg_cost: f64) -> Self {
        Self {
            ticker: ticker.into(),
            shares,
            avg_cost,
            esg_score: None,
            sector: None,
            expected_return: None,
            volatility: None,
        }
    }

    pub fn with_esg(mut self, score: f64) -> Self {
        self.esg_score = Some(score);
        self
    }

    /// Use the composite of a scorer's sub-scores.
    pub fn with_breakdown(self, breakdown: &EsgBreakdown) -> Self {
        self.with_esg(breakdown.composite())
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_expected_return(mut self, expected_return: f64) -> Self {
        self.expected_return = Some(expected_return);
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Position value at cost: shares × average cost.
    pub fn value(&self) -> f64 {
        self.shares * self.avg_cost
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), PortfolioError> {
        let invalid = |reason: String| PortfolioError::InvalidHolding {
            ticker: self.ticker.clone(),
            reason,
        };

        if !self.shares.is_finite() || self.shares < 0.0 {
            return Err(invalid(format!("shares must be >= 0, got {}", self.shares)));
        }
        if !self.avg_cost.is_finite() || self.avg_cost < 0.0 {
            return Err(invalid(format!(
                "average cost must be >= 0, got {}",
                self.avg_cost
            )));
        }
        if let Some(score) = self.esg_score {
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(invalid(format!("ESG score must be within 0..=100, got {score}")));
            }
        }
        if let Some(mu) = self.expected_return {
            if !mu.is_finite() || mu <= -1.0 {
                return Err(invalid(format!("expected return must be > -1, got {mu}")));
            }
        }
        if let Some(sigma) = self.volatility {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(invalid(format!("volatility must be >= 0, got {sigma}")));
            }
        }
        Ok(())
    }
}
