//! Closed-form portfolio metrics and benchmark comparison.
//!
//! These are analytic siblings of the simulation, computed directly from the
//! portfolio summary and configuration. All figures are percent except the
//! Sharpe-like ratio.

use serde::{Deserialize, Serialize};

use esglab_core::{AnalysisConfig, PortfolioSummary};

/// One-sided 95% z-score used by the analytic VaR.
pub const VAR_95_Z: f64 = 1.645;

/// Volatility (percent) at or below which the Sharpe ratio is undefined.
pub const MIN_VOLATILITY: f64 = 1e-12;

/// Deterministic risk/return figures for a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub expected_return: f64,
    pub volatility: f64,
    /// (expected − risk-free) / volatility. `None` when volatility is zero.
    pub sharpe_ratio: Option<f64>,
    /// Analytic 95% VaR: z·σ − ESG-adjusted return, positive = loss.
    pub var_95: f64,
    pub esg_adjusted_return: f64,
    /// Bonus included in `esg_adjusted_return`, percentage points.
    pub esg_bonus: f64,
    pub weighted_esg_score: f64,
}

impl PortfolioMetrics {
    pub fn compute(summary: &PortfolioSummary, config: &AnalysisConfig) -> Self {
        let expected_return = summary.expected_return * 100.0;
        let volatility = summary.volatility * 100.0;
        let risk_free = config.market.risk_free_rate * 100.0;
        let esg_bonus = config.esg.bonus_for(summary.weighted_esg_score) * 100.0;
        let esg_adjusted_return = expected_return + esg_bonus;

        Self {
            expected_return,
            volatility,
            sharpe_ratio: sharpe_ratio(expected_return, risk_free, volatility),
            var_95: analytic_var_95(esg_adjusted_return, volatility),
            esg_adjusted_return,
            esg_bonus,
            weighted_esg_score: summary.weighted_esg_score,
        }
    }
}

/// Sharpe-like ratio with a guarded denominator.
pub fn sharpe_ratio(expected_return: f64, risk_free: f64, volatility: f64) -> Option<f64> {
    if !volatility.is_finite() || volatility <= MIN_VOLATILITY {
        return None;
    }
    Some((expected_return - risk_free) / volatility)
}

/// Normal-approximation VaR at 95%: −(μ − 1.645σ).
pub fn analytic_var_95(mean: f64, volatility: f64) -> f64 {
    VAR_95_Z * volatility - mean
}

/// Portfolio versus a fixed reference return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub benchmark_return: f64,
    pub portfolio_return: f64,
    /// Expected return minus benchmark.
    pub excess_return: f64,
    /// ESG-adjusted return minus benchmark.
    pub alpha: f64,
    pub outperformance: bool,
}

impl BenchmarkComparison {
    /// `benchmark_return` is in percent.
    pub fn compare(metrics: &PortfolioMetrics, benchmark_return: f64) -> Self {
        let excess_return = metrics.expected_return - benchmark_return;
        Self {
            benchmark_return,
            portfolio_return: metrics.expected_return,
            excess_return,
            alpha: metrics.esg_adjusted_return - benchmark_return,
            outperformance: excess_return > 0.0,
        }
    }
}
