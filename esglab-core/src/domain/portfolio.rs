//! Portfolio — ordered collection of holdings, and its validated summary.
//!
//! `Portfolio::summarize` is the single validation gate for analysis: an empty
//! portfolio, a holding with out-of-range fields, or a portfolio whose total
//! value is not strictly positive is rejected before any weight is computed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::holding::Holding;
use crate::config::MarketAssumptions;
use crate::esg::{EsgScoreSource, ReturnPredictor};

/// Errors raised while validating a portfolio for analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
    #[error("portfolio has no holdings")]
    Empty,
    #[error("portfolio total value must be positive, got {total}")]
    NonPositiveValue { total: f64 },
    #[error("invalid holding {ticker}: {reason}")]
    InvalidHolding { ticker: String, reason: String },
}

/// Ordered collection of holdings submitted for analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,
}

/// Per-holding view inside a `PortfolioSummary`, with defaults resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingWeight {
    pub ticker: String,
    pub value: f64,
    pub weight: f64,
    pub esg_score: f64,
    pub expected_return: f64,
    pub volatility: f64,
}

/// Validated, value-weighted aggregates of a portfolio.
///
/// Return and volatility figures are annual fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub holdings: Vec<HoldingWeight>,
    pub weighted_esg_score: f64,
    pub expected_return: f64,
    /// Weighted sum of per-holding volatilities (perfect-correlation bound).
    pub volatility: f64,
    /// Number of holdings whose ESG score was replaced by the fallback.
    pub defaulted_scores: usize,
}

impl Portfolio {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Σ shares × cost basis. Not validated.
    pub fn total_value(&self) -> f64 {
        self.holdings.iter().map(Holding::value).sum()
    }

    /// Validate and reduce the portfolio to value-weighted aggregates.
    pub fn summarize(
        &self,
        market: &MarketAssumptions,
        default_esg: f64,
    ) -> Result<PortfolioSummary, PortfolioError> {
        if self.holdings.is_empty() {
            return Err(PortfolioError::Empty);
        }
        for holding in &self.holdings {
            holding.validate()?;
        }

        let total_value = self.total_value();
        if !total_value.is_finite() || total_value <= 0.0 {
            return Err(PortfolioError::NonPositiveValue { total: total_value });
        }

        let mut defaulted_scores = 0;
        let holdings: Vec<HoldingWeight> = self
            .holdings
            .iter()
            .map(|h| {
                let esg_score = h.esg_score.unwrap_or_else(|| {
                    defaulted_scores += 1;
                    default_esg
                });
                HoldingWeight {
                    ticker: h.ticker.clone(),
                    value: h.value(),
                    weight: h.value() / total_value,
                    esg_score,
                    expected_return: h.expected_return.unwrap_or(market.expected_return),
                    volatility: h.volatility.unwrap_or(market.volatility),
                }
            })
            .collect();

        if defaulted_scores > 0 {
            log::warn!(
                "{defaulted_scores} of {} holdings have no ESG score; using fallback {default_esg}",
                holdings.len()
            );
        }

        // Σ(value·x)/total, clamped to the range of positively weighted
        // inputs: uniform inputs reproduce exactly.
        let weighted = |f: fn(&HoldingWeight) -> f64| -> f64 {
            let (lo, hi) = holdings
                .iter()
                .filter(|h| h.value > 0.0)
                .map(f)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                    (lo.min(x), hi.max(x))
                });
            let avg = holdings.iter().map(|h| h.value * f(h)).sum::<f64>() / total_value;
            if lo <= hi {
                avg.clamp(lo, hi)
            } else {
                avg
            }
        };

        Ok(PortfolioSummary {
            total_value,
            weighted_esg_score: weighted(|h| h.esg_score),
            expected_return: weighted(|h| h.expected_return),
            volatility: weighted(|h| h.volatility),
            defaulted_scores,
            holdings,
        })
    }

    /// Fill absent ESG scores from `source`. Returns the number filled.
    pub fn fill_scores<S: EsgScoreSource + ?Sized>(&mut self, source: &S) -> usize {
        let mut filled = 0;
        for holding in self.holdings.iter_mut().filter(|h| h.esg_score.is_none()) {
            if let Some(score) = source.esg_score(&holding.ticker) {
                holding.esg_score = Some(score);
                filled += 1;
            }
        }
        filled
    }

    /// Fill absent expected returns with the predictor's heuristic estimate.
    /// Returns the number filled.
    pub fn fill_predicted_returns(&mut self, predictor: &ReturnPredictor, default_esg: f64) -> usize {
        let mut filled = 0;
        for holding in self
            .holdings
            .iter_mut()
            .filter(|h| h.expected_return.is_none())
        {
            let score = holding.esg_score.unwrap_or(default_esg);
            let prediction = predictor.predict(score, holding.sector.as_deref());
            holding.expected_return = Some(prediction.predicted_return / 100.0);
            filled += 1;
        }
        filled
    }
}

impl FromIterator<Holding> for Portfolio {
    fn from_iter<I: IntoIterator<Item = Holding>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample() -> Portfolio {
        Portfolio::new(vec![
            Holding::new("TCS", 50.0, 3800.0).with_esg(85.0),
            Holding::new("INFY", 40.0, 1500.0).with_esg(83.0),
            Holding::new("HDFCBANK", 75.0, 1600.0).with_esg(78.0),
        ])
    }

    #[test]
    fn empty_portfolio_rejected() {
        let err = Portfolio::default()
            .summarize(&MarketAssumptions::default(), 50.0)
            .unwrap_err();
        assert_eq!(err, PortfolioError::Empty);
    }

    #[test]
    fn zero_value_portfolio_rejected() {
        let p = Portfolio::new(vec![Holding::new("TCS", 0.0, 0.0)]);
        let err = p.summarize(&MarketAssumptions::default(), 50.0).unwrap_err();
        assert!(matches!(err, PortfolioError::NonPositiveValue { total } if total == 0.0));
    }

    #[test]
    fn invalid_holding_surfaces_before_value_check() {
        let p = Portfolio::new(vec![
            Holding::new("TCS", 10.0, 100.0),
            Holding::new("BAD", -3.0, 100.0),
        ]);
        let err = p.summarize(&MarketAssumptions::default(), 50.0).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidHolding { ref ticker, .. } if ticker == "BAD"));
    }

    #[test]
    fn weights_and_weighted_esg() {
        let s = sample().summarize(&MarketAssumptions::default(), 50.0).unwrap();
        assert_eq!(s.total_value, 370_000.0);
        let weight_sum: f64 = s.holdings.iter().map(|h| h.weight).sum();
        assert!((weight_sum - 1.0).abs() < 1e-12);
        assert!((s.holdings[0].weight - 190_000.0 / 370_000.0).abs() < 1e-12);

        let expected = (85.0 * 190_000.0 + 83.0 * 60_000.0 + 78.0 * 120_000.0) / 370_000.0;
        assert!((s.weighted_esg_score - expected).abs() < 1e-9);
        assert!(s.weighted_esg_score > 82.0 && s.weighted_esg_score < 83.0);
        assert_eq!(s.defaulted_scores, 0);
    }

    #[test]
    fn defaults_resolved_from_market_and_fallback() {
        let p = Portfolio::new(vec![
            Holding::new("A", 1.0, 100.0),
            Holding::new("B", 1.0, 100.0)
                .with_esg(90.0)
                .with_expected_return(0.20)
                .with_volatility(0.25),
        ]);
        let market = MarketAssumptions::default();
        let s = p.summarize(&market, 50.0).unwrap();
        assert_eq!(s.defaulted_scores, 1);
        assert!((s.weighted_esg_score - 70.0).abs() < 1e-12);
        assert!((s.expected_return - (market.expected_return + 0.20) / 2.0).abs() < 1e-12);
        assert!((s.volatility - (market.volatility + 0.25) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_share_holding_gets_zero_weight() {
        let p = Portfolio::new(vec![
            Holding::new("A", 0.0, 100.0).with_esg(10.0),
            Holding::new("B", 5.0, 100.0).with_esg(90.0),
        ]);
        let s = p.summarize(&MarketAssumptions::default(), 50.0).unwrap();
        assert_eq!(s.holdings[0].weight, 0.0);
        assert!((s.weighted_esg_score - 90.0).abs() < 1e-12);
    }

    #[test]
    fn fill_scores_only_touches_missing() {
        let mut p = Portfolio::new(vec![
            Holding::new("A", 1.0, 1.0),
            Holding::new("B", 1.0, 1.0).with_esg(40.0),
            Holding::new("C", 1.0, 1.0),
        ]);
        let mut scores = HashMap::new();
        scores.insert("A".to_string(), 72.0);
        scores.insert("B".to_string(), 99.0);

        assert_eq!(p.fill_scores(&scores), 1);
        assert_eq!(p.holdings[0].esg_score, Some(72.0));
        assert_eq!(p.holdings[1].esg_score, Some(40.0));
        assert_eq!(p.holdings[2].esg_score, None);
    }

    #[test]
    fn fill_predicted_returns_uses_score_and_sector() {
        let mut p = Portfolio::new(vec![
            Holding::new("A", 1.0, 1.0).with_esg(85.0).with_sector("Technology"),
            Holding::new("B", 1.0, 1.0).with_expected_return(0.07),
        ]);
        assert_eq!(p.fill_predicted_returns(&ReturnPredictor::default(), 50.0), 1);
        // 8.0 + 5.0 * 1.2 = 14.0%
        assert!((p.holdings[0].expected_return.unwrap() - 0.14).abs() < 1e-12);
        assert_eq!(p.holdings[1].expected_return, Some(0.07));
    }

    #[test]
    fn uniform_scores_reproduce_exactly_under_uneven_weights() {
        let p = Portfolio::new(vec![
            Holding::new("A", 7.0, 1536.12).with_esg(70.0),
            Holding::new("B", 13.0, 3259.59).with_esg(70.0),
            Holding::new("C", 124.0, 3685.59).with_esg(70.0),
            Holding::new("D", 190.0, 878.13).with_esg(70.0),
        ]);
        let s = p.summarize(&MarketAssumptions::default(), 50.0).unwrap();
        assert_eq!(s.weighted_esg_score, 70.0);
        assert_eq!(s.expected_return, MarketAssumptions::default().expected_return);
    }

    #[test]
    fn uniform_scores_sweep_never_drops_below_input() {
        // Deterministic spread of share/cost pairs across many sizes.
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        for _ in 0..5000 {
            let n = 2 + (next() % 6) as usize;
            let holdings = (0..n)
                .map(|i| {
                    let shares = 1.0 + (next() % 200) as f64;
                    let cost = 1.0 + (next() % 400_000) as f64 / 100.0;
                    Holding::new(format!("H{i}"), shares, cost).with_esg(70.0)
                })
                .collect();
            let s = Portfolio::new(holdings)
                .summarize(&MarketAssumptions::default(), 50.0)
                .unwrap();
            assert_eq!(s.weighted_esg_score, 70.0);
        }
    }
}
