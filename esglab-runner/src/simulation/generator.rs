//! Normally distributed daily returns.
//!
//! Returns are fractional daily changes (0.001 = +0.1%).

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::SimulationError;

/// Draws daily returns from N(drift, volatility²).
#[derive(Debug, Clone, Copy)]
pub struct ReturnGenerator {
    dist: Normal<f64>,
    daily_drift: f64,
    daily_volatility: f64,
}

impl ReturnGenerator {
    pub fn new(daily_drift: f64, daily_volatility: f64) -> Result<Self, SimulationError> {
        let invalid = SimulationError::InvalidDistribution {
            drift: daily_drift,
            volatility: daily_volatility,
        };
        // Normal::new accepts a negative σ.
        if !daily_drift.is_finite() || !daily_volatility.is_finite() || daily_volatility < 0.0 {
            return Err(invalid);
        }
        let dist = Normal::new(daily_drift, daily_volatility).map_err(|_| invalid)?;
        Ok(Self {
            dist,
            daily_drift,
            daily_volatility,
        })
    }

    /// Collapse annual figures to daily parameters over `periods` steps.
    ///
    /// The drift is the geometric equivalent, (1 + μ)^(1/n) − 1, so the
    /// expected compounded return over the horizon equals `annual_return`.
    /// Volatility scales with √n.
    pub fn from_annual(
        annual_return: f64,
        annual_volatility: f64,
        periods: usize,
    ) -> Result<Self, SimulationError> {
        if periods == 0
            || annual_return <= -1.0
            || !annual_volatility.is_finite()
            || annual_volatility < 0.0
        {
            return Err(SimulationError::InvalidDistribution {
                drift: annual_return,
                volatility: annual_volatility,
            });
        }
        let n = periods as f64;
        let daily_drift = (1.0 + annual_return).powf(1.0 / n) - 1.0;
        let daily_volatility = annual_volatility / n.sqrt();
        Self::new(daily_drift, daily_volatility)
    }

    pub fn daily_drift(&self) -> f64 {
        self.daily_drift
    }

    pub fn daily_volatility(&self) -> f64 {
        self.daily_volatility
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.dist.sample(rng)
    }

    /// Lazy, unbounded sequence of daily returns drawn from `rng`.
    pub fn returns<'a, R: Rng + ?Sized>(&'a self, rng: &'a mut R) -> impl Iterator<Item = f64> + 'a {
        std::iter::repeat_with(move || self.dist.sample(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn negative_volatility_rejected() {
        assert!(ReturnGenerator::new(0.0, -0.01).is_err());
        assert!(ReturnGenerator::new(f64::NAN, 0.01).is_err());
        assert!(ReturnGenerator::new(0.001, f64::INFINITY).is_err());
    }

    #[test]
    fn negative_annual_volatility_rejected() {
        let err = ReturnGenerator::from_annual(0.12, -0.15, 252).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InvalidDistribution { volatility, .. } if volatility == -0.15
        ));
        assert!(ReturnGenerator::from_annual(0.12, f64::NAN, 252).is_err());
        assert!(ReturnGenerator::from_annual(0.12, 0.0, 252).is_ok());
    }

    #[test]
    fn zero_volatility_returns_drift() {
        let g = ReturnGenerator::new(0.001, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(g.returns(&mut rng).take(10).all(|r| r == 0.001));
    }

    #[test]
    fn annual_parameters_collapse_to_daily() {
        let g = ReturnGenerator::from_annual(0.12, 0.15, 252).unwrap();
        assert!(((1.0 + g.daily_drift()).powi(252) - 1.12).abs() < 1e-12);
        assert!((g.daily_volatility() - 0.15 / 252f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn total_loss_annual_return_rejected() {
        assert!(ReturnGenerator::from_annual(-1.0, 0.15, 252).is_err());
        assert!(ReturnGenerator::from_annual(0.1, 0.15, 0).is_err());
    }

    #[test]
    fn sample_moments_match_parameters() {
        let g = ReturnGenerator::new(0.0005, 0.01).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let draws: Vec<f64> = g.returns(&mut rng).take(200_000).collect();
        let n = draws.len() as f64;
        let mean = draws.iter().sum::<f64>() / n;
        let var = draws.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert!((mean - 0.0005).abs() < 1e-4, "mean {mean}");
        assert!((var.sqrt() - 0.01).abs() < 2e-4, "std {}", var.sqrt());
    }

    #[test]
    fn seeded_draws_reproduce() {
        let g = ReturnGenerator::new(0.0, 0.02).unwrap();
        let a: Vec<f64> = g.returns(&mut StdRng::seed_from_u64(9)).take(20).collect();
        let b: Vec<f64> = g.returns(&mut StdRng::seed_from_u64(9)).take(20).collect();
        assert_eq!(a, b);
        assert_eq!(g.draw(&mut StdRng::seed_from_u64(9)), a[0]);
    }
}
