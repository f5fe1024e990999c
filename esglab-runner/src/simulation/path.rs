//! Geometric compounding of daily draws over the holding horizon.

use rand::Rng;

use super::generator::ReturnGenerator;

/// Compound `horizon` daily draws and return the horizon return in percent.
///
/// cumulative = Π(1 + rₜ); outcome = (cumulative − 1) × 100.
pub fn simulate_trial<R: Rng + ?Sized>(
    generator: &ReturnGenerator,
    horizon: usize,
    rng: &mut R,
) -> f64 {
    let cumulative = generator
        .returns(rng)
        .take(horizon)
        .fold(1.0, |acc, r| acc * (1.0 + r));
    (cumulative - 1.0) * 100.0
}

/// Same draws as `simulate_trial`, keeping the cumulative percent return
/// after every period. The last element equals the trial outcome.
pub fn simulate_path<R: Rng + ?Sized>(
    generator: &ReturnGenerator,
    horizon: usize,
    rng: &mut R,
) -> Vec<f64> {
    generator
        .returns(rng)
        .take(horizon)
        .scan(1.0, |cumulative, r| {
            *cumulative *= 1.0 + r;
            Some((*cumulative - 1.0) * 100.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn deterministic_drift_compounds_geometrically() {
        let g = ReturnGenerator::new(0.01, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = simulate_trial(&g, 10, &mut rng);
        let expected = (1.01f64.powi(10) - 1.0) * 100.0;
        assert!((outcome - expected).abs() < 1e-9);
        // Linear summation would give exactly 10%.
        assert!(outcome > 10.0 + 0.4);
    }

    #[test]
    fn zero_horizon_is_zero_return() {
        let g = ReturnGenerator::new(0.01, 0.02).unwrap();
        assert_eq!(simulate_trial(&g, 0, &mut StdRng::seed_from_u64(0)), 0.0);
        assert!(simulate_path(&g, 0, &mut StdRng::seed_from_u64(0)).is_empty());
    }

    #[test]
    fn path_ends_at_trial_outcome() {
        let g = ReturnGenerator::from_annual(0.12, 0.15, 252).unwrap();
        let outcome = simulate_trial(&g, 252, &mut StdRng::seed_from_u64(5));
        let path = simulate_path(&g, 252, &mut StdRng::seed_from_u64(5));
        assert_eq!(path.len(), 252);
        assert!((path[251] - outcome).abs() < 1e-9);
    }

    #[test]
    fn returns_manual_compounding_of_draws() {
        let g = ReturnGenerator::new(0.0, 0.02).unwrap();
        let draws: Vec<f64> = g.returns(&mut StdRng::seed_from_u64(11)).take(5).collect();
        let manual = (draws.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0) * 100.0;
        let outcome = simulate_trial(&g, 5, &mut StdRng::seed_from_u64(11));
        assert!((manual - outcome).abs() < 1e-12);
    }
}
