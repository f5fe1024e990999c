//! Pure reductions over the trial outcome distribution.
//!
//! Conventions:
//! - Standard deviation is the **sample** standard deviation (divides by N − 1);
//!   a single outcome has zero spread.
//! - Percentiles interpolate linearly between order statistics, with rank
//!   p/100 × (N − 1).
//! - VaR and CVaR are reported as positive loss figures: `var_95 = −p5`,
//!   `cvar_95 = −mean(worst 5%)`. A negative value means even the tail gains.
//! - Nothing is rounded here; rounding happens only in `export`.

use serde::{Deserialize, Serialize};

/// Summary statistics of a set of trial outcomes (percent returns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    /// Share of outcomes strictly above zero, percent.
    pub prob_positive: f64,
    pub var_95: f64,
    pub cvar_95: f64,
}

impl OutcomeStats {
    /// Reduce `outcomes`. Returns `None` for an empty slice.
    pub fn from_outcomes(outcomes: &[f64]) -> Option<Self> {
        if outcomes.is_empty() {
            return None;
        }

        let mut sorted = outcomes.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let p5 = percentile_sorted(&sorted, 5.0);
        let positives = sorted.iter().filter(|&&x| x > 0.0).count();

        Some(Self {
            count: n,
            mean: mean(&sorted),
            std_dev: sample_std_dev(&sorted),
            min: sorted[0],
            max: sorted[n - 1],
            median: percentile_sorted(&sorted, 50.0),
            percentile_5: p5,
            percentile_95: percentile_sorted(&sorted, 95.0),
            prob_positive: positives as f64 / n as f64 * 100.0,
            var_95: -p5,
            cvar_95: -tail_mean(&sorted, 5),
        })
    }
}

/// Per-period percentile bands across simulated paths, for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathBands {
    pub p5: Vec<f64>,
    pub p50: Vec<f64>,
    pub p95: Vec<f64>,
}

impl PathBands {
    /// Reduce equal-length paths to 5th/50th/95th percentile series.
    ///
    /// Paths shorter than the first are ignored past their end.
    pub fn from_paths(paths: &[Vec<f64>]) -> Option<Self> {
        let horizon = paths.first()?.len();
        let mut bands = Self {
            p5: Vec::with_capacity(horizon),
            p50: Vec::with_capacity(horizon),
            p95: Vec::with_capacity(horizon),
        };
        let mut column = Vec::with_capacity(paths.len());
        for t in 0..horizon {
            column.clear();
            column.extend(paths.iter().filter_map(|p| p.get(t).copied()));
            column.sort_by(|a, b| a.total_cmp(b));
            bands.p5.push(percentile_sorted(&column, 5.0));
            bands.p50.push(percentile_sorted(&column, 50.0));
            bands.p95.push(percentile_sorted(&column, 95.0));
        }
        Some(bands)
    }

    pub fn len(&self) -> usize {
        self.p50.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p50.is_empty()
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N − 1 denominator). Zero for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Percentile of a sorted slice using linear interpolation.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

/// Mean of the lowest `percent`% of a sorted slice (at least one value).
fn tail_mean(sorted: &[f64], percent: usize) -> f64 {
    let cutoff = (sorted.len() * percent).div_ceil(100).clamp(1, sorted.len());
    mean(&sorted[..cutoff])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_outcomes_is_none() {
        assert!(OutcomeStats::from_outcomes(&[]).is_none());
    }

    #[test]
    fn single_outcome_degenerate() {
        let s = OutcomeStats::from_outcomes(&[4.2]).unwrap();
        assert_eq!(s.mean, 4.2);
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.min, 4.2);
        assert_eq!(s.max, 4.2);
        assert_eq!(s.percentile_5, 4.2);
        assert_eq!(s.percentile_95, 4.2);
        assert_eq!(s.prob_positive, 100.0);
        assert_eq!(s.var_95, -4.2);
    }

    #[test]
    fn known_distribution() {
        // 1..=100
        let outcomes: Vec<f64> = (1..=100).map(f64::from).collect();
        let s = OutcomeStats::from_outcomes(&outcomes).unwrap();
        assert_eq!(s.count, 100);
        assert!((s.mean - 50.5).abs() < 1e-12);
        // sample variance of 1..=n is n(n+1)/12
        assert!((s.std_dev - (100.0 * 101.0 / 12.0f64).sqrt()).abs() < 1e-9);
        // rank 0.05 * 99 = 4.95 → 5 + 0.95
        assert!((s.percentile_5 - 5.95).abs() < 1e-9);
        assert!((s.percentile_95 - 95.05).abs() < 1e-9);
        assert!((s.median - 50.5).abs() < 1e-12);
        assert_eq!(s.prob_positive, 100.0);
        assert!((s.var_95 + 5.95).abs() < 1e-9);
        // worst 5 values: 1..=5
        assert!((s.cvar_95 + 3.0).abs() < 1e-12);
    }

    #[test]
    fn prob_positive_excludes_zero() {
        let s = OutcomeStats::from_outcomes(&[-1.0, 0.0, 1.0, 2.0]).unwrap();
        assert_eq!(s.prob_positive, 50.0);
    }

    #[test]
    fn losses_give_positive_var() {
        let outcomes: Vec<f64> = (0..200).map(|i| -20.0 + i as f64 * 0.2).collect();
        let s = OutcomeStats::from_outcomes(&outcomes).unwrap();
        assert!(s.var_95 > 0.0);
        assert!(s.cvar_95 >= s.var_95);
    }

    #[test]
    fn unsorted_input_handled() {
        let s = OutcomeStats::from_outcomes(&[3.0, -2.0, 10.0, 1.0]).unwrap();
        assert_eq!(s.min, -2.0);
        assert_eq!(s.max, 10.0);
        assert!(s.min <= s.percentile_5 && s.percentile_95 <= s.max);
    }

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        assert!((sample_std_dev(&[2.0, 4.0]) - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(sample_std_dev(&[7.0]), 0.0);
    }

    #[test]
    fn percentile_endpoints() {
        let sorted = [1.0, 2.0, 3.0];
        assert_eq!(percentile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(percentile_sorted(&sorted, 100.0), 3.0);
        assert_eq!(percentile_sorted(&sorted, 50.0), 2.0);
        assert_eq!(percentile_sorted(&[], 50.0), 0.0);
    }

    #[test]
    fn bands_per_period() {
        let paths = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
        ];
        let bands = PathBands::from_paths(&paths).unwrap();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands.p50, vec![2.0, 20.0]);
        assert!((bands.p5[0] - 1.1).abs() < 1e-12);
        assert!((bands.p95[1] - 29.0).abs() < 1e-9);
        assert!(PathBands::from_paths(&[]).is_none());
    }
}
