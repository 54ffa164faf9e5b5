//! Two-dimensional Gaussian kernel density estimate.
//!
//! Bandwidth follows Scott's rule: the kernel covariance is the sample
//! covariance scaled by `n^(-1/3)` (factor `n^(-1/6)` squared).

use nalgebra::{Matrix2, Vector2};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Gaussian KDE over `[x, y]` samples.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    points: Vec<Vector2<f64>>,
    inv_cov: Matrix2<f64>,
    norm: f64,
}

impl GaussianKde {
    /// Build an estimator. Returns `None` for fewer than two samples.
    ///
    /// Collinear or coincident samples give a singular covariance; a small
    /// ridge proportional to the covariance trace is added in that case.
    pub fn new(samples: &[[f64; 2]]) -> Option<Self> {
        let n = samples.len();
        if n < 2 {
            return None;
        }
        let points: Vec<Vector2<f64>> = samples.iter().map(|s| Vector2::new(s[0], s[1])).collect();

        let mean = points.iter().fold(Vector2::zeros(), |acc, p| acc + p) / n as f64;
        let mut cov = points.iter().fold(Matrix2::zeros(), |acc, p| {
            let d = p - mean;
            acc + d * d.transpose()
        }) / (n - 1) as f64;

        let factor = scott_factor(n);
        cov *= factor * factor;

        let trace = cov.trace();
        if cov.determinant() <= 1e-12 * trace * trace {
            let ridge = (trace * 1e-9).max(1e-18);
            cov += Matrix2::identity() * ridge;
        }

        let det = cov.determinant();
        let inv_cov = cov.try_inverse()?;
        let norm = 1.0 / (n as f64 * 2.0 * std::f64::consts::PI * det.sqrt());

        Some(Self {
            points,
            inv_cov,
            norm,
        })
    }

    /// Estimated density at `at`.
    pub fn density(&self, at: [f64; 2]) -> f64 {
        let at = Vector2::new(at[0], at[1]);
        let sum: f64 = self
            .points
            .iter()
            .map(|p| {
                let d = p - at;
                (-0.5 * d.dot(&(self.inv_cov * d))).exp()
            })
            .sum();
        sum * self.norm
    }

    /// Density at every sample, in input order.
    pub fn evaluate_samples(&self) -> Vec<f64> {
        #[cfg(feature = "parallel")]
        {
            self.points
                .par_iter()
                .map(|p| self.density([p.x, p.y]))
                .collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.points.iter().map(|p| self.density([p.x, p.y])).collect()
        }
    }
}

/// Scott's bandwidth factor for two dimensions.
pub fn scott_factor(n: usize) -> f64 {
    (n as f64).powf(-1.0 / 6.0)
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_linear() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 50.0), Some(3.0));
        assert!((percentile(&values, 10.0).unwrap() - 1.4).abs() < 1e-12);
        assert_eq!(percentile(&[], 10.0), None);
    }

    #[test]
    fn test_density_peaks_at_cluster() {
        let mut samples: Vec<[f64; 2]> = (0..50)
            .map(|i| [(i % 7) as f64 * 0.01, (i % 5) as f64 * 0.01])
            .collect();
        samples.push([5.0, 5.0]);
        let kde = GaussianKde::new(&samples).unwrap();
        let densities = kde.evaluate_samples();
        assert!(densities[0] > densities[50]);
    }

    #[test]
    fn test_collinear_samples_do_not_fail() {
        let samples: Vec<[f64; 2]> = (0..10).map(|i| [i as f64, 2.0 * i as f64]).collect();
        assert!(GaussianKde::new(&samples).is_some());
    }
}
