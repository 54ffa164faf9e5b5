//! Polynomials and weighted least-squares fitting.
//!
//! Fitted polynomials live in a centred, scaled basis `u = (x - center) / scale`
//! with `u` in `[-1, 1]` over the fitted span. A degree-20 polynomial in raw
//! longitude (|x| near 100) cannot be evaluated in f64 without catastrophic
//! cancellation; in `u` it is well behaved.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// A polynomial with coefficients ordered highest degree first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Polynomial {
    coefficients: Vec<f64>,
    center: f64,
    scale: f64,
}

impl Polynomial {
    /// Polynomial in the raw variable, e.g. `[slope, intercept]`.
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self::with_basis(coefficients, 0.0, 1.0)
    }

    /// Polynomial in `u = (x - center) / scale`.
    pub fn with_basis(coefficients: Vec<f64>, center: f64, scale: f64) -> Self {
        let coefficients = if coefficients.is_empty() {
            vec![0.0]
        } else {
            coefficients
        };
        Self {
            coefficients,
            center,
            scale,
        }
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients in the polynomial's own basis, highest degree first.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Evaluate at `x` (Horner).
    pub fn eval(&self, x: f64) -> f64 {
        let u = (x - self.center) / self.scale;
        self.coefficients.iter().fold(0.0, |acc, &c| acc * u + c)
    }

    /// First derivative with respect to `x`, in the same basis.
    pub fn derivative(&self) -> Polynomial {
        let degree = self.degree();
        if degree == 0 {
            return Self::with_basis(vec![0.0], self.center, self.scale);
        }
        let coefficients = self.coefficients[..degree]
            .iter()
            .enumerate()
            .map(|(i, &c)| c * (degree - i) as f64 / self.scale)
            .collect();
        Self::with_basis(coefficients, self.center, self.scale)
    }

    /// Coefficients in the raw variable `x`, highest degree first.
    ///
    /// Exact algebraically, but high-degree expansions around large `x` lose
    /// precision; use them for export, not evaluation.
    pub fn power_coefficients(&self) -> Vec<f64> {
        // u = alpha * x + beta, expanded by Horner over ascending coefficient vectors
        let alpha = 1.0 / self.scale;
        let beta = -self.center / self.scale;
        let mut ascending: Vec<f64> = vec![0.0];
        for &c in &self.coefficients {
            let mut next = vec![0.0; ascending.len() + 1];
            for (k, &a) in ascending.iter().enumerate() {
                next[k] += a * beta;
                next[k + 1] += a * alpha;
            }
            next[0] += c;
            ascending = next;
        }
        // Horner seeds an extra leading term; trim back to degree + 1
        ascending.truncate(self.coefficients.len());
        ascending.reverse();
        ascending
    }
}

/// Weighted least-squares polynomial fit of `y` against `x`.
///
/// Each residual is multiplied by its weight. The Vandermonde columns are
/// normalised before an SVD solve with relative cutoff `n * eps`. Returns
/// `None` when there are fewer points than coefficients or the system is rank
/// deficient (e.g. too few distinct `x` values).
pub fn weighted_polyfit(x: &[f64], y: &[f64], w: &[f64], degree: usize) -> Option<Polynomial> {
    let n = x.len();
    let m = degree + 1;
    if n < m || y.len() != n || w.len() != n {
        return None;
    }

    let min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let center = (min + max) / 2.0;
    let mut scale = (max - min) / 2.0;
    if scale <= 0.0 {
        if degree > 0 {
            return None;
        }
        scale = 1.0;
    }

    let mut a = DMatrix::<f64>::zeros(n, m);
    let mut b = DVector::<f64>::zeros(n);
    for i in 0..n {
        let u = (x[i] - center) / scale;
        let mut power = 1.0;
        for k in 0..m {
            a[(i, m - 1 - k)] = power * w[i];
            power *= u;
        }
        b[i] = y[i] * w[i];
    }

    let mut norms = Vec::with_capacity(m);
    for j in 0..m {
        let norm = a.column(j).norm();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        a.column_mut(j).scale_mut(1.0 / norm);
        norms.push(norm);
    }

    let svd = a.svd(true, true);
    let cutoff = svd.singular_values.max() * n as f64 * f64::EPSILON;
    if svd.rank(cutoff) < m {
        return None;
    }
    let solution = svd.solve(&b, cutoff).ok()?;

    let coefficients = (0..m).map(|j| solution[j] / norms[j]).collect();
    Some(Polynomial::with_basis(coefficients, center, scale))
}
