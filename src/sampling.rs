//! # Arc-Length Sampling
//!
//! Places points along a fitted curve at equal distances measured along the
//! curve itself, not along longitude. Longitude-uniform spacing would crowd
//! shallow stretches and starve steep ones.
//!
//! ## Algorithm
//! 1. Tabulate cumulative arc length `∫√(1 + p'(x)²) dx` at `table_size`
//!    evenly spaced longitudes (Gauss-Legendre per table interval)
//! 2. Invert the table by linear interpolation: arc length → longitude
//! 3. Walk from arc length 0 in fixed steps, stopping before the end of the
//!    curve (no truncated trailing point)
//!
//! Arc length is measured in degrees; the step is the interval converted at
//! the curve's minimum latitude.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CorridorError, Result, ensure_positive};
use crate::fitting::{FittedCurve, Polynomial, linspace};
use crate::geo_utils::{miles_to_degrees, miles_to_meters};
use crate::SamplePoint;

/// Configuration for arc-length sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SamplerConfig {
    /// Longitudes in the cumulative arc-length table.
    /// Default: 1000
    pub table_size: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { table_size: 1000 }
    }
}

/// One query for the external place search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub center: SamplePoint,
    pub radius_meters: f64,
}

// 5-point Gauss-Legendre nodes and weights on [-1, 1]
const GL_NODES: [f64; 5] = [
    0.0,
    -0.538_469_310_105_683_1,
    0.538_469_310_105_683_1,
    -0.906_179_845_938_664,
    0.906_179_845_938_664,
];
const GL_WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];

/// Cumulative arc length of a curve at evenly spaced longitudes.
#[derive(Debug, Clone)]
pub struct ArcLengthTable {
    xs: Vec<f64>,
    lengths: Vec<f64>,
}

impl ArcLengthTable {
    /// Tabulate `∫ √(1 + p'(t)²) dt` from `start` to each of `size` longitudes.
    pub fn new(polynomial: &Polynomial, start: f64, end: f64, size: usize) -> Self {
        let derivative = polynomial.derivative();
        let element = |t: f64| (1.0 + derivative.eval(t).powi(2)).sqrt();

        let xs: Vec<f64> = linspace(start, end, size.max(2)).collect();
        let mut lengths = Vec::with_capacity(xs.len());
        let mut total = 0.0;
        lengths.push(total);
        for w in xs.windows(2) {
            let half = 0.5 * (w[1] - w[0]);
            let mid = 0.5 * (w[1] + w[0]);
            let segment: f64 = GL_NODES
                .iter()
                .zip(GL_WEIGHTS.iter())
                .map(|(&node, &weight)| weight * element(mid + half * node))
                .sum();
            total += segment * half;
            lengths.push(total);
        }

        Self { xs, lengths }
    }

    pub fn total_length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Longitude at which the cumulative arc length reaches `length`.
    ///
    /// Linear interpolation within the table; clamps outside it.
    pub fn x_at_length(&self, length: f64) -> f64 {
        let idx = self.lengths.partition_point(|&l| l < length);
        if idx == 0 {
            return self.xs[0];
        }
        if idx >= self.lengths.len() {
            return self.xs[self.xs.len() - 1];
        }
        let (l0, l1) = (self.lengths[idx - 1], self.lengths[idx]);
        let (x0, x1) = (self.xs[idx - 1], self.xs[idx]);
        if l1 == l0 {
            return x0;
        }
        x0 + (x1 - x0) * (length - l0) / (l1 - l0)
    }
}

/// Sample a curve every `interval_miles` along its arc.
///
/// The interval is converted to degrees at the curve's minimum latitude.
pub fn sample_points(curve: &FittedCurve, interval_miles: f64) -> Result<Vec<SamplePoint>> {
    sample_points_with(curve, interval_miles, curve.range_min, &SamplerConfig::default())
}

/// Sample a curve every `interval_miles`, converting at `scale_latitude`.
pub fn sample_points_with(
    curve: &FittedCurve,
    interval_miles: f64,
    scale_latitude: f64,
    config: &SamplerConfig,
) -> Result<Vec<SamplePoint>> {
    ensure_positive("interval_miles", interval_miles)?;
    let step = ensure_positive("interval_degrees", miles_to_degrees(interval_miles, scale_latitude))?;
    if !(curve.domain_min.is_finite() && curve.domain_max.is_finite())
        || curve.domain_min > curve.domain_max
    {
        return Err(CorridorError::InvalidParameter {
            name: "domain_min",
            value: curve.domain_min,
        });
    }

    let table = ArcLengthTable::new(
        &curve.polynomial,
        curve.domain_min,
        curve.domain_max,
        config.table_size,
    );
    let total = table.total_length();

    let mut xs = vec![curve.domain_min];
    let mut travelled = 0.0;
    loop {
        travelled += step;
        if travelled >= total {
            break;
        }
        xs.push(table.x_at_length(travelled));
    }

    debug!(
        "[Sampler] arc length {:.5} deg, step {:.6} deg, {} samples",
        total,
        step,
        xs.len()
    );

    Ok(xs
        .into_iter()
        .map(|x| SamplePoint {
            lat: curve.eval(x),
            lng: x,
        })
        .collect())
}

/// Place-search queries along a curve: one per sample, radius = interval.
pub fn plan_searches(curve: &FittedCurve, interval_miles: f64) -> Result<Vec<SearchRequest>> {
    let radius_meters = miles_to_meters(interval_miles);
    Ok(sample_points(curve, interval_miles)?
        .into_iter()
        .map(|center| SearchRequest {
            center,
            radius_meters,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_length_of_line() {
        // y = 0.75x over [0, 4] has length 5
        let table = ArcLengthTable::new(&Polynomial::new(vec![0.75, 0.0]), 0.0, 4.0, 100);
        assert!((table.total_length() - 5.0).abs() < 1e-9);
        assert!((table.x_at_length(2.5) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_arc_length_of_parabola() {
        // y = x^2 over [0, 1]: (2√5 + asinh 2) / 4
        let table = ArcLengthTable::new(&Polynomial::new(vec![1.0, 0.0, 0.0]), 0.0, 1.0, 200);
        let expected = (2.0 * 5.0_f64.sqrt() + 2.0_f64.asinh()) / 4.0;
        assert!((table.total_length() - expected).abs() < 1e-9);
    }
}
