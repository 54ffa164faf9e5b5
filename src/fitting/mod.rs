//! # Corridor Curve Fitting
//!
//! Reduces a corridor's point cloud to one smooth curve, latitude as a
//! polynomial in longitude.
//!
//! ## Algorithm
//! 1. Estimate 2-D kernel density at every member point
//! 2. Drop the least dense `density_drop_percentile` percent (stragglers)
//! 3. Weighted least-squares polynomial fit; weight = density / max density
//! 4. Domain = retained longitude span; range = min/max of the curve over
//!    `range_samples` evenly spaced longitudes

mod kde;
mod polyfit;

pub use kde::{GaussianKde, percentile, scott_factor};
pub use polyfit::{Polynomial, weighted_polyfit};

use std::sync::Arc;

use geo::{Coord, LineString};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{CorridorError, Result};
use crate::{Bounds, ClusterLabel, Corridor, Direction};

/// Configuration for corridor curve fitting.
///
/// Degree and drop percentile are empirically tuned; calibrate them against
/// real corridor shapes before changing the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FitConfig {
    /// Polynomial degree.
    /// Default: 20
    pub degree: usize,

    /// Percentile of density below which points are discarded.
    /// Default: 10.0 (keeps the 90% densest points)
    pub density_drop_percentile: f64,

    /// Longitude samples used to compute the curve's latitude range.
    /// Default: 100
    pub range_samples: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            degree: 20,
            density_drop_percentile: 10.0,
            range_samples: 100,
        }
    }
}

/// A corridor reduced to `lat = poly(lng)` over `[domain_min, domain_max]`.
#[derive(Debug, Clone)]
pub struct FittedCurve {
    pub polynomial: Polynomial,
    pub domain_min: f64,
    pub domain_max: f64,
    /// Minimum of the curve over the domain samples (not of the raw data).
    pub range_min: f64,
    pub range_max: f64,
    /// Corridor the curve was fitted to, kept for altitude queries.
    pub source: Option<Arc<Corridor>>,
}

impl FittedCurve {
    /// Build a curve over a domain, computing its range from `range_samples`
    /// evenly spaced evaluations.
    pub fn new(polynomial: Polynomial, domain_min: f64, domain_max: f64, range_samples: usize) -> Self {
        let (range_min, range_max) = linspace(domain_min, domain_max, range_samples.max(2))
            .map(|x| polynomial.eval(x))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
                (lo.min(y), hi.max(y))
            });
        Self {
            polynomial,
            domain_min,
            domain_max,
            range_min,
            range_max,
            source: None,
        }
    }

    pub fn with_source(mut self, corridor: Arc<Corridor>) -> Self {
        self.source = Some(corridor);
        self
    }

    pub fn degree(&self) -> usize {
        self.polynomial.degree()
    }

    /// Latitude of the curve at longitude `x`.
    pub fn eval(&self, x: f64) -> f64 {
        self.polynomial.eval(x)
    }

    pub fn label(&self) -> Option<ClusterLabel> {
        self.source.as_ref().map(|c| c.label)
    }

    pub fn direction(&self) -> Option<Direction> {
        self.source.as_ref().map(|c| c.direction)
    }

    /// Bounding box of the curve (domain by range).
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_lat: self.range_min,
            max_lat: self.range_max,
            min_lng: self.domain_min,
            max_lng: self.domain_max,
        }
    }

    /// Polyline through `samples` evenly spaced longitudes, as `(lng, lat)`.
    pub fn to_line_string(&self, samples: usize) -> LineString<f64> {
        linspace(self.domain_min, self.domain_max, samples.max(2))
            .map(|x| Coord { x, y: self.eval(x) })
            .collect()
    }

    /// Plain record for persistence and visualization collaborators.
    pub fn to_record(&self) -> CurveRecord {
        CurveRecord {
            label: self.label(),
            direction: self.direction(),
            member_count: self.source.as_ref().map_or(0, |c| c.size()),
            degree: self.degree(),
            coefficients: self.polynomial.power_coefficients(),
            polynomial: self.polynomial.clone(),
            bounds: self.bounds(),
        }
    }
}

/// Serializable summary of a fitted curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveRecord {
    pub label: Option<ClusterLabel>,
    pub direction: Option<Direction>,
    pub member_count: usize,
    pub degree: usize,
    /// Raw-longitude coefficients, highest degree first.
    pub coefficients: Vec<f64>,
    /// Evaluable form (centred, scaled basis).
    pub polynomial: Polynomial,
    pub bounds: Bounds,
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub(crate) fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 {
        (end - start) / (n - 1) as f64
    } else {
        0.0
    };
    (0..n).map(move |i| if i + 1 == n && n > 1 { end } else { start + step * i as f64 })
}

/// Fit a density-weighted polynomial to a corridor.
///
/// Fails with `InsufficientData` when the corridor has fewer than
/// `degree + 1` members, and with `FitUnderdetermined` when the points
/// surviving the density filter cannot determine the polynomial.
///
/// Both mean the corridor cannot support the requested degree. Callers that
/// skip unfittable corridors should match both variants; the size check runs
/// first, so a corridor of 20 points at degree 20 reports `InsufficientData`,
/// never `FitUnderdetermined`.
pub fn fit(corridor: Arc<Corridor>, config: &FitConfig) -> Result<FittedCurve> {
    let required = config.degree + 1;
    if corridor.size() < required {
        return Err(CorridorError::InsufficientData {
            context: format!("corridor {} fit", corridor.label),
            point_count: corridor.size(),
            minimum_required: required,
        });
    }
    if !(0.0..100.0).contains(&config.density_drop_percentile) {
        return Err(CorridorError::InvalidParameter {
            name: "density_drop_percentile",
            value: config.density_drop_percentile,
        });
    }

    let samples: Vec<[f64; 2]> = corridor.members.iter().map(|p| [p.lng, p.lat]).collect();
    let label = corridor.label;
    let underdetermined = |retained: usize| CorridorError::FitUnderdetermined {
        label,
        retained,
        required,
    };

    let kde = GaussianKde::new(&samples).ok_or_else(|| underdetermined(samples.len()))?;
    let densities = kde.evaluate_samples();
    let threshold =
        percentile(&densities, config.density_drop_percentile).ok_or_else(|| underdetermined(0))?;

    let retained: Vec<usize> = (0..samples.len())
        .filter(|&i| densities[i] >= threshold)
        .collect();
    if retained.len() < required {
        return Err(underdetermined(retained.len()));
    }

    let max_density = retained
        .iter()
        .map(|&i| densities[i])
        .fold(f64::NEG_INFINITY, f64::max);
    let x: Vec<f64> = retained.iter().map(|&i| samples[i][0]).collect();
    let y: Vec<f64> = retained.iter().map(|&i| samples[i][1]).collect();
    let w: Vec<f64> = retained.iter().map(|&i| densities[i] / max_density).collect();

    let polynomial =
        weighted_polyfit(&x, &y, &w, config.degree).ok_or_else(|| underdetermined(retained.len()))?;

    let domain_min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let domain_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    debug!(
        "[Fit] corridor {}: {} of {} points retained, domain [{:.5}, {:.5}]",
        corridor.label,
        retained.len(),
        corridor.size(),
        domain_min,
        domain_max
    );

    Ok(FittedCurve::new(polynomial, domain_min, domain_max, config.range_samples).with_source(corridor))
}
