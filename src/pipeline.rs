//! # Airport Pipeline
//!
//! Runs the corridor engine end to end for one airport: split the log by
//! direction, extract corridors, fit a curve to each, and plan place searches
//! along every curve.
//!
//! Failures are scoped: a corridor that cannot be fitted is recorded and its
//! siblings continue; a missing airport aborts only that airport's run.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::airport::{AirportLookup, AirportReference};
use crate::clustering::{ClusterConfig, extract_corridors};
use crate::error::{CorridorError, Result};
use crate::fitting::{FitConfig, FittedCurve, fit};
use crate::geo_utils::haversine_distance;
use crate::metrics::validate_candidate;
use crate::sampling::{SearchRequest, plan_searches};
use crate::{CandidatePoint, ClusterLabel, Corridor, TrackPoint, TrackSet};

/// Place-search tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Spacing of search centres along the curve, and the search radius.
    /// Candidates farther than this from the curve are rejected.
    /// Default: 0.3 miles
    pub interval_miles: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            interval_miles: 0.3,
        }
    }
}

/// Acquisition window for usable track points.
///
/// Altitudes are above field elevation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackWindow {
    /// Default: 0 ft
    pub min_altitude_ft: f64,
    /// Default: 4921 ft (1500 m)
    pub max_altitude_ft: f64,
    /// Points closer to the airport are on the ground or in the flare.
    /// Default: 0.621371 miles (1 km)
    pub min_airport_distance_miles: f64,
    /// Required flight status, if any.
    /// Default: "en-route"
    pub required_status: Option<String>,
}

impl Default for TrackWindow {
    fn default() -> Self {
        Self {
            min_altitude_ft: 0.0,
            max_altitude_ft: 4921.0,
            min_airport_distance_miles: 0.621371,
            required_status: Some("en-route".to_string()),
        }
    }
}

impl TrackWindow {
    pub fn admits(&self, point: &TrackPoint, airport: &AirportReference) -> bool {
        if let Some(status) = &self.required_status {
            if &point.status != status {
                return false;
            }
        }
        point.is_valid()
            && point.altitude_ft >= self.min_altitude_ft
            && point.altitude_ft <= self.max_altitude_ft
            && haversine_distance(point.lat, point.lng, airport.latitude, airport.longitude)
                >= self.min_airport_distance_miles
    }

    pub fn apply(&self, log: &[TrackPoint], airport: &AirportReference) -> Vec<TrackPoint> {
        log.iter()
            .filter(|p| self.admits(p, airport))
            .cloned()
            .collect()
    }
}

/// Full configuration for an airport run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub cluster: ClusterConfig,
    pub fit: FitConfig,
    pub search: SearchConfig,
    /// Applied to the log before clustering when set.
    pub window: Option<TrackWindow>,
}

impl PipelineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// A corridor that was selected but could not be carried through.
#[derive(Debug)]
pub struct CorridorFailure {
    pub label: ClusterLabel,
    pub error: CorridorError,
}

/// Search plan along one corridor's curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorSearchPlan {
    pub label: Option<ClusterLabel>,
    pub requests: Vec<SearchRequest>,
}

/// Result of one airport run.
#[derive(Debug)]
pub struct AirportCorridors {
    pub airport: AirportReference,
    pub corridors: Vec<Arc<Corridor>>,
    pub curves: Vec<FittedCurve>,
    pub failures: Vec<CorridorFailure>,
}

impl AirportCorridors {
    /// Search requests along every fitted curve.
    ///
    /// A curve that cannot be sampled is skipped with a warning.
    pub fn search_plans(&self, interval_miles: f64) -> Vec<CorridorSearchPlan> {
        self.curves
            .iter()
            .filter_map(|curve| match plan_searches(curve, interval_miles) {
                Ok(requests) => Some(CorridorSearchPlan {
                    label: curve.label(),
                    requests,
                }),
                Err(e) => {
                    warn!("[Pipeline] corridor {:?} not sampled: {}", curve.label(), e);
                    None
                }
            })
            .collect()
    }

    /// Validate one place-search result against every curve.
    ///
    /// Returns the curves the point qualifies for. Any failure aborts this
    /// candidate only.
    pub fn validate(
        &self,
        lat: f64,
        lng: f64,
        search_radius_miles: f64,
    ) -> Result<Vec<(ClusterLabel, CandidatePoint)>> {
        let mut accepted = Vec::new();
        for curve in &self.curves {
            let Some(corridor) = &curve.source else {
                continue;
            };
            if let Some(candidate) =
                validate_candidate(lat, lng, curve, corridor, &self.airport, search_radius_miles)?
            {
                accepted.push((corridor.label, candidate));
            }
        }
        Ok(accepted)
    }
}

/// Fit every corridor, separating successes from corridor-scoped failures.
pub fn fit_corridors(
    corridors: &[Arc<Corridor>],
    config: &FitConfig,
) -> (Vec<FittedCurve>, Vec<CorridorFailure>) {
    #[cfg(feature = "parallel")]
    let results: Vec<(ClusterLabel, Result<FittedCurve>)> = corridors
        .par_iter()
        .map(|c| (c.label, fit(Arc::clone(c), config)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(ClusterLabel, Result<FittedCurve>)> = corridors
        .iter()
        .map(|c| (c.label, fit(Arc::clone(c), config)))
        .collect();

    let mut curves = Vec::new();
    let mut failures = Vec::new();
    for (label, result) in results {
        match result {
            Ok(curve) => curves.push(curve),
            Err(error) => {
                warn!("[Pipeline] corridor {} skipped: {}", label, error);
                failures.push(CorridorFailure { label, error });
            }
        }
    }
    (curves, failures)
}

/// Run the corridor engine for one airport.
pub fn process_airport(
    log: &[TrackPoint],
    airport: &AirportReference,
    config: &PipelineConfig,
) -> Result<AirportCorridors> {
    let windowed;
    let log = match &config.window {
        Some(window) => {
            windowed = window.apply(log, airport);
            windowed.as_slice()
        }
        None => log,
    };

    let (inbound, outbound) = TrackSet::split_log(log, &airport.code);
    info!(
        "[Pipeline] {}: {} inbound, {} outbound points",
        airport.code,
        inbound.len(),
        outbound.len()
    );

    let corridors: Vec<Arc<Corridor>> =
        extract_corridors(&inbound, &outbound, airport.latitude, &config.cluster)?
            .into_iter()
            .map(Arc::new)
            .collect();

    let (curves, failures) = fit_corridors(&corridors, &config.fit);

    info!(
        "[Pipeline] {}: {} corridors, {} curves, {} failures",
        airport.code,
        corridors.len(),
        curves.len(),
        failures.len()
    );

    Ok(AirportCorridors {
        airport: airport.clone(),
        corridors,
        curves,
        failures,
    })
}

/// Resolve an airport code and run its pipeline.
pub fn process_airport_by_code(
    log: &[TrackPoint],
    code: &str,
    lookup: &dyn AirportLookup,
    config: &PipelineConfig,
) -> Result<AirportCorridors> {
    let airport = lookup.resolve(code)?;
    process_airport(log, &airport, config)
}

/// One airport's input for a multi-airport run.
#[derive(Debug, Clone)]
pub struct AirportJob {
    pub code: String,
    pub log: Vec<TrackPoint>,
}

/// Run independent airports in parallel. Each result stands alone.
#[cfg(feature = "parallel")]
pub fn process_airports(
    jobs: &[AirportJob],
    lookup: &dyn AirportLookup,
    config: &PipelineConfig,
) -> Vec<(String, Result<AirportCorridors>)> {
    jobs.par_iter()
        .map(|job| {
            let result = process_airport_by_code(&job.log, &job.code, lookup, config);
            if let Err(e) = &result {
                warn!("[Pipeline] {} failed: {}", job.code, e);
            }
            (job.code.clone(), result)
        })
        .collect()
}
