//! # Corridor Fit
//!
//! Infers aircraft-spotting corridors near an airport from historical
//! low-altitude flight-track observations.
//!
//! This library provides:
//! - Density-based clustering of inbound/outbound tracks into corridors
//! - Density-weighted polynomial curve fitting per corridor
//! - Arc-length-uniform sampling of fitted curves
//! - Point-to-curve distance and corridor altitude metrics
//! - A per-airport pipeline with corridor-scoped failure handling
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel processing with rayon
//! - **`synthetic`** - Seeded synthetic corridor generator for tests and benches
//!
//! ## Quick Start
//!
//! ```rust
//! use corridorfit::{FittedCurve, Polynomial};
//! use corridorfit::sampling::sample_points;
//!
//! // A gently sloping straight corridor just west of Boston Logan
//! let curve = FittedCurve::new(Polynomial::new(vec![0.2, 56.6]), -71.10, -71.00, 100);
//! let samples = sample_points(&curve, 0.3).unwrap();
//! assert!(samples.len() > 10);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{CorridorError, OptionExt, Result};

// Geographic utilities (degree/mile conversion, haversine, bounds)
pub mod geo_utils;

// Airport reference lookup
pub mod airport;
pub use airport::{AirportLookup, AirportReference, AirportTable};

// Density-based corridor extraction
pub mod clustering;
pub use clustering::{
    ClusterConfig, DirectionClusters, cluster, extract_corridors, merge_labels,
    select_significant,
};

// Density-weighted curve fitting
pub mod fitting;
pub use fitting::{CurveRecord, FitConfig, FittedCurve, Polynomial, fit};

// Arc-length sampling of fitted curves
pub mod sampling;
pub use sampling::{SamplerConfig, SearchRequest, plan_searches, sample_points};

// Bounded scalar minimization
pub mod optimize;
pub use optimize::{Minimum, MinimizeOptions};

// Point-to-curve metrics and candidate validation
pub mod metrics;
pub use metrics::{AltitudeEstimate, distance_to_curve, mean_altitude_near, validate_candidate};

// End-to-end airport runs
pub mod pipeline;
pub use pipeline::{AirportCorridors, PipelineConfig, SearchConfig, TrackWindow, process_airport};
#[cfg(feature = "parallel")]
pub use pipeline::process_airports;

// Synthetic corridor data for tests and benches
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// Cluster identifier. `NOISE` marks points belonging to no corridor.
pub type ClusterLabel = i32;

/// Label reserved for points not dense enough to belong to any corridor.
pub const NOISE: ClusterLabel = -1;

/// One tracked aircraft position as recorded by the acquisition feed.
///
/// Serde names follow the acquisition log columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "flight_icao")]
    pub flight_id: String,
    pub lat: f64,
    pub lng: f64,
    /// Altitude above field elevation in feet
    #[serde(rename = "alt")]
    pub altitude_ft: f64,
    #[serde(rename = "dep_iata")]
    pub departure_code: String,
    #[serde(rename = "arr_iata")]
    pub arrival_code: String,
    #[serde(default)]
    pub status: String,
}

impl TrackPoint {
    /// Create an en-route track point without a timestamp.
    pub fn new(
        flight_id: &str,
        lat: f64,
        lng: f64,
        altitude_ft: f64,
        departure_code: &str,
        arrival_code: &str,
    ) -> Self {
        Self {
            timestamp: String::new(),
            flight_id: flight_id.to_string(),
            lat,
            lng,
            altitude_ft,
            departure_code: departure_code.to_string(),
            arrival_code: arrival_code.to_string(),
            status: "en-route".to_string(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = timestamp.to_string();
        self
    }

    /// Check if the point has usable coordinates.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Traffic direction relative to the scoping airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Arriving at the airport
    Inbound,
    /// Departing from the airport
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }

    /// Whether a track point belongs to this direction at `airport`.
    pub fn matches(&self, point: &TrackPoint, airport: &str) -> bool {
        match self {
            Direction::Inbound => point.arrival_code == airport,
            Direction::Outbound => point.departure_code == airport,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Track points for one airport and one direction.
///
/// Every point's arrival code (inbound) or departure code (outbound) equals
/// `airport`; the only constructor filters to guarantee it.
#[derive(Debug, Clone)]
pub struct TrackSet {
    airport: String,
    direction: Direction,
    points: Vec<TrackPoint>,
}

impl TrackSet {
    /// Select the points of `log` that belong to `airport` in `direction`.
    ///
    /// Points with non-finite or out-of-range coordinates are dropped.
    pub fn from_log(log: &[TrackPoint], airport: &str, direction: Direction) -> Self {
        let mut dropped = 0;
        let points: Vec<TrackPoint> = log
            .iter()
            .filter(|p| direction.matches(p, airport))
            .filter(|p| {
                let valid = p.is_valid();
                if !valid {
                    dropped += 1;
                }
                valid
            })
            .cloned()
            .collect();
        if dropped > 0 {
            log::warn!(
                "[TrackSet] {} {}: dropped {} points with invalid coordinates",
                airport,
                direction,
                dropped
            );
        }
        Self {
            airport: airport.to_string(),
            direction,
            points,
        }
    }

    /// Split a mixed log into its inbound and outbound sets.
    pub fn split_log(log: &[TrackPoint], airport: &str) -> (Self, Self) {
        (
            Self::from_log(log, airport, Direction::Inbound),
            Self::from_log(log, airport, Direction::Outbound),
        )
    }

    pub fn airport(&self) -> &str {
        &self.airport
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A dense, directionally consistent group of track points.
#[derive(Debug, Clone, PartialEq)]
pub struct Corridor {
    pub label: ClusterLabel,
    pub direction: Direction,
    pub members: Vec<TrackPoint>,
}

impl Corridor {
    /// Number of member points.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        geo_utils::compute_bounds(&self.members)
    }
}

/// Bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center of the bounds as `(lat, lng)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// A point lying on a fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub lat: f64,
    pub lng: f64,
}

/// A candidate location annotated against one fitted curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePoint {
    pub lat: f64,
    pub lng: f64,
    pub distance_from_curve_miles: f64,
    pub mean_altitude_ft: f64,
    pub distance_from_airport_miles: f64,
}
