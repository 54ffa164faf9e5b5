//! Synthetic track data generator for tests and benchmarking.
//!
//! Generates track logs around an airport with known corridor curves,
//! providing ground truth for clustering and curve-fitting validation.
//!
//! Feature-gated behind `synthetic`.
//!
//! # Example
//!
//! ```rust
//! use corridorfit::synthetic::SyntheticScenario;
//!
//! let dataset = SyntheticScenario::parabolic_approach().generate();
//! assert_eq!(dataset.log.len(), 250);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::fitting::{Polynomial, linspace};
use crate::geo_utils::haversine_distance;
use crate::{AirportReference, Direction, TrackPoint};

// ============================================================================
// Types
// ============================================================================

/// One ground-truth corridor: `lat = truth(lng)` over a longitude span.
#[derive(Debug, Clone)]
pub struct CorridorSpec {
    pub direction: Direction,
    pub truth: Polynomial,
    pub lng_min: f64,
    pub lng_max: f64,
    /// Points generated along the corridor, evenly spaced in longitude.
    pub point_count: usize,
    /// Uniform latitude jitter half-width in degrees.
    pub jitter_deg: f64,
    /// Altitude at `lng_min` and `lng_max`, interpolated between.
    pub altitude_ft: (f64, f64),
}

/// Scenario configuration for generating synthetic data.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    pub airport: AirportReference,
    pub corridors: Vec<CorridorSpec>,
    /// Scattered points with no corridor.
    pub noise_points: usize,
    /// Half-extent in degrees of the box noise is scattered in, centred on the airport.
    pub noise_extent_deg: f64,
    /// Noise points closer than this to any corridor are redrawn.
    pub noise_clearance_miles: f64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

/// A generated log with its ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    pub airport: AirportReference,
    pub log: Vec<TrackPoint>,
    pub expected: Vec<CorridorSpec>,
}

// ============================================================================
// Generation
// ============================================================================

const CURVE_PROBE_SAMPLES: usize = 400;

fn corridor_point(
    spec: &CorridorSpec,
    airport: &str,
    idx: usize,
    lng: f64,
    rng: &mut StdRng,
) -> TrackPoint {
    let jitter = if spec.jitter_deg > 0.0 {
        rng.gen_range(-spec.jitter_deg..spec.jitter_deg)
    } else {
        0.0
    };
    let frac = if spec.lng_max > spec.lng_min {
        (lng - spec.lng_min) / (spec.lng_max - spec.lng_min)
    } else {
        0.0
    };
    let altitude = spec.altitude_ft.0 + (spec.altitude_ft.1 - spec.altitude_ft.0) * frac;
    let (departure, arrival) = match spec.direction {
        Direction::Inbound => ("ORIG", airport),
        Direction::Outbound => (airport, "DEST"),
    };
    TrackPoint::new(
        &format!("SYN{:04}", idx % 37),
        spec.truth.eval(lng) + jitter,
        lng,
        altitude,
        departure,
        arrival,
    )
}

fn clearance_miles(lat: f64, lng: f64, corridors: &[CorridorSpec]) -> f64 {
    corridors
        .iter()
        .flat_map(|c| {
            linspace(c.lng_min, c.lng_max, CURVE_PROBE_SAMPLES)
                .map(move |x| haversine_distance(lat, lng, c.truth.eval(x), x))
        })
        .fold(f64::INFINITY, f64::min)
}

impl SyntheticScenario {
    /// Generate the log: corridor points first, then scattered noise.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let code = self.airport.code.as_str();
        let mut log = Vec::new();

        for spec in &self.corridors {
            for (i, lng) in linspace(spec.lng_min, spec.lng_max, spec.point_count).enumerate() {
                log.push(corridor_point(spec, code, i, lng, &mut rng));
            }
        }

        let mut placed = 0;
        while placed < self.noise_points {
            let lat = self.airport.latitude
                + rng.gen_range(-self.noise_extent_deg..self.noise_extent_deg);
            let lng = self.airport.longitude
                + rng.gen_range(-self.noise_extent_deg..self.noise_extent_deg);
            if clearance_miles(lat, lng, &self.corridors) < self.noise_clearance_miles {
                continue;
            }
            let inbound: bool = rng.r#gen();
            let (departure, arrival) = if inbound {
                ("ORIG", code)
            } else {
                (code, "DEST")
            };
            let altitude = rng.gen_range(500.0..4500.0);
            log.push(TrackPoint::new(
                &format!("NOISE{:03}", placed),
                lat,
                lng,
                altitude,
                departure,
                arrival,
            ));
            placed += 1;
        }

        SyntheticDataset {
            airport: self.airport.clone(),
            log,
            expected: self.corridors.clone(),
        }
    }
}

// ============================================================================
// Predefined Scenarios
// ============================================================================

/// Boston Logan reference record.
pub fn logan() -> AirportReference {
    AirportReference {
        code: "BOS".to_string(),
        latitude: 42.3656,
        longitude: -71.0096,
        elevation_ft: 20.0,
    }
}

impl SyntheticScenario {
    /// 200 inbound points along `lat = 42.40 + 10 (lng + 71.10)^2` and 50
    /// scattered points kept clear of it. Exactly one corridor.
    pub fn parabolic_approach() -> Self {
        Self {
            airport: logan(),
            corridors: vec![CorridorSpec {
                direction: Direction::Inbound,
                truth: Polynomial::with_basis(vec![10.0, 0.0, 42.40], -71.10, 1.0),
                lng_min: -71.13,
                lng_max: -71.07,
                point_count: 200,
                jitter_deg: 2e-5,
                altitude_ft: (2500.0, 900.0),
            }],
            noise_points: 50,
            noise_extent_deg: 0.1,
            noise_clearance_miles: 0.3,
            seed: 42,
        }
    }

    /// Inbound and outbound traffic with corridors of 400, 300, 150 and 60 points.
    pub fn two_way_traffic() -> Self {
        Self {
            airport: logan(),
            corridors: vec![
                CorridorSpec {
                    direction: Direction::Inbound,
                    truth: Polynomial::with_basis(vec![10.0, 0.0, 42.40], -71.10, 1.0),
                    lng_min: -71.13,
                    lng_max: -71.07,
                    point_count: 400,
                    jitter_deg: 2e-5,
                    altitude_ft: (2500.0, 900.0),
                },
                CorridorSpec {
                    direction: Direction::Outbound,
                    truth: Polynomial::with_basis(vec![-0.4, 42.33], -70.95, 1.0),
                    lng_min: -70.98,
                    lng_max: -70.90,
                    point_count: 300,
                    jitter_deg: 2e-5,
                    altitude_ft: (800.0, 3500.0),
                },
                CorridorSpec {
                    direction: Direction::Inbound,
                    truth: Polynomial::with_basis(vec![0.3, 42.30], -71.05, 1.0),
                    lng_min: -71.08,
                    lng_max: -71.02,
                    point_count: 150,
                    jitter_deg: 2e-5,
                    altitude_ft: (3000.0, 1200.0),
                },
                CorridorSpec {
                    direction: Direction::Outbound,
                    truth: Polynomial::with_basis(vec![0.0, 42.45], -70.95, 1.0),
                    lng_min: -70.97,
                    lng_max: -70.93,
                    point_count: 60,
                    jitter_deg: 2e-5,
                    altitude_ft: (1500.0, 4000.0),
                },
            ],
            noise_points: 80,
            noise_extent_deg: 0.15,
            noise_clearance_miles: 0.3,
            seed: 7,
        }
    }

    /// Configurable single-corridor scenario for benchmarks.
    pub fn with_point_count(point_count: usize) -> Self {
        let mut scenario = Self::parabolic_approach();
        scenario.corridors[0].point_count = point_count;
        scenario.noise_points = point_count / 4;
        scenario.seed = point_count as u64 * 7919;
        scenario
    }
}
