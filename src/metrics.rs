//! Point-to-curve distance, corridor altitude, and candidate validation.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::airport::AirportReference;
use crate::error::{CorridorError, OptionExt, Result, ensure_positive};
use crate::fitting::FittedCurve;
use crate::geo_utils::{haversine_distance, local_degrees_to_miles};
use crate::optimize::{MinimizeOptions, minimize_bounded};
use crate::{CandidatePoint, Corridor};

/// Radius increment for the altitude neighborhood, in miles.
pub const ALTITUDE_RADIUS_STEP_MILES: f64 = 0.1;

/// Mean corridor altitude around a point and the radius that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltitudeEstimate {
    pub altitude_ft: f64,
    pub radius_miles: f64,
    pub point_count: usize,
    /// Times the radius grew past the initial value.
    pub expansions: usize,
}

/// Minimum distance in miles from `(lat, lng)` to the curve over its domain.
pub fn distance_to_curve(lat: f64, lng: f64, curve: &FittedCurve) -> Result<f64> {
    distance_to_curve_with(lat, lng, curve, &MinimizeOptions::default())
}

/// `distance_to_curve` with explicit minimizer options.
///
/// The minimization runs in degree space, seeded at the domain midpoint. The
/// degree distance is converted to miles as a longitude offset at the closest
/// curve point.
pub fn distance_to_curve_with(
    lat: f64,
    lng: f64,
    curve: &FittedCurve,
    options: &MinimizeOptions,
) -> Result<f64> {
    let degree_distance = |x: f64| {
        let dlat = curve.eval(x) - lat;
        let dlng = x - lng;
        (dlat * dlat + dlng * dlng).sqrt()
    };

    let seed = 0.5 * (curve.domain_min + curve.domain_max);
    let minimum = minimize_bounded(
        degree_distance,
        curve.domain_min,
        curve.domain_max,
        seed,
        options,
    );

    if !minimum.converged {
        return Err(CorridorError::OptimizationDidNotConverge {
            iterations: minimum.iterations,
            residual: minimum.fun,
            x: minimum.x,
        });
    }

    let closest_lng = minimum.x;
    let closest_lat = curve.eval(closest_lng);
    Ok(local_degrees_to_miles(closest_lat, closest_lng, minimum.fun))
}

/// Mean altitude of corridor members within `initial_radius_miles` of a point.
pub fn mean_altitude_near(
    lat: f64,
    lng: f64,
    corridor: &Corridor,
    initial_radius_miles: f64,
) -> Result<f64> {
    altitude_estimate_near(lat, lng, corridor, initial_radius_miles).map(|e| e.altitude_ft)
}

/// Mean altitude of corridor members near a point, widening the radius by
/// `ALTITUDE_RADIUS_STEP_MILES` until at least one member falls inside.
///
/// Members with a non-finite position or altitude are ignored. Fails when no
/// usable member remains.
pub fn altitude_estimate_near(
    lat: f64,
    lng: f64,
    corridor: &Corridor,
    initial_radius_miles: f64,
) -> Result<AltitudeEstimate> {
    if !lat.is_finite() {
        return Err(CorridorError::InvalidParameter { name: "lat", value: lat });
    }
    if !lng.is_finite() {
        return Err(CorridorError::InvalidParameter { name: "lng", value: lng });
    }
    if !(initial_radius_miles.is_finite() && initial_radius_miles >= 0.0) {
        return Err(CorridorError::InvalidParameter {
            name: "initial_radius_miles",
            value: initial_radius_miles,
        });
    }

    let usable: Vec<(f64, f64)> = corridor
        .members
        .iter()
        .filter(|p| p.altitude_ft.is_finite())
        .map(|p| (haversine_distance(lat, lng, p.lat, p.lng), p.altitude_ft))
        .filter(|(d, _)| d.is_finite())
        .collect();

    let nearest = usable
        .iter()
        .map(|&(d, _)| d)
        .min_by(f64::total_cmp)
        .ok_or_insufficient_data(
            &format!("altitude near corridor {}", corridor.label),
            usable.len(),
            1,
        )?;

    // Jump straight to the first step that reaches the nearest member
    let radius_after =
        |steps: usize| initial_radius_miles + steps as f64 * ALTITUDE_RADIUS_STEP_MILES;
    let mut expansions = if nearest <= initial_radius_miles {
        0
    } else {
        ((nearest - initial_radius_miles) / ALTITUDE_RADIUS_STEP_MILES).ceil() as usize
    };
    if expansions > 0 && nearest <= radius_after(expansions - 1) {
        expansions -= 1;
    }
    while nearest > radius_after(expansions) {
        expansions += 1;
    }
    let radius = radius_after(expansions);

    let (sum, count) = usable
        .iter()
        .filter(|(d, _)| *d <= radius)
        .fold((0.0, 0usize), |(s, c), (_, alt)| (s + alt, c + 1));

    debug!(
        "[Metrics] altitude near ({:.5}, {:.5}): {} points within {:.2} mi after {} expansions",
        lat, lng, count, radius, expansions
    );

    Ok(AltitudeEstimate {
        altitude_ft: sum / count as f64,
        radius_miles: radius,
        point_count: count,
        expansions,
    })
}

/// Check a place-search result against a curve.
///
/// Returns `None` when the point lies farther than `search_radius_miles` from
/// the curve. Otherwise annotates it with its curve distance, the mean corridor
/// altitude nearby (starting at the search radius), and its airport distance.
pub fn validate_candidate(
    lat: f64,
    lng: f64,
    curve: &FittedCurve,
    corridor: &Corridor,
    airport: &AirportReference,
    search_radius_miles: f64,
) -> Result<Option<CandidatePoint>> {
    ensure_positive("search_radius_miles", search_radius_miles)?;

    let distance_from_curve_miles = distance_to_curve(lat, lng, curve)?;
    if distance_from_curve_miles > search_radius_miles {
        debug!(
            "[Metrics] candidate ({:.5}, {:.5}) rejected: {:.3} mi from curve",
            lat, lng, distance_from_curve_miles
        );
        return Ok(None);
    }

    let mean_altitude_ft = mean_altitude_near(lat, lng, corridor, search_radius_miles)?;
    let distance_from_airport_miles =
        haversine_distance(lat, lng, airport.latitude, airport.longitude);

    Ok(Some(CandidatePoint {
        lat,
        lng,
        distance_from_curve_miles,
        mean_altitude_ft,
        distance_from_airport_miles,
    }))
}
