//! Geographic utilities: degree/mile conversion, great-circle distance, bounds.
//!
//! All linear distances in this crate are statute miles, matching the track
//! logs and the downstream place search.

use crate::{Bounds, TrackPoint};

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Earth radius used when boxing the acquisition area around an airport.
pub const BOX_EARTH_RADIUS_MILES: f64 = 3963.19;

/// Meters per statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Convert a linear distance to angular degrees at the given latitude.
///
/// The circumference of the parallel shrinks with `cos(latitude)`, so the
/// same distance spans more degrees away from the equator. Always pass the
/// latitude of the point the distance applies to.
pub fn miles_to_degrees(miles: f64, latitude: f64) -> f64 {
    let circumference = 2.0 * std::f64::consts::PI * EARTH_RADIUS_MILES * latitude.to_radians().cos();
    (miles / circumference) * 360.0
}

/// Great-circle distance in miles between two lat/lng pairs.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lng2 - lng1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Miles spanned by an angular offset applied purely in longitude at `(lat, lng)`.
///
/// Only meaningful for small offsets: the offset is treated as an east-west
/// displacement even when it came from a distance measured in mixed
/// latitude/longitude degrees. Callers use it for sub-mile distances.
pub fn local_degrees_to_miles(lat: f64, lng: f64, degrees_offset: f64) -> f64 {
    haversine_distance(lat, lng, lat, lng + degrees_offset)
}

pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

/// Bounding box of a set of track points.
pub fn compute_bounds(points: &[TrackPoint]) -> Option<Bounds> {
    if points.is_empty() {
        return None;
    }
    let mut bounds = Bounds {
        min_lat: f64::MAX,
        max_lat: f64::MIN,
        min_lng: f64::MAX,
        max_lng: f64::MIN,
    };
    for p in points {
        bounds.min_lat = bounds.min_lat.min(p.lat);
        bounds.max_lat = bounds.max_lat.max(p.lat);
        bounds.min_lng = bounds.min_lng.min(p.lng);
        bounds.max_lng = bounds.max_lng.max(p.lng);
    }
    Some(bounds)
}

/// Box reaching `half_extent_miles` north, south, east and west of a point.
///
/// This is the window the acquisition feed is polled with.
pub fn bounding_box_around(lat: f64, lng: f64, half_extent_miles: f64) -> Bounds {
    let angular = (half_extent_miles / BOX_EARTH_RADIUS_MILES).to_degrees();
    let lng_angular = angular / lat.to_radians().cos();
    Bounds {
        min_lat: lat - angular,
        max_lat: lat + angular,
        min_lng: lng - lng_angular,
        max_lng: lng + lng_angular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_degrees_matches_parallel_length() {
        // One degree of longitude at 60N is half the equatorial length.
        let at_equator = local_degrees_to_miles(0.0, 10.0, 0.01);
        let at_sixty = local_degrees_to_miles(60.0, 10.0, 0.01);
        assert!((at_sixty / at_equator - 0.5).abs() < 1e-4);
    }
}
