//! DBSCAN over track positions.
//!
//! A point is a core point when at least `min_pts` points (itself included)
//! lie within `eps`. Clusters grow transitively through core points; border
//! points join the first cluster that reaches them. Everything else is noise.
//!
//! Points are visited in input order and clusters are numbered in discovery
//! order, so the same input always yields the same labels.

use std::collections::VecDeque;

use super::rtree::{build_rtree, region_query};
use crate::{ClusterLabel, NOISE, TrackPoint};

const UNVISITED: ClusterLabel = -2;

/// Label every point with a cluster id (`0..k`) or `NOISE`.
///
/// `eps` is in degrees. Points with non-finite coordinates are noise.
pub fn dbscan(points: &[TrackPoint], eps: f64, min_pts: usize) -> Vec<ClusterLabel> {
    if points.len() < min_pts.max(1) {
        return vec![NOISE; points.len()];
    }

    let tree = build_rtree(points);
    let mut labels = vec![UNVISITED; points.len()];
    let mut next_label: ClusterLabel = 0;

    for i in 0..points.len() {
        if labels[i] != UNVISITED {
            continue;
        }
        if !(points[i].lat.is_finite() && points[i].lng.is_finite()) {
            labels[i] = NOISE;
            continue;
        }

        let neighbors = region_query(&tree, points, i, eps);
        if neighbors.len() < min_pts {
            labels[i] = NOISE;
            continue;
        }

        let label = next_label;
        next_label += 1;
        labels[i] = label;

        let mut queue: VecDeque<usize> = neighbors.into_iter().collect();
        while let Some(j) = queue.pop_front() {
            if labels[j] == NOISE {
                // Border point: claimed but never expanded
                labels[j] = label;
                continue;
            }
            if labels[j] != UNVISITED {
                continue;
            }
            labels[j] = label;

            let expansion = region_query(&tree, points, j, eps);
            if expansion.len() >= min_pts {
                queue.extend(expansion.into_iter().filter(|&k| {
                    labels[k] == UNVISITED || labels[k] == NOISE
                }));
            }
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> TrackPoint {
        TrackPoint::new("T", lat, lng, 1000.0, "AAA", "BOS")
    }

    #[test]
    fn test_border_point_joins_cluster() {
        // Five tightly packed core points and one border point reachable from
        // exactly one of them.
        let mut points: Vec<TrackPoint> =
            (0..5).map(|i| pt(42.0, -71.0 + i as f64 * 0.001)).collect();
        points.push(pt(42.0, -71.0 + 0.008));
        let labels = dbscan(&points, 0.0045, 5);
        assert!(labels.iter().all(|&l| l == 0), "labels: {:?}", labels);
    }

    #[test]
    fn test_sparse_points_are_noise() {
        let points: Vec<TrackPoint> = (0..10).map(|i| pt(42.0 + i as f64, -71.0)).collect();
        let labels = dbscan(&points, 0.01, 5);
        assert!(labels.iter().all(|&l| l == NOISE));
    }

    #[test]
    fn test_non_finite_point_is_noise() {
        let mut points: Vec<TrackPoint> =
            (0..6).map(|i| pt(42.0, -71.0 + i as f64 * 0.001)).collect();
        points.insert(2, pt(f64::NAN, -71.0));
        let labels = dbscan(&points, 0.0045, 5);
        assert_eq!(labels[2], NOISE);
        assert!(labels.iter().enumerate().all(|(i, &l)| i == 2 || l == 0));
    }
}
