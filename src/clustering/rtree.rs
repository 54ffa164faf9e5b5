//! R-tree indexed point types for neighborhood queries.

use crate::TrackPoint;
use rstar::{AABB, PointDistance, RTree, RTreeObject};

/// A track position with its index in the source slice.
///
/// Coordinates are `[lat, lng]` in degrees; distances are planar in degree
/// space, so the query radius must already be converted at the scale latitude.
#[derive(Debug, Clone, Copy)]
pub struct IndexedPoint {
    pub idx: usize,
    pub lat: f64,
    pub lng: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlng = self.lng - point[1];
        dlat * dlat + dlng * dlng
    }
}

/// Build R-tree from track points for neighborhood queries.
///
/// Points with non-finite coordinates are left out of the index.
pub fn build_rtree(points: &[TrackPoint]) -> RTree<IndexedPoint> {
    let indexed: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.lat.is_finite() && p.lng.is_finite())
        .map(|(i, p)| IndexedPoint {
            idx: i,
            lat: p.lat,
            lng: p.lng,
        })
        .collect();
    RTree::bulk_load(indexed)
}

/// Indices of all points within `radius` degrees of `points[idx]`, itself included.
pub(crate) fn region_query(
    tree: &RTree<IndexedPoint>,
    points: &[TrackPoint],
    idx: usize,
    radius: f64,
) -> Vec<usize> {
    let p = &points[idx];
    let mut neighbors: Vec<usize> = tree
        .locate_within_distance([p.lat, p.lng], radius * radius)
        .map(|n| n.idx)
        .collect();
    // R-tree iteration order is unspecified; sort for deterministic expansion
    neighbors.sort_unstable();
    neighbors
}
