//! # Corridor Extraction
//!
//! Groups raw track points into directional traffic corridors.
//!
//! ## Algorithm
//! 1. Convert the neighborhood radius from miles to degrees at the airport's
//!    latitude (parallels shrink with `cos(latitude)`)
//! 2. Run DBSCAN separately on the inbound and outbound track sets, so dense
//!    arrivals cannot swallow a distinct departure corridor and vice versa
//! 3. Shift outbound labels past the inbound label range (noise stays `-1`)
//! 4. Rank corridors by size: the busiest `always_keep` survive regardless,
//!    the rest must reach `min_corridor_size`

mod dbscan;
mod rtree;

pub use dbscan::dbscan;
pub use rtree::{IndexedPoint, build_rtree};

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure_positive};
use crate::geo_utils::miles_to_degrees;
use crate::{ClusterLabel, Corridor, Direction, NOISE, TrackSet};

/// Configuration for corridor clustering and selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterConfig {
    /// Neighborhood radius in miles.
    /// Default: 0.125
    pub eps_miles: f64,

    /// Minimum neighborhood size (point itself included) for a core point.
    /// Default: 5
    pub min_pts: usize,

    /// Number of largest corridors kept regardless of size.
    /// Default: 2
    pub always_keep: usize,

    /// Minimum member count for every other corridor.
    /// Default: 100
    pub min_corridor_size: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            eps_miles: 0.125,
            min_pts: 5,
            always_keep: 2,
            min_corridor_size: 100,
        }
    }
}

/// Clustering result for one direction.
#[derive(Debug, Clone)]
pub struct DirectionClusters {
    pub direction: Direction,
    /// Label per input point, aligned with the source track set.
    pub labels: Vec<ClusterLabel>,
    /// Non-noise corridors keyed by label.
    pub corridors: BTreeMap<ClusterLabel, Corridor>,
}

impl DirectionClusters {
    /// Number of distinct non-noise labels.
    pub fn cluster_count(&self) -> usize {
        self.corridors.len()
    }

    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l == NOISE).count()
    }

    /// Shift every non-noise label by `offset`.
    fn shifted(self, offset: ClusterLabel) -> Self {
        let labels = self
            .labels
            .into_iter()
            .map(|l| if l == NOISE { NOISE } else { l + offset })
            .collect();
        let corridors = self
            .corridors
            .into_values()
            .map(|mut c| {
                c.label += offset;
                (c.label, c)
            })
            .collect();
        Self {
            direction: self.direction,
            labels,
            corridors,
        }
    }
}

/// Cluster one direction's track set into corridors.
///
/// An empty set, or one smaller than `min_pts`, yields only noise.
pub fn cluster(
    track_set: &TrackSet,
    latitude_for_scale: f64,
    config: &ClusterConfig,
) -> Result<DirectionClusters> {
    let eps = ensure_positive("eps_degrees", miles_to_degrees(config.eps_miles, latitude_for_scale))?;
    let points = track_set.points();

    let labels = dbscan(points, eps, config.min_pts);

    let mut corridors: BTreeMap<ClusterLabel, Corridor> = BTreeMap::new();
    for (point, &label) in points.iter().zip(&labels) {
        if label == NOISE {
            continue;
        }
        corridors
            .entry(label)
            .or_insert_with(|| Corridor {
                label,
                direction: track_set.direction(),
                members: Vec::new(),
            })
            .members
            .push(point.clone());
    }

    let result = DirectionClusters {
        direction: track_set.direction(),
        labels,
        corridors,
    };

    info!(
        "[Clusters] {} {}: {} points, {} clusters, {} noise (eps {:.6} deg)",
        track_set.airport(),
        track_set.direction(),
        points.len(),
        result.cluster_count(),
        result.noise_count(),
        eps
    );
    for corridor in result.corridors.values() {
        debug!("[Clusters] cluster {}: {} points", corridor.label, corridor.size());
    }

    Ok(result)
}

/// Make outbound labels disjoint from inbound ones.
///
/// Outbound labels move up by the inbound cluster count; noise stays noise.
pub fn merge_labels(
    inbound: DirectionClusters,
    outbound: DirectionClusters,
) -> (DirectionClusters, DirectionClusters) {
    let offset = inbound.cluster_count() as ClusterLabel;
    (inbound, outbound.shifted(offset))
}

/// Labels passing the two-tier selection policy, largest first.
///
/// The `always_keep` largest survive unconditionally; the rest need at least
/// `min_corridor_size` members. Ties rank by label.
pub fn select_significant_labels(
    sizes: &[(ClusterLabel, usize)],
    config: &ClusterConfig,
) -> Vec<ClusterLabel> {
    let mut ranked: Vec<(ClusterLabel, usize)> = sizes
        .iter()
        .copied()
        .filter(|&(label, _)| label != NOISE)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .enumerate()
        .filter(|&(rank, (_, size))| rank < config.always_keep || size >= config.min_corridor_size)
        .map(|(_, (label, _))| label)
        .collect()
}

/// Keep only significant corridors, largest first.
pub fn select_significant(
    corridors: impl IntoIterator<Item = Corridor>,
    config: &ClusterConfig,
) -> Vec<Corridor> {
    let mut by_label: BTreeMap<ClusterLabel, Corridor> =
        corridors.into_iter().map(|c| (c.label, c)).collect();
    let sizes: Vec<(ClusterLabel, usize)> =
        by_label.values().map(|c| (c.label, c.size())).collect();

    select_significant_labels(&sizes, config)
        .into_iter()
        .filter_map(|label| by_label.remove(&label))
        .collect()
}

/// Cluster both directions, merge labels and select significant corridors.
pub fn extract_corridors(
    inbound: &TrackSet,
    outbound: &TrackSet,
    latitude_for_scale: f64,
    config: &ClusterConfig,
) -> Result<Vec<Corridor>> {
    #[cfg(feature = "parallel")]
    let (inbound_clusters, outbound_clusters) = rayon::join(
        || cluster(inbound, latitude_for_scale, config),
        || cluster(outbound, latitude_for_scale, config),
    );

    #[cfg(not(feature = "parallel"))]
    let (inbound_clusters, outbound_clusters) = (
        cluster(inbound, latitude_for_scale, config),
        cluster(outbound, latitude_for_scale, config),
    );

    let (inbound_clusters, outbound_clusters) =
        merge_labels(inbound_clusters?, outbound_clusters?);

    let total = inbound_clusters.cluster_count() + outbound_clusters.cluster_count();
    let selected = select_significant(
        inbound_clusters
            .corridors
            .into_values()
            .chain(outbound_clusters.corridors.into_values()),
        config,
    );

    info!(
        "[Clusters] {} of {} clusters selected as corridors: {:?}",
        selected.len(),
        total,
        selected.iter().map(|c| (c.label, c.size())).collect::<Vec<_>>()
    );

    Ok(selected)
}
