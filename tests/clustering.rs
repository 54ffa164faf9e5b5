//! Tests for corridor clustering and selection

use corridorfit::clustering::select_significant_labels;
use corridorfit::{
    ClusterConfig, Corridor, Direction, NOISE, TrackPoint, TrackSet, cluster, extract_corridors,
    merge_labels, select_significant,
};

const BOS_LAT: f64 = 42.3656;

/// `count` points along a parallel, 0.0005 deg apart (well inside eps at Boston).
fn line(count: usize, lat: f64, start_lng: f64, dep: &str, arr: &str) -> Vec<TrackPoint> {
    (0..count)
        .map(|i| TrackPoint::new("LINE", lat, start_lng + i as f64 * 0.0005, 1500.0, dep, arr))
        .collect()
}

fn corridor_of_size(label: i32, size: usize) -> Corridor {
    Corridor {
        label,
        direction: Direction::Inbound,
        members: line(size, 42.4, -71.1, "JFK", "BOS"),
    }
}

#[test]
fn test_track_set_filters_by_direction() {
    let mut log = line(10, 42.40, -71.10, "JFK", "BOS");
    log.extend(line(6, 42.30, -71.10, "BOS", "ORD"));
    log.extend(line(4, 42.20, -71.10, "JFK", "ORD"));

    let (inbound, outbound) = TrackSet::split_log(&log, "BOS");
    assert_eq!(inbound.len(), 10);
    assert_eq!(outbound.len(), 6);
    assert!(inbound.points().iter().all(|p| p.arrival_code == "BOS"));
    assert!(outbound.points().iter().all(|p| p.departure_code == "BOS"));
    assert_eq!(outbound.direction(), Direction::Outbound);
}

#[test]
fn test_cluster_separates_distant_lines() {
    let mut log = line(20, 42.40, -71.10, "JFK", "BOS");
    log.extend(line(20, 42.45, -71.10, "JFK", "BOS"));
    let set = TrackSet::from_log(&log, "BOS", Direction::Inbound);

    let result = cluster(&set, BOS_LAT, &ClusterConfig::default()).unwrap();
    assert_eq!(result.cluster_count(), 2);
    assert_eq!(result.noise_count(), 0);
    assert!(result.labels[..20].iter().all(|&l| l == 0));
    assert!(result.labels[20..].iter().all(|&l| l == 1));
    assert_eq!(result.corridors[&0].size(), 20);
}

#[test]
fn test_cluster_is_deterministic() {
    let mut log = line(30, 42.40, -71.10, "JFK", "BOS");
    log.extend(line(12, 42.45, -71.05, "JFK", "BOS"));
    log.push(TrackPoint::new("LONE", 42.30, -71.30, 1200.0, "JFK", "BOS"));
    let set = TrackSet::from_log(&log, "BOS", Direction::Inbound);
    let config = ClusterConfig::default();

    let first = cluster(&set, BOS_LAT, &config).unwrap();
    let second = cluster(&set, BOS_LAT, &config).unwrap();
    assert_eq!(first.labels, second.labels);
    assert_eq!(first.labels[42], NOISE);
}

#[test]
fn test_cluster_empty_and_tiny_sets_are_noise() {
    let config = ClusterConfig::default();

    let empty = TrackSet::from_log(&[], "BOS", Direction::Inbound);
    let result = cluster(&empty, BOS_LAT, &config).unwrap();
    assert!(result.labels.is_empty());
    assert_eq!(result.cluster_count(), 0);

    let log = line(3, 42.40, -71.10, "JFK", "BOS");
    let tiny = TrackSet::from_log(&log, "BOS", Direction::Inbound);
    let result = cluster(&tiny, BOS_LAT, &config).unwrap();
    assert!(result.labels.iter().all(|&l| l == NOISE));
}

#[test]
fn test_merge_labels_offsets_outbound() {
    let mut log = line(20, 42.40, -71.10, "JFK", "BOS");
    log.extend(line(20, 42.45, -71.10, "JFK", "BOS"));
    log.extend(line(20, 42.30, -71.00, "BOS", "ORD"));
    log.push(TrackPoint::new("LONE", 42.20, -70.80, 3000.0, "BOS", "ORD"));
    let (inbound, outbound) = TrackSet::split_log(&log, "BOS");
    let config = ClusterConfig::default();

    let inbound = cluster(&inbound, BOS_LAT, &config).unwrap();
    let outbound = cluster(&outbound, BOS_LAT, &config).unwrap();
    assert_eq!(outbound.labels[0], 0);

    let (inbound, outbound) = merge_labels(inbound, outbound);
    assert_eq!(inbound.cluster_count(), 2);
    assert!(outbound.labels[..20].iter().all(|&l| l == 2));
    assert_eq!(outbound.labels[20], NOISE);
    assert!(outbound.corridors.contains_key(&2));
    assert_eq!(outbound.corridors[&2].label, 2);
}

#[test]
fn test_selection_two_tier_policy() {
    let sizes = [(0, 500), (1, 450), (2, 120), (3, 80), (4, 30)];
    let selected = select_significant_labels(&sizes, &ClusterConfig::default());
    assert_eq!(selected, vec![0, 1, 2]);
}

#[test]
fn test_selection_keeps_small_leaders() {
    // Fewer than always_keep corridors, all small: every one survives
    let sizes = [(0, 12), (1, 40)];
    let selected = select_significant_labels(&sizes, &ClusterConfig::default());
    assert_eq!(selected, vec![1, 0]);
}

#[test]
fn test_selection_ignores_noise_and_empty() {
    let config = ClusterConfig::default();
    assert!(select_significant_labels(&[], &config).is_empty());
    assert_eq!(
        select_significant_labels(&[(NOISE, 900), (0, 10)], &config),
        vec![0]
    );
}

#[test]
fn test_select_significant_orders_by_size() {
    let corridors = vec![
        corridor_of_size(0, 30),
        corridor_of_size(1, 150),
        corridor_of_size(2, 60),
        corridor_of_size(3, 101),
        corridor_of_size(4, 100),
    ];
    let selected = select_significant(corridors, &ClusterConfig::default());
    let labels: Vec<i32> = selected.iter().map(|c| c.label).collect();
    assert_eq!(labels, vec![1, 3, 4]);
}

#[cfg(feature = "synthetic")]
#[test]
fn test_extract_corridors_two_way_traffic() {
    use corridorfit::synthetic::SyntheticScenario;

    let dataset = SyntheticScenario::two_way_traffic().generate();
    let (inbound, outbound) = TrackSet::split_log(&dataset.log, &dataset.airport.code);

    let corridors = extract_corridors(
        &inbound,
        &outbound,
        dataset.airport.latitude,
        &ClusterConfig::default(),
    )
    .unwrap();

    let summary: Vec<(i32, Direction, usize)> = corridors
        .iter()
        .map(|c| (c.label, c.direction, c.size()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (0, Direction::Inbound, 400),
            (2, Direction::Outbound, 300),
            (1, Direction::Inbound, 150),
        ]
    );
}

#[test]
fn test_invalid_coordinates_never_reach_clustering() {
    let mut log = line(20, 42.40, -71.10, "JFK", "BOS");
    log.push(TrackPoint::new("BAD1", f64::NAN, -71.09, 1500.0, "JFK", "BOS"));
    log.push(TrackPoint::new("BAD2", 42.40, f64::INFINITY, 1500.0, "JFK", "BOS"));
    log.push(TrackPoint::new("BAD3", 123.0, -71.09, 1500.0, "JFK", "BOS"));

    let set = TrackSet::from_log(&log, "BOS", Direction::Inbound);
    assert_eq!(set.len(), 20);
    assert!(set.points().iter().all(TrackPoint::is_valid));

    let result = cluster(&set, BOS_LAT, &ClusterConfig::default()).unwrap();
    assert_eq!(result.cluster_count(), 1);
    assert_eq!(result.corridors[&0].size(), 20);
}
