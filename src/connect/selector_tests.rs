use std::collections::HashSet;

use approx::assert_relative_eq;

use crate::config::NetworkConfig;
use crate::connect::{select_connections, select_pointer_edges, Connection, DistanceCache};
use crate::geometry::Point2;
use crate::spatial::QuadTreeManager;

fn build_manager(positions: &[Point2]) -> QuadTreeManager {
    let mut manager = QuadTreeManager::new();
    let live: Vec<usize> = (0..positions.len()).collect();
    manager.build_from_snapshot(positions, &live);
    manager
}

fn edges_from(set_iter: Vec<Connection>, particle: usize) -> Vec<Connection> {
    set_iter.into_iter().filter(|c| c.a == particle).collect()
}

#[test]
fn test_nearby_particles_connect_and_distant_ones_do_not() {
    let positions = vec![
        Point2::new(10.0, 10.0),
        Point2::new(40.0, 10.0),
        Point2::new(500.0, 500.0),
    ];
    let visible = vec![true; 3];
    let mut manager = build_manager(&positions);
    let mut cache = DistanceCache::new();
    let config = NetworkConfig { line_distance: 100.0, ..NetworkConfig::default() };

    let set = select_connections(&positions, &visible, &mut manager, &mut cache, &config);
    assert_eq!(set.len(), 1);
    let edge = *set.iter().next().expect("one edge expected");
    assert_eq!((edge.a, edge.b), (0, 1));
    crate::assert_float_eq(edge.distance, 30.0, 1e-9, None);
    assert_relative_eq!(edge.opacity, 0.7, epsilon = 1e-9);
}

#[test]
fn test_each_unordered_pair_appears_once_from_the_lower_id() {
    let positions: Vec<Point2> = (0..8).map(|i| Point2::new(i as f64 * 10.0, 0.0)).collect();
    let visible = vec![true; 8];
    let mut manager = build_manager(&positions);
    let mut cache = DistanceCache::new();
    let config = NetworkConfig { line_distance: 200.0, ..NetworkConfig::default() };

    let set = select_connections(&positions, &visible, &mut manager, &mut cache, &config);
    let mut seen = HashSet::new();
    for c in set.iter() {
        assert!(c.a < c.b, "edge must originate from the lower id: {:?}", c);
        assert!(seen.insert((c.a, c.b)), "duplicate edge {:?}", c);
    }
}

#[test]
fn test_dense_cap_keeps_the_closest_edges() {
    // Six neighbors at distances 10..60 from particle 0; with a cap of 5
    // the 60-distance edge must be the one refused.
    let mut positions = vec![Point2::new(100.0, 100.0)];
    for i in 1..=6 {
        positions.push(Point2::new(100.0 + 10.0 * i as f64, 100.0));
    }
    let visible = vec![true; positions.len()];
    let mut manager = build_manager(&positions);
    let mut cache = DistanceCache::new();
    // All six candidates fall below the density threshold (200 / 3).
    let config = NetworkConfig { line_distance: 200.0, ..NetworkConfig::default() };
    assert_eq!(config.dense_cap(), 5);

    let set = select_connections(&positions, &visible, &mut manager, &mut cache, &config);
    let from_center = edges_from(set.iter().copied().collect(), 0);
    assert_eq!(from_center.len(), 5);
    let partners: HashSet<usize> = from_center.iter().map(|c| c.b).collect();
    assert_eq!(partners, HashSet::from([1, 2, 3, 4, 5]));
    let max_distance = from_center.iter().map(|c| c.distance).fold(0.0, f64::max);
    crate::assert_float_eq(max_distance, 50.0, 1e-9, None);
}

#[test]
fn test_complex_mode_tightens_the_dense_cap() {
    let mut positions = vec![Point2::new(100.0, 100.0)];
    for i in 1..=6 {
        positions.push(Point2::new(100.0 + 10.0 * i as f64, 100.0));
    }
    let visible = vec![true; positions.len()];
    let mut manager = build_manager(&positions);
    let mut cache = DistanceCache::new();
    let config = NetworkConfig {
        line_distance: 200.0,
        complex_mode: true,
        ..NetworkConfig::default()
    };
    assert_eq!(config.dense_cap(), 3);

    let set = select_connections(&positions, &visible, &mut manager, &mut cache, &config);
    let from_center = edges_from(set.iter().copied().collect(), 0);
    assert_eq!(from_center.len(), 3);
    let partners: HashSet<usize> = from_center.iter().map(|c| c.b).collect();
    assert_eq!(partners, HashSet::from([1, 2, 3]));
}

#[test]
fn test_sparse_edges_are_not_capped() {
    // Six neighbors between the density threshold and the connection
    // distance: more than the cap, but none of them dense.
    let mut positions = vec![Point2::new(500.0, 500.0)];
    for i in 0..6 {
        positions.push(Point2::new(500.0 + 40.0 + 5.0 * i as f64, 500.0));
    }
    let visible = vec![true; positions.len()];
    let mut manager = build_manager(&positions);
    let mut cache = DistanceCache::new();
    // Threshold is 100/3 = 33.3; candidates sit at 40..65.
    let config = NetworkConfig { line_distance: 100.0, ..NetworkConfig::default() };

    let set = select_connections(&positions, &visible, &mut manager, &mut cache, &config);
    let from_center = edges_from(set.iter().copied().collect(), 0);
    assert_eq!(from_center.len(), 6);
}

#[test]
fn test_non_positive_line_distance_produces_no_edges() {
    let positions = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
    let visible = vec![true; 2];
    let mut manager = build_manager(&positions);
    let mut cache = DistanceCache::new();

    for line_distance in [0.0, -5.0] {
        let config = NetworkConfig { line_distance, ..NetworkConfig::default() };
        let set = select_connections(&positions, &visible, &mut manager, &mut cache, &config);
        assert!(set.is_empty());
    }
}

#[test]
fn test_invisible_particles_do_not_originate_edges() {
    let positions = vec![
        Point2::new(10.0, 10.0),
        Point2::new(20.0, 10.0),
        Point2::new(30.0, 10.0),
    ];
    // Particle 0 is off-screen; 1 and 2 still connect to each other.
    let visible = vec![false, true, true];
    let mut manager = build_manager(&positions);
    let mut cache = DistanceCache::new();
    let config = NetworkConfig { line_distance: 50.0, ..NetworkConfig::default() };

    let set = select_connections(&positions, &visible, &mut manager, &mut cache, &config);
    let pairs: Vec<(usize, usize)> = set.iter().map(|c| (c.a, c.b)).collect();
    assert_eq!(pairs, vec![(1, 2)]);
}

#[test]
fn test_coincident_particles_connect_at_full_opacity() {
    let positions = vec![Point2::new(5.0, 5.0), Point2::new(5.0, 5.0)];
    let visible = vec![true; 2];
    let mut manager = build_manager(&positions);
    let mut cache = DistanceCache::new();
    let config = NetworkConfig { line_distance: 10.0, ..NetworkConfig::default() };

    let set = select_connections(&positions, &visible, &mut manager, &mut cache, &config);
    assert_eq!(set.len(), 1);
    let edge = *set.iter().next().expect("one edge expected");
    assert_eq!(edge.distance, 0.0);
    assert_eq!(edge.opacity, 1.0);
    // Full opacity lands in the top tier.
    let tiers = set.tiers();
    assert_eq!(tiers[tiers.len() - 1].len(), 1);
}

#[test]
fn test_opacity_tier_bucketing() {
    // Distance 30 of 100 -> opacity 0.7 -> tier 7 of 10.
    let positions = vec![Point2::new(0.0, 0.0), Point2::new(30.0, 0.0)];
    let visible = vec![true; 2];
    let mut manager = build_manager(&positions);
    let mut cache = DistanceCache::new();
    let config = NetworkConfig { line_distance: 100.0, ..NetworkConfig::default() };

    let set = select_connections(&positions, &visible, &mut manager, &mut cache, &config);
    assert_eq!(set.tiers().len(), 10);
    assert_eq!(set.tiers()[7].len(), 1);
    assert_eq!(set.len(), 1);
}

#[test]
fn test_pointer_edges_within_range_sorted_by_distance() {
    let positions = vec![
        Point2::new(10.0, 0.0),
        Point2::new(30.0, 0.0),
        Point2::new(500.0, 0.0),
    ];
    let visible = vec![true; 3];
    let mut manager = build_manager(&positions);
    let config = NetworkConfig { line_distance: 100.0, ..NetworkConfig::default() };

    let edges = select_pointer_edges(Point2::new(0.0, 0.0), &visible, &mut manager, &config);
    let ids: Vec<usize> = edges.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![0, 1]);
    crate::assert_float_eq(edges[0].distance, 10.0, 1e-9, None);
    assert_relative_eq!(edges[0].opacity, 0.9, epsilon = 1e-9);
    assert!(edges[0].distance <= edges[1].distance);
}

#[test]
fn test_pointer_edges_skip_invisible_particles() {
    let positions = vec![Point2::new(10.0, 0.0), Point2::new(20.0, 0.0)];
    let visible = vec![true, false];
    let mut manager = build_manager(&positions);
    let config = NetworkConfig { line_distance: 100.0, ..NetworkConfig::default() };

    let edges = select_pointer_edges(Point2::new(0.0, 0.0), &visible, &mut manager, &config);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].id, 0);
}
