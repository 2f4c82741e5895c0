use log::debug;

use crate::config::NetworkConfig;
use crate::geometry::Point2;
use crate::spatial::QuadTreeManager;
use super::DistanceCache;

/// One proximity edge, produced and consumed within a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    /// Linear falloff: 1 at zero distance, 0 at the connection threshold.
    pub opacity: f64,
}

/// The frame's selected edges, bucketed by opacity tier so the renderer
/// can issue one batched draw call per tier instead of one per edge.
#[derive(Debug)]
pub struct ConnectionSet {
    tiers: Vec<Vec<Connection>>,
}

impl ConnectionSet {
    fn with_tiers(tier_count: usize) -> Self {
        Self {
            tiers: (0..tier_count.max(1)).map(|_| Vec::new()).collect(),
        }
    }

    fn push(&mut self, connection: Connection) {
        let last = self.tiers.len() - 1;
        let tier = ((connection.opacity * self.tiers.len() as f64) as usize).min(last);
        self.tiers[tier].push(connection);
    }

    /// Buckets ordered from faintest to most opaque.
    pub fn tiers(&self) -> &[Vec<Connection>] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.tiers.iter().flatten()
    }
}

/// An edge between the pointer location and one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEdge {
    pub id: usize,
    pub distance: f64,
    pub opacity: f64,
}

/// Converts the spatial index into a bounded, render-ready edge list.
///
/// For every visible particle the index is queried for neighbors within
/// `line_distance`; each unordered pair is considered exactly once, from
/// the lower-id side. Candidates are ranked by distance, and once a
/// particle has accepted its cap of dense edges (closer than the density
/// threshold) further dense candidates are refused for the frame — the
/// anti-clutter mechanism that bounds visual density independent of local
/// particle count. Ranking first guarantees the kept dense edges are the
/// closest ones.
///
/// A non-positive `line_distance` produces no edges. Coincident particles
/// connect at distance zero with full opacity and still count against the
/// dense cap.
pub fn select_connections(
    positions: &[Point2],
    visible: &[bool],
    manager: &mut QuadTreeManager,
    cache: &mut DistanceCache,
    config: &NetworkConfig,
) -> ConnectionSet {
    let mut set = ConnectionSet::with_tiers(config.opacity_tiers);
    if config.line_distance <= 0.0 {
        return set;
    }
    let dense_cap = config.dense_cap();
    let dense_threshold = config.line_distance * config.density_threshold_ratio;

    for (i, p) in positions.iter().enumerate() {
        if !visible.get(i).copied().unwrap_or(false) {
            continue;
        }
        let mut candidates: Vec<(usize, f64)> = manager
            .query_circle(p.x, p.y, config.line_distance)
            .into_iter()
            .filter(|c| c.id > i)
            .filter_map(|c| {
                let q = positions.get(c.id)?;
                let d = cache.distance_between(i, *p, c.id, *q);
                (d <= config.line_distance).then_some((c.id, d))
            })
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut dense_count = 0;
        let mut refused = 0;
        for (id, distance) in candidates {
            if distance < dense_threshold {
                if dense_count >= dense_cap {
                    refused += 1;
                    continue;
                }
                dense_count += 1;
            }
            let opacity = 1.0 - distance / config.line_distance;
            set.push(Connection { a: i, b: id, distance, opacity });
        }
        if refused > 0 {
            debug!("dense cap reached for particle {}: {} candidate edge(s) refused", i, refused);
        }
    }
    set
}

/// Edges from the optional pointer location to every visible particle in
/// range. Pointer edges bypass the distance cache: the loop is O(visible)
/// per frame, not O(visible × neighbors).
pub fn select_pointer_edges(
    pointer: Point2,
    visible: &[bool],
    manager: &mut QuadTreeManager,
    config: &NetworkConfig,
) -> Vec<PointerEdge> {
    if config.line_distance <= 0.0 {
        return Vec::new();
    }
    let mut edges: Vec<PointerEdge> = manager
        .query_circle(pointer.x, pointer.y, config.line_distance)
        .into_iter()
        .filter(|c| visible.get(c.id).copied().unwrap_or(false))
        .map(|c| {
            let distance = pointer.distance_to(Point2::new(c.x, c.y));
            PointerEdge {
                id: c.id,
                distance,
                opacity: 1.0 - distance / config.line_distance,
            }
        })
        .collect();
    edges.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    edges
}
