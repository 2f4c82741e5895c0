use log::{debug, warn};
use rayon::prelude::*;

use crate::config::{
    MAX_SPARSITY_RATIO, MIN_COMPRESSION_RATIO, MIN_WORLD_PADDING, REBUILD_DEPTH_LIMIT,
    WORLD_PADDING_RATIO,
};
use crate::errors::ParticleNetError;
use crate::geometry::{Point2, Rect};
use super::{IndexedPoint, QuadTree, TreeStats};

/// Ratio heuristics are skipped below this node count; tiny trees make the
/// ratios meaningless.
const REBUILD_MIN_NODES: usize = 16;

/// Owns the quadtree and hides its lifecycle from callers.
///
/// The manager derives world bounds adaptively from the current particle
/// set, decides each frame between a full rebuild and a cheap incremental
/// refresh, and exposes simple query methods. Rebuilding every frame is
/// always correct but costs O(n log n); skipping it on stable frames risks
/// a mildly stale index, which connection queries tolerate within one frame
/// of positional drift.
pub struct QuadTreeManager {
    tree: Option<QuadTree>,
    query_count: u64,
    rejected_inserts: usize,
    needs_rebalance: bool,
}

impl Default for QuadTreeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadTreeManager {
    /// Creates an uninitialized manager; bounds are derived from the first
    /// snapshot unless [`QuadTreeManager::initialize`] is called first.
    pub fn new() -> Self {
        Self {
            tree: None,
            query_count: 0,
            rejected_inserts: 0,
            needs_rebalance: false,
        }
    }

    /// Constructs a fresh, empty tree over the given bounds.
    ///
    /// # Errors
    /// Returns an error if the bounds are inverted.
    pub fn initialize(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<(), ParticleNetError> {
        let bounds = Rect::from_bounds(min_x, min_y, max_x, max_y)?;
        self.tree = Some(QuadTree::new(bounds));
        self.rejected_inserts = 0;
        self.needs_rebalance = false;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.tree.is_some()
    }

    /// The world boundary currently indexed, if any.
    pub fn boundary(&self) -> Option<Rect> {
        self.tree.as_ref().map(QuadTree::boundary)
    }

    /// Clears and bulk-loads the tree from the current particle snapshot.
    ///
    /// Bounds are (re)derived when the manager is uninitialized or when a
    /// previous frame saw out-of-bounds rejections: the tight bounding box
    /// of all live points is expanded by a padding proportional to the
    /// average dimension, floored at an absolute minimum, so points near
    /// the edge don't immediately force another rebuild.
    pub fn build_from_snapshot(&mut self, positions: &[Point2], live_ids: &[usize]) {
        if self.tree.is_none() || self.rejected_inserts > 0 {
            if let Some(bounds) = Self::adaptive_bounds(positions, live_ids) {
                self.tree = Some(QuadTree::new(bounds));
            }
        }
        let tree = match self.tree.as_mut() {
            Some(tree) => tree,
            // Zero particles and never initialized: nothing to index yet.
            None => return,
        };
        tree.clear();
        self.rejected_inserts = 0;
        for &id in live_ids {
            if let Some(p) = positions.get(id) {
                if !tree.insert(IndexedPoint::new(id, p.x, p.y)) {
                    self.rejected_inserts += 1;
                }
            }
        }
        if self.rejected_inserts > 0 {
            warn!(
                "{} point(s) fell outside the world bounds; a rebuild with recomputed bounds is scheduled",
                self.rejected_inserts
            );
        }
        tree.optimize_memory();
        self.needs_rebalance = false;
    }

    /// Tight bounding box of the live points, padded by
    /// `WORLD_PADDING_RATIO` of the average dimension (floored at
    /// `MIN_WORLD_PADDING`). Returns `None` when there are no live points.
    fn adaptive_bounds(positions: &[Point2], live_ids: &[usize]) -> Option<Rect> {
        let (min_x, min_y, max_x, max_y) = live_ids
            .par_iter()
            .filter_map(|&id| positions.get(id))
            .map(|p| (p.x, p.y, p.x, p.y))
            .reduce(
                || (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
                |a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)),
            );
        if min_x > max_x {
            return None;
        }
        let avg_dim = ((max_x - min_x) + (max_y - min_y)) / 2.0;
        let padding = (avg_dim * WORLD_PADDING_RATIO).max(MIN_WORLD_PADDING);
        Rect::from_bounds(min_x - padding, min_y - padding, max_x + padding, max_y + padding).ok()
    }

    /// Delegated circle query; bumps the internal query counter.
    pub fn query_circle(&mut self, cx: f64, cy: f64, r: f64) -> Vec<IndexedPoint> {
        self.query_count += 1;
        match &self.tree {
            Some(tree) => tree.query_circle(cx, cy, r),
            None => Vec::new(),
        }
    }

    /// Delegated rectangle query; bumps the internal query counter.
    pub fn query_rect(&mut self, range: &Rect) -> Vec<IndexedPoint> {
        self.query_count += 1;
        match &self.tree {
            Some(tree) => tree.query_range(range),
            None => Vec::new(),
        }
    }

    pub fn query_count(&self) -> u64 {
        self.query_count
    }

    pub fn stats(&self) -> TreeStats {
        self.tree.as_ref().map(QuadTree::stats).unwrap_or_default()
    }

    /// Requests a full rebuild on the next update.
    pub fn mark_for_rebalance(&mut self) {
        self.needs_rebalance = true;
    }

    /// True when the index has degraded enough to warrant a full rebuild:
    /// the depth ceiling was exceeded, the tree never compresses (uniformly
    /// scattered points), internal nodes are mostly underfull, inserts were
    /// rejected, or a rebalance was requested explicitly.
    pub fn should_rebuild(&self) -> bool {
        let tree = match &self.tree {
            Some(tree) => tree,
            None => return true,
        };
        if self.needs_rebalance || self.rejected_inserts > 0 {
            return true;
        }
        let stats = tree.stats();
        if stats.max_depth_seen > REBUILD_DEPTH_LIMIT as usize {
            return true;
        }
        if stats.node_count >= REBUILD_MIN_NODES {
            if stats.compression_ratio() < MIN_COMPRESSION_RATIO {
                return true;
            }
            if stats.sparsity_ratio() > MAX_SPARSITY_RATIO {
                return true;
            }
        }
        false
    }

    /// Per-frame entry point: builds the index if absent, fully rebuilds
    /// when [`QuadTreeManager::should_rebuild`] says so, and otherwise runs
    /// a cheap memory-optimization pass over the existing tree.
    pub fn update(&mut self, positions: &[Point2], live_ids: &[usize]) {
        if self.tree.is_none() || self.should_rebuild() {
            debug!("rebuilding spatial index for {} live particles", live_ids.len());
            self.build_from_snapshot(positions, live_ids);
        } else if let Some(tree) = self.tree.as_mut() {
            tree.optimize_memory();
        }
    }
}
