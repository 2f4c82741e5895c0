use crate::config::{MAX_DEPTH, NODE_CAPACITY};
use crate::geometry::{Quadrant, Rect};

/// A read-only positional snapshot of one particle.
///
/// `id` is a stable index into the caller's particle arrays; the tree never
/// owns particle state. Snapshots are created fresh on every rebuild and
/// discarded when the tree is cleared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedPoint {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl IndexedPoint {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

/// Aggregate statistics over a quadtree, gathered in one recursive pass.
///
/// The derived ratios drive the manager's rebuild heuristic: a tree that
/// never compresses suggests uniformly scattered points, while a high
/// sparsity ratio means many underfull internal nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TreeStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub point_count: usize,
    pub max_depth_seen: usize,
    pub compressed_node_count: usize,
    /// Internal nodes with fewer than four children.
    pub sparse_node_count: usize,
}

impl TreeStats {
    /// Fraction of nodes created by path compression.
    pub fn compression_ratio(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.compressed_node_count as f64 / self.node_count as f64
        }
    }

    /// Fraction of nodes that are underfull internal nodes.
    pub fn sparsity_ratio(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.sparse_node_count as f64 / self.node_count as f64
        }
    }
}

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Clone, Debug)]
struct Node {
    boundary: Rect,
    depth: u8,
    /// Provenance flag: this node was created by collapsing a
    /// single-quadrant overflow instead of a four-way subdivision.
    compressed: bool,
    points: Vec<IndexedPoint>,
    children: [Option<NodeId>; 4],
}

impl Node {
    fn new(boundary: Rect, depth: u8, compressed: bool) -> Self {
        Self {
            boundary,
            depth,
            compressed,
            points: Vec::new(),
            children: [None; 4],
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    fn child_count(&self) -> usize {
        self.children.iter().flatten().count()
    }
}

/// A compressed quadtree over indexed point snapshots.
///
/// Space is partitioned recursively so queries can skip whole subtrees that
/// cannot contain qualifying points. Leaves hold at most two points before
/// subdividing; runs of co-located points collapse into a single linked
/// child (path compression) instead of four mostly-empty siblings, which
/// bounds memory for clustered particles. Beyond depth 13 the capacity
/// invariant is relaxed and points accumulate, guaranteeing termination at
/// extreme density.
///
/// Nodes live in a growable arena and reference their children by index;
/// clearing the tree truncates the arena back to a single empty root.
///
/// # Examples
///
/// ```
/// use particle_net::geometry::Rect;
/// use particle_net::spatial::{IndexedPoint, QuadTree};
///
/// let boundary = Rect::new(0.0, 0.0, 100.0, 100.0).unwrap();
/// let mut tree = QuadTree::new(boundary);
///
/// assert!(tree.insert(IndexedPoint::new(0, 25.0, 25.0)));
/// assert!(tree.insert(IndexedPoint::new(1, 75.0, 75.0)));
/// // Out-of-bounds points are rejected, never stored.
/// assert!(!tree.insert(IndexedPoint::new(2, 150.0, 50.0)));
///
/// let hits = tree.query_circle(20.0, 20.0, 10.0);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].id, 0);
/// ```
#[derive(Clone, Debug)]
pub struct QuadTree {
    nodes: Vec<Node>,
}

impl QuadTree {
    /// Creates an empty tree owning the given world boundary.
    pub fn new(boundary: Rect) -> Self {
        Self {
            nodes: vec![Node::new(boundary, 0, false)],
        }
    }

    /// The world boundary this tree was built over.
    pub fn boundary(&self) -> Rect {
        self.nodes[ROOT].boundary
    }

    /// Inserts a point snapshot, returning `false` if it lies outside the
    /// world boundary. Rejection leaves the tree unchanged; the caller
    /// decides whether to grow the bounds and rebuild.
    pub fn insert(&mut self, point: IndexedPoint) -> bool {
        if !self.nodes[ROOT].boundary.contains(point.x, point.y) {
            return false;
        }
        self.insert_at(ROOT, point);
        true
    }

    fn insert_at(&mut self, id: NodeId, point: IndexedPoint) {
        if self.nodes[id].is_leaf() {
            // Capacity is ignored at the depth ceiling.
            if self.nodes[id].points.len() < NODE_CAPACITY || self.nodes[id].depth >= MAX_DEPTH {
                self.nodes[id].points.push(point);
                return;
            }
            self.split(id, point);
            return;
        }
        let quadrant = self.nodes[id].boundary.quadrant_of(point.x, point.y);
        let child = self.child_or_create(id, quadrant, false);
        self.insert_at(child, point);
    }

    /// Subdivides a full leaf. When every resident point and the newcomer
    /// fall into one quadrant, a single compressed child is created and the
    /// move may cascade further compression; otherwise all four children are
    /// created and the residents redistributed first-fit.
    fn split(&mut self, id: NodeId, point: IndexedPoint) {
        let boundary = self.nodes[id].boundary;
        let target = boundary.quadrant_of(point.x, point.y);
        let all_same_quadrant = self.nodes[id]
            .points
            .iter()
            .all(|p| boundary.quadrant_of(p.x, p.y) == target);

        let residents = std::mem::take(&mut self.nodes[id].points);

        if all_same_quadrant {
            let child = self.child_or_create(id, target, true);
            for p in residents {
                self.insert_at(child, p);
            }
            self.insert_at(child, point);
            return;
        }

        let kids = Quadrant::ALL.map(|q| self.child_or_create(id, q, false));
        for p in residents {
            for &kid in &kids {
                if self.nodes[kid].boundary.contains(p.x, p.y) {
                    self.insert_at(kid, p);
                    break;
                }
            }
        }
        let kid = kids[target.index()];
        self.insert_at(kid, point);
    }

    fn child_or_create(&mut self, id: NodeId, quadrant: Quadrant, compressed: bool) -> NodeId {
        if let Some(child) = self.nodes[id].children[quadrant.index()] {
            return child;
        }
        let boundary = self.nodes[id].boundary.child_rect(quadrant);
        let depth = self.nodes[id].depth + 1;
        let child = self.nodes.len();
        self.nodes.push(Node::new(boundary, depth, compressed));
        self.nodes[id].children[quadrant.index()] = Some(child);
        child
    }

    /// Returns every stored point inside the query rectangle.
    ///
    /// Subtrees whose boundary does not intersect the rectangle are skipped
    /// entirely. Results are in traversal order, not distance-sorted.
    pub fn query_range(&self, range: &Rect) -> Vec<IndexedPoint> {
        let mut out = Vec::new();
        self.collect_range(ROOT, range, &mut out);
        out
    }

    fn collect_range(&self, id: NodeId, range: &Rect, out: &mut Vec<IndexedPoint>) {
        let node = &self.nodes[id];
        if !node.boundary.intersects(range) {
            return;
        }
        for p in &node.points {
            if range.contains(p.x, p.y) {
                out.push(*p);
            }
        }
        for child in node.children.iter().flatten() {
            self.collect_range(*child, range, out);
        }
    }

    /// Returns every stored point within radius `r` of (cx, cy).
    ///
    /// The boundary test is inclusive: points exactly at distance `r` match.
    pub fn query_circle(&self, cx: f64, cy: f64, r: f64) -> Vec<IndexedPoint> {
        let mut out = Vec::new();
        if r < 0.0 {
            return out;
        }
        self.collect_circle(ROOT, cx, cy, r, &mut out);
        out
    }

    fn collect_circle(&self, id: NodeId, cx: f64, cy: f64, r: f64, out: &mut Vec<IndexedPoint>) {
        let node = &self.nodes[id];
        if !node.boundary.intersects_circle(cx, cy, r) {
            return;
        }
        let r_sq = r * r;
        for p in &node.points {
            let dx = p.x - cx;
            let dy = p.y - cy;
            if dx * dx + dy * dy <= r_sq {
                out.push(*p);
            }
        }
        for child in node.children.iter().flatten() {
            self.collect_circle(*child, cx, cy, r, out);
        }
    }

    /// Collects every point stored anywhere in the tree, in traversal order.
    pub fn all_points(&self) -> Vec<IndexedPoint> {
        let mut out = Vec::new();
        self.collect_all(ROOT, &mut out);
        out
    }

    fn collect_all(&self, id: NodeId, out: &mut Vec<IndexedPoint>) {
        let node = &self.nodes[id];
        out.extend_from_slice(&node.points);
        for child in node.children.iter().flatten() {
            self.collect_all(*child, out);
        }
    }

    /// Total number of stored points.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|n| n.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all points and children; the tree becomes a single empty leaf
    /// over the same boundary. The node arena is truncated in one step.
    pub fn clear(&mut self) {
        let boundary = self.nodes[ROOT].boundary;
        self.nodes.clear();
        self.nodes.push(Node::new(boundary, 0, false));
    }

    /// Unlinks children that are empty leaves. Pure housekeeping after
    /// points have moved or been filtered out; surviving points stay where
    /// they are. Unlinked arena slots are reclaimed on the next clear or
    /// rebuild.
    pub fn optimize_memory(&mut self) {
        self.prune_empty(ROOT);
    }

    fn prune_empty(&mut self, id: NodeId) {
        for slot in 0..4 {
            if let Some(child) = self.nodes[id].children[slot] {
                self.prune_empty(child);
                if self.nodes[child].is_leaf() && self.nodes[child].points.is_empty() {
                    self.nodes[id].children[slot] = None;
                }
            }
        }
    }

    /// Collects every point, clears the tree, and reinserts them from
    /// scratch. Used when compression or sparsity metrics indicate the tree
    /// has degraded; never changes the number of stored points.
    pub fn rebalance(&mut self) {
        let points = self.all_points();
        self.clear();
        for p in points {
            // Points already in the tree are inside the boundary.
            self.insert(p);
        }
    }

    /// Aggregates statistics over the whole tree in one recursive pass.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.aggregate_stats(ROOT, &mut stats);
        stats
    }

    fn aggregate_stats(&self, id: NodeId, stats: &mut TreeStats) {
        let node = &self.nodes[id];
        stats.node_count += 1;
        stats.point_count += node.points.len();
        stats.max_depth_seen = stats.max_depth_seen.max(node.depth as usize);
        if node.compressed {
            stats.compressed_node_count += 1;
        }
        if node.is_leaf() {
            stats.leaf_count += 1;
        } else if node.child_count() < 4 {
            stats.sparse_node_count += 1;
        }
        for child in node.children.iter().flatten() {
            self.aggregate_stats(*child, stats);
        }
    }
}
