use std::collections::{HashMap, VecDeque};

use crate::config::{MAX_CACHE_ENTRIES, MIN_CACHE_ENTRIES};
use crate::geometry::Point2;

/// Order-independent key for a particle pair. Ids must fit in 32 bits.
pub fn pair_key(a: usize, b: usize) -> u64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    ((lo as u64) << 32) | (hi as u64 & 0xFFFF_FFFF)
}

/// A bounded cache of pairwise Euclidean distances.
///
/// Keys are symmetric: the distance between particles (a, b) and (b, a) is
/// one entry. Positions change every frame, so the cache has no
/// invalidation other than a full [`DistanceCache::reset`], which must run
/// once per frame before any lookups.
///
/// Eviction is FIFO by insertion order — there is no touch-on-read
/// reordering, so this is not an LRU.
///
/// # Examples
///
/// ```
/// use particle_net::connect::DistanceCache;
/// use particle_net::geometry::Point2;
///
/// let mut cache = DistanceCache::new();
/// let a = Point2::new(0.0, 0.0);
/// let b = Point2::new(3.0, 4.0);
/// assert_eq!(cache.distance_between(0, a, 1, b), 5.0);
/// // Symmetric: the reversed pair hits the same entry.
/// assert_eq!(cache.distance_between(1, b, 0, a), 5.0);
/// ```
#[derive(Debug)]
pub struct DistanceCache {
    entries: HashMap<u64, f64>,
    insertion_order: VecDeque<u64>,
    max_entries: usize,
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHE_ENTRIES)
    }

    /// A capacity of zero disables caching: every lookup is computed and
    /// immediately discarded.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            max_entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Returns the Euclidean distance between the two particles, from cache
    /// when the pair was already computed this frame.
    pub fn distance_between(&mut self, id_a: usize, pos_a: Point2, id_b: usize, pos_b: Point2) -> f64 {
        if self.max_entries == 0 {
            return pos_a.distance_to(pos_b);
        }
        let key = pair_key(id_a, id_b);
        if let Some(&distance) = self.entries.get(&key) {
            return distance;
        }
        let distance = pos_a.distance_to(pos_b);
        self.entries.insert(key, distance);
        self.insertion_order.push_back(key);
        while self.entries.len() > self.max_entries {
            self.evict_oldest();
        }
        distance
    }

    fn evict_oldest(&mut self) {
        if let Some(key) = self.insertion_order.pop_front() {
            self.entries.remove(&key);
        }
    }

    /// Drops every entry by swapping in fresh containers. No entry outlives
    /// a reset.
    pub fn reset(&mut self) {
        self.entries = HashMap::new();
        self.insertion_order = VecDeque::new();
    }

    /// Recomputes the target capacity from the particle count — the number
    /// of unordered pairs, clamped to a sane range — and trims the oldest
    /// entries when shrinking.
    pub fn update_capacity(&mut self, particle_count: usize) {
        let pairs = particle_count.saturating_mul(particle_count.saturating_sub(1)) / 2;
        self.max_entries = pairs.clamp(MIN_CACHE_ENTRIES, MAX_CACHE_ENTRIES);
        while self.entries.len() > self.max_entries {
            self.evict_oldest();
        }
    }
}
