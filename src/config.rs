// src/config.rs

use crate::errors::ParticleNetError;

/// Maximum number of points a leaf holds before it subdivides.
pub const NODE_CAPACITY: usize = 2;

/// Hard recursion ceiling for the quadtree. At this depth the capacity
/// invariant is relaxed and points simply accumulate in the node.
pub const MAX_DEPTH: u8 = 13;

/// The manager schedules a full rebuild once the tree reaches this depth.
pub const REBUILD_DEPTH_LIMIT: u8 = 12;

/// World bounds are padded by this fraction of the average bbox dimension.
pub const WORLD_PADDING_RATIO: f64 = 0.15;

/// Absolute floor on world-bounds padding, so a tight point cluster still
/// gets room to drift without forcing a rebuild on the next frame.
pub const MIN_WORLD_PADDING: f64 = 10.0;

/// Rebuild when fewer than this fraction of nodes came from path compression.
pub const MIN_COMPRESSION_RATIO: f64 = 0.05;

/// Rebuild when more than this fraction of internal nodes are underfull.
pub const MAX_SPARSITY_RATIO: f64 = 0.7;

/// Bounds on the distance cache capacity derived from the particle count.
pub const MIN_CACHE_ENTRIES: usize = 64;
pub const MAX_CACHE_ENTRIES: usize = 32_768;

/// Number of discrete opacity buckets handed to the renderer.
pub const OPACITY_TIERS: usize = 10;

/// A candidate edge counts as "dense" below this fraction of the
/// connection distance.
pub const DENSE_DISTANCE_RATIO: f64 = 1.0 / 3.0;

/// Dense-edge caps per particle, normal and complex mode.
pub const DENSE_CONNECTION_CAP: usize = 5;
pub const COMPLEX_DENSE_CAP: usize = 3;

/// Scale factor for the pointer-attraction impulse.
pub const POINTER_FORCE: f64 = 0.02;

/// Tunables for connection selection and pointer interaction.
///
/// Distances are expressed in the same units as particle positions.
#[derive(Debug, Clone, Copy)]
pub struct NetworkConfig {
    /// Maximum distance at which two particles are connected by an edge.
    pub line_distance: f64,
    /// Complex mode tightens the dense-connection cap for busy scenes.
    pub complex_mode: bool,
    /// Maximum number of dense edges emitted per particle per frame.
    pub max_dense_connections: usize,
    /// Fraction of `line_distance` below which an edge counts as dense.
    pub density_threshold_ratio: f64,
    /// Number of opacity buckets for batched edge rendering.
    pub opacity_tiers: usize,
    /// Impulse scale applied when the pointer attracts nearby particles.
    pub pointer_force: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            line_distance: 100.0,
            complex_mode: false,
            max_dense_connections: DENSE_CONNECTION_CAP,
            density_threshold_ratio: DENSE_DISTANCE_RATIO,
            opacity_tiers: OPACITY_TIERS,
            pointer_force: POINTER_FORCE,
        }
    }
}

impl NetworkConfig {
    pub fn new(
        line_distance: Option<f64>,
        complex_mode: Option<bool>,
        max_dense_connections: Option<usize>,
        density_threshold_ratio: Option<f64>,
    ) -> Self {
        let default = NetworkConfig::default();
        let complex = complex_mode.unwrap_or(default.complex_mode);
        Self {
            line_distance: line_distance.unwrap_or(default.line_distance),
            complex_mode: complex,
            max_dense_connections: max_dense_connections
                .unwrap_or(if complex { COMPLEX_DENSE_CAP } else { DENSE_CONNECTION_CAP }),
            density_threshold_ratio: density_threshold_ratio.unwrap_or(default.density_threshold_ratio),
            ..default
        }
    }

    /// The dense-edge cap in effect, accounting for complex mode.
    pub fn dense_cap(&self) -> usize {
        if self.complex_mode {
            self.max_dense_connections.min(COMPLEX_DENSE_CAP)
        } else {
            self.max_dense_connections
        }
    }

    /// Validates the configuration, returning it unchanged on success.
    ///
    /// # Errors
    /// Returns an error if `line_distance` is negative or non-finite, if the
    /// density threshold is outside `(0, 1]`, or if there are no opacity tiers.
    pub fn validated(self) -> Result<Self, ParticleNetError> {
        if !self.line_distance.is_finite() || self.line_distance < 0.0 {
            return Err(ParticleNetError::InvalidDistance);
        }
        if !(self.density_threshold_ratio > 0.0 && self.density_threshold_ratio <= 1.0) {
            return Err(ParticleNetError::CalculationError(
                "density_threshold_ratio must be in (0, 1]".to_string(),
            ));
        }
        if self.opacity_tiers == 0 {
            return Err(ParticleNetError::InvalidCapacity);
        }
        Ok(self)
    }
}
