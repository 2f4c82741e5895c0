use crate::config::NetworkConfig;
use crate::connect::{select_connections, select_pointer_edges, ConnectionSet, DistanceCache, PointerEdge};
use crate::errors::ParticleNetError;
use crate::geometry::Point2;
use crate::interaction::apply_pointer_attraction;
use crate::spatial::{QuadTreeManager, TreeStats};

/// Everything one frame hands to the renderer: the tiered edge set,
/// optional pointer edges, and index statistics for diagnostics.
#[derive(Debug)]
pub struct FrameOutput {
    pub connections: ConnectionSet,
    pub pointer_edges: Vec<PointerEdge>,
    pub stats: TreeStats,
}

/// Per-frame driver for the particle network core.
///
/// Owns the spatial index manager and the distance cache, and runs the
/// frame pipeline: reset the cache, refresh the index from the current
/// positions, select connections, then gather pointer edges. Kinematics
/// (position integration, boundary reflection) and rendering stay with the
/// caller.
///
/// # Examples
///
/// ```
/// use particle_net::config::NetworkConfig;
/// use particle_net::frame::NetworkFrame;
/// use particle_net::geometry::Point2;
///
/// let mut frame = NetworkFrame::new(NetworkConfig::default()).unwrap();
/// let positions = vec![
///     Point2::new(10.0, 10.0),
///     Point2::new(40.0, 10.0),
///     Point2::new(400.0, 400.0),
/// ];
/// let visible = vec![true; positions.len()];
///
/// let output = frame.advance(&positions, &visible, None);
/// // The two nearby particles connect; the far one does not.
/// assert_eq!(output.connections.len(), 1);
/// ```
pub struct NetworkFrame {
    manager: QuadTreeManager,
    cache: DistanceCache,
    config: NetworkConfig,
}

impl NetworkFrame {
    /// # Errors
    /// Returns an error if the configuration fails validation.
    pub fn new(config: NetworkConfig) -> Result<Self, ParticleNetError> {
        Ok(Self {
            manager: QuadTreeManager::new(),
            cache: DistanceCache::new(),
            config: config.validated()?,
        })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Replaces the configuration after validating it.
    pub fn set_config(&mut self, config: NetworkConfig) -> Result<(), ParticleNetError> {
        self.config = config.validated()?;
        Ok(())
    }

    pub fn manager(&self) -> &QuadTreeManager {
        &self.manager
    }

    /// Runs one frame: kinematics has already moved the particles, so the
    /// cache is reset and resized, the index is refreshed from the
    /// snapshot, and the edge set is selected. Every particle index in
    /// `0..positions.len()` is treated as live; `visible` gates which
    /// particles originate queries.
    pub fn advance(&mut self, positions: &[Point2], visible: &[bool], pointer: Option<Point2>) -> FrameOutput {
        self.cache.reset();
        self.cache.update_capacity(positions.len());

        let live_ids: Vec<usize> = (0..positions.len()).collect();
        self.manager.update(positions, &live_ids);

        let connections =
            select_connections(positions, visible, &mut self.manager, &mut self.cache, &self.config);
        let pointer_edges = match pointer {
            Some(p) => select_pointer_edges(p, visible, &mut self.manager, &self.config),
            None => Vec::new(),
        };

        FrameOutput {
            connections,
            pointer_edges,
            stats: self.manager.stats(),
        }
    }

    /// Applies the pointer attraction side-effect to the caller's velocity
    /// arrays. Separate from [`NetworkFrame::advance`] because the velocity
    /// state belongs to the external kinematics component.
    pub fn attract_toward(
        &self,
        pointer: Point2,
        positions: &[Point2],
        velocities_x: &mut [f64],
        velocities_y: &mut [f64],
        perturbed: &mut [bool],
        visible: &[bool],
    ) {
        apply_pointer_attraction(
            pointer,
            positions,
            velocities_x,
            velocities_y,
            perturbed,
            visible,
            &self.config,
        );
    }
}
