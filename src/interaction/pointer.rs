//! Pointer/touch interaction: particles near the pointer are nudged toward
//! it. The external kinematics component later decays the perturbed
//! velocities back toward their baseline.
//!
//! Velocities use the structure-of-arrays layout (`velocities_x` /
//! `velocities_y`) and are updated in parallel; the loop is O(visible) per
//! frame, so no distance cache is involved.

use rayon::prelude::*;

use crate::config::NetworkConfig;
use crate::geometry::Point2;

/// Applies an attraction impulse toward `pointer` to every visible
/// particle within `line_distance` of it, and marks those particles as
/// perturbed.
///
/// The impulse is the offset to the pointer scaled by the configured
/// constant force factor. Slices are zipped, so all particle arrays must
/// share the particle indexing; a non-positive `line_distance` leaves
/// everything untouched.
pub fn apply_pointer_attraction(
    pointer: Point2,
    positions: &[Point2],
    velocities_x: &mut [f64],
    velocities_y: &mut [f64],
    perturbed: &mut [bool],
    visible: &[bool],
    config: &NetworkConfig,
) {
    if config.line_distance <= 0.0 {
        return;
    }
    let range_sq = config.line_distance * config.line_distance;
    let force = config.pointer_force;

    positions
        .par_iter()
        .zip(visible.par_iter())
        .zip(velocities_x.par_iter_mut())
        .zip(velocities_y.par_iter_mut())
        .zip(perturbed.par_iter_mut())
        .for_each(|((((p, &is_visible), vx), vy), flag)| {
            if !is_visible {
                return;
            }
            let dx = pointer.x - p.x;
            let dy = pointer.y - p.y;
            if dx * dx + dy * dy <= range_sq {
                *vx += dx * force;
                *vy += dy * force;
                *flag = true;
            }
        });
}
