//! Velocity sources for the vorton engine
//!
//! Defines the [`VelocitySource`] trait, implemented by the influence tree
//! (hierarchical, approximate) and by [`DirectSummation`] (exact O(N) per
//! query), and the routine that samples a source onto the velocity grid

use rayon::prelude::*;

use crate::grid::geometry::UniformGridGeometry;
use crate::grid::uniform_grid::UniformGrid;
use crate::simulation::influence_tree::{compute_velocity_brute_force, InfluenceTree};
use crate::simulation::states::NVec3;
use crate::simulation::vorton::Vorton;

/// Anything that can report the fluid velocity at a point.
/// Must be shareable across the rayon pool, since grid sampling is parallel
pub trait VelocitySource: Sync {
    fn velocity_at(&self, position: &NVec3) -> NVec3;
}

impl VelocitySource for InfluenceTree {
    fn velocity_at(&self, position: &NVec3) -> NVec3 {
        InfluenceTree::velocity_at(self, position)
    }
}

/// Exact Biot-Savart sum over every vorton. Reference path for testing and
/// benchmarking the tree
pub struct DirectSummation<'a> {
    pub vortons: &'a [Vorton],
}

impl VelocitySource for DirectSummation<'_> {
    fn velocity_at(&self, position: &NVec3) -> NVec3 {
        compute_velocity_brute_force(self.vortons, position)
    }
}

/// Fill `velocity_grid` with velocities sampled from `source`.
///
/// The grid takes the shape of `geometry` (the base layer of the influence
/// tree). Sample points are shrunk towards the minimal corner by `2ε` of a
/// cell so the last row stays strictly inside the region.
///
/// z-slices are independent, so each one is filled by its own rayon task.
pub fn compute_velocity_grid(velocity_grid: &mut UniformGrid<NVec3>, geometry: &UniformGridGeometry, source: &dyn VelocitySource) {
    velocity_grid.copy_shape(geometry);
    velocity_grid.init();
    if velocity_grid.is_empty() {
        return;
    }

    let min_corner = *geometry.min_corner();
    let spacing = geometry.cell_spacing() * (1.0 - 2.0 * f64::EPSILON);
    let nx = geometry.num_points(0);
    let ny = geometry.num_points(1);

    velocity_grid
        .contents_mut()
        .par_chunks_mut(nx * ny)
        .enumerate()
        .for_each(|(k, slice)| {
            for j in 0..ny {
                for i in 0..nx {
                    let position = min_corner + NVec3::new(
                        i as f64 * spacing.x,
                        j as f64 * spacing.y,
                        k as f64 * spacing.z,
                    );
                    slice[i + nx * j] = source.velocity_at(&position);
                }
            }
        });
}
