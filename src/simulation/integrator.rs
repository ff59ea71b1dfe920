//! Explicit time integration of particle positions
//!
//! Vortons and tracers are both advected by the velocity grid with a
//! forward-Euler step. Particles are independent, so each step runs across
//! the rayon pool

use rayon::prelude::*;

use super::states::{NVec3, Particle};
use super::vorton::Vorton;
use crate::grid::uniform_grid::UniformGrid;

/// Advance every vorton by one forward-Euler step through `velocity_grid`
/// The interpolated velocity is cached on the vorton
pub fn advect_vortons(vortons: &mut [Vorton], velocity_grid: &UniformGrid<NVec3>, dt: f64) {
    if vortons.is_empty() || velocity_grid.is_empty() { // nothing to move, or nothing to move with
        return;
    }

    vortons.par_iter_mut().for_each(|vorton| {
        // v_n = u(x_n)
        vorton.velocity = velocity_grid.interpolate(&vorton.position);
        // x_n+1 = x_n + dt v_n
        vorton.position += vorton.velocity * dt;
    });
}

/// Advance every tracer by one forward-Euler step through `velocity_grid`
pub fn advect_tracers(tracers: &mut [Particle], velocity_grid: &UniformGrid<NVec3>, dt: f64) {
    if tracers.is_empty() || velocity_grid.is_empty() {
        return;
    }

    tracers.par_iter_mut().for_each(|tracer| {
        tracer.velocity = velocity_grid.interpolate(&tracer.position);
        tracer.position += tracer.velocity * dt;
    });
}
