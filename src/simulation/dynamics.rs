//! Vorticity dynamics: the terms that change vorton vorticity in place
//!
//! - [`stretch_and_tilt`]: vortex stretching from the velocity gradient
//! - [`diffuse_vorticity_pse`]: viscous diffusion by particle strength exchange
//! - [`diffuse_vorticity_globally`]: cheap diffusion towards the mean vorticity
//!
//! None of these move vortons; see the integrator for advection

use rayon::prelude::*;

use crate::grid::geometry::UniformGridGeometry;
use crate::grid::grid_math::compute_jacobian;
use crate::grid::uniform_grid::UniformGrid;
use crate::simulation::states::{NMat3, NVec3};
use crate::simulation::vorton::Vorton;

/// Stretch and tilt vorton vorticity by the local velocity gradient.
///
/// Applies `ω += damping * (J ω) dt`, where `J` is the velocity Jacobian
/// interpolated at each vorton. Skipped when the velocity grid is flat along
/// any axis, since the gradient is undefined there.
pub fn stretch_and_tilt(vortons: &mut [Vorton], velocity_grid: &UniformGrid<NVec3>, damping: f64, dt: f64) {
    if velocity_grid.is_empty() || velocity_grid.extent().iter().any(|&e| e == 0.0) {
        return;
    }

    let mut jacobian: UniformGrid<NMat3> = UniformGrid::new();
    compute_jacobian(&mut jacobian, velocity_grid);

    vortons.par_iter_mut().for_each(|vorton| {
        let grad = jacobian.interpolate(&vorton.position);
        let stretch_tilt = grad * vorton.vorticity;
        vorton.vorticity += damping * stretch_tilt * dt;
    });
}

/// Diffuse vorticity with particle strength exchange.
///
/// Vortons are bucketed into the cells of `geometry`. Each vorton trades
/// `2ν dt (ω_here - ω_there)` with every later vorton in its own cell and
/// with every vorton in the +x, +y and +z neighbour cells, so each pair is
/// visited once and the exchange is symmetric. Afterwards every vorton loses
/// `ν dt` of its vorticity to dissipation.
pub fn diffuse_vorticity_pse(vortons: &mut [Vorton], geometry: &UniformGridGeometry, viscosity: f64, dt: f64) {
    if vortons.is_empty() || geometry.grid_capacity() == 0 {
        return;
    }

    let mut buckets: UniformGrid<Vec<usize>> = UniformGrid::with_geometry(geometry);
    buckets.init();
    for (index, vorton) in vortons.iter().enumerate() {
        buckets.at_position_mut(&vorton.position).push(index);
    }

    let cells = [geometry.num_cells(0), geometry.num_cells(1), geometry.num_cells(2)];
    let exchange_rate = 2.0 * viscosity * dt;

    let mut exchange = |here: usize, there: usize| {
        let delta = exchange_rate * (vortons[here].vorticity - vortons[there].vorticity);
        vortons[here].vorticity -= delta;
        vortons[there].vorticity += delta;
    };

    for k in 0..cells[2] {
        for j in 0..cells[1] {
            for i in 0..cells[0] {
                let offset = buckets.offset_from_indices(&[i, j, k]);
                let here = &buckets[offset];

                // Same cell: each unordered pair once
                for (n, &a) in here.iter().enumerate() {
                    for &b in &here[n + 1..] {
                        exchange(a, b);
                    }
                }

                // Forward neighbours only; the backward ones visit us
                let neighbours = [
                    (i + 1 < cells[0]).then(|| buckets.offset_from_indices(&[i + 1, j, k])),
                    (j + 1 < cells[1]).then(|| buckets.offset_from_indices(&[i, j + 1, k])),
                    (k + 1 < cells[2]).then(|| buckets.offset_from_indices(&[i, j, k + 1])),
                ];
                for neighbour in neighbours.into_iter().flatten() {
                    for &a in here {
                        for &b in &buckets[neighbour] {
                            exchange(a, b);
                        }
                    }
                }
            }
        }
    }

    let dissipation = viscosity * dt;
    for vorton in vortons.iter_mut() {
        vorton.vorticity -= dissipation * vorton.vorticity;
    }
}

/// Mean vorticity over all vortons (zero for an empty set).
pub fn average_vorticity(vortons: &[Vorton]) -> NVec3 {
    if vortons.is_empty() {
        return NVec3::zeros();
    }
    let sum: NVec3 = vortons.iter().map(|v| v.vorticity).sum();
    sum / vortons.len() as f64
}

/// Relax every vorton towards `average` at rate `ν dt`.
///
/// `ω <- (1 - ν dt) ω + ν dt * average`. Ignores spatial structure entirely;
/// useful as a fast stand-in for PSE.
pub fn diffuse_vorticity_globally(vortons: &mut [Vorton], average: &NVec3, viscosity: f64, dt: f64) {
    let rate = viscosity * dt;
    for vorton in vortons.iter_mut() {
        vorton.vorticity = (1.0 - rate) * vorton.vorticity + rate * *average;
    }
}
