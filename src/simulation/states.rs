//! Core state types shared by the simulation and the grids.
//!
//! - `NVec3` / `NMat3`: nalgebra vector and matrix aliases used everywhere
//! - [`Particle`]: passive tracer advected by the flow

use nalgebra::{Matrix3, Vector3};
pub type NVec3 = Vector3<f64>;
pub type NMat3 = Matrix3<f64>;

/// Passive tracer particle. Carried by the flow, exerts no influence on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: NVec3, // world position of the particle centre
    pub velocity: NVec3, // velocity cached by the last advection
    pub mass: f64, // mass, for momentum bookkeeping by collaborators
    pub size: f64, // radius, for collision tests by collaborators
    pub birth_time: u32, // frame in which the particle was created
}

impl Particle {
    pub fn new(position: NVec3, mass: f64, size: f64, birth_time: u32) -> Self {
        Self {
            position,
            velocity: NVec3::zeros(),
            mass,
            size,
            birth_time,
        }
    }
}
