//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - fluid properties (`viscosity`, `density`),
//! - vortex stretching damping and the tree descent margin,
//! - an optional fixed domain box the influence tree always covers,
//! - step size, step count and tracer density for the driver

use crate::simulation::states::NVec3;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub viscosity: f64, // kinematic viscosity
    pub density: f64, // fluid density, sets tracer mass
    pub stretch_damping: f64, // fraction of stretch/tilt applied per step
    pub margin_factor: f64, // descent margin, as a fraction of child cell spacing
    pub domain: Option<(NVec3, NVec3)>, // (min, max) box the tree must cover
    pub time_step: f64, // step size
    pub num_steps: usize, // steps run by the driver
    pub tracers_per_cell: usize, // cube root of tracers per base cell
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            viscosity: 0.05,
            density: 1.0,
            stretch_damping: 0.5,
            margin_factor: 0.0001,
            domain: None,
            time_step: 0.01,
            num_steps: 100,
            tracers_per_cell: 1,
        }
    }
}
