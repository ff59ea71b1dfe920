//! Vortex particle ("vorton") and its regularized Biot-Savart kernel.

use std::f64::consts::PI;

use crate::grid::uniform_grid::GridElement;
use crate::simulation::states::NVec3;

/// Added to squared distances so a query exactly at a vorton stays finite.
pub const AVOID_SINGULARITY: f64 = 2.805_622_793_945_937_6e-103; // f64::MIN_POSITIVE.cbrt()

const ONE_OVER_FOUR_PI: f64 = 1.0 / (4.0 * PI);

/// Tiny vortex element: a finite-core packet of vorticity.
///
/// `radius` plays two roles: the core size inside which the induced
/// velocity is regularized, and the half-side of the cubic volume element
/// (`8 r^3`) used to turn vorticity into circulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vorton {
    pub position: NVec3, // world position
    pub vorticity: NVec3, // vorticity vector
    pub radius: f64, // core radius, > 0 for real vortons
    pub velocity: NVec3, // velocity cached by the last advection
}

impl Default for Vorton {
    fn default() -> Self {
        Self {
            position: NVec3::zeros(),
            vorticity: NVec3::zeros(),
            radius: 0.0,
            velocity: NVec3::zeros(),
        }
    }
}

/// Supervorton cells start out all-zero, which doubles as "no vortons here".
impl GridElement for Vorton {
    fn empty() -> Self {
        Self::default()
    }
}

impl Vorton {
    pub fn new(position: NVec3, vorticity: NVec3, radius: f64) -> Self {
        Self {
            position,
            vorticity,
            radius,
            velocity: NVec3::zeros(),
        }
    }

    /// Volume element of this vorton, a cube of side `2 r`.
    #[inline]
    pub fn volume(&self) -> f64 {
        8.0 * self.radius * self.radius * self.radius
    }

    /// Add the velocity this vorton induces at `query` into `velocity`.
    #[inline]
    pub fn accumulate_velocity(&self, velocity: &mut NVec3, query: &NVec3) {
        accumulate_velocity(velocity, query, &self.position, &self.vorticity, self.radius);
    }

    /// Velocity this vorton alone induces at `query`.
    pub fn velocity_at(&self, query: &NVec3) -> NVec3 {
        let mut velocity = NVec3::zeros();
        self.accumulate_velocity(&mut velocity, query);
        velocity
    }

    /// Assign the vorticity that makes this vorton induce `velocity` at `query`.
    ///
    /// Inverts the far-field law: `w = 4 pi |d| (d x v) / (8 r^3)` with
    /// `d = query - position`. Only meaningful when `d` is orthogonal to
    /// `velocity`; position and radius are left untouched.
    pub fn assign_by_velocity(&mut self, query: &NVec3, velocity: &NVec3) {
        let rel = query - self.position;
        let dist = rel.norm();
        self.vorticity = (4.0 * PI * dist * rel).cross(velocity) / self.volume();
    }
}

/// Regularized Biot-Savart contribution of a vortex element at `position`.
///
/// Outside the core the velocity decays with the usual inverse-square law.
/// Inside the core the distance law switches to `1 / (|d| r^2)`, so two
/// vortons passing close to each other do not fling each other apart.
#[inline]
pub fn accumulate_velocity(velocity: &mut NVec3, query: &NVec3, position: &NVec3, vorticity: &NVec3, radius: f64) {
    let d = query - position;
    let radius2 = radius * radius;
    let dist2 = d.norm_squared() + AVOID_SINGULARITY;
    let one_over_dist = dist2.sqrt().recip();
    let dist_law = if dist2 < radius2 {
        one_over_dist / radius2
    } else {
        one_over_dist / dist2
    };
    *velocity += (ONE_OVER_FOUR_PI * 8.0 * radius2 * radius * vorticity).cross(&d) * dist_law;
}
