//! Initial vorticity distributions
//!
//! A [`VorticityDistribution`] describes a vorticity field over a box centred
//! on the origin. [`seed_vortons`] samples one onto a lattice to produce the
//! initial vorton population of a scenario.
//!
//! Provided shapes:
//! - [`VortexSheet`]: shear layer with spanwise thickness variation
//! - [`VortexRing`]: torus of tangential vorticity
//! - [`VortexTube`]: column of vorticity with a wavy radius

use std::f64::consts::PI;

use crate::grid::geometry::UniformGridGeometry;
use crate::simulation::states::NVec3;
use crate::simulation::vorton::Vorton;

/// A vorticity field that can be sampled anywhere inside its domain.
pub trait VorticityDistribution {
    /// Size of the box, centred on `center`, that contains all of the
    /// field's vorticity.
    fn domain_size(&self) -> NVec3;

    /// Vorticity at `position` for a distribution centred at `center`.
    fn assign_vorticity(&self, position: &NVec3, center: &NVec3) -> NVec3;
}

/// Horizontal shear layer whose thickness varies along y.
#[derive(Debug, Clone)]
pub struct VortexSheet {
    pub thickness: f64, // characteristic thickness of the shear layer
    pub variation: f64, // amplitude of the thickness variation, sensible in [0, 0.2]
    pub width: f64, // spanwise width of the layer
}

impl VorticityDistribution for VortexSheet {
    fn domain_size(&self) -> NVec3 {
        NVec3::new(14.0 * self.thickness, self.width, 14.0 * self.thickness)
    }

    fn assign_vorticity(&self, position: &NVec3, _center: &NVec3) -> NVec3 {
        let y_over_width = position.y / self.width;
        let d = 1.0 - 0.5 * self.variation * ((2.0 * PI * y_over_width).cos() - 1.0);
        let z_over_d = position.z / d;

        let s = 1.0 / z_over_d.cosh();
        let t = z_over_d.tanh();
        let vorticity = NVec3::new(
            0.0,
            s * s / d,
            t * t * PI * self.variation * z_over_d / (self.width * d) * (2.0 * PI * y_over_width).sin(),
        );

        // Drop the long tails so they do not spawn a halo of weak vortons
        if vorticity.norm_squared() < 0.01 {
            NVec3::zeros()
        } else {
            vorticity
        }
    }
}

/// Vortex ring lying in the plane perpendicular to `direction`.
///
/// Vorticity circulates around the ring's core, so the ring propagates along
/// `direction`.
#[derive(Debug, Clone)]
pub struct VortexRing {
    pub radius: f64, // distance from the ring centre to the core centreline
    pub thickness: f64, // core radius
    pub direction: NVec3, // propagation direction
}

impl VorticityDistribution for VortexRing {
    fn domain_size(&self) -> NVec3 {
        NVec3::repeat(2.0 * (self.radius + self.thickness))
    }

    fn assign_vorticity(&self, position: &NVec3, center: &NVec3) -> NVec3 {
        let axis = self.direction.try_normalize(f64::EPSILON).unwrap_or_else(|| NVec3::new(0.0, 0.0, 1.0));
        let rel = position - center;
        let along = rel.dot(&axis);
        let radial = rel - along * axis;
        let rho = radial.norm();
        if rho == 0.0 {
            return NVec3::zeros();
        }

        let dist_from_core = ((rho - self.radius).powi(2) + along * along).sqrt();
        if dist_from_core >= self.thickness {
            return NVec3::zeros();
        }

        let tangent = axis.cross(&(radial / rho));
        let profile = 0.5 * ((PI * dist_from_core / self.thickness).cos() + 1.0);
        tangent * profile
    }
}

/// Column of y-vorticity whose radius oscillates along its length.
#[derive(Debug, Clone)]
pub struct VortexTube {
    pub thickness: f64, // mean radius of the tube
    pub variation: f64, // relative amplitude of the radius oscillation
    pub width: f64, // length of the tube along y
    pub period: f64, // number of oscillations over the length
}

impl VorticityDistribution for VortexTube {
    fn domain_size(&self) -> NVec3 {
        let reach = 2.0 * self.thickness * (1.0 + self.variation.abs());
        NVec3::new(reach, self.width, reach)
    }

    fn assign_vorticity(&self, position: &NVec3, center: &NVec3) -> NVec3 {
        let rel = position - center;
        let phase = 2.0 * PI * self.period * rel.y / self.width;
        let local_radius = self.thickness * (1.0 + self.variation * phase.sin());
        let rho = (rel.x * rel.x + rel.z * rel.z).sqrt();
        if local_radius <= 0.0 || rho >= local_radius {
            return NVec3::zeros();
        }
        NVec3::new(0.0, 0.5 * ((PI * rho / local_radius).cos() + 1.0), 0.0)
    }
}

/// Smallest vorticity (squared) worth keeping a vorton for: the geometric
/// mean of the machine epsilon and the smallest normal float.
fn tiny() -> f64 {
    (0.5 * (f64::EPSILON.ln() + f64::MIN_POSITIVE.ln())).exp()
}

/// Sample `distribution` onto at most `num_vortons_max` lattice cells and
/// return a vorton for every sample with non-negligible vorticity.
///
/// The lattice covers the distribution's domain centred on the origin. Cell
/// counts come from [`UniformGridGeometry`] and are halved until their
/// product fits the budget. Samples sit a quarter cell into each cell, and
/// every vorton's radius is half the cell's cube root of volume (square root
/// of area for a flat domain). Vorticity is scaled by `magnitude`.
pub fn seed_vortons(magnitude: f64, num_vortons_max: usize, distribution: &dyn VorticityDistribution) -> Vec<Vorton> {
    let dimensions = distribution.domain_size();
    let center = NVec3::zeros();
    let min = center - 0.5 * dimensions;
    let max = min + dimensions;

    let skeleton = UniformGridGeometry::new(num_vortons_max, min, max, true);
    let mut num_cells = [
        skeleton.num_cells(0).max(1),
        skeleton.num_cells(1).max(1),
        skeleton.num_cells(2).max(1),
    ];
    while num_cells.iter().product::<usize>() > num_vortons_max.max(1) {
        for cells in num_cells.iter_mut() {
            *cells = (*cells / 2).max(1);
        }
    }

    let cell_size = NVec3::new(
        dimensions.x / num_cells[0] as f64,
        dimensions.y / num_cells[1] as f64,
        dimensions.z / num_cells[2] as f64,
    );
    let radius = if dimensions.z == 0.0 {
        0.5 * (cell_size.x * cell_size.y).sqrt()
    } else {
        0.5 * (cell_size.x * cell_size.y * cell_size.z).cbrt()
    };

    let tiny = tiny();
    let mut vortons = Vec::new();
    for k in 0..num_cells[2] {
        for j in 0..num_cells[1] {
            for i in 0..num_cells[0] {
                let position = min + NVec3::new(
                    (i as f64 + 0.25) * cell_size.x,
                    (j as f64 + 0.25) * cell_size.y,
                    (k as f64 + 0.25) * cell_size.z,
                );
                let vorticity = distribution.assign_vorticity(&position, &center);
                if vorticity.norm_squared() > tiny {
                    vortons.push(Vorton::new(position, vorticity * magnitude, radius));
                }
            }
        }
    }
    vortons
}
