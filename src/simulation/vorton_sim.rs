//! Vortex particle fluid simulation
//!
//! [`VortonSim`] owns the vortons, the passive tracers, the influence tree and
//! the velocity grid, and advances all of them one step per
//! [`VortonSim::update`]:
//!
//! 1. rebuild the influence tree over the current vortons,
//! 2. sample velocity onto the grid (tree or direct, per the engine),
//! 3. stretch and tilt vorticity by the velocity gradient,
//! 4. diffuse vorticity (PSE, or globally towards the mean),
//! 5. advect vortons, then tracers.
//!
//! Rigid-body coupling is left to the caller, through the mutable accessors.

use log::{debug, info};

use crate::configuration::config::{DiffusionConfig, VelocityConfig};
use crate::grid::uniform_grid::UniformGrid;
use crate::simulation::dynamics::{
    average_vorticity, diffuse_vorticity_globally, diffuse_vorticity_pse, stretch_and_tilt,
};
use crate::simulation::engine::Engine;
use crate::simulation::influence_tree::InfluenceTree;
use crate::simulation::integrator::{advect_tracers, advect_vortons};
use crate::simulation::params::Parameters;
use crate::simulation::states::{NVec3, Particle};
use crate::simulation::velocity::{compute_velocity_grid, DirectSummation};
use crate::simulation::vorton::Vorton;

/// Snapshot of the quantities worth watching while a simulation runs.
///
/// With zero viscosity, circulation and linear impulse should stay close to
/// their initial values; drift indicates numerical error.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub circulation: NVec3,
    pub linear_impulse: NVec3,
    pub circulation_initial: NVec3,
    pub linear_impulse_initial: NVec3,
    pub num_vortons: usize,
    pub num_tracers: usize,
    pub tree_depth: usize,
}

pub struct VortonSim {
    engine: Engine,
    parameters: Parameters,
    vortons: Vec<Vorton>,
    tracers: Vec<Particle>,
    influence_tree: InfluenceTree,
    velocity_grid: UniformGrid<NVec3>,
    min_corner: NVec3, // bounding box of the last tree build
    max_corner: NVec3,
    mass_per_particle: f64,
    average_vorticity: NVec3, // only used by global diffusion
    circulation_initial: NVec3,
    linear_impulse_initial: NVec3,
    frame: u32, // frame of the last update, stamped on new tracers
}

impl VortonSim {
    pub fn new(engine: Engine, parameters: Parameters) -> Self {
        let influence_tree = InfluenceTree::new(parameters.margin_factor);
        Self {
            engine,
            parameters,
            vortons: Vec::new(),
            tracers: Vec::new(),
            influence_tree,
            velocity_grid: UniformGrid::new(),
            min_corner: NVec3::repeat(f64::MAX),
            max_corner: NVec3::repeat(-f64::MAX),
            mass_per_particle: 0.0,
            average_vorticity: NVec3::zeros(),
            circulation_initial: NVec3::zeros(),
            linear_impulse_initial: NVec3::zeros(),
            frame: 0,
        }
    }

    /// Start with the given vortons already in place.
    pub fn with_vortons(engine: Engine, parameters: Parameters, vortons: Vec<Vorton>) -> Self {
        let mut sim = Self::new(engine, parameters);
        sim.vortons = vortons;
        sim
    }

    /// Prepare a simulation whose vortons are already in place.
    ///
    /// Records the baseline conserved quantities, builds the influence tree
    /// once to learn the domain, and seeds `multiplier^3` passive tracers in
    /// each cell of the interior of the base grid.
    pub fn initialize(&mut self, multiplier: usize) {
        let (circulation, linear_impulse) = self.conserved_quantities();
        self.circulation_initial = circulation;
        self.linear_impulse_initial = linear_impulse;
        self.average_vorticity = average_vorticity(&self.vortons);

        self.create_influence_tree();

        self.mass_per_particle = match self.influence_tree.base_geometry() {
            Some(base) => {
                let total_mass = base.effective_volume() * self.parameters.density;
                let tracers_per_cell = multiplier.pow(3);
                total_mass / (base.total_cells() * tracers_per_cell).max(1) as f64
            }
            None => 0.0,
        };
        self.initialize_passive_tracers(multiplier);

        info!(
            "vorton simulation initialized: {} vortons, {} tracers, tree depth {}, mass per particle {:.6e}",
            self.vortons.len(),
            self.tracers.len(),
            self.influence_tree.depth(),
            self.mass_per_particle,
        );
    }

    /// Advance the simulation by `dt`.
    pub fn update(&mut self, dt: f64, frame: u32) {
        self.frame = frame;
        if !self.create_influence_tree() {
            return;
        }
        self.compute_velocity_grid();
        self.stretch_and_tilt_vortons(dt);
        match self.engine.diffusion {
            DiffusionConfig::Pse => self.diffuse_vorticity_pse(dt),
            DiffusionConfig::Global => self.diffuse_vorticity_globally(dt),
        }
        self.advect_vortons(dt);
        self.advect_tracers(dt);

        debug!(
            "frame {frame}: {} vortons, {} tracers, depth {}, box {:?} .. {:?}",
            self.vortons.len(),
            self.tracers.len(),
            self.influence_tree.depth(),
            self.min_corner.as_slice(),
            self.max_corner.as_slice(),
        );
    }

    /// Remove every particle and all derived structures.
    pub fn clear(&mut self) {
        self.vortons.clear();
        self.tracers.clear();
        self.influence_tree.clear();
        self.velocity_grid.clear();
    }

    /// Remove tracer `index`; the last tracer takes its place.
    pub fn kill_tracer(&mut self, index: usize) {
        self.tracers.swap_remove(index);
    }

    /// Replace the vortons with one per grid point of significant vorticity.
    ///
    /// Every vorton gets the same radius, half the cube root of a cell's
    /// volume (or the square root of its area on a flat grid). Points are
    /// nudged off the minimal corner so they bin into the intended cell.
    pub fn assign_vortons_from_vorticity(&mut self, vorticity: &UniformGrid<NVec3>) {
        self.vortons.clear();

        let spacing = vorticity.cell_spacing();
        let radius = if spacing.z == 0.0 {
            0.5 * (spacing.x * spacing.y).sqrt()
        } else {
            0.5 * (spacing.x * spacing.y * spacing.z).cbrt()
        };
        let min = vorticity.min_corner() + vorticity.extent() * (f64::EPSILON * 4.0);

        for (offset, omega) in vorticity.contents().iter().enumerate() {
            if omega.norm_squared() > f64::EPSILON {
                let indices = vorticity.indices_from_offset(offset);
                let position = min + NVec3::new(
                    indices[0] as f64 * spacing.x,
                    indices[1] as f64 * spacing.y,
                    indices[2] as f64 * spacing.z,
                );
                self.vortons.push(Vorton::new(position, *omega, radius));
            }
        }
    }

    /// Total circulation `Σ ω vol` and linear impulse `Σ (x × ω) vol`.
    pub fn conserved_quantities(&self) -> (NVec3, NVec3) {
        let mut circulation = NVec3::zeros();
        let mut linear_impulse = NVec3::zeros();
        for vorton in &self.vortons {
            let volume = vorton.volume();
            circulation += vorton.vorticity * volume;
            linear_impulse += vorton.position.cross(&vorton.vorticity) * volume;
        }
        (circulation, linear_impulse)
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let (circulation, linear_impulse) = self.conserved_quantities();
        Diagnostics {
            circulation,
            linear_impulse,
            circulation_initial: self.circulation_initial,
            linear_impulse_initial: self.linear_impulse_initial,
            num_vortons: self.vortons.len(),
            num_tracers: self.tracers.len(),
            tree_depth: self.influence_tree.depth(),
        }
    }

    /// Mass-weighted mean tracer position, zero without tracers.
    pub fn tracer_center_of_mass(&self) -> NVec3 {
        let mut total_mass = 0.0;
        let mut com = NVec3::zeros();
        for tracer in &self.tracers {
            total_mass += tracer.mass;
            com += tracer.position * tracer.mass;
        }
        if total_mass > 0.0 {
            com /= total_mass;
        }
        com
    }

    // accessors ===========================================================================

    pub fn vortons(&self) -> &[Vorton] {
        &self.vortons
    }

    pub fn vortons_mut(&mut self) -> &mut Vec<Vorton> {
        &mut self.vortons
    }

    pub fn tracers(&self) -> &[Particle] {
        &self.tracers
    }

    pub fn tracers_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.tracers
    }

    pub fn velocity_grid(&self) -> &UniformGrid<NVec3> {
        &self.velocity_grid
    }

    pub fn influence_tree(&self) -> &InfluenceTree {
        &self.influence_tree
    }

    pub fn mass_per_particle(&self) -> f64 {
        self.mass_per_particle
    }

    pub fn average_vorticity(&self) -> &NVec3 {
        &self.average_vorticity
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Frame passed to the most recent [`update`](Self::update).
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// `(min, max)` corners of the box the tree was last built over.
    pub fn bounding_box(&self) -> (NVec3, NVec3) {
        (self.min_corner, self.max_corner)
    }

    // stages ==============================================================================

    /// Fit the bounding box around all vortons, all tracers and the
    /// configured domain, padded by `ε` of its extent.
    ///
    /// Returns `false` when there is nothing to bound.
    fn find_bounding_box(&mut self) -> bool {
        let mut min = NVec3::repeat(f64::MAX);
        let mut max = NVec3::repeat(-f64::MAX);

        let positions = self
            .vortons
            .iter()
            .map(|v| &v.position)
            .chain(self.tracers.iter().map(|t| &t.position));
        for position in positions {
            min = min.inf(position);
            max = max.sup(position);
        }
        if let Some((domain_min, domain_max)) = &self.parameters.domain {
            min = min.inf(domain_min);
            max = max.sup(domain_max);
        }

        if (0..3).any(|axis| min[axis] > max[axis]) {
            return false;
        }

        let pad = (max - min) * f64::EPSILON;
        self.min_corner = min - pad;
        self.max_corner = max + pad;
        true
    }

    /// Rebuild the influence tree; returns `false` (and clears the tree and
    /// velocity grid) when the simulation is empty.
    fn create_influence_tree(&mut self) -> bool {
        if !self.find_bounding_box() {
            self.influence_tree.clear();
            self.velocity_grid.clear();
            return false;
        }
        self.influence_tree.build(&self.vortons, self.min_corner, self.max_corner);
        true
    }

    fn compute_velocity_grid(&mut self) {
        let Some(geometry) = self.influence_tree.base_geometry() else {
            return;
        };
        match self.engine.velocity {
            VelocityConfig::Tree => {
                compute_velocity_grid(&mut self.velocity_grid, geometry, &self.influence_tree);
            }
            VelocityConfig::Direct => {
                let direct = DirectSummation { vortons: &self.vortons };
                compute_velocity_grid(&mut self.velocity_grid, geometry, &direct);
            }
        }
    }

    fn stretch_and_tilt_vortons(&mut self, dt: f64) {
        stretch_and_tilt(&mut self.vortons, &self.velocity_grid, self.parameters.stretch_damping, dt);
    }

    fn diffuse_vorticity_pse(&mut self, dt: f64) {
        if let Some(geometry) = self.influence_tree.base_geometry() {
            diffuse_vorticity_pse(&mut self.vortons, geometry, self.parameters.viscosity, dt);
        }
    }

    fn diffuse_vorticity_globally(&mut self, dt: f64) {
        self.average_vorticity = average_vorticity(&self.vortons);
        diffuse_vorticity_globally(&mut self.vortons, &self.average_vorticity, self.parameters.viscosity, dt);
    }

    fn advect_vortons(&mut self, dt: f64) {
        advect_vortons(&mut self.vortons, &self.velocity_grid, dt);
    }

    fn advect_tracers(&mut self, dt: f64) {
        advect_tracers(&mut self.tracers, &self.velocity_grid, dt);
    }

    /// Seed tracers through the middle 75% of the base grid.
    ///
    /// Each seeded cell gets `multiplier` tracers per axis on a regular
    /// sub-lattice; an axis with zero extent gets a single layer in its plane.
    /// Tracers are born in the frame of the last update.
    fn initialize_passive_tracers(&mut self, multiplier: usize) {
        self.tracers.clear();
        let Some(base) = self.influence_tree.base_geometry() else {
            return;
        };
        let multiplier = multiplier.max(1);

        let spacing = *base.cell_spacing();
        let mut begin = [0; 3];
        let mut end = [1; 3];
        let mut per_cell = [1; 3];
        for axis in 0..3 {
            if base.extent()[axis] != 0.0 {
                let cells = base.num_cells(axis);
                begin[axis] = cells / 8;
                end[axis] = (7 * cells / 8).max(begin[axis] + 1);
                per_cell[axis] = multiplier;
            }
        }

        let cell_volume: f64 = spacing.iter().filter(|&&s| s != 0.0).product();
        let size = 2.0 * cell_volume.powf(2.0 / 3.0) / multiplier as f64;

        for k in begin[2]..end[2] {
            for j in begin[1]..end[1] {
                for i in begin[0]..end[0] {
                    let cell_min = base.position_from_indices(&[i, j, k]);
                    for sk in 0..per_cell[2] {
                        for sj in 0..per_cell[1] {
                            for si in 0..per_cell[0] {
                                let sub = [si, sj, sk];
                                let mut position = cell_min;
                                for axis in 0..3 {
                                    let fraction = (sub[axis] as f64 + 0.5) / per_cell[axis] as f64;
                                    position[axis] += fraction * spacing[axis];
                                }
                                self.tracers.push(Particle::new(position, self.mass_per_particle, size, self.frame));
                            }
                        }
                    }
                }
            }
        }
    }
}
