//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the vorton simulation (`VortonSim`), seeded and initialized at t = 0
//!
//! The driver binary builds one of these and steps it headlessly

use log::{info, warn};

use crate::configuration::config::{ConfigError, DistributionConfig, ScenarioConfig, ShapeConfig, VortonConfig, to_vec3};
use crate::simulation::distribution::{seed_vortons, VortexRing, VortexSheet, VortexTube, VorticityDistribution};
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::vorton::Vorton;
use crate::simulation::vorton_sim::VortonSim;

/// A fully-initialized simulation scenario
///
/// This is the main "runtime bundle" constructed from a [`ScenarioConfig`]:
/// it contains the engine settings, parameters and the simulation state
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub sim: VortonSim,
    pub frame: u32,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        // Parameters (runtime) from ParametersConfig
        let defaults = Parameters::default();
        let p_cfg = &cfg.parameters;
        let domain = match &p_cfg.domain {
            Some(d) => Some((to_vec3("domain.min", &d.min)?, to_vec3("domain.max", &d.max)?)),
            None => None,
        };
        let parameters = Parameters {
            viscosity: p_cfg.viscosity,
            density: p_cfg.density,
            stretch_damping: p_cfg.stretch_damping.unwrap_or(defaults.stretch_damping),
            margin_factor: p_cfg.margin_factor.unwrap_or(defaults.margin_factor),
            domain,
            time_step: p_cfg.time_step,
            num_steps: p_cfg.num_steps,
            tracers_per_cell: p_cfg.tracers_per_cell.unwrap_or(defaults.tracers_per_cell),
        };

        // Engine (runtime) from EngineConfig
        let engine = Engine {
            velocity: cfg.engine.velocity,
            diffusion: cfg.engine.diffusion.unwrap_or(Engine::default().diffusion),
            threads: cfg.engine.threads,
        };

        // Vortons: seeded distribution first, then explicit ones
        let mut vortons = match &cfg.distribution {
            Some(d_cfg) => seed_from_distribution(d_cfg)?,
            None => Vec::new(),
        };
        for vc in &cfg.vortons {
            vortons.push(vorton_from_config(vc)?);
        }

        if vortons.is_empty() {
            warn!("scenario has no vortons; the flow will stay at rest");
        }
        if 2.0 * parameters.viscosity * parameters.time_step > 0.5 {
            warn!(
                "viscosity {} with time step {} exchanges more than half the vorticity difference per step; diffusion may oscillate",
                parameters.viscosity, parameters.time_step,
            );
        }

        let mut sim = VortonSim::with_vortons(engine.clone(), parameters.clone(), vortons);
        sim.initialize(parameters.tracers_per_cell);

        Ok(Self {
            engine,
            parameters,
            sim,
            frame: 0,
        })
    }

    /// Advance the simulation `steps` times by the configured time step.
    pub fn run(&mut self, steps: usize) {
        let dt = self.parameters.time_step;
        for _ in 0..steps {
            self.sim.update(dt, self.frame);
            self.frame += 1;
        }

        let d = self.sim.diagnostics();
        info!(
            "after {} frames: {} vortons, circulation {:?} (initial {:?}), linear impulse {:?} (initial {:?})",
            self.frame,
            d.num_vortons,
            d.circulation.as_slice(),
            d.circulation_initial.as_slice(),
            d.linear_impulse.as_slice(),
            d.linear_impulse_initial.as_slice(),
        );
    }
}

fn seed_from_distribution(cfg: &DistributionConfig) -> Result<Vec<Vorton>, ConfigError> {
    let distribution: Box<dyn VorticityDistribution> = match &cfg.shape {
        ShapeConfig::Sheet { thickness, variation, width } => Box::new(VortexSheet {
            thickness: *thickness,
            variation: *variation,
            width: *width,
        }),
        ShapeConfig::Ring { radius, thickness, direction } => Box::new(VortexRing {
            radius: *radius,
            thickness: *thickness,
            direction: to_vec3("shape.direction", direction)?,
        }),
        ShapeConfig::Tube { thickness, variation, width, period } => Box::new(VortexTube {
            thickness: *thickness,
            variation: *variation,
            width: *width,
            period: *period,
        }),
    };
    Ok(seed_vortons(cfg.magnitude, cfg.num_vortons, distribution.as_ref()))
}

fn vorton_from_config(cfg: &VortonConfig) -> Result<Vorton, ConfigError> {
    Ok(Vorton::new(
        to_vec3("vortons.position", &cfg.position)?,
        to_vec3("vortons.vorticity", &cfg.vorticity)?,
        cfg.radius,
    ))
}
