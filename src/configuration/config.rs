//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]       – velocity method, diffusion scheme, thread count
//! - [`ParametersConfig`]   – fluid properties and stepping parameters
//! - [`DistributionConfig`] – optional procedural vorticity to seed vortons from
//! - [`VortonConfig`]       – optional explicit vortons
//! - [`ScenarioConfig`]     – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example vortex ring scenario matching these types:
//!
//! ```yaml
//! engine:
//!   velocity: "tree"          # or "direct"
//!   diffusion: "pse"          # or "global"
//!   threads: 4                # optional, rayon default otherwise
//!
//! parameters:
//!   viscosity: 0.05           # kinematic viscosity
//!   density: 1.0              # fluid density
//!   stretch_damping: 0.5      # optional
//!   margin_factor: 0.0001     # optional
//!   time_step: 0.01
//!   num_steps: 200
//!   tracers_per_cell: 2       # optional, cube root of tracers per cell
//!   domain:                   # optional box the tree always covers
//!     min: [ -4.0, -4.0, -4.0 ]
//!     max: [  4.0,  4.0,  4.0 ]
//!
//! distribution:
//!   magnitude: 1.0
//!   num_vortons: 4096
//!   shape:
//!     type: "ring"
//!     radius: 1.0
//!     thickness: 0.25
//!     direction: [ 0.0, 0.0, 1.0 ]
//!
//! vortons:
//!   - position: [ 0.0, 0.0, 2.0 ]
//!     vorticity: [ 0.0, 0.0, 1.0 ]
//!     radius: 0.1
//! ```
//!
//! The engine then maps this configuration into its runtime types
//! ([`Engine`](crate::simulation::engine::Engine),
//! [`Parameters`](crate::simulation::params::Parameters)) after
//! [`ScenarioConfig::validate`] accepts it.

use serde::Deserialize;
use thiserror::Error;

use crate::simulation::states::NVec3;

/// Problems found while validating a [`ScenarioConfig`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("viscosity must be non-negative, got {0}")]
    NegativeViscosity(f64),

    #[error("density must be positive, got {0}")]
    NonPositiveDensity(f64),

    #[error("time step must be positive, got {0}")]
    NonPositiveTimeStep(f64),

    #[error("vorton {index}: radius must be positive, got {radius}")]
    NonPositiveRadius { index: usize, radius: f64 },

    #[error("`{field}` must have 3 components, got {len}")]
    WrongLength { field: String, len: usize },

    #[error("domain min {min:?} exceeds max {max:?}")]
    InvertedDomain { min: [f64; 3], max: [f64; 3] },

    #[error("distribution `{field}` must be positive, got {value}")]
    NonPositiveSize { field: &'static str, value: f64 },
}

/// How the velocity grid is evaluated
/// `velocity: "tree"` or `velocity: "direct"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityConfig {
    #[serde(rename = "tree")] // Influence tree: near cells opened, far clusters lumped into supervortons
    Tree,

    #[serde(rename = "direct")] // Exact sum over every vorton at every grid point, O(N) per point
    Direct,
}

/// Which viscous diffusion scheme runs each step
/// `diffusion: "pse"` or `diffusion: "global"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffusionConfig {
    #[serde(rename = "pse")] // Particle strength exchange between neighbouring vortons
    Pse,

    #[serde(rename = "global")] // Relax every vorton towards the mean vorticity
    Global,
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub velocity: VelocityConfig, // velocity evaluation method
    pub diffusion: Option<DiffusionConfig>, // defaults to pse
    pub threads: Option<usize>, // size of the global rayon pool
}

/// Axis-aligned box given by its corners
#[derive(Deserialize, Debug, Clone)]
pub struct DomainConfig {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub viscosity: f64,       // kinematic viscosity, 0 for inviscid
    pub density: f64,         // fluid density
    pub stretch_damping: Option<f64>, // fraction of stretch/tilt applied, default 0.5
    pub margin_factor: Option<f64>,   // tree descent margin, default 0.0001
    pub domain: Option<DomainConfig>, // box the tree always covers
    pub time_step: f64,       // step size
    pub num_steps: usize,     // steps the driver runs
    pub tracers_per_cell: Option<usize>, // cube root of tracers per base cell, default 1
}

/// Procedural vorticity field
/// Selected with `type: "sheet" | "ring" | "tube"`
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ShapeConfig {
    #[serde(rename = "sheet")]
    Sheet {
        thickness: f64,
        variation: f64,
        width: f64,
    },

    #[serde(rename = "ring")]
    Ring {
        radius: f64,
        thickness: f64,
        direction: Vec<f64>,
    },

    #[serde(rename = "tube")]
    Tube {
        thickness: f64,
        variation: f64,
        width: f64,
        period: f64,
    },
}

/// Vorticity distribution to seed vortons from
#[derive(Deserialize, Debug, Clone)]
pub struct DistributionConfig {
    pub magnitude: f64,    // scale applied to the sampled vorticity
    pub num_vortons: usize, // upper bound on lattice samples
    pub shape: ShapeConfig,
}

/// Configuration for a single vorton's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct VortonConfig {
    pub position: Vec<f64>,  // initial position
    pub vorticity: Vec<f64>, // initial vorticity
    pub radius: f64,         // core radius
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // Engine-level configuration
    pub parameters: ParametersConfig, // Global numerical and physical parameters
    pub distribution: Option<DistributionConfig>, // Procedural seeding, if any
    #[serde(default)]
    pub vortons: Vec<VortonConfig>, // Explicit vortons, added after any seeded ones
}

impl ScenarioConfig {
    /// Check every value the runtime relies on.
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.parameters;
        if p.viscosity < 0.0 {
            return Err(ConfigError::NegativeViscosity(p.viscosity));
        }
        if p.density <= 0.0 {
            return Err(ConfigError::NonPositiveDensity(p.density));
        }
        if p.time_step <= 0.0 {
            return Err(ConfigError::NonPositiveTimeStep(p.time_step));
        }

        if let Some(domain) = &p.domain {
            let min = to_vec3("domain.min", &domain.min)?;
            let max = to_vec3("domain.max", &domain.max)?;
            if (0..3).any(|axis| min[axis] > max[axis]) {
                return Err(ConfigError::InvertedDomain {
                    min: [min.x, min.y, min.z],
                    max: [max.x, max.y, max.z],
                });
            }
        }

        if let Some(distribution) = &self.distribution {
            distribution.validate()?;
        }

        for (index, vorton) in self.vortons.iter().enumerate() {
            to_vec3("vortons.position", &vorton.position)?;
            to_vec3("vortons.vorticity", &vorton.vorticity)?;
            if vorton.radius <= 0.0 {
                return Err(ConfigError::NonPositiveRadius { index, radius: vorton.radius });
            }
        }

        Ok(())
    }
}

impl DistributionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, value: f64| {
            if value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NonPositiveSize { field, value })
            }
        };

        match &self.shape {
            ShapeConfig::Sheet { thickness, width, .. } => {
                positive("thickness", *thickness)?;
                positive("width", *width)
            }
            ShapeConfig::Ring { radius, thickness, direction } => {
                positive("radius", *radius)?;
                positive("thickness", *thickness)?;
                to_vec3("shape.direction", direction).map(|_| ())
            }
            ShapeConfig::Tube { thickness, width, .. } => {
                positive("thickness", *thickness)?;
                positive("width", *width)
            }
        }
    }
}

/// Convert a YAML list into a vector, checking it has exactly 3 components.
pub fn to_vec3(field: &str, values: &[f64]) -> Result<NVec3, ConfigError> {
    match values {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(ConfigError::WrongLength {
            field: field.to_string(),
            len: values.len(),
        }),
    }
}
