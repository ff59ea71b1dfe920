pub mod grid;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{NVec3, NMat3, Particle};
pub use simulation::vorton::Vorton;
pub use simulation::influence_tree::{InfluenceTree, compute_velocity_brute_force};
pub use simulation::velocity::{VelocitySource, DirectSummation};
pub use simulation::distribution::{VorticityDistribution, VortexSheet, VortexRing, VortexTube, seed_vortons};
pub use simulation::vorton_sim::{VortonSim, Diagnostics};
pub use simulation::scenario::Scenario;
pub use simulation::engine::Engine;
pub use simulation::params::Parameters;

pub use grid::geometry::UniformGridGeometry;
pub use grid::uniform_grid::{UniformGrid, GridElement, GridValue};
pub use grid::nested_grid::NestedGrid;

pub use configuration::config::{VelocityConfig, DiffusionConfig, EngineConfig, ParametersConfig, DistributionConfig, ShapeConfig, VortonConfig, ScenarioConfig, ConfigError};

pub use benchmark::benchmark::{bench_velocity, bench_update_curve};
