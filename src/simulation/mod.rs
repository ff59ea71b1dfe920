pub mod states;
pub mod params;
pub mod engine;
pub mod vorton;
pub mod influence_tree;
pub mod velocity;
pub mod dynamics;
pub mod integrator;
pub mod distribution;
pub mod vorton_sim;
pub mod scenario;
