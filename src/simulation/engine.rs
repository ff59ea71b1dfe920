//! High-level runtime engine settings
//!
//! Selects how velocity is evaluated (influence tree or direct sum), which
//! diffusion scheme runs, and how many worker threads the pool gets

use crate::configuration::config::{DiffusionConfig, VelocityConfig};

#[derive(Debug, Clone)]
pub struct Engine {
    pub velocity: VelocityConfig, // tree or direct
    pub diffusion: DiffusionConfig, // pse or global
    pub threads: Option<usize>, // None = rayon default
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            velocity: VelocityConfig::Tree,
            diffusion: DiffusionConfig::Pse,
            threads: None,
        }
    }
}
