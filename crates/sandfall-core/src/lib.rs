//! Chunked falling-sand simulation engine
//!
//! - `world`: grid, chunk activity tracking, update engine, painting
//! - `render`: CPU RGBA snapshots
//! - `config`: engine configuration

pub mod config;
pub mod error;
pub mod render;
pub mod world;

// Particle data lives in sandfall-simulation
pub mod simulation {
    pub use sandfall_simulation::*;
}

pub use config::SimConfig;
pub use error::{CommandError, ConfigError};
pub use render::PixelRenderer;
pub use world::{ParticleCounts, ParticlePlaced, Sandbox, SimRng, SimStats};
