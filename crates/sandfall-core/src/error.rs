//! Engine error types

use thiserror::Error;

/// Rejected engine configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid must have at least one cell (got {width}x{height})")]
    EmptyGrid { width: usize, height: usize },

    #[error("tick interval must be positive (got {0})")]
    InvalidTickInterval(f32),

    #[error("max_ticks_per_update must be at least 1")]
    NoTicksPerUpdate,

    #[error("liquid shimmer must be within 0.0..=1.0 (got {0})")]
    InvalidShimmer(f32),
}

/// Failed console-style command
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("particle '{0}' not found")]
    UnknownParticle(String),
}
