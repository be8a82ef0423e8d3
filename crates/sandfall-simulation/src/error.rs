//! Errors raised while loading particle and interaction data

use std::path::PathBuf;
use thiserror::Error;

/// Invalid or unreadable catalog data. Loading stops at the first problem.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("particle '{name}' uses reserved id 0")]
    ReservedId { name: String },

    #[error("duplicate particle id {id} ('{first}' and '{second}')")]
    DuplicateId {
        id: u16,
        first: String,
        second: String,
    },

    #[error("duplicate particle name '{0}'")]
    DuplicateName(String),

    #[error("{context} references unknown particle '{name}'")]
    UnknownParticleName { context: String, name: String },

    #[error("{context} references unknown particle id {id}")]
    UnknownParticleId { context: String, id: u16 },

    #[error("interaction '{name}' has chance {chance} outside [0, 1]")]
    InvalidChance { name: String, chance: f32 },

    #[error("failed to read catalog file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog")]
    Parse(#[from] ron::error::SpannedError),
}
