//! Particle data and interaction rules for Sandfall
//!
//! This crate provides the foundational data types for the grid simulation:
//! - Particle definitions (ParticleId, ParticleDef, ParticleCatalog)
//! - Phase flags (Phase)
//! - Pairwise interaction rules (Interaction, Outcome, InteractionTable)
//! - RON catalog files resolved into a validated Ruleset

mod catalog_file;
mod error;
mod interactions;
mod particles;

pub use catalog_file::{CatalogFile, InteractionRecord, OutcomeRecord, ParticleRecord, Ruleset};
pub use error::CatalogError;
pub use interactions::{Interaction, InteractionTable, Outcome, default_interactions};
pub use particles::{ParticleCatalog, ParticleDef, ParticleId, Phase, default_particles};
