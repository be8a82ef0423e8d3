//! Grid world - storage, chunk activity, update engine and editing

mod chunk_tracker;
mod grid;
mod interaction_resolver;
mod movement;
pub mod paint;
pub mod rng_trait;
mod sandbox;
pub mod stats;

pub use chunk_tracker::{CHUNK_SIZE, ChunkTracker};
pub use grid::Grid;
pub use interaction_resolver::{InteractionResolver, NEIGHBOR_OFFSETS};
pub use movement::MovementUpdater;
pub use paint::ParticlePlaced;
pub use rng_trait::SimRng;
pub use sandbox::{ParticleCounts, Sandbox};
pub use stats::{NoopStats, SimStats, TickStats};
