//! # Sandfall - headless falling-sand sandbox
//!
//! Wraps the engine from `sandfall-core` with the pieces a player session
//! needs: money and shop unlocks, market events, scripted scenarios and PNG
//! snapshots.

pub mod config;
pub mod economy;
pub mod scenario;
pub mod session;
pub mod snapshot;

// Re-export core modules for convenience
pub use sandfall_core::simulation;
pub use sandfall_core::world;

pub use config::AppConfig;
pub use session::Session;
