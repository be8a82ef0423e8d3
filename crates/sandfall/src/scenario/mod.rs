//! Scripted sessions loaded from RON
//!
//! A scenario runs `setup` then `actions` against a [`Session`](crate::session::Session)
//! and finally checks its `verify` conditions.

pub mod actions;
pub mod definition;
pub mod executor;
pub mod results;
pub mod verification;

pub use actions::ScenarioAction;
pub use definition::ScenarioDefinition;
pub use executor::{ScenarioExecutor, ScenarioExecutorConfig};
pub use results::{ExecutionReport, PerformanceMetrics};
pub use verification::{VerificationCondition, VerificationResult};
