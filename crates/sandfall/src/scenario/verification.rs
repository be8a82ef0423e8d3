//! Verification conditions and state checks for scenarios

use sandfall_core::simulation::ParticleId;
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Conditions that can be verified against session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VerificationCondition {
    // === GRID CHECKS ===
    /// Assert the particle at a cell ("empty" for no particle)
    CellIs { x: i32, y: i32, particle: String },

    /// Assert a particle type's population lies within bounds
    ParticleCount {
        particle: String,
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },

    /// Assert the number of non-empty cells lies within bounds
    TotalCount {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },

    /// Assert no chunk is scheduled for the next tick
    Settled,

    // === ECONOMY CHECKS ===
    MoneyAtLeast { amount: f64 },

    /// Assert a shop particle has been bought
    Unlocked { particle: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub message: String,
    pub actual_value: Option<String>, // For debugging
}

impl VerificationCondition {
    pub fn evaluate(&self, session: &Session) -> VerificationResult {
        let sandbox = session.sandbox();

        match self {
            VerificationCondition::CellIs { x, y, particle } => {
                let Some(expected) = particle_id(session, particle) else {
                    return unknown_particle(particle);
                };
                let actual = sandbox.cell(*x, *y);

                VerificationResult {
                    passed: actual == Some(expected),
                    message: format!(
                        "Cell ({}, {}): expected '{}' ({}), got {:?}",
                        x, y, particle, expected, actual
                    ),
                    actual_value: actual.map(|id| id.to_string()),
                }
            }

            VerificationCondition::ParticleCount { particle, min, max } => {
                let Some(id) = particle_id(session, particle) else {
                    return unknown_particle(particle);
                };
                let actual = sandbox
                    .grid()
                    .cells()
                    .iter()
                    .filter(|&&cell| cell == id)
                    .count();

                VerificationResult {
                    passed: within(actual, *min, *max),
                    message: format!(
                        "'{}' count: expected {}, got {}",
                        particle,
                        describe_bounds(*min, *max),
                        actual
                    ),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::TotalCount { min, max } => {
                let actual = sandbox.particle_counts().total;

                VerificationResult {
                    passed: within(actual, *min, *max),
                    message: format!(
                        "Total particles: expected {}, got {}",
                        describe_bounds(*min, *max),
                        actual
                    ),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::Settled => {
                let scheduled = sandbox.tracker().scheduled_count();

                VerificationResult {
                    passed: scheduled == 0,
                    message: format!("Settled: {} chunks still scheduled", scheduled),
                    actual_value: Some(scheduled.to_string()),
                }
            }

            VerificationCondition::MoneyAtLeast { amount } => {
                let money = session.wallet().money();

                VerificationResult {
                    passed: money >= *amount,
                    message: format!("Money: expected at least {:.2}, got {:.2}", amount, money),
                    actual_value: Some(format!("{:.4}", money)),
                }
            }

            VerificationCondition::Unlocked { particle } => {
                let Some(id) = particle_id(session, particle) else {
                    return unknown_particle(particle);
                };
                let unlocked = session.wallet().is_unlocked(id);

                VerificationResult {
                    passed: unlocked,
                    message: format!("'{}' unlocked: {}", particle, unlocked),
                    actual_value: Some(unlocked.to_string()),
                }
            }
        }
    }
}

fn particle_id(session: &Session, name: &str) -> Option<u16> {
    if name.eq_ignore_ascii_case("empty") || name.eq_ignore_ascii_case("eraser") {
        return Some(ParticleId::EMPTY);
    }
    session
        .sandbox()
        .catalog()
        .find_by_name(name)
        .map(|def| def.id)
}

fn unknown_particle(name: &str) -> VerificationResult {
    VerificationResult {
        passed: false,
        message: format!("Unknown particle '{}'", name),
        actual_value: None,
    }
}

fn within(actual: usize, min: Option<usize>, max: Option<usize>) -> bool {
    min.is_none_or(|min| actual >= min) && max.is_none_or(|max| actual <= max)
}

fn describe_bounds(min: Option<usize>, max: Option<usize>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{}-{}", min, max),
        (Some(min), None) => format!(">= {}", min),
        (None, Some(max)) => format!("<= {}", max),
        (None, None) => "any".to_string(),
    }
}
