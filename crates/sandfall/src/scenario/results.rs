//! Execution results and reporting

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::verification::VerificationResult;

/// Timing for a scenario execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Total wall-clock time (milliseconds)
    pub total_duration_ms: f64,

    /// Setup phase duration (milliseconds)
    pub setup_duration_ms: f64,

    /// Main action phase duration (milliseconds)
    pub action_duration_ms: f64,

    /// Verification phase duration (milliseconds)
    pub verification_duration_ms: f64,

    /// Average time per simulation tick (milliseconds)
    pub avg_tick_time_ms: f64,
}

impl PerformanceMetrics {
    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.1}ms | Actions: {:.1}ms | Avg tick: {:.3}ms",
            self.total_duration_ms, self.action_duration_ms, self.avg_tick_time_ms
        )
    }
}

/// Report from scenario execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub scenario_name: String,

    /// Overall pass/fail status
    pub passed: bool,

    pub actions_executed: usize,

    /// Simulation ticks run by the scenario
    pub ticks_executed: u64,

    /// Money left at the end
    pub final_money: f64,

    /// Verification failures (empty if all passed)
    pub verification_failures: Vec<VerificationResult>,

    /// Execution log messages
    pub log: Vec<String>,

    /// Snapshot file paths
    pub snapshots: Vec<String>,

    pub performance: PerformanceMetrics,
}

impl ExecutionReport {
    pub fn new(scenario_name: String) -> Self {
        Self {
            scenario_name,
            passed: false,
            actions_executed: 0,
            ticks_executed: 0,
            final_money: 0.0,
            verification_failures: Vec::new(),
            log: Vec::new(),
            snapshots: Vec::new(),
            performance: PerformanceMetrics::default(),
        }
    }

    /// Check if all verifications passed
    pub fn success(&self) -> bool {
        self.verification_failures.is_empty()
    }

    /// Save report to a RON file
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<()> {
        let ron = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize execution report to RON")?;

        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path.as_ref(), ron).with_context(|| {
            format!(
                "Failed to write execution report: {}",
                path.as_ref().display()
            )
        })?;

        Ok(())
    }
}
