//! Driver configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `sandfall.ron` in the working directory (if exists), or the file
//!    passed with `--config` (must exist)
//! 3. Environment variables prefixed with `SANDFALL_`
//!
//! Example environment variable: `SANDFALL_SIM__BRUSH_RADIUS=3`

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use sandfall_core::SimConfig;
use serde::{Deserialize, Serialize};

use crate::economy::EconomyConfig;

/// Main driver configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub sim: SimConfig,

    #[serde(default)]
    pub economy: EconomyConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// What the headless run reports when it finishes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write a PNG of the final grid here
    pub snapshot: Option<String>,
    /// Log per-type particle counts after the run
    pub print_counts: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot: None,
            print_counts: true,
        }
    }
}

impl AppConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `sandfall.ron`, or `path` when given
    /// 3. Environment variables prefixed with `SANDFALL_` (highest priority)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("sim.width", defaults.sim.width as i64)?
            .set_default("sim.height", defaults.sim.height as i64)?
            .set_default("sim.tick_interval", f64::from(defaults.sim.tick_interval))?
            .set_default(
                "sim.max_ticks_per_update",
                i64::from(defaults.sim.max_ticks_per_update),
            )?
            .set_default(
                "sim.liquid_flow_passes",
                i64::from(defaults.sim.liquid_flow_passes),
            )?
            .set_default("sim.brush_radius", i64::from(defaults.sim.brush_radius))?
            .set_default("sim.liquid_shimmer", f64::from(defaults.sim.liquid_shimmer))?
            .set_default(
                "economy.money_per_particle",
                defaults.economy.money_per_particle,
            )?
            .set_default("economy.starting_money", defaults.economy.starting_money)?
            .set_default("output.print_counts", defaults.output.print_counts)?;

        // Layer 2: Config file
        let builder = match path {
            Some(path) => builder.add_source(
                File::from(path)
                    .format(FileFormat::Ron)
                    .required(true),
            ),
            None => builder.add_source(
                File::with_name("sandfall")
                    .format(FileFormat::Ron)
                    .required(false),
            ),
        };

        // Layer 3: Environment variables (SANDFALL_SIM__WIDTH, etc.)
        let builder = builder.add_source(
            Environment::with_prefix("SANDFALL")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let app: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.sim
            .validate()
            .context("Invalid simulation configuration")?;
        app.economy
            .validate()
            .context("Invalid economy configuration")?;
        Ok(app)
    }
}
