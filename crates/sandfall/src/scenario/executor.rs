//! Scenario execution engine

use std::time::Instant;

use anyhow::{Result, bail};
use sandfall_core::simulation::ParticleId;

use super::actions::ScenarioAction;
use super::definition::ScenarioDefinition;
use super::results::ExecutionReport;
use crate::session::Session;
use crate::snapshot;

/// Configuration for scenario executor
#[derive(Debug, Clone)]
pub struct ScenarioExecutorConfig {
    /// Frame length used by `Advance`
    pub frame_dt: f32,

    /// Log every action before running it
    pub verbose: bool,
}

impl Default for ScenarioExecutorConfig {
    fn default() -> Self {
        Self {
            frame_dt: 1.0 / 60.0,
            verbose: false,
        }
    }
}

/// Executes scenario actions against a session
pub struct ScenarioExecutor {
    config: ScenarioExecutorConfig,

    /// Action execution log
    log: Vec<String>,

    /// Snapshots written
    snapshots: Vec<String>,
}

impl ScenarioExecutor {
    pub fn new() -> Self {
        Self::with_config(ScenarioExecutorConfig::default())
    }

    pub fn with_config(config: ScenarioExecutorConfig) -> Self {
        Self {
            config,
            log: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    /// Execute a complete scenario
    pub fn execute_scenario(
        &mut self,
        scenario: &ScenarioDefinition,
        session: &mut Session,
    ) -> Result<ExecutionReport> {
        let start_time = Instant::now();
        let start_tick = session.sandbox().tick_count();
        let mut report = ExecutionReport::new(scenario.name.clone());

        self.log.clear();
        self.snapshots.clear();

        self.log(&format!("Starting scenario: {}", scenario.name));
        if !scenario.description.is_empty() {
            self.log(&format!("Description: {}", scenario.description));
        }

        // Execute setup actions
        let setup_start = Instant::now();
        if !scenario.setup.is_empty() {
            self.log(&format!("Running {} setup actions", scenario.setup.len()));
            for (idx, action) in scenario.setup.iter().enumerate() {
                if let Err(e) = self.execute_action(action, session) {
                    let msg = format!("Setup action {} failed: {}", idx, e);
                    self.log(&msg);
                    return Err(anyhow::anyhow!(msg));
                }
            }
        }
        report.performance.setup_duration_ms = setup_start.elapsed().as_secs_f64() * 1000.0;

        // Execute main actions
        let action_start = Instant::now();
        self.log(&format!("Running {} main actions", scenario.actions.len()));
        for (idx, action) in scenario.actions.iter().enumerate() {
            if let Err(e) = self.execute_action(action, session) {
                let msg = format!("Action {} failed: {}", idx, e);
                self.log(&msg);
                return Err(anyhow::anyhow!(msg));
            }
        }
        report.performance.action_duration_ms = action_start.elapsed().as_secs_f64() * 1000.0;

        report.actions_executed = scenario.setup.len() + scenario.actions.len();
        report.ticks_executed = session.sandbox().tick_count() - start_tick;

        // Run verifications
        let verify_start = Instant::now();
        if !scenario.verify.is_empty() {
            self.log(&format!("Running {} verifications", scenario.verify.len()));
            for condition in &scenario.verify {
                let result = condition.evaluate(session);
                self.log(&format!(
                    "  {} {}",
                    if result.passed { "✓" } else { "✗" },
                    result.message
                ));

                if !result.passed {
                    report.verification_failures.push(result);
                }
            }
        }
        report.performance.verification_duration_ms =
            verify_start.elapsed().as_secs_f64() * 1000.0;

        // Finalize report
        report.final_money = session.wallet().money();
        report.passed = report.success();
        report.performance.total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        if report.ticks_executed > 0 {
            report.performance.avg_tick_time_ms = (report.performance.setup_duration_ms
                + report.performance.action_duration_ms)
                / report.ticks_executed as f64;
        }

        self.log(&format!(
            "Scenario complete: {} ({} ticks, {:.1}ms)",
            if report.passed { "PASSED" } else { "FAILED" },
            report.ticks_executed,
            report.performance.total_duration_ms
        ));
        self.log(&format!("  Performance: {}", report.performance.summary()));

        report.log = self.log.clone();
        report.snapshots = self.snapshots.clone();
        Ok(report)
    }

    /// Execute a single action
    fn execute_action(&mut self, action: &ScenarioAction, session: &mut Session) -> Result<()> {
        if self.config.verbose {
            self.log(&format!(
                "[Tick {}] {:?}",
                session.sandbox().tick_count(),
                action
            ));
        }

        match action {
            ScenarioAction::Paint { x, y } => {
                let placed = session.paint(*x, *y)?;
                self.log(&format!("  Painted at ({}, {}): {} placed", x, y, placed));
            }

            ScenarioAction::PaintLine { from, to } => {
                let placed = session.paint_line(*from, *to)?;
                self.log(&format!(
                    "  Painted line {:?} -> {:?}: {} placed",
                    from, to, placed
                ));
            }

            ScenarioAction::FillRect {
                min_x,
                min_y,
                max_x,
                max_y,
                particle,
            } => {
                let id = resolve_particle(session, particle)?;
                let mut written = 0;
                for y in *min_y..=*max_y {
                    for x in *min_x..=*max_x {
                        if session.sandbox_mut().set_cell(x, y, id) {
                            written += 1;
                        }
                    }
                }
                self.log(&format!(
                    "  Filled rect ({},{}) to ({},{}) with '{}': {} cells",
                    min_x, min_y, max_x, max_y, particle, written
                ));
            }

            ScenarioAction::SetBrushRadius { radius } => {
                session.sandbox_mut().set_brush_radius(*radius);
                self.log(&format!("  Brush radius set to {}", radius));
            }

            ScenarioAction::SelectBrush { particle } => {
                session.select_brush(particle)?;
                self.log(&format!("  Selected brush '{}'", particle));
            }

            ScenarioAction::ClearAll { particle } => {
                let cleared = session.clear_all(particle.as_deref())?;
                self.log(&format!("  Cleared {} particles", cleared));
            }

            ScenarioAction::Buy { particle } => {
                session.buy(particle)?;
                self.log(&format!(
                    "  Bought '{}', {:.2} left",
                    particle,
                    session.wallet().money()
                ));
            }

            ScenarioAction::GiveMoney { amount } => {
                session.wallet_mut().deposit(*amount);
                self.log(&format!(
                    "  Gave {:.2}, balance {:.2}",
                    amount,
                    session.wallet().money()
                ));
            }

            ScenarioAction::ClearMoney => {
                session.clear_money();
                self.log("  Cleared money and unlocks");
            }

            ScenarioAction::StartEvent { name, duration } => {
                session.start_event(name, *duration)?;
                self.log(&format!("  Started event '{}' for {:.1}s", name, duration));
            }

            ScenarioAction::Tick { count } => {
                session.tick(*count);
                self.log(&format!("  Ran {} ticks", count));
            }

            ScenarioAction::Advance { seconds } => {
                let ticks = session.advance(*seconds, self.config.frame_dt)?;
                self.log(&format!("  Advanced {:.2}s: {} ticks", seconds, ticks));
            }

            ScenarioAction::PrintCounts => {
                let counts = session.particle_counts();
                for (name, count) in &counts.by_type {
                    self.log(&format!("  {}: {}", name, count));
                }
                if counts.unknown > 0 {
                    self.log(&format!("  unknown: {}", counts.unknown));
                }
                self.log(&format!("  total: {}", counts.total));
            }

            ScenarioAction::Snapshot { path } => {
                let renderer = session.render();
                snapshot::save_png(&renderer, path)?;
                self.snapshots.push(path.clone());
                self.log(&format!("  Snapshot saved to {}", path));
            }

            ScenarioAction::Log { message } => {
                self.log(&format!("  {}", message));
            }
        }

        Ok(())
    }

    fn log(&mut self, message: &str) {
        log::info!("{}", message);
        self.log.push(message.to_string());
    }
}

impl Default for ScenarioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_particle(session: &Session, name: &str) -> Result<u16> {
    if name.eq_ignore_ascii_case("empty") || name.eq_ignore_ascii_case("eraser") {
        return Ok(ParticleId::EMPTY);
    }
    match session.sandbox().catalog().find_by_name(name) {
        Some(def) => Ok(def.id),
        None => bail!("Unknown particle '{}'", name),
    }
}
