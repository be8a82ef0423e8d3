//! Sandbox - owns the grid and runs the update engine

use ahash::{AHashMap, AHashSet};
use glam::IVec2;

use super::chunk_tracker::ChunkTracker;
use super::grid::Grid;
use super::interaction_resolver::InteractionResolver;
use super::movement::MovementUpdater;
use super::paint::{self, ParticlePlaced};
use crate::config::SimConfig;
use crate::error::{CommandError, ConfigError};
use crate::simulation::{InteractionTable, ParticleCatalog, ParticleId, Ruleset};
use crate::world::{SimRng, SimStats};

/// Per-type population of the grid
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParticleCounts {
    /// (lower-cased name, count) in catalog order, types on the grid only
    pub by_type: Vec<(String, usize)>,
    /// Cells holding IDs missing from the catalog
    pub unknown: usize,
    /// All non-empty cells
    pub total: usize,
}

/// The simulation context: grid, chunk activity, rules, config and clock.
///
/// Painting and ticking both go through `&mut Sandbox`, so edits can only
/// ever land between ticks.
pub struct Sandbox {
    config: SimConfig,
    rules: Ruleset,
    grid: Grid,
    tracker: ChunkTracker,
    brush_radius: u32,

    /// Simulation time accumulator
    time_accumulator: f32,
    tick_count: u64,

    /// Unknown IDs already reported
    warned_unknown: AHashSet<u16>,
}

impl Sandbox {
    pub fn new(config: SimConfig, rules: Ruleset) -> Result<Self, ConfigError> {
        config.validate()?;

        log::info!(
            "Sandbox {}x{} ({} particle types, {} interactions)",
            config.width,
            config.height,
            rules.particles.len(),
            rules.interactions.len()
        );

        Ok(Self {
            grid: Grid::new(config.width, config.height),
            tracker: ChunkTracker::new(config.width, config.height),
            brush_radius: config.brush_radius,
            time_accumulator: 0.0,
            tick_count: 0,
            warned_unknown: AHashSet::new(),
            config,
            rules,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ParticleCatalog {
        &self.rules.particles
    }

    pub fn interactions(&self) -> &InteractionTable {
        &self.rules.interactions
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tracker(&self) -> &ChunkTracker {
        &self.tracker
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Ticks run since creation
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// True when no chunk is scheduled for the next tick
    pub fn is_settled(&self) -> bool {
        self.tracker.scheduled_count() == 0
    }

    pub fn brush_radius(&self) -> u32 {
        self.brush_radius
    }

    pub fn set_brush_radius(&mut self, radius: u32) {
        self.brush_radius = radius;
    }

    /// Particle ID at a cell, `None` outside the grid
    pub fn cell(&self, x: i32, y: i32) -> Option<u16> {
        self.grid.get(x, y)
    }

    /// Write a single cell unconditionally and wake its neighborhood
    pub fn set_cell(&mut self, x: i32, y: i32, particle: u16) -> bool {
        if !self.grid.set(x, y, particle) {
            return false;
        }
        self.tracker.wake_cell(x, y);
        log::trace!("set ({}, {}) = {}", x, y, particle);
        true
    }

    /// Schedule every chunk for the next tick
    pub fn wake_all(&mut self) {
        self.tracker.wake_all();
    }

    /// Stamp the brush at (x, y). Returns one event per particle placed on
    /// empty space.
    pub fn paint(&mut self, x: i32, y: i32, particle: u16) -> Vec<ParticlePlaced> {
        paint::draw_circle(
            &mut self.grid,
            &mut self.tracker,
            x,
            y,
            self.brush_radius,
            particle,
        )
    }

    /// Stamp the brush along a dragged line
    pub fn paint_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        particle: u16,
    ) -> Vec<ParticlePlaced> {
        paint::draw_line(
            &mut self.grid,
            &mut self.tracker,
            (x0, y0),
            (x1, y1),
            self.brush_radius,
            particle,
        )
    }

    /// Advance the clock by `dt` seconds, running whole ticks as the
    /// accumulator fills. Returns the number of ticks run.
    ///
    /// A NaN, infinite or negative `dt` is ignored and leaves the clock as
    /// it was.
    pub fn update<R: SimRng>(&mut self, dt: f32, stats: &mut dyn SimStats, rng: &mut R) -> u32 {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Ignoring invalid frame time {}", dt);
            return 0;
        }

        let interval = self.config.tick_interval;
        self.time_accumulator += dt;

        // Cap ticks per call so a slow frame degrades into slow motion
        // instead of an ever-growing backlog
        let mut ticks = 0;
        while self.time_accumulator >= interval && ticks < self.config.max_ticks_per_update {
            self.step(stats, rng);
            self.time_accumulator -= interval;
            ticks += 1;
        }

        // Clamp accumulator to prevent runaway
        if self.time_accumulator > interval * 2.0 {
            self.time_accumulator = interval;
        }

        ticks
    }

    /// Run exactly one tick
    pub fn step<R: SimRng>(&mut self, stats: &mut dyn SimStats, rng: &mut R) {
        self.tracker.begin_tick();
        self.grid.clear_processed();
        self.tick_count += 1;

        let active_chunks: Vec<IVec2> = self.tracker.active_chunks().to_vec();
        if active_chunks.is_empty() {
            return;
        }

        for &chunk in &active_chunks {
            self.update_chunk_solids(chunk, stats, rng);
        }

        for _ in 0..self.config.liquid_flow_passes {
            for &chunk in &active_chunks {
                self.update_chunk_liquids(chunk, stats, rng);
            }
        }

        log::debug!(
            "tick {}: {} active chunks, {} scheduled",
            self.tick_count,
            active_chunks.len(),
            self.tracker.scheduled_count()
        );
    }

    /// Solids/gas pass over one chunk, bottom row first
    fn update_chunk_solids<R: SimRng>(
        &mut self,
        chunk: IVec2,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        let (min, max) = self.tracker.chunk_bounds(chunk);

        for y in min.y..max.y {
            for x in min.x..max.x {
                if self.grid.is_processed(x, y) {
                    continue;
                }
                let Some(id) = self.grid.get(x, y) else {
                    continue;
                };
                if id == ParticleId::EMPTY {
                    continue;
                }
                let Some(particle) = self.rules.particles.get(id) else {
                    note_unknown(&mut self.warned_unknown, id, x, y, stats);
                    continue;
                };
                if particle.is_liquid() {
                    continue;
                }

                if InteractionResolver::try_react(
                    &mut self.grid,
                    &mut self.tracker,
                    &self.rules,
                    x,
                    y,
                    stats,
                    rng,
                ) {
                    continue;
                }

                MovementUpdater::update_solid_or_gas(
                    &mut self.grid,
                    &mut self.tracker,
                    particle,
                    x,
                    y,
                    stats,
                );
            }
        }
    }

    /// One liquid sub-pass over one chunk
    fn update_chunk_liquids<R: SimRng>(
        &mut self,
        chunk: IVec2,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        let (min, max) = self.tracker.chunk_bounds(chunk);

        for y in min.y..max.y {
            for x in min.x..max.x {
                if self.grid.is_processed(x, y) {
                    continue;
                }
                let Some(id) = self.grid.get(x, y) else {
                    continue;
                };
                if id == ParticleId::EMPTY {
                    continue;
                }
                let Some(particle) = self.rules.particles.get(id) else {
                    note_unknown(&mut self.warned_unknown, id, x, y, stats);
                    continue;
                };
                if !particle.is_liquid() {
                    continue;
                }

                if InteractionResolver::try_react(
                    &mut self.grid,
                    &mut self.tracker,
                    &self.rules,
                    x,
                    y,
                    stats,
                    rng,
                ) {
                    continue;
                }

                MovementUpdater::update_liquid(&mut self.grid, &mut self.tracker, x, y, stats, rng);
            }
        }
    }

    /// Clear every particle, or only those of the named type.
    ///
    /// The name is matched case-insensitively. An unknown name leaves the
    /// grid untouched. Returns the number of cells cleared.
    pub fn clear_all(&mut self, name: Option<&str>) -> Result<usize, CommandError> {
        let target = match name {
            Some(name) => Some(
                self.rules
                    .particles
                    .find_by_name(name)
                    .ok_or_else(|| CommandError::UnknownParticle(name.to_string()))?
                    .id,
            ),
            None => None,
        };

        let mut cleared = 0;
        for y in 0..self.grid.height() as i32 {
            for x in 0..self.grid.width() as i32 {
                let Some(id) = self.grid.get(x, y) else {
                    continue;
                };
                if id == ParticleId::EMPTY || target.is_some_and(|target| target != id) {
                    continue;
                }
                self.grid.set(x, y, ParticleId::EMPTY);
                self.tracker.wake_cell(x, y);
                cleared += 1;
            }
        }

        match name {
            Some(name) => log::info!("Cleared {} '{}' particles", cleared, name),
            None => log::info!("Cleared {} particles", cleared),
        }
        Ok(cleared)
    }

    /// Lower-cased particle names in catalog order
    pub fn particle_names(&self) -> Vec<String> {
        self.rules.particles.names()
    }

    /// Count the particles currently on the grid
    pub fn particle_counts(&self) -> ParticleCounts {
        let mut by_id: AHashMap<u16, usize> = AHashMap::new();
        for &id in self.grid.cells() {
            if id != ParticleId::EMPTY {
                *by_id.entry(id).or_default() += 1;
            }
        }

        let total = by_id.values().sum();
        let by_type = self
            .rules
            .particles
            .iter()
            .filter_map(|def| {
                by_id
                    .remove(&def.id)
                    .map(|count| (def.name.to_lowercase(), count))
            })
            .collect();

        ParticleCounts {
            by_type,
            unknown: by_id.values().sum(),
            total,
        }
    }
}

/// Report an unknown ID, logging each distinct ID once
fn note_unknown(
    warned: &mut AHashSet<u16>,
    id: u16,
    x: i32,
    y: i32,
    stats: &mut dyn SimStats,
) {
    stats.record_unknown_particle();
    if warned.insert(id) {
        log::warn!(
            "Unknown particle ID {} at ({}, {}); leaving it in place",
            id,
            x,
            y
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{NoopStats, TickStats};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn sandbox(width: usize, height: usize) -> Sandbox {
        Sandbox::new(
            SimConfig::default().with_size(width, height),
            Ruleset::builtin(),
        )
        .unwrap()
    }

    fn rng() -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(42)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = Sandbox::new(SimConfig::default().with_size(0, 0), Ruleset::builtin());
        assert!(result.is_err());
    }

    #[test]
    fn test_set_cell_wakes_and_clips() {
        let mut sandbox = sandbox(32, 32);
        assert!(sandbox.set_cell(3, 3, ParticleId::SAND));
        assert!(!sandbox.is_settled());
        assert!(!sandbox.set_cell(-1, 3, ParticleId::SAND));
    }

    #[test]
    fn test_update_runs_ticks_on_interval() {
        let mut sandbox = sandbox(32, 32);
        let mut rng = rng();

        assert_eq!(sandbox.update(0.03, &mut NoopStats, &mut rng), 0);
        assert_eq!(sandbox.update(0.03, &mut NoopStats, &mut rng), 1);
        assert_eq!(sandbox.tick_count(), 1);
    }

    #[test]
    fn test_update_caps_ticks_and_clamps_backlog() {
        let mut sandbox = sandbox(32, 32);
        let mut rng = rng();

        assert_eq!(sandbox.update(10.0, &mut NoopStats, &mut rng), 2);
        // Backlog was clamped to one interval
        assert_eq!(sandbox.update(0.0, &mut NoopStats, &mut rng), 1);
        assert_eq!(sandbox.update(0.0, &mut NoopStats, &mut rng), 0);
    }

    #[test]
    fn test_update_ignores_invalid_dt() {
        let mut sandbox = sandbox(32, 32);
        let mut rng = rng();

        assert_eq!(sandbox.update(0.03, &mut NoopStats, &mut rng), 0);
        for dt in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -1.0] {
            assert_eq!(sandbox.update(dt, &mut NoopStats, &mut rng), 0);
        }

        // The earlier 0.03 is still pending
        assert_eq!(sandbox.update(0.03, &mut NoopStats, &mut rng), 1);
        assert_eq!(sandbox.update(0.05, &mut NoopStats, &mut rng), 1);
        assert_eq!(sandbox.tick_count(), 2);
    }

    #[test]
    fn test_settled_sandbox_does_no_work() {
        let mut sandbox = sandbox(64, 64);
        let mut stats = TickStats::default();
        sandbox.set_cell(10, 0, ParticleId::STONE);

        sandbox.step(&mut stats, &mut rng());
        assert!(sandbox.is_settled());

        stats.reset();
        sandbox.step(&mut stats, &mut rng());
        assert_eq!(stats.evaluated(), 0);
        assert!(sandbox.tracker().active_chunks().is_empty());
    }

    #[test]
    fn test_unknown_particle_is_left_alone() {
        let mut sandbox = sandbox(32, 32);
        let mut stats = TickStats::default();
        sandbox.set_cell(5, 5, 999);

        sandbox.step(&mut stats, &mut rng());
        sandbox.wake_all();
        sandbox.step(&mut stats, &mut rng());

        assert_eq!(sandbox.cell(5, 5), Some(999));
        assert!(stats.unknown_particles >= 2);
    }

    #[test]
    fn test_clear_all_everything() {
        let mut sandbox = sandbox(32, 32);
        sandbox.paint(10, 10, ParticleId::SAND);
        sandbox.set_cell(0, 0, 999);

        let before = sandbox.particle_counts().total;
        assert_eq!(sandbox.clear_all(None), Ok(before));
        assert_eq!(sandbox.particle_counts().total, 0);
        assert_eq!(sandbox.cell(0, 0), Some(ParticleId::EMPTY));
    }

    #[test]
    fn test_clear_all_by_name_ignores_case() {
        let mut sandbox = sandbox(32, 32);
        sandbox.set_cell(1, 1, ParticleId::SAND);
        sandbox.set_cell(2, 1, ParticleId::WATER);

        assert_eq!(sandbox.clear_all(Some("SaNd")), Ok(1));
        assert_eq!(sandbox.cell(1, 1), Some(ParticleId::EMPTY));
        assert_eq!(sandbox.cell(2, 1), Some(ParticleId::WATER));
    }

    #[test]
    fn test_clear_all_unknown_name_is_noop() {
        let mut sandbox = sandbox(32, 32);
        sandbox.set_cell(1, 1, ParticleId::SAND);

        assert_eq!(
            sandbox.clear_all(Some("unobtainium")),
            Err(CommandError::UnknownParticle("unobtainium".to_string()))
        );
        assert_eq!(sandbox.cell(1, 1), Some(ParticleId::SAND));
    }

    #[test]
    fn test_particle_counts() {
        let mut sandbox = sandbox(32, 32);
        sandbox.set_cell(1, 1, ParticleId::WATER);
        sandbox.set_cell(2, 1, ParticleId::SAND);
        sandbox.set_cell(3, 1, ParticleId::SAND);
        sandbox.set_cell(4, 1, 999);

        let counts = sandbox.particle_counts();
        assert_eq!(
            counts.by_type,
            vec![("sand".to_string(), 2), ("water".to_string(), 1)]
        );
        assert_eq!(counts.unknown, 1);
        assert_eq!(counts.total, 4);
    }

    #[test]
    fn test_particle_names_are_lowercase() {
        let sandbox = sandbox(16, 16);
        let names = sandbox.particle_names();
        assert_eq!(names.first().map(String::as_str), Some("sand"));
        assert!(names.iter().all(|name| name.to_lowercase() == *name));
    }

    #[test]
    fn test_brush_radius_comes_from_config() {
        let mut sandbox = sandbox(32, 32);
        assert_eq!(sandbox.brush_radius(), 5);
        sandbox.set_brush_radius(0);
        assert_eq!(sandbox.paint(4, 4, ParticleId::SAND).len(), 1);
    }
}
