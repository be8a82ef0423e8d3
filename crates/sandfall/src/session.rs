//! A play session: the sandbox plus everything the player owns
//!
//! Brush selection, money and market events sit around the engine, never
//! inside it. Every edit goes through here so earnings and shop locks are
//! applied consistently.

use anyhow::{Result, bail};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use sandfall_core::simulation::{ParticleId, Ruleset};
use sandfall_core::world::TickStats;
use sandfall_core::{ParticleCounts, ParticlePlaced, PixelRenderer, Sandbox};

use crate::config::AppConfig;
use crate::economy::{EconomyError, MarketEvents, Wallet};

pub struct Session {
    sandbox: Sandbox,
    wallet: Wallet,
    events: MarketEvents,
    money_per_particle: f64,

    /// Particle ID painted by `paint`; 0 erases
    brush: u16,

    rng: Xoshiro256StarStar,
    stats: TickStats,
}

impl Session {
    pub fn new(config: &AppConfig, rules: Ruleset, seed: u64) -> Result<Self> {
        config.economy.validate()?;
        let sandbox = Sandbox::new(config.sim.clone(), rules)?;

        Ok(Self {
            sandbox,
            wallet: Wallet::new(config.economy.starting_money),
            events: MarketEvents::new(config.economy.events.clone()),
            money_per_particle: config.economy.money_per_particle,
            brush: ParticleId::SAND,
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            stats: TickStats::default(),
        })
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn sandbox_mut(&mut self) -> &mut Sandbox {
        &mut self.sandbox
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut Wallet {
        &mut self.wallet
    }

    pub fn events(&self) -> &MarketEvents {
        &self.events
    }

    pub fn brush(&self) -> u16 {
        self.brush
    }

    /// Counters accumulated over every tick run so far
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Select the brush by particle name; "eraser" and "empty" pick ID 0
    pub fn select_brush(&mut self, name: &str) -> Result<()> {
        let id = self.resolve_brush(name)?;
        if !self.wallet.can_paint(id, self.sandbox.catalog()) {
            bail!(EconomyError::Locked(name.to_lowercase()));
        }
        self.brush = id;
        log::debug!("Brush set to '{}' ({})", name, id);
        Ok(())
    }

    /// Buy a shop particle and select it
    pub fn buy(&mut self, name: &str) -> Result<()> {
        let Some(def) = self.sandbox.catalog().find_by_name(name) else {
            bail!("Unknown particle '{}'", name);
        };
        self.wallet.purchase(def)?;
        self.brush = def.id;
        Ok(())
    }

    /// Paint the current brush at (x, y). Returns the number of particles
    /// placed on empty space.
    pub fn paint(&mut self, x: i32, y: i32) -> Result<usize> {
        self.ensure_brush_allowed()?;
        let placed = self.sandbox.paint(x, y, self.brush);
        self.award(&placed);
        Ok(placed.len())
    }

    /// Drag the current brush from one point to another
    pub fn paint_line(&mut self, from: (i32, i32), to: (i32, i32)) -> Result<usize> {
        self.ensure_brush_allowed()?;
        let placed = self
            .sandbox
            .paint_line(from.0, from.1, to.0, to.1, self.brush);
        self.award(&placed);
        Ok(placed.len())
    }

    /// Start a market event by name
    pub fn start_event(&mut self, name: &str, duration: f32) -> Result<()> {
        self.events.start(name, duration)?;
        Ok(())
    }

    /// Run `count` ticks directly, bypassing the accumulator. Each tick
    /// also counts one tick interval off the running event.
    pub fn tick(&mut self, count: u32) {
        let interval = self.sandbox.config().tick_interval;
        for _ in 0..count {
            self.sandbox.step(&mut self.stats, &mut self.rng);
            self.events.update(interval);
        }
    }

    /// Feed `seconds` of real time through the fixed-timestep clock in
    /// frames of `frame_dt`. Returns the number of ticks run.
    pub fn advance(&mut self, seconds: f32, frame_dt: f32) -> Result<u32> {
        if frame_dt.is_nan() || frame_dt <= 0.0 {
            bail!("Frame time must be positive, got {}", frame_dt);
        }

        let mut remaining = seconds;
        let mut ticks = 0;
        while remaining > 0.0 {
            let dt = frame_dt.min(remaining);
            ticks += self.sandbox.update(dt, &mut self.stats, &mut self.rng);
            self.events.update(dt);
            remaining -= dt;
        }
        Ok(ticks)
    }

    /// Clear every particle, or only the named type
    pub fn clear_all(&mut self, name: Option<&str>) -> Result<usize> {
        Ok(self.sandbox.clear_all(name)?)
    }

    /// Wipe money and every unlock. A locked brush falls back to sand.
    pub fn clear_money(&mut self) {
        self.wallet.reset();
        if !self.wallet.can_paint(self.brush, self.sandbox.catalog()) {
            self.brush = ParticleId::SAND;
        }
        log::info!("Wiped all money and purchased items");
    }

    pub fn particle_counts(&self) -> ParticleCounts {
        self.sandbox.particle_counts()
    }

    /// Render the grid with this session's RNG driving the shimmer
    pub fn render(&mut self) -> PixelRenderer {
        let mut renderer = PixelRenderer::for_sandbox(&self.sandbox);
        renderer.render(&self.sandbox, &mut self.rng);
        renderer
    }

    fn resolve_brush(&self, name: &str) -> Result<u16> {
        if name.eq_ignore_ascii_case("eraser") || name.eq_ignore_ascii_case("empty") {
            return Ok(ParticleId::EMPTY);
        }
        match self.sandbox.catalog().find_by_name(name) {
            Some(def) => Ok(def.id),
            None => bail!("Unknown particle '{}'", name),
        }
    }

    fn ensure_brush_allowed(&self) -> Result<()> {
        if !self.wallet.can_paint(self.brush, self.sandbox.catalog()) {
            let name = self
                .sandbox
                .catalog()
                .get(self.brush)
                .map_or_else(|| self.brush.to_string(), |def| def.name.clone());
            bail!(EconomyError::Locked(name));
        }
        Ok(())
    }

    fn award(&mut self, placed: &[ParticlePlaced]) {
        if placed.is_empty() {
            return;
        }
        let earned = self.wallet.award_placements(
            placed,
            self.money_per_particle,
            self.events.multiplier(),
        );
        log::trace!("Placed {} particles, earned {:.4}", placed.len(), earned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::MarketEventDef;

    fn session() -> Session {
        let mut config = AppConfig::default();
        config.sim = config.sim.with_size(64, 64);
        config.sim.brush_radius = 0;
        Session::new(&config, Ruleset::builtin(), 7).unwrap()
    }

    #[test]
    fn test_paint_earns_money() {
        let mut session = session();
        let before = session.wallet().money();

        let placed = session.paint(10, 10).unwrap();

        assert_eq!(placed, 1);
        assert!(session.wallet().money() > before);
        assert_eq!(session.sandbox().cell(10, 10), Some(ParticleId::SAND));
    }

    #[test]
    fn test_painting_occupied_cell_earns_nothing() {
        let mut session = session();
        session.paint(10, 10).unwrap();
        let before = session.wallet().money();

        assert_eq!(session.paint(10, 10).unwrap(), 0);
        assert_eq!(session.wallet().money(), before);
    }

    #[test]
    fn test_event_multiplies_earnings() {
        let mut plain = session();
        plain.paint(1, 1).unwrap();
        let base = plain.wallet().money() - 10.0;

        let mut boosted = session();
        boosted.start_event("jackpot", 10.0).unwrap();
        boosted.paint(1, 1).unwrap();
        let gained = boosted.wallet().money() - 10.0;

        assert!((gained - base * 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_event_multiplier_refused() {
        let mut config = AppConfig::default();
        config.sim = config.sim.with_size(16, 16);
        config.economy.events = vec![MarketEventDef {
            name: "crash".to_string(),
            money_multiplier: -3.0,
        }];

        assert!(Session::new(&config, Ruleset::builtin(), 7).is_err());
    }

    #[test]
    fn test_paint_far_outside_grid_places_nothing() {
        let mut session = session();
        let before = session.wallet().money();

        assert_eq!(session.paint(i32::MAX, i32::MIN).unwrap(), 0);
        assert_eq!(session.paint_line((i32::MIN, 0), (i32::MIN, 5)).unwrap(), 0);
        assert_eq!(session.wallet().money(), before);
    }

    #[test]
    fn test_locked_brush_rejected() {
        let mut session = session();
        assert!(session.select_brush("lava").is_err());
        assert_eq!(session.brush(), ParticleId::SAND);
    }

    #[test]
    fn test_buy_selects_brush() {
        let mut session = session();
        session.wallet_mut().deposit(100.0);

        session.buy("Lava").unwrap();

        assert_eq!(session.brush(), ParticleId::LAVA);
        session.paint(5, 5).unwrap();
        assert_eq!(session.sandbox().cell(5, 5), Some(ParticleId::LAVA));
    }

    #[test]
    fn test_eraser_always_selectable() {
        let mut session = session();
        session.paint(3, 3).unwrap();

        session.select_brush("eraser").unwrap();
        assert_eq!(session.paint(3, 3).unwrap(), 0);
        assert_eq!(session.sandbox().cell(3, 3), Some(ParticleId::EMPTY));
    }

    #[test]
    fn test_clear_money_drops_locked_brush() {
        let mut session = session();
        session.wallet_mut().deposit(100.0);
        session.buy("acid").unwrap();

        session.clear_money();

        assert_eq!(session.wallet().money(), 0.0);
        assert_eq!(session.brush(), ParticleId::SAND);
    }

    #[test]
    fn test_advance_runs_ticks() {
        let mut session = session();
        session.paint(10, 20).unwrap();

        let ticks = session.advance(0.5, 0.05).unwrap();

        assert!(ticks > 0);
        assert_eq!(session.sandbox().tick_count(), u64::from(ticks));
        assert_eq!(session.sandbox().cell(10, 20), Some(ParticleId::EMPTY));
    }

    #[test]
    fn test_advance_rejects_bad_frame_time() {
        let mut session = session();
        assert!(session.advance(1.0, 0.0).is_err());
    }

    #[test]
    fn test_tick_counts_down_event() {
        let mut session = session();
        session.start_event("gold rush", 0.08).unwrap();

        session.tick(2);

        assert!(session.events().active().is_none());
        assert_eq!(session.sandbox().tick_count(), 2);
    }
}
