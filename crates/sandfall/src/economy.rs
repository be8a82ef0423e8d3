//! Money, shop unlocks and timed market events
//!
//! Painting onto empty space earns money; shop particles must be bought
//! before they can be painted. A market event multiplies earnings while it
//! runs.

use ahash::AHashSet;

use sandfall_core::ParticlePlaced;
use sandfall_core::simulation::{ParticleCatalog, ParticleDef, ParticleId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EconomyError {
    #[error("'{0}' is already owned")]
    AlreadyOwned(String),

    #[error("not enough money for '{name}': costs {price:.2}, have {money:.2}")]
    InsufficientFunds { name: String, price: f64, money: f64 },

    #[error("'{0}' is not sold in the shop")]
    NotForSale(String),

    #[error("'{0}' must be bought before it can be painted")]
    Locked(String),

    #[error("no market event named '{0}'")]
    UnknownEvent(String),

    #[error("money_per_particle must be finite and non-negative, got {0}")]
    InvalidRate(f64),

    #[error("market event '{name}' needs a finite, non-negative multiplier, got {multiplier}")]
    InvalidMultiplier { name: String, multiplier: f64 },
}

/// Economy tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Earned per particle placed on empty space
    pub money_per_particle: f64,
    pub starting_money: f64,
    /// Events that can be started by name
    pub events: Vec<MarketEventDef>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            money_per_particle: 0.0001,
            starting_money: 10.0,
            events: vec![
                MarketEventDef {
                    name: "gold rush".to_string(),
                    money_multiplier: 1.5,
                },
                MarketEventDef {
                    name: "jackpot".to_string(),
                    money_multiplier: 3.0,
                },
            ],
        }
    }
}

impl EconomyConfig {
    /// Rejects rates and multipliers that would make earnings negative or NaN
    pub fn validate(&self) -> Result<(), EconomyError> {
        if !is_non_negative(self.money_per_particle) {
            return Err(EconomyError::InvalidRate(self.money_per_particle));
        }
        if let Some(def) = self
            .events
            .iter()
            .find(|def| !is_non_negative(def.money_multiplier))
        {
            return Err(EconomyError::InvalidMultiplier {
                name: def.name.clone(),
                multiplier: def.money_multiplier,
            });
        }
        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEventDef {
    pub name: String,
    #[serde(default = "default_multiplier")]
    pub money_multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.5
}

/// Money balance plus the set of shop particles bought so far
#[derive(Debug, Clone)]
pub struct Wallet {
    money: f64,
    unlocked: AHashSet<u16>,
}

impl Wallet {
    pub fn new(starting_money: f64) -> Self {
        Self {
            money: starting_money,
            unlocked: AHashSet::new(),
        }
    }

    pub fn money(&self) -> f64 {
        self.money
    }

    pub fn is_unlocked(&self, id: u16) -> bool {
        self.unlocked.contains(&id)
    }

    pub fn deposit(&mut self, amount: f64) {
        self.money += amount;
    }

    /// Pay out for freshly placed particles. Returns the amount earned.
    pub fn award_placements(
        &mut self,
        placed: &[ParticlePlaced],
        money_per_particle: f64,
        multiplier: f64,
    ) -> f64 {
        let earned = placed.len() as f64 * money_per_particle * multiplier;
        self.money += earned;
        earned
    }

    /// Buy a shop particle
    pub fn purchase(&mut self, particle: &ParticleDef) -> Result<(), EconomyError> {
        if !particle.shop_item {
            return Err(EconomyError::NotForSale(particle.name.clone()));
        }
        if self.unlocked.contains(&particle.id) {
            return Err(EconomyError::AlreadyOwned(particle.name.clone()));
        }

        let price = f64::from(particle.price);
        if self.money < price {
            return Err(EconomyError::InsufficientFunds {
                name: particle.name.clone(),
                price,
                money: self.money,
            });
        }

        self.money -= price;
        self.unlocked.insert(particle.id);
        log::info!(
            "Bought '{}' for {:.2}, {:.2} left",
            particle.name,
            price,
            self.money
        );
        Ok(())
    }

    /// Whether `id` may be used as a brush. The eraser, non-shop particles
    /// and IDs missing from the catalog are never gated.
    pub fn can_paint(&self, id: u16, catalog: &ParticleCatalog) -> bool {
        if id == ParticleId::EMPTY {
            return true;
        }
        match catalog.get(id) {
            Some(def) if def.shop_item => self.unlocked.contains(&id),
            _ => true,
        }
    }

    /// Wipe the balance and every unlock
    pub fn reset(&mut self) {
        self.money = 0.0;
        self.unlocked.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveEvent {
    def: MarketEventDef,
    remaining: f32,
}

/// Registry of market events and the one currently running
#[derive(Debug, Clone)]
pub struct MarketEvents {
    defs: Vec<MarketEventDef>,
    active: Option<ActiveEvent>,
}

impl MarketEvents {
    pub fn new(defs: Vec<MarketEventDef>) -> Self {
        Self { defs, active: None }
    }

    /// Start the named event (case-insensitive), replacing any running one
    pub fn start(&mut self, name: &str, duration: f32) -> Result<(), EconomyError> {
        let def = self
            .defs
            .iter()
            .find(|def| def.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| EconomyError::UnknownEvent(name.to_string()))?;

        log::info!(
            "Event '{}' started: x{} money for {:.1}s",
            def.name,
            def.money_multiplier,
            duration
        );
        self.active = Some(ActiveEvent {
            def: def.clone(),
            remaining: duration,
        });
        Ok(())
    }

    /// Count the running event down. Returns true if it ended this call.
    pub fn update(&mut self, dt: f32) -> bool {
        let Some(active) = &mut self.active else {
            return false;
        };

        active.remaining -= dt;
        if active.remaining <= 0.0 {
            log::info!("Event '{}' ended", active.def.name);
            self.active = None;
            return true;
        }
        false
    }

    /// Earnings multiplier, 1.0 without an active event
    pub fn multiplier(&self) -> f64 {
        self.active
            .as_ref()
            .map_or(1.0, |active| active.def.money_multiplier)
    }

    /// Name and remaining seconds of the running event
    pub fn active(&self) -> Option<(&str, f32)> {
        self.active
            .as_ref()
            .map(|active| (active.def.name.as_str(), active.remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(n: usize) -> Vec<ParticlePlaced> {
        (0..n)
            .map(|i| ParticlePlaced {
                x: i as i32,
                y: 0,
                particle: ParticleId::SAND,
            })
            .collect()
    }

    // ============================================================================
    // Wallet
    // ============================================================================

    #[test]
    fn test_award_scales_with_count_and_multiplier() {
        let mut wallet = Wallet::new(0.0);
        let earned = wallet.award_placements(&placed(100), 0.5, 2.0);

        assert_eq!(earned, 100.0);
        assert_eq!(wallet.money(), 100.0);
    }

    #[test]
    fn test_award_nothing_for_empty_stroke() {
        let mut wallet = Wallet::new(10.0);
        wallet.award_placements(&[], 0.0001, 1.0);
        assert_eq!(wallet.money(), 10.0);
    }

    #[test]
    fn test_purchase_unlocks_and_deducts() {
        let catalog = ParticleCatalog::new();
        let lava = catalog.get(ParticleId::LAVA).unwrap();
        let mut wallet = Wallet::new(60.0);

        assert!(!wallet.can_paint(ParticleId::LAVA, &catalog));
        wallet.purchase(lava).unwrap();

        assert_eq!(wallet.money(), 10.0);
        assert!(wallet.is_unlocked(ParticleId::LAVA));
        assert!(wallet.can_paint(ParticleId::LAVA, &catalog));
    }

    #[test]
    fn test_purchase_twice_is_already_owned() {
        let catalog = ParticleCatalog::new();
        let acid = catalog.get(ParticleId::ACID).unwrap();
        let mut wallet = Wallet::new(100.0);

        wallet.purchase(acid).unwrap();
        let err = wallet.purchase(acid).unwrap_err();

        assert_eq!(err, EconomyError::AlreadyOwned("acid".to_string()));
        assert_eq!(wallet.money(), 75.0);
    }

    #[test]
    fn test_purchase_without_funds_changes_nothing() {
        let catalog = ParticleCatalog::new();
        let lava = catalog.get(ParticleId::LAVA).unwrap();
        let mut wallet = Wallet::new(10.0);

        let err = wallet.purchase(lava).unwrap_err();

        assert!(matches!(err, EconomyError::InsufficientFunds { .. }));
        assert_eq!(wallet.money(), 10.0);
        assert!(!wallet.is_unlocked(ParticleId::LAVA));
    }

    #[test]
    fn test_purchase_non_shop_particle() {
        let catalog = ParticleCatalog::new();
        let sand = catalog.get(ParticleId::SAND).unwrap();
        let mut wallet = Wallet::new(1000.0);

        assert_eq!(
            wallet.purchase(sand).unwrap_err(),
            EconomyError::NotForSale("sand".to_string())
        );
    }

    #[test]
    fn test_can_paint_ungated_particles() {
        let catalog = ParticleCatalog::new();
        let wallet = Wallet::new(0.0);

        assert!(wallet.can_paint(ParticleId::EMPTY, &catalog));
        assert!(wallet.can_paint(ParticleId::SAND, &catalog));
        assert!(wallet.can_paint(999, &catalog));
        assert!(!wallet.can_paint(ParticleId::GUNPOWDER, &catalog));
    }

    #[test]
    fn test_reset_clears_money_and_unlocks() {
        let catalog = ParticleCatalog::new();
        let mut wallet = Wallet::new(100.0);
        wallet
            .purchase(catalog.get(ParticleId::GUNPOWDER).unwrap())
            .unwrap();

        wallet.reset();

        assert_eq!(wallet.money(), 0.0);
        assert!(!wallet.is_unlocked(ParticleId::GUNPOWDER));
    }

    // ============================================================================
    // Market events
    // ============================================================================

    #[test]
    fn test_multiplier_defaults_to_one() {
        let events = MarketEvents::new(EconomyConfig::default().events);
        assert_eq!(events.multiplier(), 1.0);
        assert!(events.active().is_none());
    }

    #[test]
    fn test_start_is_case_insensitive() {
        let mut events = MarketEvents::new(EconomyConfig::default().events);
        events.start("GOLD Rush", 5.0).unwrap();

        assert_eq!(events.multiplier(), 1.5);
        assert_eq!(events.active(), Some(("gold rush", 5.0)));
    }

    #[test]
    fn test_start_unknown_event() {
        let mut events = MarketEvents::new(EconomyConfig::default().events);
        assert_eq!(
            events.start("meteor", 5.0),
            Err(EconomyError::UnknownEvent("meteor".to_string()))
        );
        assert_eq!(events.multiplier(), 1.0);
    }

    #[test]
    fn test_event_counts_down_and_ends() {
        let mut events = MarketEvents::new(EconomyConfig::default().events);
        events.start("jackpot", 1.0).unwrap();

        assert!(!events.update(0.5));
        assert_eq!(events.multiplier(), 3.0);
        assert!(events.update(0.5));
        assert_eq!(events.multiplier(), 1.0);
        assert!(!events.update(0.5));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EconomyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_negative_multiplier_rejected() {
        let mut config = EconomyConfig::default();
        config.events.push(MarketEventDef {
            name: "crash".to_string(),
            money_multiplier: -2.0,
        });

        assert_eq!(
            config.validate(),
            Err(EconomyError::InvalidMultiplier {
                name: "crash".to_string(),
                multiplier: -2.0,
            })
        );
    }

    #[test]
    fn test_nan_multiplier_rejected() {
        let config = EconomyConfig {
            events: vec![MarketEventDef {
                name: "glitch".to_string(),
                money_multiplier: f64::NAN,
            }],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EconomyError::InvalidMultiplier { .. })
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let config = EconomyConfig {
            money_per_particle: -0.5,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(EconomyError::InvalidRate(-0.5)));
    }

    #[test]
    fn test_event_def_multiplier_default() {
        let def: MarketEventDef = ron::from_str("(name: \"sale\")").unwrap();
        assert_eq!(def.money_multiplier, 1.5);
    }
}
