//! Particle definitions and catalog

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Built-in particle IDs
pub struct ParticleId;

impl ParticleId {
    /// Reserved for "no particle"
    pub const EMPTY: u16 = 0;

    pub const SAND: u16 = 1;
    pub const WATER: u16 = 2;
    pub const STONE: u16 = 3;
    pub const WOOD: u16 = 4;
    pub const FIRE: u16 = 5;
    pub const SMOKE: u16 = 6;
    pub const STEAM: u16 = 7;
    pub const LAVA: u16 = 8;
    pub const OIL: u16 = 9;
    pub const ACID: u16 = 10;
    pub const ICE: u16 = 11;
    pub const GLASS: u16 = 12;
    pub const GUNPOWDER: u16 = 13;
    pub const PLANT: u16 = 14;
}

bitflags! {
    /// Phase of matter. Exclusive by convention only; the engine checks
    /// liquid first, then solid, then gas.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Phase: u8 {
        const SOLID = 1 << 0;
        const LIQUID = 1 << 1;
        const GAS = 1 << 2;
    }
}

/// Definition of a particle type's properties
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleDef {
    pub id: u16,
    pub name: String,

    /// Base color (RGBA)
    pub color: [u8; 4],

    pub phase: Phase,

    /// Not consulted by movement; kept for ordering rules
    pub density: f32,

    /// Solids only fall when this is set
    pub gravity_affected: bool,

    // Burning
    pub flammable: bool,
    /// What this becomes when burned
    pub burns_into: Option<u16>,
    /// Chance per evaluation (0.0 - 1.0)
    pub burn_chance: f32,
    pub heat_source: bool,

    // Shop & economy
    /// Must be bought before it can be painted
    pub shop_item: bool,
    pub price: f32,
}

impl ParticleDef {
    pub fn is_solid(&self) -> bool {
        self.phase.contains(Phase::SOLID)
    }

    pub fn is_liquid(&self) -> bool {
        self.phase.contains(Phase::LIQUID)
    }

    pub fn is_gas(&self) -> bool {
        self.phase.contains(Phase::GAS)
    }

    /// Solid and pulled down one cell per tick
    pub fn falls(&self) -> bool {
        self.is_solid() && self.gravity_affected
    }
}

impl Default for ParticleDef {
    fn default() -> Self {
        Self {
            id: 0,
            name: "unknown".to_string(),
            color: [255, 0, 255, 255], // Magenta for misconfigured particles
            phase: Phase::SOLID,
            density: 5.0,
            gravity_affected: true,
            flammable: false,
            burns_into: None,
            burn_chance: 0.1,
            heat_source: false,
            shop_item: false,
            price: 100.0,
        }
    }
}

/// Registry of all particle types, indexed by ID
#[derive(Clone, Debug)]
pub struct ParticleCatalog {
    /// Slot per ID; `None` for unregistered IDs (and always for ID 0)
    particles: Vec<Option<ParticleDef>>,
    /// IDs in registration order
    order: Vec<u16>,
}

impl ParticleCatalog {
    /// Catalog with the built-in particle set
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        for def in default_particles() {
            catalog.insert(def);
        }
        catalog
    }

    pub fn empty() -> Self {
        Self {
            particles: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Build a catalog from externally supplied definitions.
    ///
    /// Rejects ID 0, duplicate IDs, duplicate names (case-insensitive) and
    /// burn targets that do not name a registered particle.
    pub fn from_defs(defs: Vec<ParticleDef>) -> Result<Self, CatalogError> {
        let mut catalog = Self::empty();

        for def in defs {
            if def.id == ParticleId::EMPTY {
                return Err(CatalogError::ReservedId { name: def.name });
            }
            if let Some(existing) = catalog.get(def.id) {
                return Err(CatalogError::DuplicateId {
                    id: def.id,
                    first: existing.name.clone(),
                    second: def.name,
                });
            }
            if catalog.find_by_name(&def.name).is_some() {
                return Err(CatalogError::DuplicateName(def.name));
            }
            catalog.insert(def);
        }

        for def in catalog.iter() {
            if let Some(target) = def.burns_into
                && target != ParticleId::EMPTY
                && !catalog.contains(target)
            {
                return Err(CatalogError::UnknownParticleId {
                    context: format!("burn target of '{}'", def.name),
                    id: target,
                });
            }
        }

        Ok(catalog)
    }

    fn insert(&mut self, def: ParticleDef) {
        let id = def.id as usize;
        // Ensure vec is large enough
        if self.particles.len() <= id {
            self.particles.resize(id + 1, None);
        }
        self.order.push(def.id);
        self.particles[id] = Some(def);
    }

    /// Get particle definition by ID. ID 0 and unregistered IDs resolve to `None`.
    pub fn get(&self, id: u16) -> Option<&ParticleDef> {
        if id == ParticleId::EMPTY {
            return None;
        }
        self.particles.get(id as usize)?.as_ref()
    }

    pub fn contains(&self, id: u16) -> bool {
        self.get(id).is_some()
    }

    /// Case-insensitive lookup by display name
    pub fn find_by_name(&self, name: &str) -> Option<&ParticleDef> {
        self.iter().find(|def| def.name.eq_ignore_ascii_case(name))
    }

    /// Definitions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &ParticleDef> {
        self.order.iter().filter_map(|&id| self.get(id))
    }

    /// Lower-cased display names in registration order
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|def| def.name.to_lowercase()).collect()
    }

    /// Render color; black for empty and unknown IDs
    pub fn color(&self, id: u16) -> [u8; 4] {
        self.get(id).map_or([0, 0, 0, 255], |def| def.color)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ParticleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in particle set
pub fn default_particles() -> Vec<ParticleDef> {
    vec![
        ParticleDef {
            id: ParticleId::SAND,
            name: "sand".to_string(),
            color: [194, 178, 128, 255],
            density: 1.5,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::WATER,
            name: "water".to_string(),
            color: [64, 164, 223, 255],
            phase: Phase::LIQUID,
            density: 1.0,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::STONE,
            name: "stone".to_string(),
            color: [128, 128, 128, 255],
            density: 2.5,
            gravity_affected: false,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::WOOD,
            name: "wood".to_string(),
            color: [139, 90, 43, 255],
            density: 0.6,
            gravity_affected: false,
            flammable: true,
            burns_into: Some(ParticleId::FIRE),
            burn_chance: 0.05,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::FIRE,
            name: "fire".to_string(),
            color: [255, 100, 0, 255],
            phase: Phase::GAS,
            density: 0.1,
            gravity_affected: false,
            heat_source: true,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::SMOKE,
            name: "smoke".to_string(),
            color: [60, 60, 60, 255],
            phase: Phase::GAS,
            density: 0.05,
            gravity_affected: false,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::STEAM,
            name: "steam".to_string(),
            color: [200, 200, 220, 255],
            phase: Phase::GAS,
            density: 0.06,
            gravity_affected: false,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::LAVA,
            name: "lava".to_string(),
            color: [255, 69, 0, 255],
            phase: Phase::LIQUID,
            density: 3.0,
            heat_source: true,
            shop_item: true,
            price: 50.0,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::OIL,
            name: "oil".to_string(),
            color: [50, 40, 20, 255],
            phase: Phase::LIQUID,
            density: 0.8,
            flammable: true,
            burns_into: Some(ParticleId::FIRE),
            burn_chance: 0.3,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::ACID,
            name: "acid".to_string(),
            color: [0, 255, 0, 255],
            phase: Phase::LIQUID,
            density: 1.1,
            shop_item: true,
            price: 25.0,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::ICE,
            name: "ice".to_string(),
            color: [180, 220, 255, 255],
            density: 0.9,
            gravity_affected: false,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::GLASS,
            name: "glass".to_string(),
            color: [200, 230, 230, 255],
            density: 2.5,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::GUNPOWDER,
            name: "gunpowder".to_string(),
            color: [64, 64, 64, 255],
            density: 1.7,
            flammable: true,
            burns_into: Some(ParticleId::FIRE),
            burn_chance: 0.9,
            shop_item: true,
            price: 10.0,
            ..Default::default()
        },
        ParticleDef {
            id: ParticleId::PLANT,
            name: "plant".to_string(),
            color: [34, 139, 34, 255],
            density: 0.5,
            gravity_affected: false,
            flammable: true,
            burns_into: Some(ParticleId::FIRE),
            burn_chance: 0.15,
            ..Default::default()
        },
    ]
}
