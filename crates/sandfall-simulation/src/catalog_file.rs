//! Catalog files
//!
//! Particle and interaction records are authored in RON and refer to each
//! other by name. Names are resolved to IDs once, at load time, and any
//! dangling reference fails the whole load.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CatalogError;
use crate::interactions::{Interaction, InteractionTable, Outcome};
use crate::particles::{ParticleCatalog, ParticleDef, Phase};

/// One particle type as written in a catalog file
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleRecord {
    pub id: u16,
    pub name: String,
    pub color: [u8; 4],
    /// Flag names, e.g. "LIQUID" or "SOLID | GAS"
    #[serde(with = "phase_names")]
    pub phase: Phase,
    pub density: f32,
    pub gravity_affected: bool,
    pub flammable: bool,
    /// Name of the particle this burns into
    pub burns_into: Option<String>,
    pub burn_chance: f32,
    pub heat_source: bool,
    pub shop_item: bool,
    pub price: f32,
}

impl Default for ParticleRecord {
    fn default() -> Self {
        let def = ParticleDef::default();
        Self {
            id: def.id,
            name: def.name,
            color: def.color,
            phase: def.phase,
            density: def.density,
            gravity_affected: def.gravity_affected,
            flammable: def.flammable,
            burns_into: None,
            burn_chance: def.burn_chance,
            heat_source: def.heat_source,
            shop_item: def.shop_item,
            price: def.price,
        }
    }
}

mod phase_names {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    use crate::particles::Phase;

    pub fn serialize<S: Serializer>(phase: &Phase, serializer: S) -> Result<S::Ok, S::Error> {
        let mut text = String::new();
        bitflags::parser::to_writer(phase, &mut text)
            .map_err(<S::Error as ser::Error>::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Phase, D::Error> {
        let text = String::deserialize(deserializer)?;
        bitflags::parser::from_str(&text).map_err(|err| {
            <D::Error as de::Error>::custom(format!("invalid phase '{}': {}", text, err))
        })
    }
}

/// Outcome as written in a catalog file. No default:
/// every rule spells out `Empty` or `Becomes("name")` for both sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeRecord {
    Empty,
    Becomes(String),
}

/// One interaction rule as written in a catalog file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub name: String,
    pub particle_a: String,
    pub particle_b: String,
    pub outcome_a: OutcomeRecord,
    pub outcome_b: OutcomeRecord,
    #[serde(default = "default_chance")]
    pub chance: f32,
}

fn default_chance() -> f32 {
    1.0
}

/// Top-level catalog file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    pub particles: Vec<ParticleRecord>,

    /// Rules in evaluation order
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
}

impl CatalogFile {
    pub fn from_ron_str(content: &str) -> Result<Self, CatalogError> {
        Ok(ron::from_str(content)?)
    }

    /// Load catalog from RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content)
    }

    /// Resolve names to IDs and validate everything
    pub fn resolve(self) -> Result<Ruleset, CatalogError> {
        let lookup = |name: &str, context: &dyn Fn() -> String| {
            self.particles
                .iter()
                .find(|record| record.name.eq_ignore_ascii_case(name))
                .map(|record| record.id)
                .ok_or_else(|| CatalogError::UnknownParticleName {
                    context: context(),
                    name: name.to_string(),
                })
        };

        let mut defs = Vec::with_capacity(self.particles.len());
        for record in &self.particles {
            let burns_into = match &record.burns_into {
                Some(target) => Some(lookup(target, &|| {
                    format!("burn target of '{}'", record.name)
                })?),
                None => None,
            };

            defs.push(ParticleDef {
                id: record.id,
                name: record.name.clone(),
                color: record.color,
                phase: record.phase,
                density: record.density,
                gravity_affected: record.gravity_affected,
                flammable: record.flammable,
                burns_into,
                burn_chance: record.burn_chance,
                heat_source: record.heat_source,
                shop_item: record.shop_item,
                price: record.price,
            });
        }

        let resolve_outcome = |outcome: &OutcomeRecord, context: &dyn Fn() -> String| match outcome
        {
            OutcomeRecord::Empty => Ok(Outcome::Empty),
            OutcomeRecord::Becomes(name) => lookup(name, context).map(Outcome::Becomes),
        };

        let mut rules = Vec::with_capacity(self.interactions.len());
        for record in &self.interactions {
            let context = |field: &str| format!("{} of interaction '{}'", field, record.name);
            rules.push(Interaction {
                name: record.name.clone(),
                particle_a: lookup(&record.particle_a, &|| context("particle_a"))?,
                particle_b: lookup(&record.particle_b, &|| context("particle_b"))?,
                outcome_a: resolve_outcome(&record.outcome_a, &|| context("outcome_a"))?,
                outcome_b: resolve_outcome(&record.outcome_b, &|| context("outcome_b"))?,
                chance: record.chance,
            });
        }

        let particles = ParticleCatalog::from_defs(defs)?;
        let interactions = InteractionTable::from_rules(rules, &particles)?;
        Ok(Ruleset {
            particles,
            interactions,
        })
    }
}

/// Validated particle catalog plus its interaction table
#[derive(Clone, Debug, Default)]
pub struct Ruleset {
    pub particles: ParticleCatalog,
    pub interactions: InteractionTable,
}

impl Ruleset {
    /// Built-in particles and interactions
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Load and validate a RON catalog file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let ruleset = CatalogFile::from_file(path)?.resolve()?;
        log::info!(
            "Loaded {} particle types and {} interactions from {}",
            ruleset.particles.len(),
            ruleset.interactions.len(),
            path.display()
        );
        Ok(ruleset)
    }
}
