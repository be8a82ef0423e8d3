//! Pairwise interaction rules
//!
//! Two neighboring particles react when a rule names both of them, in either
//! order. Examples: water + lava → steam + stone, acid + wood → empty + empty

use serde::{Deserialize, Serialize};
use ahash::AHashMap;

use crate::error::CatalogError;
use crate::particles::{ParticleCatalog, ParticleId};

/// What a participating cell turns into when a rule fires
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The cell becomes the given particle type
    Becomes(u16),
    /// The cell is cleared
    Empty,
}

impl Outcome {
    /// Grid value written for this outcome
    pub fn particle_id(self) -> u16 {
        match self {
            Outcome::Becomes(id) => id,
            Outcome::Empty => ParticleId::EMPTY,
        }
    }
}

/// Definition of a reaction between two particle types
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Human-readable name
    pub name: String,

    pub particle_a: u16,
    pub particle_b: u16,

    /// What `particle_a` becomes
    pub outcome_a: Outcome,
    /// What `particle_b` becomes
    pub outcome_b: Outcome,

    /// Probability per evaluation (0.0 - 1.0)
    pub chance: f32,
}

impl Interaction {
    /// True if this rule applies to the unordered pair {a, b}
    pub fn involves(&self, a: u16, b: u16) -> bool {
        (self.particle_a == a && self.particle_b == b)
            || (self.particle_a == b && self.particle_b == a)
    }

    /// Grid values for (current, neighbor), accounting for which side is which
    pub fn outcomes_for(&self, current: u16) -> (u16, u16) {
        if current == self.particle_a {
            (self.outcome_a.particle_id(), self.outcome_b.particle_id())
        } else {
            // Current cell holds particle_b, swap outcomes too
            (self.outcome_b.particle_id(), self.outcome_a.particle_id())
        }
    }
}

/// Ordered interaction rules with pair lookup
///
/// Key: (particle_a, particle_b) normalized so the lower ID comes first.
/// Value: indices into `rules`, in registration order.
#[derive(Clone, Debug)]
pub struct InteractionTable {
    rules: Vec<Interaction>,
    by_pair: AHashMap<(u16, u16), Vec<usize>>,
}

impl InteractionTable {
    /// Table with the built-in rule set
    pub fn new() -> Self {
        let mut table = Self::empty();
        for rule in default_interactions() {
            table.register(rule);
        }
        table
    }

    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            by_pair: AHashMap::new(),
        }
    }

    /// Build a table from externally supplied rules, checking every reference
    /// against the catalog.
    pub fn from_rules(
        rules: Vec<Interaction>,
        catalog: &ParticleCatalog,
    ) -> Result<Self, CatalogError> {
        let mut table = Self::empty();

        for rule in rules {
            if !(0.0..=1.0).contains(&rule.chance) {
                return Err(CatalogError::InvalidChance {
                    name: rule.name,
                    chance: rule.chance,
                });
            }

            let participants = [
                ("particle_a", rule.particle_a),
                ("particle_b", rule.particle_b),
            ];
            for (field, id) in participants {
                if !catalog.contains(id) {
                    return Err(CatalogError::UnknownParticleId {
                        context: format!("{} of interaction '{}'", field, rule.name),
                        id,
                    });
                }
            }

            for (field, outcome) in [("outcome_a", rule.outcome_a), ("outcome_b", rule.outcome_b)] {
                if let Outcome::Becomes(id) = outcome
                    && !catalog.contains(id)
                {
                    return Err(CatalogError::UnknownParticleId {
                        context: format!("{} of interaction '{}'", field, rule.name),
                        id,
                    });
                }
            }

            table.register(rule);
        }

        Ok(table)
    }

    /// Register a new rule after all existing ones
    pub fn register(&mut self, rule: Interaction) {
        let key = Self::pair_key(rule.particle_a, rule.particle_b);
        self.by_pair.entry(key).or_default().push(self.rules.len());
        self.rules.push(rule);
    }

    fn pair_key(a: u16, b: u16) -> (u16, u16) {
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Rules for the unordered pair {a, b}, in registration order
    pub fn matching(&self, a: u16, b: u16) -> impl Iterator<Item = &Interaction> {
        self.by_pair
            .get(&Self::pair_key(a, b))
            .into_iter()
            .flatten()
            .map(|&index| &self.rules[index])
    }

    /// True if any rule mentions this particle
    pub fn is_reactive(&self, id: u16) -> bool {
        self.by_pair.keys().any(|&(a, b)| a == id || b == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for InteractionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in rule set
pub fn default_interactions() -> Vec<Interaction> {
    use Outcome::{Becomes, Empty};

    vec![
        // Water + Lava → Steam + Stone
        Interaction {
            name: "water_lava_steam".to_string(),
            particle_a: ParticleId::WATER,
            particle_b: ParticleId::LAVA,
            outcome_a: Becomes(ParticleId::STEAM),
            outcome_b: Becomes(ParticleId::STONE),
            chance: 0.3,
        },
        // Water puts out fire
        Interaction {
            name: "water_fire_quench".to_string(),
            particle_a: ParticleId::WATER,
            particle_b: ParticleId::FIRE,
            outcome_a: Becomes(ParticleId::STEAM),
            outcome_b: Empty,
            chance: 1.0,
        },
        // Ice + Lava → Water + Stone
        Interaction {
            name: "ice_lava_cool".to_string(),
            particle_a: ParticleId::ICE,
            particle_b: ParticleId::LAVA,
            outcome_a: Becomes(ParticleId::WATER),
            outcome_b: Becomes(ParticleId::STONE),
            chance: 0.4,
        },
        // Steam condenses on ice
        Interaction {
            name: "steam_ice_condense".to_string(),
            particle_a: ParticleId::STEAM,
            particle_b: ParticleId::ICE,
            outcome_a: Becomes(ParticleId::WATER),
            outcome_b: Becomes(ParticleId::ICE),
            chance: 0.1,
        },
        // Lava vitrifies sand
        Interaction {
            name: "lava_sand_glass".to_string(),
            particle_a: ParticleId::LAVA,
            particle_b: ParticleId::SAND,
            outcome_a: Becomes(ParticleId::LAVA),
            outcome_b: Becomes(ParticleId::GLASS),
            chance: 0.05,
        },
        // Acid eats stone, survives
        Interaction {
            name: "acid_stone_corrode".to_string(),
            particle_a: ParticleId::ACID,
            particle_b: ParticleId::STONE,
            outcome_a: Becomes(ParticleId::ACID),
            outcome_b: Empty,
            chance: 0.05,
        },
        // Acid + Wood → nothing left
        Interaction {
            name: "acid_wood_corrode".to_string(),
            particle_a: ParticleId::ACID,
            particle_b: ParticleId::WOOD,
            outcome_a: Empty,
            outcome_b: Empty,
            chance: 0.1,
        },
        // Fire spreads into flammables
        Interaction {
            name: "fire_wood_burn".to_string(),
            particle_a: ParticleId::FIRE,
            particle_b: ParticleId::WOOD,
            outcome_a: Becomes(ParticleId::SMOKE),
            outcome_b: Becomes(ParticleId::FIRE),
            chance: 0.2,
        },
        Interaction {
            name: "fire_oil_burn".to_string(),
            particle_a: ParticleId::FIRE,
            particle_b: ParticleId::OIL,
            outcome_a: Becomes(ParticleId::FIRE),
            outcome_b: Becomes(ParticleId::FIRE),
            chance: 0.5,
        },
        Interaction {
            name: "fire_gunpowder_ignite".to_string(),
            particle_a: ParticleId::FIRE,
            particle_b: ParticleId::GUNPOWDER,
            outcome_a: Becomes(ParticleId::FIRE),
            outcome_b: Becomes(ParticleId::FIRE),
            chance: 0.9,
        },
        Interaction {
            name: "fire_plant_burn".to_string(),
            particle_a: ParticleId::FIRE,
            particle_b: ParticleId::PLANT,
            outcome_a: Becomes(ParticleId::SMOKE),
            outcome_b: Becomes(ParticleId::FIRE),
            chance: 0.15,
        },
        // Lava ignites plants it touches
        Interaction {
            name: "lava_plant_ignite".to_string(),
            particle_a: ParticleId::LAVA,
            particle_b: ParticleId::PLANT,
            outcome_a: Becomes(ParticleId::LAVA),
            outcome_b: Becomes(ParticleId::FIRE),
            chance: 0.3,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_forward() {
        let table = InteractionTable::new();

        let rule = table
            .matching(ParticleId::WATER, ParticleId::LAVA)
            .next()
            .unwrap();
        assert_eq!(rule.name, "water_lava_steam");
    }

    #[test]
    fn test_matching_backward() {
        let table = InteractionTable::new();

        // Order doesn't matter
        let rule = table
            .matching(ParticleId::LAVA, ParticleId::WATER)
            .next()
            .unwrap();
        assert_eq!(rule.name, "water_lava_steam");
    }

    #[test]
    fn test_no_match() {
        let table = InteractionTable::new();
        assert!(table.matching(ParticleId::SAND, ParticleId::WATER).next().is_none());
    }

    #[test]
    fn test_outcomes_for_either_side() {
        let table = InteractionTable::new();
        let rule = table
            .matching(ParticleId::WATER, ParticleId::LAVA)
            .next()
            .unwrap();

        let (current, neighbor) = rule.outcomes_for(ParticleId::WATER);
        assert_eq!(current, ParticleId::STEAM);
        assert_eq!(neighbor, ParticleId::STONE);

        let (current, neighbor) = rule.outcomes_for(ParticleId::LAVA);
        assert_eq!(current, ParticleId::STONE);
        assert_eq!(neighbor, ParticleId::STEAM);
    }

    #[test]
    fn test_empty_outcome_clears_cell() {
        assert_eq!(Outcome::Empty.particle_id(), ParticleId::EMPTY);
        assert_eq!(Outcome::Becomes(5).particle_id(), 5);
    }

    #[test]
    fn test_matching_keeps_registration_order() {
        let mut table = InteractionTable::empty();
        for name in ["first", "second", "third"] {
            table.register(Interaction {
                name: name.to_string(),
                particle_a: 2,
                particle_b: 1,
                outcome_a: Outcome::Empty,
                outcome_b: Outcome::Empty,
                chance: 0.5,
            });
        }

        let names: Vec<_> = table.matching(1, 2).map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_defaults_reference_known_particles() {
        let catalog = ParticleCatalog::new();
        let table = InteractionTable::from_rules(default_interactions(), &catalog).unwrap();
        assert_eq!(table.len(), InteractionTable::new().len());
    }

    #[test]
    fn test_rejects_dangling_participant() {
        let catalog = ParticleCatalog::new();
        let result = InteractionTable::from_rules(
            vec![Interaction {
                name: "ghost".to_string(),
                particle_a: ParticleId::WATER,
                particle_b: 500,
                outcome_a: Outcome::Empty,
                outcome_b: Outcome::Empty,
                chance: 1.0,
            }],
            &catalog,
        );
        assert!(matches!(
            result,
            Err(CatalogError::UnknownParticleId { id: 500, .. })
        ));
    }

    #[test]
    fn test_rejects_dangling_outcome() {
        let catalog = ParticleCatalog::new();
        let result = InteractionTable::from_rules(
            vec![Interaction {
                name: "ghost".to_string(),
                particle_a: ParticleId::WATER,
                particle_b: ParticleId::SAND,
                outcome_a: Outcome::Becomes(321),
                outcome_b: Outcome::Empty,
                chance: 1.0,
            }],
            &catalog,
        );
        assert!(matches!(
            result,
            Err(CatalogError::UnknownParticleId { id: 321, .. })
        ));
    }

    #[test]
    fn test_rejects_chance_out_of_range() {
        let catalog = ParticleCatalog::new();
        let result = InteractionTable::from_rules(
            vec![Interaction {
                name: "overeager".to_string(),
                particle_a: ParticleId::WATER,
                particle_b: ParticleId::SAND,
                outcome_a: Outcome::Empty,
                outcome_b: Outcome::Empty,
                chance: 1.5,
            }],
            &catalog,
        );
        assert!(matches!(result, Err(CatalogError::InvalidChance { .. })));
    }
}
