//! Interaction resolution - pairwise reactions between neighboring cells

use super::chunk_tracker::ChunkTracker;
use super::grid::Grid;
use crate::simulation::{ParticleId, Ruleset};
use crate::world::{SimRng, SimStats};

/// Moore neighborhood in scan order: N, NE, E, SE, S, SW, W, NW (y up)
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Stateless resolver for neighbor reactions
pub struct InteractionResolver;

impl InteractionResolver {
    /// Try to react the cell at (x, y) with one of its neighbors.
    ///
    /// Neighbors are scanned in `NEIGHBOR_OFFSETS` order and rules in
    /// registration order. The first rule whose chance roll succeeds writes
    /// both outcomes, marks both cells processed and wakes them. A failed
    /// roll moves on to the next rule, then the next neighbor.
    pub fn try_react<R: SimRng>(
        grid: &mut Grid,
        tracker: &mut ChunkTracker,
        rules: &Ruleset,
        x: i32,
        y: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> bool {
        let Some(current) = grid.get(x, y) else {
            return false;
        };
        if current == ParticleId::EMPTY || !rules.particles.contains(current) {
            return false;
        }

        for (dx, dy) in NEIGHBOR_OFFSETS {
            let nx = x + dx;
            let ny = y + dy;

            let Some(neighbor) = grid.get(nx, ny) else {
                continue;
            };
            if neighbor == ParticleId::EMPTY
                || grid.is_processed(nx, ny)
                || !rules.particles.contains(neighbor)
            {
                continue;
            }

            for rule in rules.interactions.matching(current, neighbor) {
                if !rng.check_probability(rule.chance) {
                    continue;
                }

                let (new_current, new_neighbor) = rule.outcomes_for(current);
                grid.set(x, y, new_current);
                grid.set(nx, ny, new_neighbor);
                grid.mark_processed(x, y);
                grid.mark_processed(nx, ny);
                tracker.wake_cell(x, y);
                tracker.wake_cell(nx, ny);
                stats.record_reaction();

                log::trace!(
                    "{} fired at ({}, {}) with ({}, {})",
                    rule.name,
                    x,
                    y,
                    nx,
                    ny
                );
                return true;
            }
        }

        false
    }
}
