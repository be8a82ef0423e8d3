//! Per-cell movement rules - gravity, buoyancy and liquid flow

use glam::IVec2;

use super::chunk_tracker::ChunkTracker;
use super::grid::Grid;
use crate::simulation::ParticleDef;
use crate::world::{SimRng, SimStats};

/// Stateless movement rules. Callers have already ruled out empty,
/// unknown and processed cells.
pub struct MovementUpdater;

impl MovementUpdater {
    /// Solids/gas pass rule for one cell: falling solids drop one cell,
    /// gases rise one cell, everything else settles
    pub fn update_solid_or_gas(
        grid: &mut Grid,
        tracker: &mut ChunkTracker,
        particle: &ParticleDef,
        x: i32,
        y: i32,
        stats: &mut dyn SimStats,
    ) {
        let moved = if particle.falls() {
            Self::try_move(grid, tracker, x, y, x, y - 1, stats)
        } else if particle.is_gas() {
            Self::try_move(grid, tracker, x, y, x, y + 1, stats)
        } else {
            false
        };

        if !moved {
            grid.mark_processed(x, y);
            stats.record_settled();
        }
    }

    /// Liquid pass rule for one cell.
    ///
    /// Tries straight down, then both down-diagonals, then both sides; the
    /// bias draw decides which side is tried first.
    pub fn update_liquid<R: SimRng>(
        grid: &mut Grid,
        tracker: &mut ChunkTracker,
        x: i32,
        y: i32,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) {
        let dir = if rng.gen_bool() { 1 } else { -1 };
        let targets = [(0, -1), (dir, -1), (-dir, -1), (dir, 0), (-dir, 0)];

        for (dx, dy) in targets {
            if Self::try_move(grid, tracker, x, y, x + dx, y + dy, stats) {
                return;
            }
        }

        grid.mark_processed(x, y);
        stats.record_settled();
    }

    /// Move a particle into an empty cell.
    /// Returns true if the move happened.
    fn try_move(
        grid: &mut Grid,
        tracker: &mut ChunkTracker,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
        stats: &mut dyn SimStats,
    ) -> bool {
        // Out of bounds counts as occupied
        if !grid.is_empty_at(to_x, to_y) {
            return false;
        }

        if !grid.swap(IVec2::new(from_x, from_y), IVec2::new(to_x, to_y)) {
            return false;
        }

        grid.mark_processed(to_x, to_y);
        tracker.wake_cell(from_x, from_y);
        tracker.wake_cell(to_x, to_y);
        stats.record_particle_moved();
        true
    }
}
