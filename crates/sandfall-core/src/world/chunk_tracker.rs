//! Chunk activity tracking - which regions need simulating next tick

use glam::IVec2;

/// Chunk side length in cells
pub const CHUNK_SIZE: usize = 16;

/// Tracks which chunks changed and must be simulated.
///
/// Writes during a tick only ever land in the next-tick set; the set being
/// iterated is swapped in at tick start and never grows mid-tick.
#[derive(Clone, Debug)]
pub struct ChunkTracker {
    grid_width: usize,
    grid_height: usize,
    chunks_x: i32,
    chunks_y: i32,
    /// Chunks simulated this tick, row-major from the bottom
    active: Vec<IVec2>,
    /// Chunks scheduled for the next tick, in wake order
    scheduled: Vec<IVec2>,
    /// Membership bitmap for `scheduled`
    scheduled_mask: Vec<bool>,
}

impl ChunkTracker {
    pub fn new(grid_width: usize, grid_height: usize) -> Self {
        let chunks_x = grid_width.div_ceil(CHUNK_SIZE) as i32;
        let chunks_y = grid_height.div_ceil(CHUNK_SIZE) as i32;
        Self {
            grid_width,
            grid_height,
            chunks_x,
            chunks_y,
            active: Vec::new(),
            scheduled: Vec::new(),
            scheduled_mask: vec![false; (chunks_x * chunks_y) as usize],
        }
    }

    /// Number of chunks along each axis (partial chunks included)
    pub fn chunk_dims(&self) -> IVec2 {
        IVec2::new(self.chunks_x, self.chunks_y)
    }

    fn chunk_index(&self, chunk: IVec2) -> Option<usize> {
        if chunk.x >= 0 && chunk.y >= 0 && chunk.x < self.chunks_x && chunk.y < self.chunks_y {
            Some((chunk.y * self.chunks_x + chunk.x) as usize)
        } else {
            None
        }
    }

    /// Chunk owning a cell, `None` outside the grid
    pub fn chunk_of(&self, x: i32, y: i32) -> Option<IVec2> {
        if x < 0 || y < 0 || x as usize >= self.grid_width || y as usize >= self.grid_height {
            return None;
        }
        Some(IVec2::new(
            x / CHUNK_SIZE as i32,
            y / CHUNK_SIZE as i32,
        ))
    }

    /// Cell range covered by a chunk: (min inclusive, max exclusive),
    /// clipped to the grid for the last partial row/column
    pub fn chunk_bounds(&self, chunk: IVec2) -> (IVec2, IVec2) {
        let min = chunk * CHUNK_SIZE as i32;
        let max = (min + IVec2::splat(CHUNK_SIZE as i32))
            .min(IVec2::new(self.grid_width as i32, self.grid_height as i32));
        (min, max)
    }

    fn schedule(&mut self, chunk: IVec2) {
        if let Some(idx) = self.chunk_index(chunk)
            && !self.scheduled_mask[idx]
        {
            self.scheduled_mask[idx] = true;
            self.scheduled.push(chunk);
        }
    }

    /// Schedule the chunk owning (x, y) and its 8 neighbors for next tick.
    /// Out-of-bounds cells are ignored.
    pub fn wake_cell(&mut self, x: i32, y: i32) {
        let Some(center) = self.chunk_of(x, y) else {
            return;
        };

        for dy in -1..=1 {
            for dx in -1..=1 {
                self.schedule(center + IVec2::new(dx, dy));
            }
        }
    }

    /// Schedule every chunk
    pub fn wake_all(&mut self) {
        for cy in 0..self.chunks_y {
            for cx in 0..self.chunks_x {
                self.schedule(IVec2::new(cx, cy));
            }
        }
    }

    /// Swap the next-tick set in as this tick's active set.
    ///
    /// Active chunks come out in row-major order (bottom row first), which
    /// keeps seeded runs reproducible regardless of wake order.
    pub fn begin_tick(&mut self) {
        self.active.clear();
        if self.scheduled.is_empty() {
            return;
        }

        std::mem::swap(&mut self.active, &mut self.scheduled);
        for chunk in &self.active {
            let idx = (chunk.y * self.chunks_x + chunk.x) as usize;
            self.scheduled_mask[idx] = false;
        }
        self.active.sort_unstable_by_key(|chunk| (chunk.y, chunk.x));
    }

    /// Chunks being simulated this tick
    pub fn active_chunks(&self) -> &[IVec2] {
        &self.active
    }

    /// Whether a chunk will be simulated next tick
    pub fn is_scheduled(&self, chunk: IVec2) -> bool {
        self.chunk_index(chunk)
            .is_some_and(|idx| self.scheduled_mask[idx])
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_dims_include_partial_chunks() {
        let tracker = ChunkTracker::new(40, 16);
        assert_eq!(tracker.chunk_dims(), IVec2::new(3, 1));
    }

    #[test]
    fn test_wake_cell_schedules_moore_neighborhood() {
        let mut tracker = ChunkTracker::new(64, 64);
        tracker.wake_cell(20, 20); // chunk (1, 1)

        assert_eq!(tracker.scheduled_count(), 9);
        for cy in 0..3 {
            for cx in 0..3 {
                assert!(tracker.is_scheduled(IVec2::new(cx, cy)));
            }
        }
        assert!(!tracker.is_scheduled(IVec2::new(3, 3)));
    }

    #[test]
    fn test_wake_cell_at_corner_clips_neighbors() {
        let mut tracker = ChunkTracker::new(64, 64);
        tracker.wake_cell(0, 0);
        assert_eq!(tracker.scheduled_count(), 4);
    }

    #[test]
    fn test_wake_cell_is_idempotent() {
        let mut tracker = ChunkTracker::new(64, 64);
        tracker.wake_cell(5, 5);
        tracker.wake_cell(5, 5);
        tracker.wake_cell(6, 7);
        assert_eq!(tracker.scheduled_count(), 4);
    }

    #[test]
    fn test_wake_out_of_bounds_is_ignored() {
        let mut tracker = ChunkTracker::new(32, 32);
        tracker.wake_cell(-1, 5);
        tracker.wake_cell(5, 32);
        assert_eq!(tracker.scheduled_count(), 0);
    }

    #[test]
    fn test_begin_tick_swaps_and_clears() {
        let mut tracker = ChunkTracker::new(64, 64);
        tracker.wake_cell(40, 40);
        tracker.begin_tick();

        assert_eq!(tracker.active_chunks().len(), 9);
        assert_eq!(tracker.scheduled_count(), 0);
        assert!(!tracker.is_scheduled(IVec2::new(2, 2)));

        tracker.begin_tick();
        assert!(tracker.active_chunks().is_empty());
    }

    #[test]
    fn test_active_chunks_are_row_major() {
        let mut tracker = ChunkTracker::new(64, 64);
        tracker.wake_cell(60, 60);
        tracker.wake_cell(0, 0);
        tracker.begin_tick();

        let active = tracker.active_chunks();
        for pair in active.windows(2) {
            assert!((pair[0].y, pair[0].x) < (pair[1].y, pair[1].x));
        }
        assert_eq!(active[0], IVec2::new(0, 0));
    }

    #[test]
    fn test_wake_during_tick_goes_to_next_set() {
        let mut tracker = ChunkTracker::new(64, 64);
        tracker.wake_cell(0, 0);
        tracker.begin_tick();
        tracker.wake_cell(63, 63);

        assert_eq!(tracker.active_chunks().len(), 4);
        assert!(!tracker.active_chunks().contains(&IVec2::new(3, 3)));
        assert!(tracker.is_scheduled(IVec2::new(3, 3)));
    }

    #[test]
    fn test_chunk_bounds_clip_partial_chunk() {
        let tracker = ChunkTracker::new(40, 20);
        assert_eq!(
            tracker.chunk_bounds(IVec2::new(2, 1)),
            (IVec2::new(32, 16), IVec2::new(40, 20))
        );
        assert_eq!(
            tracker.chunk_bounds(IVec2::new(0, 0)),
            (IVec2::new(0, 0), IVec2::new(16, 16))
        );
    }

    #[test]
    fn test_wake_all() {
        let mut tracker = ChunkTracker::new(40, 20);
        tracker.wake_all();
        assert_eq!(tracker.scheduled_count(), 6);
    }
}
