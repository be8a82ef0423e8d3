//! Dense cell storage - particle IDs plus per-cell processed markers

use glam::IVec2;

use crate::simulation::ParticleId;

/// Fixed-size 2D grid of particle IDs. y = 0 is the bottom row.
///
/// Out-of-bounds coordinates read as `None` and count as occupied, so
/// nothing can ever move or be written outside the grid.
#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u16>,
    processed: Vec<bool>,
    /// Indices whose processed flag is currently set
    processed_log: Vec<usize>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        let area = width * height;
        Self {
            width,
            height,
            cells: vec![ParticleId::EMPTY; area],
            processed: vec![false; area],
            processed_log: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width as i32, self.height as i32)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Particle ID at a cell, `None` outside the grid
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u16> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// True only for in-bounds cells holding ID 0
    #[inline]
    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Some(ParticleId::EMPTY)
    }

    /// Write a cell. Returns false (and writes nothing) outside the grid.
    pub fn set(&mut self, x: i32, y: i32, id: u16) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = id;
                true
            }
            None => false,
        }
    }

    /// Swap two in-bounds cells
    pub fn swap(&mut self, a: IVec2, b: IVec2) -> bool {
        match (self.index(a.x, a.y), self.index(b.x, b.y)) {
            (Some(ia), Some(ib)) => {
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn is_processed(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|idx| self.processed[idx])
    }

    pub fn mark_processed(&mut self, x: i32, y: i32) {
        if let Some(idx) = self.index(x, y)
            && !self.processed[idx]
        {
            self.processed[idx] = true;
            self.processed_log.push(idx);
        }
    }

    /// Reset every processed flag.
    ///
    /// Only flags that were actually set are touched, so the cost follows
    /// last tick's activity rather than the grid area.
    pub fn clear_processed(&mut self) {
        for idx in self.processed_log.drain(..) {
            self.processed[idx] = false;
        }
    }

    /// Raw cells, row-major from the bottom row
    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    /// Iterate `(x, y, id)` over every cell, bottom row first
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, u16)> + '_ {
        self.cells.iter().enumerate().map(move |(idx, &id)| {
            (
                (idx % self.width) as i32,
                (idx / self.width) as i32,
                id,
            )
        })
    }
}
