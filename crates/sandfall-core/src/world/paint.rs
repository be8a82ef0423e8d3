//! Paint/edit operations - circular stamps and dragged lines

use bresenham::Bresenham;
use serde::{Deserialize, Serialize};

use super::chunk_tracker::ChunkTracker;
use super::grid::Grid;
use crate::simulation::ParticleId;

/// Emitted for every cell where a particle was painted onto empty space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticlePlaced {
    pub x: i32,
    pub y: i32,
    pub particle: u16,
}

/// Stamp a filled circle of `particle` centered on (center_x, center_y).
///
/// Painting never overwrites an occupied cell; erasing (ID 0) always
/// clears. Cells outside the grid are clipped, and any center or radius
/// is accepted.
pub fn draw_circle(
    grid: &mut Grid,
    tracker: &mut ChunkTracker,
    center_x: i32,
    center_y: i32,
    radius: u32,
    particle: u16,
) -> Vec<ParticlePlaced> {
    let (width, height) = (grid.width() as i64, grid.height() as i64);
    let (cx, cy) = (i64::from(center_x), i64::from(center_y));
    let r = effective_radius(grid, radius);
    let r_sq = r * r;

    let xs = (cx - r).max(0)..=(cx + r).min(width - 1);
    let ys = (cy - r).max(0)..=(cy + r).min(height - 1);

    let erasing = particle == ParticleId::EMPTY;
    let mut placed = Vec::new();

    for y in ys {
        let dy = y - cy;
        for x in xs.clone() {
            let dx = x - cx;
            if dx * dx + dy * dy > r_sq {
                continue;
            }

            // Both lie inside the grid here
            let (x, y) = (x as i32, y as i32);
            let Some(current) = grid.get(x, y) else {
                continue;
            };
            if !erasing && current != ParticleId::EMPTY {
                continue;
            }

            if !erasing {
                placed.push(ParticlePlaced { x, y, particle });
            }
            grid.set(x, y, particle);
            tracker.wake_cell(x, y);
        }
    }

    placed
}

/// Stamp circles along the line from (x0, y0) to (x1, y1), both ends included
pub fn draw_line(
    grid: &mut Grid,
    tracker: &mut ChunkTracker,
    from: (i32, i32),
    to: (i32, i32),
    radius: u32,
    particle: u16,
) -> Vec<ParticlePlaced> {
    let r = effective_radius(grid, radius);
    let min = -r;
    let max = (grid.width() as i64 + r - 1, grid.height() as i64 + r - 1);

    // Only the part whose stamps can reach the grid gets walked
    let Some(((x0, y0), (x1, y1))) = clip_segment(from, to, (min, min), max) else {
        return Vec::new();
    };

    // Bresenham yields the start point but stops short of the end point
    let points = Bresenham::new((x0 as isize, y0 as isize), (x1 as isize, y1 as isize))
        .chain(std::iter::once((x1 as isize, y1 as isize)));

    let mut placed = Vec::new();
    for (x, y) in points {
        placed.extend(draw_circle(grid, tracker, x as i32, y as i32, radius, particle));
    }
    placed
}

/// Radius capped at the grid's width plus height, which already covers
/// every cell from any center that can touch the grid.
fn effective_radius(grid: &Grid, radius: u32) -> i64 {
    i64::from(radius).min(grid.width() as i64 + grid.height() as i64)
}

/// Liang-Barsky clip of a segment to the box `min..=max`, rounded to cells.
/// `None` if the segment misses the box.
fn clip_segment(
    from: (i32, i32),
    to: (i32, i32),
    min: (i64, i64),
    max: (i64, i64),
) -> Option<((i64, i64), (i64, i64))> {
    let (x0, y0) = (f64::from(from.0), f64::from(from.1));
    let (dx, dy) = (f64::from(to.0) - x0, f64::from(to.1) - y0);
    let (min_x, min_y) = (min.0 as f64, min.1 as f64);
    let (max_x, max_y) = (max.0 as f64, max.1 as f64);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - min_x),
        (dx, max_x - x0),
        (-dy, y0 - min_y),
        (dy, max_y - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }

    let point = |t: f64| {
        (
            (x0 + t * dx).round().clamp(min_x, max_x) as i64,
            (y0 + t * dy).round().clamp(min_y, max_y) as i64,
        )
    };
    Some((point(t0), point(t1)))
}
