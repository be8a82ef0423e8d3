//! CPU pixel buffer renderer
//!
//! Turns the grid into an RGBA image without any GPU dependency.

use crate::world::{Sandbox, SimRng};

/// Background for empty cells and IDs missing from the catalog
const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Renderer that outputs one RGBA pixel per grid cell
pub struct PixelRenderer {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// RGBA pixel buffer (4 bytes per pixel), top row first
    pub buffer: Vec<u8>,
}

impl PixelRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0u8; width * height * 4],
        }
    }

    /// Renderer sized to a sandbox's grid
    pub fn for_sandbox(sandbox: &Sandbox) -> Self {
        Self::new(sandbox.width(), sandbox.height())
    }

    /// Render the whole grid. Liquids get a fresh brightness jitter on
    /// every call; nothing is written back to the grid.
    pub fn render<R: SimRng>(&mut self, sandbox: &Sandbox, rng: &mut R) {
        if self.width != sandbox.width() || self.height != sandbox.height() {
            *self = Self::for_sandbox(sandbox);
        }

        let catalog = sandbox.catalog();
        let shimmer = sandbox.config().liquid_shimmer;

        for (x, y, id) in sandbox.grid().iter() {
            let color = match catalog.get(id) {
                Some(particle) if particle.is_liquid() && shimmer > 0.0 => {
                    apply_shimmer(particle.color, 1.0 + rng.gen_signed(shimmer))
                }
                Some(particle) => particle.color,
                None => BLACK,
            };

            // Flip Y for screen coordinates (grid Y increases upward)
            let flipped_y = self.height - 1 - y as usize;
            let idx = (flipped_y * self.width + x as usize) * 4;
            self.buffer[idx..idx + 4].copy_from_slice(&color);
        }
    }

    /// Pixel at screen coordinates (top-left origin)
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.buffer[idx..idx + 4]);
        Some(color)
    }
}

/// Scale RGB by `factor`, keeping alpha
fn apply_shimmer(color: [u8; 4], factor: f32) -> [u8; 4] {
    let scale = |channel: u8| (channel as f32 * factor).round().clamp(0.0, 255.0) as u8;
    [scale(color[0]), scale(color[1]), scale(color[2]), color[3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::simulation::{ParticleId, Ruleset};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn sandbox(shimmer: f32) -> Sandbox {
        let config = SimConfig {
            liquid_shimmer: shimmer,
            ..SimConfig::default().with_size(8, 4)
        };
        Sandbox::new(config, Ruleset::builtin()).unwrap()
    }

    #[test]
    fn test_empty_and_unknown_render_black() {
        let mut sandbox = sandbox(0.05);
        sandbox.set_cell(1, 1, 999);

        let mut renderer = PixelRenderer::for_sandbox(&sandbox);
        renderer.render(&sandbox, &mut Xoshiro256StarStar::seed_from_u64(1));

        assert_eq!(renderer.pixel(0, 0), Some(BLACK));
        assert_eq!(renderer.pixel(1, 2), Some(BLACK));
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let mut sandbox = sandbox(0.0);
        sandbox.set_cell(2, 0, ParticleId::STONE);

        let mut renderer = PixelRenderer::for_sandbox(&sandbox);
        renderer.render(&sandbox, &mut Xoshiro256StarStar::seed_from_u64(1));

        let stone = sandbox.catalog().color(ParticleId::STONE);
        // Bottom grid row is the last image row
        assert_eq!(renderer.pixel(2, 3), Some(stone));
        assert_eq!(renderer.pixel(2, 0), Some(BLACK));
    }

    #[test]
    fn test_liquid_shimmer_stays_in_range_and_keeps_alpha() {
        let mut sandbox = sandbox(0.05);
        for x in 0..8 {
            sandbox.set_cell(x, 0, ParticleId::WATER);
        }

        let mut renderer = PixelRenderer::for_sandbox(&sandbox);
        renderer.render(&sandbox, &mut Xoshiro256StarStar::seed_from_u64(9));

        let base = sandbox.catalog().color(ParticleId::WATER);
        for x in 0..8 {
            let pixel = renderer.pixel(x, 3).unwrap();
            for channel in 0..3 {
                let low = (base[channel] as f32 * 0.95).floor() as u8;
                let high = (base[channel] as f32 * 1.05).ceil().min(255.0) as u8;
                assert!((low..=high).contains(&pixel[channel]));
            }
            assert_eq!(pixel[3], base[3]);
        }
    }

    #[test]
    fn test_solids_render_exact_color() {
        let mut sandbox = sandbox(0.5);
        sandbox.set_cell(0, 0, ParticleId::SAND);

        let mut renderer = PixelRenderer::for_sandbox(&sandbox);
        renderer.render(&sandbox, &mut Xoshiro256StarStar::seed_from_u64(3));

        assert_eq!(
            renderer.pixel(0, 3),
            Some(sandbox.catalog().color(ParticleId::SAND))
        );
    }

    #[test]
    fn test_apply_shimmer_clamps() {
        assert_eq!(apply_shimmer([250, 10, 0, 128], 1.1), [255, 11, 0, 128]);
    }
}
