//! PNG snapshots of the grid

use std::path::Path;

use anyhow::{Context, Result};
use sandfall_core::PixelRenderer;

/// Write a rendered frame to `path` as PNG
pub fn save_png(renderer: &PixelRenderer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    save_buffer_as_png(&renderer.buffer, renderer.width, renderer.height, path)
        .with_context(|| format!("Failed to save snapshot: {}", path.display()))?;
    log::info!(
        "Saved {}x{} snapshot to {}",
        renderer.width,
        renderer.height,
        path.display()
    );
    Ok(())
}

fn save_buffer_as_png(buffer: &[u8], width: usize, height: usize, path: &Path) -> Result<()> {
    use image::{ImageBuffer, Rgba};
    let img: ImageBuffer<Rgba<u8>, _> =
        ImageBuffer::from_raw(width as u32, height as u32, buffer.to_vec())
            .ok_or_else(|| anyhow::anyhow!("Failed to create image buffer"))?;
    img.save(path)?;
    Ok(())
}
