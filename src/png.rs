//! Экспорт карты в PNG

use std::path::Path;

use image::{ImageBuffer, Luma, Rgba};

use crate::error::{GenError, Result};
use crate::generator::Terrain;
use crate::grid::Heightmap;
use crate::render::tile_glyph;

impl Terrain {
    /// RGBA-пиксели карты биомов с реками, дорогами и городами (цвета как в текстовом рендере)
    #[must_use]
    pub fn to_rgba_image(&self) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.heightmap.len() * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let (_, [r, g, b]) = tile_glyph(self, x, y);
                pixels.extend_from_slice(&[r, g, b, 255]);
            }
        }
        pixels
    }

    pub fn save_as_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.to_rgba_image())
                .ok_or_else(|| GenError::Config("image buffer size mismatch".to_string()))?;
        img.save(path)?;
        Ok(())
    }
}

impl Heightmap {
    /// Высоты в оттенках серого (0 = чёрный, 1 = белый)
    #[must_use]
    pub fn to_grayscale_image(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&h| (h.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }

    pub fn save_as_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.to_grayscale_image())
                .ok_or_else(|| GenError::Config("image buffer size mismatch".to_string()))?;
        img.save(path)?;
        Ok(())
    }
}
