//! Текстовый рендер мира: символ и цвет на тайл

use std::fmt::Write;

use crossterm::style::{Color, Stylize};

use crate::biome::Biome;
use crate::generator::Terrain;

const CITY: (char, [u8; 3]) = ('@', [230, 180, 0]);
const WIDE_RIVER: (char, [u8; 3]) = ('≡', [0, 100, 255]);
const RIVER: (char, [u8; 3]) = ('=', [80, 180, 255]);
const ROAD: (char, [u8; 3]) = ('#', [160, 110, 60]);

/// Реки шире этого рисуются двойной линией
const WIDE_RIVER_WIDTH: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Раскрашивать символы escape-последовательностями терминала
    pub color: bool,
    /// Добавить легенду под картой
    pub legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: true,
            legend: false,
        }
    }
}

/// Символ биома
#[must_use]
pub fn biome_glyph(biome: Biome) -> char {
    match biome {
        Biome::Ocean => '~',
        Biome::Desert => '.',
        Biome::Grassland => ',',
        Biome::Forest | Biome::DarkForest => '^',
        Biome::Jungle => '&',
        Biome::Snow => '*',
        Biome::Tundra => '\'',
        Biome::Scorched => 'x',
    }
}

/// Символ и цвет тайла: город поверх реки, река поверх дороги, дорога поверх биома
#[must_use]
pub fn tile_glyph(terrain: &Terrain, x: u32, y: u32) -> (char, [u8; 3]) {
    if terrain.city_at(x, y) {
        return CITY;
    }
    if *terrain.river_mask.get(x, y) || *terrain.rivers.river_id.get(x, y) > 0 {
        return if *terrain.rivers.river_width.get(x, y) > WIDE_RIVER_WIDTH {
            WIDE_RIVER
        } else {
            RIVER
        };
    }
    if *terrain.roads.mask.get(x, y) {
        return ROAD;
    }
    let biome = *terrain.biome_map.get(x, y);
    (biome_glyph(biome), biome.to_rgb())
}

/// Карта в виде строк по `width` символов, по строке на ряд тайлов
#[must_use]
pub fn render(terrain: &Terrain, options: &RenderOptions) -> String {
    let mut out = String::with_capacity((terrain.width as usize + 1) * terrain.height as usize);
    for y in 0..terrain.height {
        for x in 0..terrain.width {
            let (glyph, rgb) = tile_glyph(terrain, x, y);
            push_glyph(&mut out, glyph, rgb, options.color);
        }
        out.push('\n');
    }

    if options.legend {
        out.push('\n');
        for biome in Biome::ALL {
            push_glyph(&mut out, biome_glyph(biome), biome.to_rgb(), options.color);
            let _ = writeln!(out, " {}", biome.name());
        }
        for ((glyph, rgb), label) in [
            (CITY, "city"),
            (RIVER, "river"),
            (WIDE_RIVER, "wide river"),
            (ROAD, "road"),
        ] {
            push_glyph(&mut out, glyph, rgb, options.color);
            let _ = writeln!(out, " {label}");
        }
    }
    out
}

fn push_glyph(out: &mut String, glyph: char, [r, g, b]: [u8; 3], color: bool) {
    if color {
        let _ = write!(out, "{}", glyph.with(Color::Rgb { r, g, b }));
    } else {
        out.push(glyph);
    }
}
