pub mod biome;
pub mod borders;
pub mod cities;
pub mod climate;
pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod heightmap;
pub mod noise;
pub mod png;
pub mod points;
pub mod rasterizer;
pub mod render;
pub mod rivers;
pub mod roads;
pub mod spatial;
pub mod timing;
pub mod voronoi;

/// Уровень моря по умолчанию: всё ниже считается океаном
pub const SEA_LEVEL: f32 = 0.26;

pub use biome::Biome;
pub use config::{GenerationParams, IslandSettings, SamplingMode, WindDirection};
pub use error::{GenError, Result};
pub use generator::{Terrain, TerrainSummary, generate};
pub use render::{RenderOptions, render};
