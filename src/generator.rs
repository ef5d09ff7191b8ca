//! Полный конвейер: от сида до готового мира

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::biome::{Biome, assign_biomes};
use crate::borders;
use crate::cities::{self, City};
use crate::climate::generate_climate;
use crate::config::GenerationParams;
use crate::error::Result;
use crate::geometry::Point;
use crate::grid::{Grid, Heightmap, Mask};
use crate::heightmap::{Island, cell_elevation, clear_border, generate_islands, smooth};
use crate::points;
use crate::rasterizer::{Jitter, Rasterizer, from_owners, owner_grid};
use crate::rivers::{FlowField, RiverNetwork, compute_flow, trace_rivers};
use crate::roads::{self, RoadNetwork};
use crate::timing::Timed;
use crate::voronoi::{self, VoronoiDiagram};

/// Плотность выборки при растеризации рек (точек на тайл)
const RIVER_SAMPLING_DENSITY: f64 = 2.0;

/// Результат генерации.
///
/// Поля ячеек хранятся параллельными векторами по индексу ячейки диаграммы,
/// поля тайлов хранятся сетками `width × height`.
#[derive(Debug, Clone, Serialize)]
pub struct Terrain {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub sea_level: f32,

    pub diagram: VoronoiDiagram,
    pub islands: Vec<Island>,
    pub elevation: Vec<f32>,
    pub temperature: Vec<f32>,
    pub rainfall: Vec<f32>,
    pub moisture: Vec<f32>,
    pub land: Vec<bool>,
    pub biomes: Vec<Biome>,
    /// Номер области одного биома для каждой ячейки
    pub region_ids: Vec<usize>,
    /// Извилистые границы между биомами
    pub borders: Vec<Vec<Point>>,

    pub heightmap: Heightmap,
    pub biome_map: Grid<Biome>,
    pub flow: FlowField,
    pub rivers: RiverNetwork,
    pub river_mask: Mask,
    pub roads: RoadNetwork,
    pub cities: Vec<City>,
}

/// Краткая сводка по миру (для CLI)
#[derive(Debug, Clone, Serialize)]
pub struct TerrainSummary {
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub cells: usize,
    pub land_cells: usize,
    pub regions: usize,
    pub biomes: BTreeMap<&'static str, usize>,
    pub rivers: usize,
    pub river_tiles: usize,
    pub cities: Vec<City>,
    pub roads: usize,
    pub road_tiles: usize,
}

impl Terrain {
    #[must_use]
    pub fn summary(&self) -> TerrainSummary {
        let mut biomes = BTreeMap::new();
        for b in &self.biomes {
            *biomes.entry(b.name()).or_insert(0) += 1;
        }
        TerrainSummary {
            seed: self.seed,
            width: self.width,
            height: self.height,
            cells: self.diagram.len(),
            land_cells: self.land.iter().filter(|&&l| l).count(),
            regions: self.region_ids.iter().max().map_or(0, |&r| r + 1),
            biomes,
            rivers: self.rivers.paths.len(),
            river_tiles: self.river_mask.count(),
            cities: self.cities.clone(),
            roads: self.roads.paths.len(),
            road_tiles: self.roads.mask.count(),
        }
    }

    /// Есть ли город в тайле
    #[must_use]
    pub fn city_at(&self, x: u32, y: u32) -> bool {
        self.cities.iter().any(|c| c.x == x && c.y == y)
    }
}

/// Генерирует мир по параметрам.
///
/// Один `ChaCha8Rng`, засеянный `params.seed`, проходит через все случайные
/// этапы по порядку; сиды шума берутся из него же. Одинаковые параметры дают
/// побитово одинаковый результат.
pub fn generate(params: &GenerationParams) -> Result<Terrain> {
    params.validate()?;
    let _total = Timed::info("Generation");
    log::info!(
        "Generating {}x{} world, seed {}",
        params.width,
        params.height,
        params.seed
    );

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let (w, h) = (f64::from(params.width), f64::from(params.height));
    let sea_level = params.sea_level;

    // 1. Точки и диаграмма
    let diagram = {
        let _t = Timed::info("Voronoi");
        let sampled = points::sample(w, h, params.sampling, &mut rng);
        let relaxed = voronoi::relax(&sampled, w, h, params.relax_iterations)?;
        voronoi::build(&relaxed, w, h)?
    };
    log::info!("Cells: {}", diagram.len());

    // 2. Рельеф и климат ячеек
    let islands = generate_islands(&params.islands, w, h, &mut rng);
    let elevation_seed: i32 = rng.r#gen();
    let elevation = {
        let _t = Timed::info("Elevation");
        cell_elevation(&diagram, &islands, elevation_seed, params.land_fraction, sea_level)
    };
    let land: Vec<bool> = elevation.iter().map(|&e| e >= sea_level).collect();

    let climate_seeds: (i32, i32) = (rng.r#gen(), rng.r#gen());
    let climate = {
        let _t = Timed::info("Climate");
        generate_climate(
            &diagram,
            &elevation,
            climate_seeds,
            params.prevailing_wind,
            params.moisture_diffusion,
        )
    };
    let biomes = assign_biomes(&land, &climate.temperature, &climate.moisture);

    // 3. Растр
    let (heightmap, biome_map) = {
        let _t = Timed::info("Rasterize");
        let owners = owner_grid(&diagram.cells, params.width, params.height);
        let touches: Vec<bool> = diagram.cells.iter().map(|c| c.touches_border).collect();
        let mut heightmap = smooth(&from_owners(&owners, &elevation), params.smooth_radius);
        clear_border(&mut heightmap, &from_owners(&owners, &touches));
        (heightmap, from_owners(&owners, &biomes))
    };

    // 4. Реки
    let jitter = params.jitter_enabled.then_some(Jitter {
        frequency: params.jitter_frequency,
        strength: params.jitter_strength,
    });
    let river_seed: i32 = rng.r#gen();
    let (flow, rivers, river_mask) = {
        let _t = Timed::info("Rivers");
        let flow = compute_flow(&heightmap);
        let rivers = trace_rivers(&flow, &heightmap, params.river_min_flux, sea_level);
        let mask = river_mask(&rivers, params, jitter, river_seed);
        (flow, rivers, mask)
    };
    log::info!("Rivers: {}", rivers.paths.len());

    // 5. Города и дороги
    let cities = cities::place(
        &rivers.river_id,
        &heightmap,
        params.num_cities,
        params.city_min_distance,
        sea_level,
        &mut rng,
    );
    log::info!("Cities: {} of {}", cities.len(), params.num_cities);

    let road_seed: i32 = rng.r#gen();
    let roads = {
        let _t = Timed::info("Roads");
        roads::connect(
            &cities,
            &heightmap,
            sea_level,
            params.road_width_tiles,
            jitter,
            road_seed,
        )
    };

    // 6. Области и границы биомов
    let border_seed: i32 = rng.r#gen();
    let (region_ids, borders) = {
        let _t = Timed::info("Borders");
        (
            borders::regions(&biomes, &diagram.adjacency),
            borders::borders(
                &diagram,
                &biomes,
                params.border_amplitude,
                params.border_frequency,
                border_seed,
            ),
        )
    };

    Ok(Terrain {
        seed: params.seed,
        width: params.width,
        height: params.height,
        sea_level,
        diagram,
        islands,
        elevation,
        temperature: climate.temperature,
        rainfall: climate.rainfall,
        moisture: climate.moisture,
        land,
        biomes,
        region_ids,
        borders,
        heightmap,
        biome_map,
        flow,
        rivers,
        river_mask,
        roads,
        cities,
    })
}

/// Маска рек: пути (возможно, искажённые) с кистью не уже диагонали полутайла,
/// чтобы искажённая линия не рвалась между соседними тайлами
fn river_mask(
    rivers: &RiverNetwork,
    params: &GenerationParams,
    jitter: Option<Jitter>,
    seed: i32,
) -> Mask {
    let rasterizer = Rasterizer::new(params.width, params.height, seed);
    let lines: Vec<Vec<Point>> = rivers
        .paths
        .iter()
        .map(|path| {
            let line: Vec<Point> = path
                .iter()
                .map(|&(x, y)| Point::new(f64::from(x), f64::from(y)))
                .collect();
            match jitter {
                Some(j) => rasterizer.jitter_polyline(&line, j.frequency, j.strength),
                None => line,
            }
        })
        .collect();
    let brush = (f64::from(params.river_width_tiles) / 2.0).max(std::f64::consts::FRAC_1_SQRT_2);
    rasterizer.rasterize_polylines(&lines, brush, RIVER_SAMPLING_DENSITY)
}
