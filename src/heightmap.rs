//! Рельеф: острова, высоты ячеек и растровая карта высот

use rand::Rng;
use serde::Serialize;

use crate::config::IslandSettings;
use crate::geometry::Point;
use crate::grid::{Heightmap, Mask, smooth_heightmap};
use crate::noise::NoiseField;
use crate::voronoi::VoronoiDiagram;

const ELEVATION_FREQUENCY: f32 = 0.04;
const ELEVATION_OCTAVES: i32 = 4;
/// Вклад шума относительно маски островов
const NOISE_WEIGHT: f32 = 0.3;

/// Островное «ядро»: высота спадает линейно от центра к краю радиуса
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Island {
    pub center: Point,
    pub radius: f64,
}

/// Случайные острова внутри карты
pub fn generate_islands<R: Rng>(
    settings: &IslandSettings,
    width: f64,
    height: f64,
    rng: &mut R,
) -> Vec<Island> {
    let scale = width.min(height);
    let min_r = f64::from(settings.min_radius) * scale;
    let max_r = f64::from(settings.max_radius) * scale;
    (0..settings.num_islands)
        .map(|_| {
            let center = Point::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
            let radius = if max_r > min_r {
                rng.gen_range(min_r..max_r)
            } else {
                min_r
            };
            Island { center, radius }
        })
        .collect()
}

/// Маска островов в точке: 1 в центре ближайшего острова, 0 за пределами всех
#[must_use]
pub fn island_mask(islands: &[Island], p: Point) -> f32 {
    islands
        .iter()
        .map(|isl| 1.0 - (p.distance(isl.center) / isl.radius).min(1.0))
        .fold(0.0, f64::max) as f32
}

/// Высоты ячеек в [0, 1].
///
/// Маска островов плюс фрактальный шум в центре масс ячейки; ячейки на краю
/// карты всегда 0. При `land_fraction = Some(f)` высоты перераспределяются по
/// рангу так, чтобы доля `f` ячеек оказалась не ниже `sea_level`.
#[must_use]
pub fn cell_elevation(
    diagram: &VoronoiDiagram,
    islands: &[Island],
    noise_seed: i32,
    land_fraction: Option<f32>,
    sea_level: f32,
) -> Vec<f32> {
    let noise = NoiseField::fractal(noise_seed, ELEVATION_FREQUENCY, ELEVATION_OCTAVES);

    let mut elevation: Vec<f32> = diagram
        .cells
        .iter()
        .map(|cell| {
            if cell.touches_border {
                return 0.0;
            }
            let c = cell.centroid;
            (island_mask(islands, c) + noise.signed(c.x, c.y) * NOISE_WEIGHT).max(0.0)
        })
        .collect();

    // Нормализация: минимум уже 0 (граница или отсечение), делим на максимум
    let max_h = elevation.iter().copied().fold(0.0_f32, f32::max);
    if max_h > 0.0 {
        for h in &mut elevation {
            *h /= max_h;
        }
    }

    if let Some(fraction) = land_fraction {
        let fixed: Vec<bool> = diagram.cells.iter().map(|c| c.touches_border).collect();
        rank_normalize(&mut elevation, &fixed, fraction, sea_level);
    }
    elevation
}

/// Перераспределение высот по рангу.
///
/// Ячейки с `fixed[i]` остаются на 0 и считаются водой. Среди остальных нужное
/// число самых низких получает значения в (0, `sea_level`), прочие получают значения в
/// (`sea_level`, 1], сохраняя порядок. Равные значения упорядочиваются по индексу.
pub fn rank_normalize(elevation: &mut [f32], fixed: &[bool], land_fraction: f32, sea_level: f32) {
    let mut order: Vec<usize> = (0..elevation.len()).filter(|&i| !fixed[i]).collect();
    order.sort_by(|&a, &b| elevation[a].total_cmp(&elevation[b]).then(a.cmp(&b)));

    let total = elevation.len();
    let movable = order.len();
    let border = total - movable;
    let target_water = ((1.0 - land_fraction) * total as f32).round() as usize;
    let water = target_water.saturating_sub(border).min(movable);
    let land = movable - water;

    for (rank, &i) in order.iter().enumerate() {
        elevation[i] = if rank < water {
            sea_level * (rank + 1) as f32 / (water + 1) as f32
        } else {
            let r = (rank - water + 1) as f32 / land as f32;
            sea_level + (1.0 - sea_level) * r
        };
    }
    for (h, &f) in elevation.iter_mut().zip(fixed) {
        if f {
            *h = 0.0;
        }
    }
}

/// Сглаживание растровой карты высот
#[must_use]
pub fn smooth(heightmap: &Heightmap, radius: usize) -> Heightmap {
    let mut out = heightmap.clone();
    smooth_heightmap(
        &mut out.data,
        heightmap.width as usize,
        heightmap.height as usize,
        radius,
    );
    out
}

/// Возвращает краю карты нулевую высоту после [`smooth`]: обнуляются внешнее
/// кольцо тайлов и все тайлы, отмеченные в `border` (тайлы приграничных ячеек)
pub fn clear_border(heightmap: &mut Heightmap, border: &Mask) {
    let (w, h) = (heightmap.width, heightmap.height);
    for (idx, value) in heightmap.data.iter_mut().enumerate() {
        let x = (idx % w as usize) as u32;
        let y = (idx / w as usize) as u32;
        if border.data[idx] || x == 0 || y == 0 || x + 1 == w || y + 1 == h {
            *value = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::poisson_disk;
    use crate::voronoi;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn mask_peaks_at_center() {
        let islands = [Island {
            center: Point::new(10.0, 10.0),
            radius: 5.0,
        }];
        assert!((island_mask(&islands, Point::new(10.0, 10.0)) - 1.0).abs() < 1e-6);
        assert!((island_mask(&islands, Point::new(12.5, 10.0)) - 0.5).abs() < 1e-6);
        assert_eq!(island_mask(&islands, Point::new(30.0, 10.0)), 0.0);
    }

    #[test]
    fn rank_normalization_hits_land_fraction() {
        let mut elevation: Vec<f32> = (0..100).map(|i| (i as f32 * 0.37).sin().abs()).collect();
        let fixed: Vec<bool> = (0..100).map(|i| i < 10).collect();
        rank_normalize(&mut elevation, &fixed, 0.5, 0.26);

        let land = elevation.iter().filter(|&&h| h >= 0.26).count();
        assert_eq!(land, 50);
        assert!(elevation[..10].iter().all(|&h| h == 0.0));
        assert!(elevation.iter().all(|&h| (0.0..=1.0).contains(&h)));
    }

    #[test]
    fn border_cells_are_sea() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let points = poisson_disk(50.0, 50.0, 3.0, &mut rng);
        let diagram = voronoi::build(&points, 50.0, 50.0).expect("voronoi");
        let islands = generate_islands(&IslandSettings::default(), 50.0, 50.0, &mut rng);
        let elevation = cell_elevation(&diagram, &islands, 17, None, 0.26);

        assert_eq!(elevation.len(), diagram.len());
        for (cell, &h) in diagram.cells.iter().zip(&elevation) {
            assert!((0.0..=1.0).contains(&h));
            if cell.touches_border {
                assert_eq!(h, 0.0);
            }
        }
        assert!(elevation.iter().any(|&h| h > 0.26));
    }

    #[test]
    fn smoothed_edge_returns_to_sea_level_zero() {
        let mut hm = Heightmap::filled(8, 6, 0.9);
        for x in 0..8 {
            hm.set(x, 0, 0.0);
        }
        let mut border = Mask::new(8, 6);
        border.set(3, 1, true);

        let mut smoothed = smooth(&hm, 1);
        assert!(*smoothed.get(3, 0) > 0.26);
        clear_border(&mut smoothed, &border);

        for (idx, &v) in smoothed.data.iter().enumerate() {
            let (x, y) = smoothed.coords(idx);
            let edge = x == 0 || y == 0 || x == 7 || y == 5;
            if edge || (x, y) == (3, 1) {
                assert_eq!(v, 0.0, "tile ({x}, {y})");
            } else {
                assert!(v > 0.26);
            }
        }
    }

    #[test]
    fn islands_fit_the_map() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let islands = generate_islands(&IslandSettings::default(), 80.0, 40.0, &mut rng);
        assert_eq!(islands.len(), 4);
        for isl in islands {
            assert!(isl.center.x < 80.0 && isl.center.y < 40.0);
            assert!(isl.radius >= 0.15 * 40.0 && isl.radius <= 0.35 * 40.0);
        }
    }
}
