//! Растеризация: значения ячеек в сетку тайлов и ломаные в маски
//!
//! Тайл `(x, y)` соответствует квадрату `[x, x+1) × [y, y+1)`; при переносе
//! значений ячеек берётся его центр `(x + 0.5, y + 0.5)`. Ломаные (реки, дороги)
//! задаются в координатах тайлов, поэтому кисть измеряется до целой точки `(x, y)`.

use crate::geometry::{Point, Rect, convex_contains};
use crate::grid::{Grid, Mask};
use crate::noise::NoiseField;
use crate::spatial::{GridIndex, SpatialIndex};
use crate::voronoi::VoronoiCell;

/// Ниже этого числа проверок (ячейки × тайлы) индекс не строится
const BRUTE_FORCE_LIMIT: usize = 4096;

/// Переносит значения ячеек на сетку тайлов.
///
/// Центр тайла на общей границе достаётся ячейке с наименьшим индексом.
/// Тайлы, не попавшие ни в одну ячейку из-за погрешности, получают значение
/// ячейки с ближайшей исходной точкой.
pub fn to_grid<T: Copy + Default>(
    cells: &[VoronoiCell],
    values: &[T],
    width: u32,
    height: u32,
) -> Grid<T> {
    if cells.is_empty() {
        return Grid::new(width, height);
    }
    from_owners(&owner_grid(cells, width, height), values)
}

/// Значения ячеек, разнесённые по уже посчитанной сетке владельцев
#[must_use]
pub fn from_owners<T: Copy>(owners: &Grid<usize>, values: &[T]) -> Grid<T> {
    owners.map(|&owner| values[owner])
}

/// Индекс ячейки-владельца для каждого тайла
#[must_use]
pub fn owner_grid(cells: &[VoronoiCell], width: u32, height: u32) -> Grid<usize> {
    let mut owners = Grid::new(width, height);
    let tiles = width as usize * height as usize;
    let bounds = Rect::from_size(f64::from(width), f64::from(height));

    let index = (cells.len() * tiles > BRUTE_FORCE_LIMIT).then(|| {
        let spacing = (bounds.width() * bounds.height() / cells.len() as f64).sqrt();
        let rects: Vec<Rect> = cells.iter().map(|c| c.bounds).collect();
        GridIndex::from_rects(bounds, spacing, &rects)
    });

    for y in 0..height {
        for x in 0..width {
            let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            let candidates: Vec<usize> = match &index {
                Some(index) => index.query(&Rect::new(center, center)),
                None => (0..cells.len()).collect(),
            };
            let owner = candidates
                .into_iter()
                .find(|&i| convex_contains(&cells[i].vertices, center))
                .unwrap_or_else(|| nearest_site(cells, center));
            owners.set(x, y, owner);
        }
    }
    owners
}

fn nearest_site(cells: &[VoronoiCell], p: Point) -> usize {
    cells
        .iter()
        .enumerate()
        .min_by(|a, b| {
            a.1.site
                .distance_sq(p)
                .total_cmp(&b.1.site.distance_sq(p))
                .then(a.0.cmp(&b.0))
        })
        .map_or(0, |(i, _)| i)
}

/// Параметры искажения линий шумом
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    /// Шум берётся в точке `(x / frequency, y / frequency)`
    pub frequency: f64,
    /// Максимальное боковое смещение
    pub strength: f64,
}

/// Растеризатор линий с детерминированным искажением
pub struct Rasterizer {
    pub width: u32,
    pub height: u32,
    noise: NoiseField,
}

impl Rasterizer {
    #[must_use]
    pub fn new(width: u32, height: u32, seed: i32) -> Self {
        Self {
            width,
            height,
            noise: NoiseField::simple(seed, 1.0),
        }
    }

    /// Маска тайлов, лежащих не дальше `brush_radius` от ломаной.
    ///
    /// Каждый отрезок проходится за `ceil(длина × sampling_density)` шагов,
    /// концы включаются.
    #[must_use]
    pub fn rasterize_polyline(&self, path: &[Point], brush_radius: f64, sampling_density: f64) -> Mask {
        let mut mask = Mask::new(self.width, self.height);
        self.stamp_polyline(&mut mask, path, brush_radius, sampling_density);
        mask
    }

    /// Несколько ломаных, объединённых логическим ИЛИ
    #[must_use]
    pub fn rasterize_polylines(
        &self,
        paths: &[Vec<Point>],
        brush_radius: f64,
        sampling_density: f64,
    ) -> Mask {
        let mut mask = Mask::new(self.width, self.height);
        for path in paths {
            self.stamp_polyline(&mut mask, path, brush_radius, sampling_density);
        }
        mask
    }

    fn stamp_polyline(&self, mask: &mut Mask, path: &[Point], brush_radius: f64, density: f64) {
        if let [single] = path {
            stamp(mask, *single, brush_radius);
            return;
        }
        for w in path.windows(2) {
            let steps = (w[0].distance(w[1]) * density).ceil().max(1.0) as usize;
            for i in 0..=steps {
                stamp(mask, w[0].lerp(w[1], i as f64 / steps as f64), brush_radius);
            }
        }
    }

    /// Смещает внутренние вершины вдоль локальной нормали на
    /// `noise(x / freq, y / freq) * strength`; концы остаются на месте.
    #[must_use]
    pub fn jitter_polyline(&self, path: &[Point], freq: f64, strength: f64) -> Vec<Point> {
        let mut out = path.to_vec();
        for i in 1..path.len().saturating_sub(1) {
            let Some(normal) = (path[i + 1] - path[i - 1]).unit_normal() else {
                continue;
            };
            let p = path[i];
            let offset = f64::from(self.noise.signed(p.x / freq, p.y / freq)) * strength;
            out[i] = p + normal * offset;
        }
        out
    }
}

/// Отмечает тайлы в круге радиуса `radius` вокруг точки
pub fn stamp(mask: &mut Mask, p: Point, radius: f64) {
    let x0 = (p.x - radius).floor() as i64;
    let x1 = (p.x + radius).ceil() as i64;
    let y0 = (p.y - radius).floor() as i64;
    let y1 = (p.y + radius).ceil() as i64;
    let r2 = radius * radius + 1e-9;
    for y in y0..=y1 {
        for x in x0..=x1 {
            if !mask.in_bounds(x, y) {
                continue;
            }
            let dx = x as f64 - p.x;
            let dy = y as f64 - p.y;
            if dx * dx + dy * dy <= r2 {
                mask.set(x as u32, y as u32, true);
            }
        }
    }
}
