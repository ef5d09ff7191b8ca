//! Ограниченная диаграмма Вороного и релаксация Ллойда
//!
//! Каждая ячейка строится независимо: прямоугольник карты последовательно
//! отсекается серединными перпендикулярами к ближайшим точкам. Соседи берутся из
//! сетки корзин по мере роста радиуса поиска, пока радиус не превысит удвоенное
//! расстояние до самой дальней вершины ячейки: дальше ни одна точка не может
//! изменить ячейку.
//!
//! Если хотя бы одна ячейка получилась вырожденной, вся диаграмма строится
//! заново прямым методом (отсечение каждой ячейки всеми остальными точками).

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::Serialize;

use crate::error::{GenError, Result};
use crate::geometry::{
    EPSILON, Point, Rect, TaggedVertex, centroid, clip_by_bisector, rect_polygon, signed_area,
};
use crate::spatial::{GridIndex, SpatialIndex};
use crate::timing::Timed;

/// Рёбра короче этого не считаются общей границей соседей
const MIN_SHARED_EDGE: f64 = 1e-7;

/// Ячейки меньшей площади считаются вырожденными
const MIN_CELL_AREA: f64 = 1e-12;

/// Выпуклая ячейка диаграммы
#[derive(Debug, Clone, Serialize)]
pub struct VoronoiCell {
    /// Исходная точка ячейки
    pub site: Point,
    /// Вершины многоугольника в положительной ориентации
    pub vertices: Vec<Point>,
    /// Владелец ребра `vertices[k] → vertices[k + 1]`: соседняя ячейка или граница карты (`None`)
    pub edge_neighbors: Vec<Option<usize>>,
    pub centroid: Point,
    pub area: f64,
    pub bounds: Rect,
    /// Ячейка касается края карты
    pub touches_border: bool,
}

impl VoronoiCell {
    fn from_polygon(site: Point, polygon: &[TaggedVertex]) -> Self {
        let vertices: Vec<Point> = polygon.iter().map(|v| v.pos).collect();
        let edge_neighbors: Vec<Option<usize>> = polygon.iter().map(|v| v.edge).collect();
        Self {
            site,
            centroid: centroid(&vertices),
            area: signed_area(&vertices),
            bounds: Rect::bounding(&vertices),
            touches_border: edge_neighbors.iter().any(Option::is_none),
            vertices,
            edge_neighbors,
        }
    }

    /// Рёбра, общие с ячейкой `other`
    pub fn edges_with(&self, other: usize) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).filter_map(move |k| {
            let a = self.vertices[k];
            let b = self.vertices[(k + 1) % n];
            (self.edge_neighbors[k] == Some(other) && a.distance(b) > MIN_SHARED_EDGE)
                .then_some((a, b))
        })
    }
}

/// Разбиение карты на ячейки и граф смежности
#[derive(Debug, Clone, Serialize)]
pub struct VoronoiDiagram {
    pub width: f64,
    pub height: f64,
    pub cells: Vec<VoronoiCell>,
    /// Симметричный граф смежности (двойственный к диаграмме граф Делоне)
    pub adjacency: Vec<BTreeSet<usize>>,
}

impl VoronoiDiagram {
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Общая граница ячеек `i` и `j` (пустая, если они не соседи)
    #[must_use]
    pub fn shared_boundary(&self, i: usize, j: usize) -> Vec<(Point, Point)> {
        let edges: Vec<(Point, Point)> = self.cells[i].edges_with(j).collect();
        if !edges.is_empty() {
            return edges;
        }
        // Численно ребро могло сохраниться только у соседа
        self.cells[j].edges_with(i).map(|(a, b)| (b, a)).collect()
    }
}

/// Строит ограниченную диаграмму Вороного.
///
/// Число ячеек всегда равно числу точек; ошибка возвращается, только если и
/// прямой метод дал вырожденную ячейку (например, для совпадающих точек).
pub fn build(points: &[Point], width: f64, height: f64) -> Result<VoronoiDiagram> {
    build_with(points, width, height, build_knn)
}

/// Сборка диаграммы с заданным основным методом. Если он указал на вырожденную
/// ячейку, все ячейки перестраиваются прямым отсечением
fn build_with(
    points: &[Point],
    width: f64,
    height: f64,
    primary: impl FnOnce(&[Point], &Rect) -> std::result::Result<Vec<Vec<TaggedVertex>>, usize>,
) -> Result<VoronoiDiagram> {
    let _t = Timed::debug("Voronoi");
    let bounds = Rect::from_size(width, height);

    let polygons = match primary(points, &bounds) {
        Ok(polygons) => polygons,
        Err(index) => {
            warn!("Voronoi cell #{index} is degenerate, rebuilding with direct clipping");
            build_direct(points, &bounds)?
        }
    };

    let cells: Vec<VoronoiCell> = points
        .iter()
        .zip(&polygons)
        .map(|(&site, polygon)| VoronoiCell::from_polygon(site, polygon))
        .collect();

    let adjacency = build_adjacency(&cells);
    debug!("Voronoi: {} cells", cells.len());

    Ok(VoronoiDiagram {
        width,
        height,
        cells,
        adjacency,
    })
}

/// Построение через ближайших соседей. `Err(index)` указывает на первую вырожденную ячейку.
fn build_knn(
    points: &[Point],
    bounds: &Rect,
) -> std::result::Result<Vec<Vec<TaggedVertex>>, usize> {
    if points.is_empty() {
        return Ok(Vec::new());
    }

    let spacing = (bounds.width() * bounds.height() / points.len() as f64).sqrt();
    let index = GridIndex::from_points(*bounds, spacing, points);
    let diagonal = bounds.width().hypot(bounds.height());

    let mut polygons = Vec::with_capacity(points.len());
    for (i, &site) in points.iter().enumerate() {
        let mut polygon = rect_polygon(bounds);
        let mut done_radius = 0.0;
        let mut radius = 2.0 * spacing;

        loop {
            let mut candidates: Vec<(f64, usize)> = index
                .query(&Rect::around(site, radius))
                .into_iter()
                .filter(|&j| j != i)
                .map(|j| (site.distance(points[j]), j))
                .filter(|&(d, _)| d <= radius && (d > done_radius || done_radius == 0.0))
                .collect();
            candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            for (d, j) in candidates {
                if d < EPSILON {
                    return Err(i);
                }
                polygon = clip_by_bisector(&polygon, site, points[j], j);
                if polygon.len() < 3 {
                    return Err(i);
                }
            }

            let reach = polygon
                .iter()
                .map(|v| site.distance(v.pos))
                .fold(0.0, f64::max);
            if 2.0 * reach <= radius || radius > diagonal {
                break;
            }
            done_radius = radius;
            radius = (2.0 * reach).max(radius * 2.0);
        }

        if is_degenerate(&polygon) {
            return Err(i);
        }
        polygons.push(polygon);
    }
    Ok(polygons)
}

/// Прямое построение: каждая ячейка отсекается всеми остальными точками
pub(crate) fn build_direct(points: &[Point], bounds: &Rect) -> Result<Vec<Vec<TaggedVertex>>> {
    let degenerate = |index: usize| GenError::GeometricDegeneracy {
        index,
        x: points[index].x,
        y: points[index].y,
    };

    let mut polygons = Vec::with_capacity(points.len());
    for (i, &site) in points.iter().enumerate() {
        let mut polygon = rect_polygon(bounds);
        for (j, &other) in points.iter().enumerate() {
            if j == i {
                continue;
            }
            if site.distance(other) < EPSILON {
                return Err(degenerate(i));
            }
            polygon = clip_by_bisector(&polygon, site, other, j);
            if polygon.len() < 3 {
                return Err(degenerate(i));
            }
        }
        if is_degenerate(&polygon) {
            return Err(degenerate(i));
        }
        polygons.push(polygon);
    }
    Ok(polygons)
}

fn is_degenerate(polygon: &[TaggedVertex]) -> bool {
    if polygon.len() < 3 {
        return true;
    }
    let vertices: Vec<Point> = polygon.iter().map(|v| v.pos).collect();
    signed_area(&vertices) < MIN_CELL_AREA
}

/// Смежность по помеченным рёбрам с симметризацией
fn build_adjacency(cells: &[VoronoiCell]) -> Vec<BTreeSet<usize>> {
    let mut adjacency = vec![BTreeSet::new(); cells.len()];
    for (i, cell) in cells.iter().enumerate() {
        let n = cell.vertices.len();
        for k in 0..n {
            let Some(j) = cell.edge_neighbors[k] else {
                continue;
            };
            if cell.vertices[k].distance(cell.vertices[(k + 1) % n]) > MIN_SHARED_EDGE {
                adjacency[i].insert(j);
                adjacency[j].insert(i);
            }
        }
    }
    adjacency
}

/// Релаксация Ллойда: каждая точка переносится в центр масс своей ячейки.
///
/// Вырожденные ячейки оставляют точку на месте. `iterations == 0` возвращает копию.
pub fn relax(points: &[Point], width: f64, height: f64, iterations: usize) -> Result<Vec<Point>> {
    let mut current = points.to_vec();
    for _ in 0..iterations {
        let diagram = build(&current, width, height)?;
        current = diagram
            .cells
            .iter()
            .zip(&current)
            .map(|(cell, &p)| {
                if cell.area > MIN_CELL_AREA {
                    Point::new(
                        cell.centroid.x.clamp(0.0, width - EPSILON),
                        cell.centroid.y.clamp(0.0, height - EPSILON),
                    )
                } else {
                    p
                }
            })
            .collect();
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::convex_contains;
    use crate::points::poisson_disk;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_points(seed: u64) -> Vec<Point> {
        poisson_disk(40.0, 30.0, 3.0, &mut ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn cells_tile_the_map() {
        let points = sample_points(1);
        let diagram = build(&points, 40.0, 30.0).expect("voronoi");
        assert_eq!(diagram.len(), points.len());

        let total: f64 = diagram.cells.iter().map(|c| c.area).sum();
        assert!((total - 1200.0).abs() < 1e-6, "area sum {total}");

        for cell in &diagram.cells {
            assert!(convex_contains(&cell.vertices, cell.site));
            assert!(cell.vertices.iter().all(|v| {
                v.x >= -EPSILON && v.x <= 40.0 + EPSILON && v.y >= -EPSILON && v.y <= 30.0 + EPSILON
            }));
        }
    }

    #[test]
    fn adjacency_is_symmetric() {
        let diagram = build(&sample_points(2), 40.0, 30.0).expect("voronoi");
        for (i, neighbors) in diagram.adjacency.iter().enumerate() {
            assert!(!neighbors.is_empty());
            for &j in neighbors {
                assert_ne!(i, j);
                assert!(diagram.adjacency[j].contains(&i), "{i} -> {j} not mirrored");
            }
        }
    }

    #[test]
    fn knn_matches_direct_construction() {
        let points = sample_points(3);
        let bounds = Rect::from_size(40.0, 30.0);
        let fast = build_knn(&points, &bounds).expect("knn build");
        let direct = build_direct(&points, &bounds).expect("direct build");
        for (a, b) in fast.iter().zip(&direct) {
            let area = |p: &Vec<TaggedVertex>| {
                signed_area(&p.iter().map(|v| v.pos).collect::<Vec<_>>())
            };
            assert!((area(a) - area(b)).abs() < 1e-9);
        }
    }

    #[test]
    fn two_cells_share_one_edge() {
        let points = [Point::new(0.5, 0.5), Point::new(1.5, 0.5)];
        let diagram = build(&points, 2.0, 1.0).expect("voronoi");
        assert_eq!(diagram.adjacency[0], BTreeSet::from([1]));
        assert_eq!(diagram.adjacency[1], BTreeSet::from([0]));

        let shared = diagram.shared_boundary(0, 1);
        assert_eq!(shared.len(), 1);
        let (a, b) = shared[0];
        assert!((a.x - 1.0).abs() < 1e-12 && (b.x - 1.0).abs() < 1e-12);
        assert!((a.y - b.y).abs() > 0.999);
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let points = [Point::new(1.0, 1.0), Point::new(1.0, 1.0), Point::new(3.0, 3.0)];
        let err = build(&points, 4.0, 4.0).unwrap_err();
        assert!(matches!(err, GenError::GeometricDegeneracy { .. }));
    }

    #[test]
    fn failed_knn_falls_back_to_direct_clipping() {
        let points = sample_points(6);
        let diagram = build_with(&points, 40.0, 30.0, |_, _| Err(0)).expect("fallback");
        assert_eq!(diagram.len(), points.len());

        let area: f64 = diagram.cells.iter().map(|c| c.area).sum();
        assert!((area - 40.0 * 30.0).abs() < 1e-6);
        let regular = build(&points, 40.0, 30.0).expect("voronoi");
        assert_eq!(diagram.adjacency, regular.adjacency);
    }

    #[test]
    fn relaxation_keeps_points_inside() {
        let points = sample_points(4);
        assert_eq!(relax(&points, 40.0, 30.0, 0).expect("relax"), points);

        let relaxed = relax(&points, 40.0, 30.0, 2).expect("relax");
        assert_eq!(relaxed.len(), points.len());
        assert!(relaxed.iter().all(|p| p.x >= 0.0 && p.x < 40.0 && p.y >= 0.0 && p.y < 30.0));
        assert_ne!(relaxed, points);
    }
}
