//! Дороги между городами: A* по сетке тайлов с учётом рельефа

use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::cities::City;
use crate::geometry::{Point, resample_polyline};
use crate::grid::{Grid, Heightmap, Mask};
use crate::rasterizer::{Jitter, Rasterizer};

/// Цена шага в воду: дорога через море практически запрещена
pub const WATER_COST: f64 = 1e6;
/// Надбавка к цене шага за высоту
const ELEVATION_COST: f64 = 3.0;

/// Путь дороги в координатах тайлов
pub type RoadPath = Vec<(u32, u32)>;

#[derive(Debug, Clone, Serialize)]
pub struct RoadNetwork {
    /// Найденные пути для соединённых пар городов
    pub paths: Vec<RoadPath>,
    /// Тайлы дорог (только суша)
    pub mask: Mask,
}

/// Цена входа в тайл: `1 + 3h` на суше, [`WATER_COST`] ниже уровня моря
#[must_use]
pub fn cost_grid(heightmap: &Heightmap, sea_level: f32) -> Grid<f64> {
    heightmap.map(|&h| {
        if h < sea_level {
            WATER_COST
        } else {
            1.0 + f64::from(h) * ELEVATION_COST
        }
    })
}

/// Граф сетки тайлов: узел `i` соответствует тайлу с линейным индексом `i`,
/// ребро `a → b` весит цену входа в `b`
struct TileGraph {
    graph: DiGraph<(), f64>,
    width: u32,
}

impl TileGraph {
    fn new(costs: &Grid<f64>) -> Self {
        let mut graph = DiGraph::with_capacity(costs.len(), costs.len() * 4);
        for _ in 0..costs.len() {
            graph.add_node(());
        }
        for idx in 0..costs.len() {
            for n in costs.neighbors4(idx) {
                graph.add_edge(NodeIndex::new(idx), NodeIndex::new(n), costs.data[n]);
            }
        }
        Self {
            graph,
            width: costs.width,
        }
    }

    fn node(&self, x: u32, y: u32) -> NodeIndex {
        NodeIndex::new(y as usize * self.width as usize + x as usize)
    }

    fn coords(&self, node: NodeIndex) -> (u32, u32) {
        let w = self.width as usize;
        ((node.index() % w) as u32, (node.index() / w) as u32)
    }

    /// Кратчайший путь с манхэттенской эвристикой
    /// (допустима: ходы только по четырём направлениям, шаг стоит не меньше 1)
    fn find_path(&self, from: City, to: City) -> Option<RoadPath> {
        let start = self.node(from.x, from.y);
        let goal = self.node(to.x, to.y);
        let (_, nodes) = astar(
            &self.graph,
            start,
            |n| n == goal,
            |e| *e.weight(),
            |n| {
                let (x, y) = self.coords(n);
                f64::from(x.abs_diff(to.x) + y.abs_diff(to.y))
            },
        )?;
        Some(nodes.into_iter().map(|n| self.coords(n)).collect())
    }
}

/// Соединяет дорогами последовательные пары городов (в порядке списка).
///
/// Недостижимая пара пропускается. Путь может искажаться шумом, затем
/// перевыбирается с единичным шагом и отпечатывается в маску кистью шириной
/// `width_tiles`; тайлы ниже уровня моря в маску не попадают.
#[must_use]
pub fn connect(
    cities: &[City],
    heightmap: &Heightmap,
    sea_level: f32,
    width_tiles: u32,
    jitter: Option<Jitter>,
    seed: i32,
) -> RoadNetwork {
    let mut mask = Mask::new(heightmap.width, heightmap.height);
    if cities.len() < 2 {
        return RoadNetwork {
            paths: Vec::new(),
            mask,
        };
    }

    let graph = TileGraph::new(&cost_grid(heightmap, sea_level));
    let rasterizer = Rasterizer::new(heightmap.width, heightmap.height, seed);
    let brush = f64::from(width_tiles.saturating_sub(1)) / 2.0;

    let mut paths = Vec::new();
    for pair in cities.windows(2) {
        let Some(path) = graph.find_path(pair[0], pair[1]) else {
            log::warn!(
                "Roads: no route from ({}, {}) to ({}, {})",
                pair[0].x,
                pair[0].y,
                pair[1].x,
                pair[1].y
            );
            continue;
        };
        if path.len() < 2 {
            continue;
        }

        let mut line: Vec<Point> = path
            .iter()
            .map(|&(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect();
        if let Some(j) = jitter {
            line = rasterizer.jitter_polyline(&line, j.frequency, j.strength);
        }

        for p in resample_polyline(&line, 1.0) {
            stamp_land(&mut mask, heightmap, p, brush, sea_level);
        }
        paths.push(path);
    }

    log::debug!("Roads: {} segments, {} tiles", paths.len(), mask.count());
    RoadNetwork { paths, mask }
}

/// Отмечает тайлы суши в круге вокруг округлённой точки
fn stamp_land(mask: &mut Mask, heightmap: &Heightmap, p: Point, radius: f64, sea_level: f32) {
    let cx = p.x.round() as i64;
    let cy = p.y.round() as i64;
    let r = radius.ceil() as i64;
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            if !mask.in_bounds(x, y) {
                continue;
            }
            let d2 = ((x - cx).pow(2) + (y - cy).pow(2)) as f64;
            if d2 <= radius * radius && *heightmap.get(x as u32, y as u32) >= sea_level {
                mask.set(x as u32, y as u32, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Суша с водной стеной посередине и проходом у нижнего края
    fn walled(width: u32, height: u32) -> Heightmap {
        let mut hm = Heightmap::filled(width, height, 0.4);
        let wall_x = width / 2;
        for y in 0..height - 2 {
            hm.set(wall_x, y, 0.1);
        }
        hm
    }

    #[test]
    fn route_goes_around_water() {
        let hm = walled(12, 10);
        let cities = [City { x: 1, y: 1 }, City { x: 10, y: 1 }];
        let roads = connect(&cities, &hm, 0.26, 1, None, 0);
        assert_eq!(roads.paths.len(), 1);

        let path = &roads.paths[0];
        assert_eq!(path.first(), Some(&(1, 1)));
        assert_eq!(path.last(), Some(&(10, 1)));
        assert!(path.iter().all(|&(x, y)| *hm.get(x, y) >= 0.26));
        for w in path.windows(2) {
            assert_eq!(w[0].0.abs_diff(w[1].0) + w[0].1.abs_diff(w[1].1), 1);
        }
    }

    #[test]
    fn road_mask_never_touches_water() {
        let mut hm = walled(16, 12);
        // Вода без обхода: дорога вынуждена пересечь её
        for y in 0..12 {
            hm.set(8, y, 0.1);
        }
        let cities = [City { x: 2, y: 5 }, City { x: 13, y: 5 }];
        let roads = connect(&cities, &hm, 0.26, 3, None, 0);
        assert_eq!(roads.paths.len(), 1);
        for (idx, &road) in roads.mask.data.iter().enumerate() {
            if road {
                assert!(hm.data[idx] >= 0.26);
            }
        }
        assert!(!*roads.mask.get(8, 5));
    }

    #[test]
    fn jittered_roads_stay_on_land() {
        let hm = walled(20, 14);
        let cities = [City { x: 2, y: 2 }, City { x: 17, y: 3 }, City { x: 5, y: 10 }];
        let jitter = Some(Jitter {
            frequency: 4.0,
            strength: 1.5,
        });
        let roads = connect(&cities, &hm, 0.26, 1, jitter, 7);
        assert_eq!(roads.paths.len(), 2);
        assert!(roads.mask.count() > 0);
        for (idx, &road) in roads.mask.data.iter().enumerate() {
            assert!(!road || hm.data[idx] >= 0.26);
        }
    }

    #[test]
    fn single_city_builds_nothing() {
        let hm = Heightmap::filled(5, 5, 0.5);
        let roads = connect(&[City { x: 1, y: 1 }], &hm, 0.26, 1, None, 0);
        assert!(roads.paths.is_empty());
        assert_eq!(roads.mask.count(), 0);
    }
}
