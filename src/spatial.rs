//! Пространственный индекс на равномерной сетке корзин
//!
//! Используется для поиска соседей при построении диаграммы Вороного
//! и для поиска ячеек-кандидатов при растеризации.

use crate::geometry::{Point, Rect};

/// Запрос кандидатов в прямоугольной области.
///
/// Возвращает индексы объектов, чьи ограничивающие прямоугольники могут
/// пересекать область, отсортированные по возрастанию и без повторов.
pub trait SpatialIndex {
    fn query(&self, region: &Rect) -> Vec<usize>;
}

/// Сетка корзин, покрывающая прямоугольник `bounds`
#[derive(Debug, Clone)]
pub struct GridIndex {
    bounds: Rect,
    cell_size: f64,
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<usize>>,
}

impl GridIndex {
    /// Пустой индекс. `cell_size` ограничивается снизу, чтобы сетка оставалась конечной.
    #[must_use]
    pub fn new(bounds: Rect, cell_size: f64) -> Self {
        let cell_size = cell_size.max(1e-3);
        let cols = ((bounds.width() / cell_size).ceil() as usize).max(1);
        let rows = ((bounds.height() / cell_size).ceil() as usize).max(1);
        Self {
            bounds,
            cell_size,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
        }
    }

    /// Индекс точек: каждая точка попадает в одну корзину
    #[must_use]
    pub fn from_points(bounds: Rect, cell_size: f64, points: &[Point]) -> Self {
        let mut index = Self::new(bounds, cell_size);
        for (i, &p) in points.iter().enumerate() {
            index.insert(i, &Rect::new(p, p));
        }
        index
    }

    /// Индекс прямоугольников: объект регистрируется во всех пересекаемых корзинах
    #[must_use]
    pub fn from_rects(bounds: Rect, cell_size: f64, rects: &[Rect]) -> Self {
        let mut index = Self::new(bounds, cell_size);
        for (i, rect) in rects.iter().enumerate() {
            index.insert(i, rect);
        }
        index
    }

    pub fn insert(&mut self, item: usize, rect: &Rect) {
        let (c0, r0, c1, r1) = self.span(rect);
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.buckets[row * self.cols + col].push(item);
            }
        }
    }

    /// Диапазон корзин (включительно), покрывающих прямоугольник
    fn span(&self, rect: &Rect) -> (usize, usize, usize, usize) {
        let col = |x: f64| {
            (((x - self.bounds.min.x) / self.cell_size).floor().max(0.0) as usize).min(self.cols - 1)
        };
        let row = |y: f64| {
            (((y - self.bounds.min.y) / self.cell_size).floor().max(0.0) as usize).min(self.rows - 1)
        };
        (col(rect.min.x), row(rect.min.y), col(rect.max.x), row(rect.max.y))
    }
}

impl SpatialIndex for GridIndex {
    fn query(&self, region: &Rect) -> Vec<usize> {
        if !region.intersects(&self.bounds) {
            return Vec::new();
        }
        let (c0, r0, c1, r1) = self.span(region);
        let mut out = Vec::new();
        for row in r0..=r1 {
            for col in c0..=c1 {
                out.extend_from_slice(&self.buckets[row * self.cols + col]);
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_finds_nearby_points_only() {
        let points = vec![
            Point::new(1.0, 1.0),
            Point::new(9.0, 9.0),
            Point::new(1.5, 2.0),
        ];
        let index = GridIndex::from_points(Rect::from_size(10.0, 10.0), 2.0, &points);
        let found = index.query(&Rect::around(Point::new(1.0, 1.0), 1.0));
        assert_eq!(found, vec![0, 2]);
    }

    #[test]
    fn rect_registered_in_every_bucket() {
        let rects = vec![Rect::new(Point::new(0.5, 0.5), Point::new(7.5, 1.0))];
        let index = GridIndex::from_rects(Rect::from_size(8.0, 8.0), 2.0, &rects);
        let query = Rect::new(Point::new(6.5, 0.7), Point::new(6.6, 0.8));
        assert_eq!(index.query(&query), vec![0]);
    }

    #[test]
    fn query_outside_bounds_is_empty() {
        let index = GridIndex::from_points(Rect::from_size(4.0, 4.0), 1.0, &[Point::new(1.0, 1.0)]);
        assert!(index.query(&Rect::around(Point::new(20.0, 20.0), 1.0)).is_empty());
    }
}
