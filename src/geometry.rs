//! Базовая двумерная геометрия: точки, прямоугольники, выпуклые многоугольники
//!
//! Все многоугольники хранятся с положительной ориентацией (площадь по формуле
//! шнуровки > 0). Карта задаётся прямоугольником `[0, width] × [0, height]`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Допуск для сравнения координат
pub const EPSILON: f64 = 1e-9;

/// Точка на карте (в единицах тайлов)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
    }

    #[must_use]
    pub fn distance_sq(self, other: Point) -> f64 {
        let d = self - other;
        d.dot(d)
    }

    /// Левая нормаль единичной длины; `None` для нулевого вектора
    #[must_use]
    pub fn unit_normal(self) -> Option<Point> {
        let len = self.length();
        if len < EPSILON {
            return None;
        }
        Some(Point::new(-self.y / len, self.x / len))
    }

    #[must_use]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        self + (other - self) * t
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Осевой прямоугольник
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    #[must_use]
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Прямоугольник карты `[0, width] × [0, height]`
    #[must_use]
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(width, height))
    }

    /// Квадрат со стороной `2 * radius` вокруг точки
    #[must_use]
    pub fn around(center: Point, radius: f64) -> Self {
        Self::new(
            Point::new(center.x - radius, center.y - radius),
            Point::new(center.x + radius, center.y + radius),
        )
    }

    /// Ограничивающий прямоугольник набора точек
    #[must_use]
    pub fn bounding(points: &[Point]) -> Self {
        let mut rect = Self::new(
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        );
        for p in points {
            rect.min.x = rect.min.x.min(p.x);
            rect.min.y = rect.min.y.min(p.y);
            rect.max.x = rect.max.x.max(p.x);
            rect.max.y = rect.max.y.max(p.y);
        }
        rect
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Вершины прямоугольника в положительной ориентации
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}

/// Вершина многоугольника вместе с владельцем исходящего ребра.
///
/// `edge` хранит индекс соседней точки, чья серединная перпендикулярь образовала ребро
/// `vertex[k] → vertex[k + 1]`, либо `None`, если ребро лежит на границе карты.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedVertex {
    pub pos: Point,
    pub edge: Option<usize>,
}

/// Начальный многоугольник ячейки: весь прямоугольник карты
#[must_use]
pub fn rect_polygon(bounds: &Rect) -> Vec<TaggedVertex> {
    bounds
        .corners()
        .into_iter()
        .map(|pos| TaggedVertex { pos, edge: None })
        .collect()
}

/// Отсекает выпуклый многоугольник полуплоскостью точек, которые ближе к `site`,
/// чем к `other` (алгоритм Сазерленда-Ходжмана).
///
/// Новые рёбра помечаются индексом `other_index`.
#[must_use]
pub fn clip_by_bisector(
    polygon: &[TaggedVertex],
    site: Point,
    other: Point,
    other_index: usize,
) -> Vec<TaggedVertex> {
    let normal = other - site;
    let offset = normal.dot((site + other) * 0.5);
    let side = |p: Point| normal.dot(p) - offset;

    let n = polygon.len();
    let mut out = Vec::with_capacity(n + 1);
    for k in 0..n {
        let a = polygon[k];
        let b = polygon[(k + 1) % n];
        let da = side(a.pos);
        let db = side(b.pos);

        if da <= 0.0 {
            out.push(a);
            if db > 0.0 {
                // Выходим из полуплоскости: дальше идём по новой границе
                let t = da / (da - db);
                out.push(TaggedVertex {
                    pos: a.pos.lerp(b.pos, t),
                    edge: Some(other_index),
                });
            }
        } else if db <= 0.0 {
            // Входим обратно: остаток старого ребра сохраняет владельца
            let t = da / (da - db);
            out.push(TaggedVertex {
                pos: a.pos.lerp(b.pos, t),
                edge: a.edge,
            });
        }
    }

    dedup_vertices(out)
}

/// Убирает вершины, совпадающие со следующей (рёбра нулевой длины)
fn dedup_vertices(mut polygon: Vec<TaggedVertex>) -> Vec<TaggedVertex> {
    let mut k = 0;
    while polygon.len() > 1 && k < polygon.len() {
        let next = (k + 1) % polygon.len();
        if polygon[k].pos.distance_sq(polygon[next].pos) < EPSILON * EPSILON {
            polygon.remove(k);
        } else {
            k += 1;
        }
    }
    polygon
}

/// Ориентированная площадь многоугольника
#[must_use]
pub fn signed_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| polygon[i].cross(polygon[(i + 1) % n]))
        .sum();
    twice * 0.5
}

/// Центр масс многоугольника.
///
/// Для вырожденных многоугольников возвращает среднее вершин.
#[must_use]
pub fn centroid(polygon: &[Point]) -> Point {
    let area = signed_area(polygon);
    if area.abs() < EPSILON {
        let n = polygon.len().max(1) as f64;
        let sum = polygon
            .iter()
            .fold(Point::default(), |acc, &p| acc + p);
        return sum * (1.0 / n);
    }

    let n = polygon.len();
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let f = a.cross(b);
        cx += (a.x + b.x) * f;
        cy += (a.y + b.y) * f;
    }
    Point::new(cx / (6.0 * area), cy / (6.0 * area))
}

/// Проверка принадлежности точки выпуклому многоугольнику (граница включается)
#[must_use]
pub fn convex_contains(polygon: &[Point], p: Point) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    (0..n).all(|i| {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        (b - a).cross(p - a) >= -EPSILON
    })
}

/// Длина ломаной
#[must_use]
pub fn polyline_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Перевыборка ломаной с шагом `step` по длине дуги (включая начало и конец)
#[must_use]
pub fn resample_polyline(path: &[Point], step: f64) -> Vec<Point> {
    let Some(&first) = path.first() else {
        return Vec::new();
    };
    let total = polyline_length(path);
    let mut out = vec![first];
    if total < EPSILON || step <= 0.0 {
        return out;
    }

    let mut target = step;
    let mut walked = 0.0;
    for w in path.windows(2) {
        let seg = w[0].distance(w[1]);
        while seg > 0.0 && target <= walked + seg {
            out.push(w[0].lerp(w[1], (target - walked) / seg));
            target += step;
        }
        walked += seg;
    }
    if let (Some(&last), Some(&end)) = (out.last(), path.last()) {
        if last.distance(end) > EPSILON {
            out.push(end);
        }
    }
    out
}
