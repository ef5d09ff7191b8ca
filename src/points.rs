//! Выборка точек-центров ячеек

use rand::Rng;

use crate::config::SamplingMode;
use crate::geometry::Point;

/// Сколько попыток даётся активной точке, прежде чем она выбывает
const POISSON_ATTEMPTS: usize = 30;

/// Возвращает точки строго внутри `[0, width) × [0, height)`
pub fn sample<R: Rng>(width: f64, height: f64, mode: SamplingMode, rng: &mut R) -> Vec<Point> {
    match mode {
        SamplingMode::PoissonDisk { radius } => poisson_disk(width, height, radius, rng),
        SamplingMode::Uniform { count } => uniform(width, height, count, rng),
    }
}

/// Равномерно случайные точки
pub fn uniform<R: Rng>(width: f64, height: f64, count: usize, rng: &mut R) -> Vec<Point> {
    (0..count)
        .map(|_| Point::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height)))
        .collect()
}

/// Выборка Пуассона (алгоритм Бридсона).
///
/// Фоновая сетка с шагом `r/√2` хранит не более одной точки на ячейку,
/// поэтому проверка расстояния смотрит только окрестность 5×5.
pub fn poisson_disk<R: Rng>(width: f64, height: f64, radius: f64, rng: &mut R) -> Vec<Point> {
    let cell_size = radius / std::f64::consts::SQRT_2;
    let grid_w = (width / cell_size).ceil() as usize;
    let grid_h = (height / cell_size).ceil() as usize;
    let mut grid: Vec<Option<usize>> = vec![None; grid_w * grid_h];

    let mut points: Vec<Point> = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    let cell_of = |p: Point| {
        (
            ((p.x / cell_size) as usize).min(grid_w - 1),
            ((p.y / cell_size) as usize).min(grid_h - 1),
        )
    };

    let first = Point::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
    let (gx, gy) = cell_of(first);
    grid[gy * grid_w + gx] = Some(0);
    points.push(first);
    active.push(0);

    while !active.is_empty() {
        let slot = rng.gen_range(0..active.len());
        let base = points[active[slot]];
        let mut found = false;

        for _ in 0..POISSON_ATTEMPTS {
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let dist = rng.gen_range(radius..2.0 * radius);
            let candidate = Point::new(base.x + angle.cos() * dist, base.y + angle.sin() * dist);
            if !(candidate.x >= 0.0 && candidate.x < width && candidate.y >= 0.0 && candidate.y < height)
            {
                continue;
            }

            let (cx, cy) = cell_of(candidate);
            let too_close = (cy.saturating_sub(2)..(cy + 3).min(grid_h)).any(|yy| {
                (cx.saturating_sub(2)..(cx + 3).min(grid_w)).any(|xx| {
                    grid[yy * grid_w + xx]
                        .is_some_and(|pid| points[pid].distance_sq(candidate) < radius * radius)
                })
            });

            if !too_close {
                let idx = points.len();
                grid[cy * grid_w + cx] = Some(idx);
                points.push(candidate);
                active.push(idx);
                found = true;
                break;
            }
        }

        if !found {
            active.swap_remove(slot);
        }
    }

    points
}
