//! Равномерная сетка тайлов `width × height` (построчное хранение)

use serde::{Deserialize, Serialize};

/// Двумерная сетка значений тайлов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid<T> {
    pub width: u32,
    pub height: u32,
    pub data: Vec<T>,
}

/// Карта высот: 0.0 (глубокий океан) … 1.0 (высочайшие пики)
pub type Heightmap = Grid<f32>;

/// Булева маска тайлов (реки, дороги)
pub type Mask = Grid<bool>;

/// Соседи по четырём направлениям: вверх, вниз, влево, вправо
pub const DIRECTIONS_4: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

impl<T: Clone> Grid<T> {
    pub fn filled(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T> Grid<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Координаты тайла по линейному индексу
    #[must_use]
    pub fn coords(&self, idx: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((idx % w) as u32, (idx / w) as u32)
    }

    #[must_use]
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Индексы соседей по четырём направлениям в порядке [`DIRECTIONS_4`]
    pub fn neighbors4(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let (x, y) = self.coords(idx);
        DIRECTIONS_4.iter().filter_map(move |&(dx, dy)| {
            let nx = i64::from(x) + i64::from(dx);
            let ny = i64::from(y) + i64::from(dy);
            self.in_bounds(nx, ny)
                .then(|| self.index(nx as u32, ny as u32))
        })
    }

    /// Применяет функцию к каждому значению, сохраняя размеры
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl Mask {
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Сглаживание скользящим средним (3×3, 5×5 и т.д.), края ограничиваются
pub fn smooth_heightmap(data: &mut [f32], width: usize, height: usize, radius: usize) {
    if radius == 0 || width == 0 || height == 0 {
        return;
    }

    let r = radius as i64;
    let count = (2 * r + 1) as f32;
    let clamp_x = |x: i64| x.clamp(0, width as i64 - 1) as usize;
    let clamp_y = |y: i64| y.clamp(0, height as i64 - 1) as usize;

    // 1. Горизонтальный проход
    let mut temp = vec![0.0; data.len()];
    for y in 0..height {
        let row = y * width;
        let mut window_sum: f32 = (-r..=r).map(|dx| data[row + clamp_x(dx)]).sum();
        for x in 0..width {
            temp[row + x] = window_sum / count;
            let left = clamp_x(x as i64 - r);
            let right = clamp_x(x as i64 + r + 1);
            window_sum += data[row + right] - data[row + left];
        }
    }

    // 2. Вертикальный проход
    for x in 0..width {
        let mut window_sum: f32 = (-r..=r).map(|dy| temp[clamp_y(dy) * width + x]).sum();
        for y in 0..height {
            data[y * width + x] = window_sum / count;
            let top = clamp_y(y as i64 - r);
            let bottom = clamp_y(y as i64 + r + 1);
            window_sum += temp[bottom * width + x] - temp[top * width + x];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_respect_edges() {
        let grid: Grid<u8> = Grid::new(3, 3);
        let corner: Vec<usize> = grid.neighbors4(0).collect();
        assert_eq!(corner, vec![3, 1]);
        let center: Vec<usize> = grid.neighbors4(4).collect();
        assert_eq!(center, vec![1, 7, 3, 5]);
    }

    #[test]
    fn smoothing_keeps_constant_field() {
        let mut data = vec![0.4_f32; 25];
        smooth_heightmap(&mut data, 5, 5, 2);
        assert!(data.iter().all(|&v| (v - 0.4).abs() < 1e-6));
    }

    #[test]
    fn smoothing_spreads_a_spike() {
        let mut data = vec![0.0_f32; 25];
        data[12] = 9.0;
        smooth_heightmap(&mut data, 5, 5, 1);
        assert!((data[12] - 1.0).abs() < 1e-6);
        assert!(data[6] > 0.0);
        assert_eq!(data[0], 0.0);
    }
}
