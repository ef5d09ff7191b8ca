//! Климат ячеек: температура, осадки и влажность

use std::collections::BTreeSet;

use crate::config::WindDirection;
use crate::noise::NoiseField;
use crate::voronoi::VoronoiDiagram;

const TEMPERATURE_NOISE: f32 = 0.1;
const TEMPERATURE_FREQUENCY: f32 = 0.05;
const RAINFALL_FREQUENCY: f32 = 0.03;
const RAINFALL_OCTAVES: i32 = 3;

/// Во сколько раз влага в воздухе убывает за шаг
const RAIN_SHADOW_DECAY: f32 = 0.9;
/// Выше этой высоты горы задерживают влагу
const MOUNTAIN_THRESHOLD: f32 = 0.6;
const MOUNTAIN_SUPPRESSION: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct Climate {
    pub temperature: Vec<f32>,
    pub rainfall: Vec<f32>,
    pub moisture: Vec<f32>,
}

/// Температура: линейный градиент от тёплого верхнего края (y = 0) к холодному нижнему
/// с небольшим шумом, обрезанная до [0, 1]
#[must_use]
pub fn temperature(diagram: &VoronoiDiagram, noise_seed: i32) -> Vec<f32> {
    let noise = NoiseField::simple(noise_seed, TEMPERATURE_FREQUENCY);
    diagram
        .cells
        .iter()
        .map(|cell| {
            let c = cell.centroid;
            let warmth = 1.0 - (c.y / diagram.height) as f32;
            (warmth + noise.signed(c.x, c.y) * TEMPERATURE_NOISE).clamp(0.0, 1.0)
        })
        .collect()
}

/// Осадки: независимое поле шума в [0, 1]
#[must_use]
pub fn rainfall(diagram: &VoronoiDiagram, noise_seed: i32) -> Vec<f32> {
    let noise = NoiseField::fractal(noise_seed, RAINFALL_FREQUENCY, RAINFALL_OCTAVES);
    diagram
        .cells
        .iter()
        .map(|cell| noise.unit(cell.centroid.x, cell.centroid.y))
        .collect()
}

/// Дождевая тень.
///
/// Ячейки группируются в полосы поперёк ветра (ширина полосы равна среднему шагу ячеек)
/// и проходятся по ветру. Влага в воздухе убывает на каждом шаге, пополняется
/// осадками и срезается над горами. Результат нормализуется в [0, 1].
#[must_use]
pub fn apply_rain_shadow(
    diagram: &VoronoiDiagram,
    rainfall: &[f32],
    elevation: &[f32],
    wind: WindDirection,
) -> Vec<f32> {
    let n = diagram.len();
    if n == 0 {
        return Vec::new();
    }
    let band_width = (diagram.width * diagram.height / n as f64).sqrt();

    // (вдоль ветра, поперёк ветра)
    let axes = |i: usize| {
        let c = diagram.cells[i].centroid;
        match wind {
            WindDirection::East => (c.x, c.y),
            WindDirection::West => (-c.x, c.y),
            WindDirection::North => (-c.y, c.x),
            WindDirection::South => (c.y, c.x),
        }
    };
    let band = |i: usize| (axes(i).1 / band_width).floor() as i64;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        band(a)
            .cmp(&band(b))
            .then(axes(a).0.total_cmp(&axes(b).0))
            .then(a.cmp(&b))
    });

    let mut swept = vec![0.0_f32; n];
    let mut current_band = None;
    let mut moisture = 0.0_f32;
    for i in order {
        let b = band(i);
        if current_band != Some(b) {
            current_band = Some(b);
            moisture = 0.0;
        }
        moisture = (moisture * RAIN_SHADOW_DECAY).max(rainfall[i]);
        if elevation[i] > MOUNTAIN_THRESHOLD {
            moisture *= MOUNTAIN_SUPPRESSION;
        }
        swept[i] = moisture;
    }

    normalize(&mut swept);
    swept
}

/// Диффузия по графу смежности: значение усредняется со средним соседей
#[must_use]
pub fn diffuse(values: &[f32], adjacency: &[BTreeSet<usize>], iterations: usize) -> Vec<f32> {
    let mut current = values.to_vec();
    for _ in 0..iterations {
        current = adjacency
            .iter()
            .enumerate()
            .map(|(i, neighbors)| {
                if neighbors.is_empty() {
                    return current[i];
                }
                let mean = neighbors.iter().map(|&j| current[j]).sum::<f32>() / neighbors.len() as f32;
                (current[i] + mean) * 0.5
            })
            .collect();
    }
    current
}

/// Мин-макс нормализация в [0, 1]; постоянное поле не меняется
fn normalize(values: &mut [f32]) {
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max > min {
        for v in values {
            *v = (*v - min) / (max - min);
        }
    }
}

/// Полный климат ячеек
#[must_use]
pub fn generate_climate(
    diagram: &VoronoiDiagram,
    elevation: &[f32],
    seeds: (i32, i32),
    wind: Option<WindDirection>,
    diffusion: usize,
) -> Climate {
    let temperature = temperature(diagram, seeds.0);
    let raw_rain = rainfall(diagram, seeds.1);
    let rainfall = match wind {
        Some(dir) => apply_rain_shadow(diagram, &raw_rain, elevation, dir),
        None => raw_rain,
    };
    let moisture = diffuse(&rainfall, &diagram.adjacency, diffusion);
    Climate {
        temperature,
        rainfall,
        moisture,
    }
}
