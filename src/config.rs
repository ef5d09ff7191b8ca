// src/config.rs
//! Конфигурация генерации архипелага
//!
//! Этот модуль определяет все параметры, управляющие процедурной генерацией:
//! - Размер карты и сид
//! - Способ выборки точек и релаксация Ллойда
//! - Форма островов, уровень моря и климат
//! - Реки, города, дороги и искажение линий
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{GenError, Result};

/// Предел числа тайлов: линейный индекс тайла должен помещаться в `u32`
pub const MAX_TILES: u64 = u32::MAX as u64;
/// Меньший радиус Пуассона даёт больше точек, чем карта различает тайлами
pub const MIN_POISSON_RADIUS: f64 = 0.5;
/// Предел плотности равномерной выборки
const MAX_POINTS_PER_TILE: usize = 4;

/// Способ выборки точек-центров ячеек Вороного
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SamplingMode {
    /// Выборка Пуассона (blue noise): точки не ближе `radius` друг к другу
    PoissonDisk { radius: f64 },
    /// Равномерно случайные точки в фиксированном количестве
    Uniform { count: usize },
}

impl Default for SamplingMode {
    fn default() -> Self {
        SamplingMode::PoissonDisk { radius: 2.5 }
    }
}

/// Направление преобладающего ветра (куда дует ветер).
///
/// Определяет направление прохода «дождевой тени»: влага приходит с наветренной
/// стороны и задерживается горами.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WindDirection {
    /// С запада на восток (по возрастанию x)
    #[default]
    East,
    /// С востока на запад
    West,
    /// С юга на север (по убыванию y)
    North,
    /// С севера на юг
    South,
}

/// Настройки островов
///
/// Радиусы задаются долей от меньшей стороны карты, чтобы форма архипелага
/// не зависела от размера карты.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IslandSettings {
    /// Количество островных «ядер» (0 = рельеф только из шума)
    #[serde(default = "default_num_islands")]
    pub num_islands: usize,

    /// Минимальный радиус острова (доля меньшей стороны карты)
    #[serde(default = "default_min_island_radius")]
    pub min_radius: f32,

    /// Максимальный радиус острова (доля меньшей стороны карты)
    #[serde(default = "default_max_island_radius")]
    pub max_radius: f32,
}

fn default_num_islands() -> usize {
    4
}
fn default_min_island_radius() -> f32 {
    0.15
}
fn default_max_island_radius() -> f32 {
    0.35
}

impl Default for IslandSettings {
    fn default() -> Self {
        Self {
            num_islands: default_num_islands(),
            min_radius: default_min_island_radius(),
            max_radius: default_max_island_radius(),
        }
    }
}

/// Основные параметры генерации
///
/// Полная конфигурация одного запуска. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationParams {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default)]
    pub seed: u64,

    /// Ширина карты в тайлах
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в тайлах
    #[serde(default = "default_height")]
    pub height: u32,

    /// Выборка точек (по умолчанию Пуассон с радиусом 2.5)
    #[serde(default)]
    pub sampling: SamplingMode,

    /// Число итераций релаксации Ллойда (0 = выключено)
    #[serde(default = "default_relax_iterations")]
    pub relax_iterations: usize,

    /// Уровень моря: всё ниже считается океаном
    #[serde(default = "default_sea_level")]
    pub sea_level: f32,

    /// Целевая доля суши среди ячеек (`None` = без ранговой нормализации)
    #[serde(default = "default_land_fraction")]
    pub land_fraction: Option<f32>,

    #[serde(default)]
    pub islands: IslandSettings,

    /// Преобладающий ветер для дождевой тени (`None` = без дождевой тени)
    #[serde(default = "default_prevailing_wind")]
    pub prevailing_wind: Option<WindDirection>,

    /// Число итераций диффузии влажности по соседним ячейкам (0 = без диффузии)
    #[serde(default = "default_moisture_diffusion")]
    pub moisture_diffusion: usize,

    /// Радиус сглаживания растровой карты высот в тайлах (0 = без сглаживания)
    #[serde(default = "default_smooth_radius")]
    pub smooth_radius: usize,

    /// Минимальный поток, с которого начинается река
    #[serde(default = "default_river_min_flux")]
    pub river_min_flux: f32,

    /// Сколько городов разместить
    #[serde(default = "default_num_cities")]
    pub num_cities: usize,

    /// Минимальное расстояние между городами в тайлах
    #[serde(default = "default_city_min_distance")]
    pub city_min_distance: f64,

    /// Ширина рек в маске (в тайлах)
    #[serde(default = "default_line_width")]
    pub river_width_tiles: u32,

    /// Ширина дорог в маске (в тайлах)
    #[serde(default = "default_line_width")]
    pub road_width_tiles: u32,

    /// Искажать ли реки и дороги шумом
    #[serde(default = "default_jitter_enabled")]
    pub jitter_enabled: bool,

    /// Масштаб шума искажения: шум берётся в точке `(x / freq, y / freq)`
    #[serde(default = "default_jitter_frequency")]
    pub jitter_frequency: f64,

    /// Максимальное боковое смещение вершин рек и дорог
    #[serde(default = "default_jitter_strength")]
    pub jitter_strength: f64,

    /// Максимальное боковое смещение границ биомов
    #[serde(default = "default_border_amplitude")]
    pub border_amplitude: f64,

    /// Частота шума вдоль границ биомов
    #[serde(default = "default_border_frequency")]
    pub border_frequency: f64,
}

fn default_width() -> u32 {
    80
}
fn default_height() -> u32 {
    40
}
fn default_relax_iterations() -> usize {
    1
}
fn default_sea_level() -> f32 {
    crate::SEA_LEVEL
}
#[allow(clippy::unnecessary_wraps)]
fn default_land_fraction() -> Option<f32> {
    Some(0.4)
}
#[allow(clippy::unnecessary_wraps)]
fn default_prevailing_wind() -> Option<WindDirection> {
    Some(WindDirection::East)
}
fn default_moisture_diffusion() -> usize {
    1
}
fn default_smooth_radius() -> usize {
    1
}
fn default_river_min_flux() -> f32 {
    12.0
}
fn default_num_cities() -> usize {
    6
}
fn default_city_min_distance() -> f64 {
    10.0
}
fn default_line_width() -> u32 {
    1
}
fn default_jitter_enabled() -> bool {
    true
}
fn default_jitter_frequency() -> f64 {
    8.0
}
fn default_jitter_strength() -> f64 {
    0.6
}
fn default_border_amplitude() -> f64 {
    1.0
}
fn default_border_frequency() -> f64 {
    0.1
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            width: default_width(),
            height: default_height(),
            sampling: SamplingMode::default(),
            relax_iterations: default_relax_iterations(),
            sea_level: default_sea_level(),
            land_fraction: default_land_fraction(),
            islands: IslandSettings::default(),
            prevailing_wind: default_prevailing_wind(),
            moisture_diffusion: default_moisture_diffusion(),
            smooth_radius: default_smooth_radius(),
            river_min_flux: default_river_min_flux(),
            num_cities: default_num_cities(),
            city_min_distance: default_city_min_distance(),
            river_width_tiles: default_line_width(),
            road_width_tiles: default_line_width(),
            jitter_enabled: default_jitter_enabled(),
            jitter_frequency: default_jitter_frequency(),
            jitter_strength: default_jitter_strength(),
            border_amplitude: default_border_amplitude(),
            border_frequency: default_border_frequency(),
        }
    }
}

impl GenerationParams {
    /// Параметры по умолчанию для карты заданного размера
    #[must_use]
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            ..Self::default()
        }
    }

    /// Загружает параметры из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// seed = 42
    /// width = 120
    /// height = 60
    /// num_cities = 8
    ///
    /// [sampling]
    /// mode = "poisson_disk"
    /// radius = 3.0
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let params: Self = toml::from_str(contents)?;
        params.validate()?;
        Ok(params)
    }

    /// Проверяет параметры до начала генерации
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(GenError::Config(msg));

        if self.width == 0 || self.height == 0 {
            return fail(format!(
                "map size must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        let tiles = u64::from(self.width) * u64::from(self.height);
        if tiles > MAX_TILES {
            return fail(format!(
                "map {}x{} has {tiles} tiles, at most {MAX_TILES} are supported",
                self.width, self.height
            ));
        }
        let tiles = tiles as usize;
        match self.sampling {
            SamplingMode::PoissonDisk { radius } if !(radius.is_finite() && radius > 0.0) => {
                return fail(format!("poisson radius must be positive, got {radius}"));
            }
            SamplingMode::PoissonDisk { radius } if radius < MIN_POISSON_RADIUS => {
                return fail(format!(
                    "poisson radius must be at least {MIN_POISSON_RADIUS} tiles, got {radius}"
                ));
            }
            SamplingMode::Uniform { count: 0 } => {
                return fail("uniform sampling needs at least one point".to_string());
            }
            SamplingMode::Uniform { count } if count > tiles * MAX_POINTS_PER_TILE => {
                return fail(format!(
                    "{count} points requested, at most {} fit a {}x{} map",
                    tiles * MAX_POINTS_PER_TILE,
                    self.width,
                    self.height
                ));
            }
            _ => {}
        }
        if !(self.sea_level > 0.0 && self.sea_level < 1.0) {
            return fail(format!("sea_level must be in (0, 1), got {}", self.sea_level));
        }
        if let Some(f) = self.land_fraction.filter(|f| !(*f > 0.0 && *f < 1.0)) {
            return fail(format!("land_fraction must be in (0, 1), got {f}"));
        }
        let islands = &self.islands;
        if islands.min_radius <= 0.0 || islands.min_radius > islands.max_radius {
            return fail(format!(
                "island radii must satisfy 0 < min <= max, got {}..{}",
                islands.min_radius, islands.max_radius
            ));
        }
        if self.num_cities > tiles {
            return fail(format!(
                "{} cities requested but the map has only {tiles} tiles",
                self.num_cities
            ));
        }
        if self.river_width_tiles == 0 || self.road_width_tiles == 0 {
            return fail("river and road widths must be at least one tile".to_string());
        }
        if !(self.city_min_distance >= 0.0 && self.city_min_distance.is_finite()) {
            return fail(format!(
                "city_min_distance must be non-negative, got {}",
                self.city_min_distance
            ));
        }
        let positive = |f: f64| f > 0.0 && f.is_finite();
        if !positive(self.jitter_frequency) || !positive(self.border_frequency) {
            return fail(format!(
                "noise frequencies must be positive, got jitter {} and border {}",
                self.jitter_frequency, self.border_frequency
            ));
        }
        let offsets = [self.jitter_strength, self.border_amplitude];
        if offsets.iter().any(|&d| !(d >= 0.0 && d.is_finite())) {
            return fail(format!(
                "jitter_strength and border_amplitude must be non-negative, got {} and {}",
                self.jitter_strength, self.border_amplitude
            ));
        }
        Ok(())
    }
}
