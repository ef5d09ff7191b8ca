//! Ошибки генерации мира

use thiserror::Error;

/// Ошибки, прерывающие генерацию.
///
/// Недостижимые дороги и пустой набор кандидатов для городов ошибками не считаются:
/// они дают деградированный, но корректный результат.
#[derive(Debug, Error)]
pub enum GenError {
    /// Недопустимые параметры генерации
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Диаграмма Вороного не смогла построить ячейку даже прямым методом
    #[error("degenerate Voronoi cell for point #{index} ({x:.3}, {y:.3})")]
    GeometricDegeneracy { index: usize, x: f64, y: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, GenError>;
