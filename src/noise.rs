//! Детерминированный фрактальный шум поверх `fastnoise-lite`
//!
//! Одинаковый сид и координата всегда дают одно и то же значение.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

/// Скалярное поле шума OpenSimplex2 с опциональным FBm
pub struct NoiseField {
    noise: FastNoiseLite,
}

impl NoiseField {
    /// Фрактальный шум (FBm) с заданным числом октав
    #[must_use]
    pub fn fractal(seed: i32, frequency: f32, octaves: i32) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(seed));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_fractal_type(Some(FractalType::FBm));
        noise.set_fractal_octaves(Some(octaves));
        noise.set_frequency(Some(frequency));
        Self { noise }
    }

    /// Одна октава без фрактала
    #[must_use]
    pub fn simple(seed: i32, frequency: f32) -> Self {
        let mut noise = FastNoiseLite::new();
        noise.set_seed(Some(seed));
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(frequency));
        Self { noise }
    }

    /// Значение в диапазоне [-1, 1]
    #[must_use]
    pub fn signed(&self, x: f64, y: f64) -> f32 {
        self.noise.get_noise_2d(x as f32, y as f32).clamp(-1.0, 1.0)
    }

    /// Значение в диапазоне [0, 1]
    #[must_use]
    pub fn unit(&self, x: f64, y: f64) -> f32 {
        (self.signed(x, y) + 1.0) * 0.5
    }
}
