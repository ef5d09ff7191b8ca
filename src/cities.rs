//! Размещение городов у рек и побережий

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Heightmap};

/// Выше этой высоты города не строятся
const MAX_CITY_ELEVATION: f32 = 0.8;

/// Город в координатах тайла
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    pub x: u32,
    pub y: u32,
}

impl City {
    #[must_use]
    pub fn distance(&self, other: &City) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

/// Тайлы, пригодные для города: суша ниже гор, на реке или рядом с океаном (окрестность 3×3)
#[must_use]
pub fn candidate_tiles(river_map: &Grid<u32>, heightmap: &Heightmap, sea_level: f32) -> Vec<City> {
    let mut candidates = Vec::new();
    for y in 0..heightmap.height {
        for x in 0..heightmap.width {
            let h = *heightmap.get(x, y);
            if !(h > sea_level && h < MAX_CITY_ELEVATION) {
                continue;
            }
            if *river_map.get(x, y) > 0 || is_coastal(heightmap, x, y, sea_level) {
                candidates.push(City { x, y });
            }
        }
    }
    candidates
}

fn is_coastal(heightmap: &Heightmap, x: u32, y: u32, sea_level: f32) -> bool {
    (-1..=1).any(|dy| {
        (-1..=1).any(|dx| {
            let nx = i64::from(x) + dx;
            let ny = i64::from(y) + dy;
            heightmap.in_bounds(nx, ny) && *heightmap.get(nx as u32, ny as u32) < sea_level
        })
    })
}

/// Выбирает до `n_cities` городов.
///
/// Кандидаты перемешиваются генератором запуска и принимаются по порядку, если
/// до каждого уже принятого города не меньше `min_dist`. Городов может оказаться
/// меньше запрошенного.
pub fn place<R: Rng>(
    river_map: &Grid<u32>,
    heightmap: &Heightmap,
    n_cities: usize,
    min_dist: f64,
    sea_level: f32,
    rng: &mut R,
) -> Vec<City> {
    let mut candidates = candidate_tiles(river_map, heightmap, sea_level);
    if candidates.is_empty() {
        log::debug!("Cities: no candidate tiles");
        return Vec::new();
    }
    candidates.shuffle(rng);

    let mut cities: Vec<City> = Vec::with_capacity(n_cities);
    for candidate in candidates {
        if cities.len() == n_cities {
            break;
        }
        if cities.iter().all(|c| c.distance(&candidate) >= min_dist) {
            cities.push(candidate);
        }
    }

    if cities.len() < n_cities {
        log::debug!("Cities: placed {} of {n_cities}", cities.len());
    }
    cities
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Остров: суша в середине, вода по краям
    fn island(size: u32) -> Heightmap {
        let mut hm = Heightmap::new(size, size);
        let c = size as f32 / 2.0;
        for y in 0..size {
            for x in 0..size {
                let d = ((x as f32 - c).powi(2) + (y as f32 - c).powi(2)).sqrt();
                hm.set(x, y, (0.7 - d / c * 0.6).max(0.0));
            }
        }
        hm
    }

    #[test]
    fn cities_are_spaced_and_on_land() {
        let hm = island(40);
        let rivers = Grid::new(40, 40);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cities = place(&rivers, &hm, 5, 8.0, 0.26, &mut rng);
        assert!(!cities.is_empty());
        for (i, a) in cities.iter().enumerate() {
            let h = *hm.get(a.x, a.y);
            assert!(h > 0.26 && h < 0.8);
            for b in &cities[i + 1..] {
                assert!(a.distance(b) >= 8.0);
            }
        }
    }

    #[test]
    fn river_tiles_are_candidates() {
        let hm = island(20);
        let mut rivers: Grid<u32> = Grid::new(20, 20);
        rivers.set(10, 10, 1);
        let candidates = candidate_tiles(&rivers, &hm, 0.26);
        assert!(candidates.contains(&City { x: 10, y: 10 }));
        assert!(!candidates.contains(&City { x: 10, y: 9 }));
    }

    #[test]
    fn no_land_means_no_cities() {
        let hm = Heightmap::new(10, 10);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(place(&Grid::new(10, 10), &hm, 3, 2.0, 0.26, &mut rng).is_empty());
    }

    #[test]
    fn placement_is_reproducible() {
        let hm = island(30);
        let rivers = Grid::new(30, 30);
        let a = place(&rivers, &hm, 4, 5.0, 0.26, &mut ChaCha8Rng::seed_from_u64(9));
        let b = place(&rivers, &hm, 4, 5.0, 0.26, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
