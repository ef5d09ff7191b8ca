use serde::{Deserialize, Serialize};

/// Биом ячейки (упрощённая диаграмма Уиттекера)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    #[default]
    Ocean,
    Desert,
    Grassland,
    Forest,
    DarkForest,
    Jungle,
    Snow,
    Tundra,
    Scorched,
}

impl Biome {
    pub const ALL: [Biome; 9] = [
        Biome::Ocean,
        Biome::Desert,
        Biome::Grassland,
        Biome::Forest,
        Biome::DarkForest,
        Biome::Jungle,
        Biome::Snow,
        Biome::Tundra,
        Biome::Scorched,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Biome::Ocean => "ocean",
            Biome::Desert => "desert",
            Biome::Grassland => "grassland",
            Biome::Forest => "forest",
            Biome::DarkForest => "dark_forest",
            Biome::Jungle => "jungle",
            Biome::Snow => "snow",
            Biome::Tundra => "tundra",
            Biome::Scorched => "scorched",
        }
    }

    #[must_use]
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            Biome::Ocean => [0, 0, 200],
            Biome::Desert => [200, 180, 50],
            Biome::Grassland => [50, 180, 50],
            Biome::Forest => [20, 140, 20],
            Biome::DarkForest => [10, 100, 10],
            Biome::Jungle => [0, 150, 0],
            Biome::Snow => [240, 240, 240],
            Biome::Tundra => [200, 200, 210],
            Biome::Scorched => [120, 40, 0],
        }
    }
}

/// Назначает биом по суше, температуре и влажности.
///
/// Таблица порогов:
///
/// | температура  | влажность                                                         |
/// |--------------|-------------------------------------------------------------------|
/// | любая        | `< 0.05` → Scorched                                               |
/// | `< 0.2`      | `> 0.5` → Snow, иначе Tundra                                      |
/// | `< 0.4`      | `< 0.25` Desert, `< 0.5` Grassland, иначе Forest                  |
/// | `< 0.7`      | `< 0.25` Desert, `< 0.5` Grassland, `< 0.75` Forest, иначе DarkForest |
/// | `≥ 0.7`      | `< 0.3` Desert, `< 0.6` Grassland, иначе Jungle                   |
#[must_use]
pub fn classify(is_land: bool, temperature: f32, moisture: f32) -> Biome {
    if !is_land {
        return Biome::Ocean;
    }

    let t = temperature;
    let m = moisture;

    // Крайняя сухость важнее температуры
    if m < 0.05 {
        return Biome::Scorched;
    }

    if t < 0.2 {
        if m > 0.5 { Biome::Snow } else { Biome::Tundra }
    } else if t < 0.4 {
        if m < 0.25 {
            Biome::Desert
        } else if m < 0.5 {
            Biome::Grassland
        } else {
            Biome::Forest
        }
    } else if t < 0.7 {
        if m < 0.25 {
            Biome::Desert
        } else if m < 0.5 {
            Biome::Grassland
        } else if m < 0.75 {
            Biome::Forest
        } else {
            Biome::DarkForest
        }
    } else if m < 0.3 {
        Biome::Desert
    } else if m < 0.6 {
        Biome::Grassland
    } else {
        Biome::Jungle
    }
}

/// Биомы для всех ячеек
#[must_use]
pub fn assign_biomes(land: &[bool], temperature: &[f32], moisture: &[f32]) -> Vec<Biome> {
    land.iter()
        .zip(temperature)
        .zip(moisture)
        .map(|((&is_land, &t), &m)| classify(is_land, t, m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_is_always_ocean() {
        assert_eq!(classify(false, 0.5, 0.5), Biome::Ocean);
        assert_eq!(classify(false, 0.0, 0.0), Biome::Ocean);
    }

    #[test]
    fn scorched_overrides_temperature() {
        for t in [0.0, 0.3, 0.6, 0.9] {
            assert_eq!(classify(true, t, 0.01), Biome::Scorched);
        }
    }

    #[test]
    fn threshold_table() {
        assert_eq!(classify(true, 0.1, 0.6), Biome::Snow);
        assert_eq!(classify(true, 0.1, 0.5), Biome::Tundra);
        assert_eq!(classify(true, 0.3, 0.2), Biome::Desert);
        assert_eq!(classify(true, 0.3, 0.4), Biome::Grassland);
        assert_eq!(classify(true, 0.3, 0.9), Biome::Forest);
        assert_eq!(classify(true, 0.5, 0.6), Biome::Forest);
        assert_eq!(classify(true, 0.5, 0.8), Biome::DarkForest);
        assert_eq!(classify(true, 0.8, 0.25), Biome::Desert);
        assert_eq!(classify(true, 0.8, 0.5), Biome::Grassland);
        assert_eq!(classify(true, 0.8, 0.7), Biome::Jungle);
    }

    #[test]
    fn names_are_snake_case() {
        assert_eq!(Biome::DarkForest.name(), "dark_forest");
        let json = serde_json::to_string(&Biome::DarkForest).expect("serialize");
        assert_eq!(json, "\"dark_forest\"");
        assert_eq!(Biome::ALL.len(), 9);
    }
}
