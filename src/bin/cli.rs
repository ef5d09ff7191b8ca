use archipelago::{GenerationParams, RenderOptions, generate, render};
use clap::Parser;
use std::path::PathBuf;

/// Генератор архипелагов: Вороной, климат, реки, города и дороги
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ширина карты в тайлах
    #[arg(long)]
    width: Option<u32>,

    /// Высота карты в тайлах
    #[arg(long)]
    height: Option<u32>,

    /// Сид генерации
    #[arg(short, long)]
    seed: Option<u64>,

    /// Сколько городов разместить
    #[arg(long)]
    cities: Option<usize>,

    /// Не искажать реки и дороги
    #[arg(long)]
    no_jitter: bool,

    /// Ширина рек в тайлах
    #[arg(long)]
    river_width: Option<u32>,

    /// Ширина дорог в тайлах
    #[arg(long)]
    road_width: Option<u32>,

    /// Показать легенду под картой
    #[arg(long)]
    legend: bool,

    /// Без цветов терминала
    #[arg(long)]
    no_color: bool,

    /// Сохранить превью карты в PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Сохранить карту высот в PNG (оттенки серого)
    #[arg(long)]
    height_png: Option<PathBuf>,

    /// Вывести JSON-сводку вместо карты
    #[arg(long)]
    summary: bool,
}

impl Cli {
    /// Параметры из файла (или по умолчанию) с переопределениями из командной строки
    fn params(&self) -> archipelago::Result<GenerationParams> {
        let mut params = match &self.config {
            Some(path) => GenerationParams::from_toml_file(path)?,
            None => GenerationParams::default(),
        };
        if let Some(w) = self.width {
            params.width = w;
        }
        if let Some(h) = self.height {
            params.height = h;
        }
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(n) = self.cities {
            params.num_cities = n;
        }
        if let Some(w) = self.river_width {
            params.river_width_tiles = w;
        }
        if let Some(w) = self.road_width {
            params.road_width_tiles = w;
        }
        if self.no_jitter {
            params.jitter_enabled = false;
        }
        params.validate()?;
        Ok(params)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let params = cli.params()?;
    let terrain = generate(&params)?;

    if let Some(path) = &cli.png {
        terrain.save_as_png(path)?;
        log::info!("Map saved to {}", path.display());
    }
    if let Some(path) = &cli.height_png {
        terrain.heightmap.save_as_png(path)?;
        log::info!("Heightmap saved to {}", path.display());
    }

    if cli.summary {
        println!("{}", serde_json::to_string_pretty(&terrain.summary())?);
    } else {
        let options = RenderOptions {
            color: !cli.no_color,
            legend: cli.legend,
        };
        print!("{}", render(&terrain, &options));
    }
    Ok(())
}
