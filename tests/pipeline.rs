//! Свойства полного конвейера генерации

use archipelago::{GenerationParams, SEA_LEVEL, SamplingMode, Terrain, generate};

fn world(width: u32, height: u32, seed: u64) -> Terrain {
    generate(&GenerationParams::new(width, height, seed)).expect("generation succeeds")
}

#[test]
fn same_seed_gives_identical_world() {
    let a = world(100, 100, 1);
    let b = world(100, 100, 1);
    let ja = serde_json::to_string(&a).expect("serialize");
    let jb = serde_json::to_string(&b).expect("serialize");
    assert!(ja == jb, "two runs with seed 1 differ");
}

#[test]
fn roads_never_enter_water() {
    let t = world(60, 60, 4);
    for (idx, &road) in t.roads.mask.data.iter().enumerate() {
        if road {
            let (x, y) = t.roads.mask.coords(idx);
            assert!(
                t.heightmap.data[idx] >= SEA_LEVEL,
                "road at ({x}, {y}) is below sea level"
            );
        }
    }
}

#[test]
fn map_edge_stays_under_water() {
    for seed in 0..20 {
        let t = world(80, 40, seed);
        let hm = &t.heightmap;
        for (idx, &h) in hm.data.iter().enumerate() {
            let (x, y) = hm.coords(idx);
            if x == 0 || y == 0 || x + 1 == hm.width || y + 1 == hm.height {
                assert!(h < SEA_LEVEL, "seed {seed}: edge tile ({x}, {y}) has height {h}");
            }
        }
    }
}

#[test]
fn cells_tile_the_map() {
    let t = world(80, 40, 9);
    let area: f64 = t.diagram.cells.iter().map(|c| c.area).sum();
    assert!((area - 80.0 * 40.0).abs() < 1e-6, "area sum {area}");
    for cell in &t.diagram.cells {
        for v in &cell.vertices {
            assert!(v.x >= -1e-9 && v.x <= 80.0 + 1e-9);
            assert!(v.y >= -1e-9 && v.y <= 40.0 + 1e-9);
        }
    }
}

#[test]
fn adjacency_is_symmetric() {
    let t = world(70, 50, 12);
    for (i, neighbors) in t.diagram.adjacency.iter().enumerate() {
        assert!(!neighbors.contains(&i));
        for &j in neighbors {
            assert!(t.diagram.adjacency[j].contains(&i), "{i} -> {j} not mirrored");
        }
    }
}

#[test]
fn flow_terminates_and_rivers_run_downhill() {
    let t = world(80, 60, 21);
    let n = t.flow.downslope.len();
    for start in 0..n {
        let mut current = start;
        let mut steps = 0;
        while let Some(next) = t.flow.downslope[current] {
            assert!(t.heightmap.data[next] < t.heightmap.data[current]);
            current = next;
            steps += 1;
            assert!(steps <= n);
        }
    }

    for path in &t.rivers.paths {
        assert!(path.len() > 1);
        for w in path.windows(2) {
            assert!(t.heightmap.get(w[1].0, w[1].1) <= t.heightmap.get(w[0].0, w[0].1));
        }
    }
}

#[test]
fn cities_are_spaced_on_land() {
    let params = GenerationParams {
        num_cities: 10,
        city_min_distance: 7.0,
        ..GenerationParams::new(90, 60, 33)
    };
    let t = generate(&params).expect("generation succeeds");
    assert!(t.cities.len() <= 10);
    for (i, a) in t.cities.iter().enumerate() {
        let h = *t.heightmap.get(a.x, a.y);
        assert!(h > SEA_LEVEL && h < 0.8);
        for b in &t.cities[i + 1..] {
            assert!(a.distance(b) >= 7.0);
        }
    }
}

#[test]
fn land_fraction_is_respected() {
    let t = world(80, 60, 5);
    let land = t.land.iter().filter(|&&l| l).count() as f32;
    let fraction = land / t.land.len() as f32;
    assert!((fraction - 0.4).abs() < 0.02, "land fraction {fraction}");
}

#[test]
fn uniform_sampling_keeps_point_count() {
    let params = GenerationParams {
        sampling: SamplingMode::Uniform { count: 150 },
        relax_iterations: 2,
        ..GenerationParams::new(50, 50, 8)
    };
    let t = generate(&params).expect("generation succeeds");
    assert_eq!(t.diagram.len(), 150);
}

#[test]
fn config_file_drives_generation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("world.toml");
    std::fs::write(
        &path,
        "seed = 3\nwidth = 48\nheight = 32\nnum_cities = 2\njitter_enabled = false\n",
    )
    .expect("write config");

    let params = GenerationParams::from_toml_file(&path).expect("load");
    let t = generate(&params).expect("generation succeeds");
    assert_eq!((t.width, t.height, t.seed), (48, 32, 3));
    assert!(t.cities.len() <= 2);
}
