//! Гидрология: направление стока, накопление потока и трассировка рек

use serde::Serialize;

use crate::grid::{Grid, Heightmap};

/// Поле стока по тайлам
#[derive(Debug, Clone, Serialize)]
pub struct FlowField {
    pub width: u32,
    pub height: u32,
    /// Самый низкий из строго более низких соседей (вверх, вниз, влево, вправо)
    pub downslope: Vec<Option<usize>>,
    /// Накопленный поток: сам тайл (1) плюс всё, что в него стекает
    pub flux: Vec<f32>,
}

/// Путь реки в координатах тайлов, от истока к устью
pub type RiverPath = Vec<(u32, u32)>;

/// Реки, проложенные по полю стока
#[derive(Debug, Clone, Serialize)]
pub struct RiverNetwork {
    /// Номер реки в тайле (0 = нет реки, реки нумеруются с 1)
    pub river_id: Grid<u32>,
    /// Ширина реки `max(1, floor(log2(flux)))`, 0 вне рек
    pub river_width: Grid<u8>,
    pub paths: Vec<RiverPath>,
}

/// Направления стока и накопленный поток.
///
/// Тайлы обрабатываются по убыванию высоты (при равенстве по индексу), так что
/// поток тайла окончателен до того, как он передаётся вниз по склону.
#[must_use]
pub fn compute_flow(heightmap: &Heightmap) -> FlowField {
    let elevation = &heightmap.data;

    let downslope: Vec<Option<usize>> = (0..heightmap.len())
        .map(|idx| {
            let mut min_h = elevation[idx];
            let mut best = None;
            for n in heightmap.neighbors4(idx) {
                if elevation[n] < min_h {
                    min_h = elevation[n];
                    best = Some(n);
                }
            }
            best
        })
        .collect();

    // Сортируем индексы от вершин к низинам
    let mut order: Vec<usize> = (0..heightmap.len()).collect();
    order.sort_by(|&a, &b| elevation[b].total_cmp(&elevation[a]).then(a.cmp(&b)));

    let mut flux = vec![1.0_f32; heightmap.len()];
    for idx in order {
        if let Some(target) = downslope[idx] {
            flux[target] += flux[idx];
        }
    }

    FlowField {
        width: heightmap.width,
        height: heightmap.height,
        downslope,
        flux,
    }
}

/// Трассирует реки от тайлов с потоком не меньше `min_flux`.
///
/// Истоки берутся по убыванию потока. Путь идёт по направлениям стока, пока тайл
/// не ниже уровня моря, и обрывается на уже занятом тайле (он становится устьем
/// притока), в локальном минимуме или перед тайлом ниже уровня моря.
/// Пути из одного тайла отбрасываются.
#[must_use]
pub fn trace_rivers(
    flow: &FlowField,
    heightmap: &Heightmap,
    min_flux: f32,
    sea_level: f32,
) -> RiverNetwork {
    let elevation = &heightmap.data;
    let mut river_id: Grid<u32> = Grid::new(flow.width, flow.height);
    let mut river_width: Grid<u8> = Grid::new(flow.width, flow.height);
    let mut visited = vec![false; elevation.len()];
    let mut paths = Vec::new();

    let mut sources: Vec<usize> = (0..flow.flux.len())
        .filter(|&i| flow.flux[i] >= min_flux)
        .collect();
    sources.sort_by(|&a, &b| flow.flux[b].total_cmp(&flow.flux[a]).then(a.cmp(&b)));

    for source in sources {
        if visited[source] {
            continue;
        }
        let mut line = Vec::new();
        let mut current = source;
        while elevation[current] >= sea_level {
            line.push(current);
            if visited[current] {
                // Впадаем в уже проложенную реку: слияние становится последним тайлом пути
                break;
            }
            visited[current] = true;
            match flow.downslope[current] {
                Some(next) if elevation[next] >= sea_level => current = next,
                _ => break,
            }
        }

        if line.len() > 1 {
            let id = paths.len() as u32 + 1;
            for &idx in &line {
                if river_id.data[idx] == 0 {
                    river_id.data[idx] = id;
                    river_width.data[idx] = width_for_flux(flow.flux[idx]);
                }
            }
            paths.push(line.into_iter().map(|idx| river_id.coords(idx)).collect());
        }
    }

    log::debug!("Rivers: {} traced", paths.len());
    RiverNetwork {
        river_id,
        river_width,
        paths,
    }
}

/// Ширина реки по потоку
#[must_use]
pub fn width_for_flux(flux: f32) -> u8 {
    flux.log2().floor().clamp(1.0, f32::from(u8::MAX)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Наклонная плоскость: высота растёт с x, у левого края море
    fn ramp(width: u32, height: u32) -> Heightmap {
        let mut hm = Heightmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let h = x as f32 / width as f32 + y as f32 * 0.001;
                hm.set(x, y, h);
            }
        }
        hm
    }

    #[test]
    fn downslope_points_strictly_lower() {
        let hm = ramp(8, 5);
        let flow = compute_flow(&hm);
        for (idx, target) in flow.downslope.iter().enumerate() {
            if let Some(t) = target {
                assert!(hm.data[*t] < hm.data[idx]);
            }
        }
        // Левый верхний угол является глобальным минимумом
        assert_eq!(flow.downslope[0], None);
    }

    #[test]
    fn flow_chains_terminate() {
        let hm = ramp(12, 7);
        let flow = compute_flow(&hm);
        for start in 0..hm.len() {
            let mut current = start;
            let mut steps = 0;
            while let Some(next) = flow.downslope[current] {
                current = next;
                steps += 1;
                assert!(steps <= hm.len());
            }
        }
    }

    #[test]
    fn flux_conserves_area() {
        let hm = ramp(6, 4);
        let flow = compute_flow(&hm);
        let sinks: f32 = flow
            .downslope
            .iter()
            .zip(&flow.flux)
            .filter(|(d, _)| d.is_none())
            .map(|(_, f)| *f)
            .sum();
        assert!((sinks - 24.0).abs() < 1e-4);
    }

    #[test]
    fn rivers_flow_downhill_to_the_sea() {
        let hm = ramp(20, 6);
        let flow = compute_flow(&hm);
        let rivers = trace_rivers(&flow, &hm, 3.0, 0.26);
        assert!(!rivers.paths.is_empty());
        for path in &rivers.paths {
            assert!(path.len() > 1);
            for w in path.windows(2) {
                assert!(hm.get(w[1].0, w[1].1) <= hm.get(w[0].0, w[0].1));
            }
            for &(x, y) in path {
                assert!(*hm.get(x, y) >= 0.26);
                assert!(*rivers.river_width.get(x, y) >= 1);
                assert!(*rivers.river_id.get(x, y) > 0);
            }
        }
    }

    #[test]
    fn width_grows_with_flux() {
        assert_eq!(width_for_flux(1.0), 1);
        assert_eq!(width_for_flux(3.0), 1);
        assert_eq!(width_for_flux(8.0), 3);
        assert_eq!(width_for_flux(1000.0), 9);
    }
}
