//! Области одного биома и извилистые границы между ними

use std::collections::BTreeSet;

use crate::biome::Biome;
use crate::geometry::Point;
use crate::noise::NoiseField;
use crate::voronoi::VoronoiDiagram;

/// Максимальная длина отрезка границы после разбиения
const MAX_SEGMENT: f64 = 5.0;

/// Номер области для каждой ячейки.
///
/// Область состоит из связной по смежности группы ячеек одного биома. Ячейки обходятся
/// по возрастанию индекса, каждая ещё не размеченная начинает новую область
/// (обход в глубину), так что номера идут с 0 без пропусков.
#[must_use]
pub fn regions(biomes: &[Biome], adjacency: &[BTreeSet<usize>]) -> Vec<usize> {
    let mut region = vec![usize::MAX; biomes.len()];
    let mut next_id = 0;
    let mut stack = Vec::new();

    for start in 0..biomes.len() {
        if region[start] != usize::MAX {
            continue;
        }
        region[start] = next_id;
        stack.push(start);
        while let Some(i) = stack.pop() {
            for &j in &adjacency[i] {
                if region[j] == usize::MAX && biomes[j] == biomes[start] {
                    region[j] = next_id;
                    stack.push(j);
                }
            }
        }
        next_id += 1;
    }

    log::debug!("Regions: {next_id}");
    region
}

/// Кривые на границах соседних ячеек с разными биомами.
///
/// Каждая пара соседей рассматривается один раз (`i < j`). Общее ребро делится
/// на части не длиннее [`MAX_SEGMENT`] (минимум две), внутренние точки
/// сдвигаются по нормали к ребру на `noise(p × frequency) × amplitude`.
/// Концы остаются на месте, поэтому соседние кривые не расходятся.
#[must_use]
pub fn borders(
    diagram: &VoronoiDiagram,
    biomes: &[Biome],
    amplitude: f64,
    frequency: f64,
    seed: i32,
) -> Vec<Vec<Point>> {
    let noise = NoiseField::simple(seed, 1.0);
    let mut curves = Vec::new();

    for (i, neighbors) in diagram.adjacency.iter().enumerate() {
        for &j in neighbors.range(i + 1..) {
            if biomes[i] == biomes[j] {
                continue;
            }
            for (a, b) in diagram.shared_boundary(i, j) {
                curves.push(jagged_edge(a, b, &noise, amplitude, frequency));
            }
        }
    }

    log::debug!("Borders: {} curves", curves.len());
    curves
}

fn jagged_edge(a: Point, b: Point, noise: &NoiseField, amplitude: f64, frequency: f64) -> Vec<Point> {
    let steps = ((a.distance(b) / MAX_SEGMENT).ceil() as usize).max(2);
    let Some(normal) = (b - a).unit_normal() else {
        return vec![a, b];
    };

    (0..=steps)
        .map(|k| {
            let p = a.lerp(b, k as f64 / steps as f64);
            if k == 0 || k == steps {
                return p;
            }
            let offset = f64::from(noise.signed(p.x * frequency, p.y * frequency)) * amplitude;
            p + normal * offset
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voronoi;

    fn halves(height: f64) -> VoronoiDiagram {
        let points = [Point::new(5.0, height / 2.0), Point::new(15.0, height / 2.0)];
        voronoi::build(&points, 20.0, height).expect("voronoi")
    }

    #[test]
    fn regions_follow_adjacency_and_biome() {
        // Цепочка 0-1-2-3, биомы: A A B A
        let adjacency: Vec<BTreeSet<usize>> = vec![
            BTreeSet::from([1]),
            BTreeSet::from([0, 2]),
            BTreeSet::from([1, 3]),
            BTreeSet::from([2]),
        ];
        let biomes = [Biome::Forest, Biome::Forest, Biome::Desert, Biome::Forest];
        assert_eq!(regions(&biomes, &adjacency), vec![0, 0, 1, 2]);
    }

    #[test]
    fn same_biome_has_no_border() {
        let diagram = halves(10.0);
        let curves = borders(&diagram, &[Biome::Snow, Biome::Snow], 1.0, 0.1, 1);
        assert!(curves.is_empty());
    }

    #[test]
    fn border_keeps_endpoints() {
        let diagram = halves(10.0);
        let curves = borders(&diagram, &[Biome::Snow, Biome::Desert], 1.0, 0.1, 1);
        assert_eq!(curves.len(), 1);

        let curve = &curves[0];
        assert_eq!(curve.len(), 3);
        let mut ends = [curve[0], curve[2]];
        ends.sort_by(|p, q| p.y.total_cmp(&q.y));
        assert!(ends[0].distance(Point::new(10.0, 0.0)) < 1e-9);
        assert!(ends[1].distance(Point::new(10.0, 10.0)) < 1e-9);
    }

    #[test]
    fn long_border_is_displaced_within_amplitude() {
        let diagram = halves(40.0);
        let amplitude = 2.0;
        let curves = borders(&diagram, &[Biome::Snow, Biome::Desert], amplitude, 0.1, 5);
        let curve = &curves[0];
        assert_eq!(curve.len(), 9);

        let offsets: Vec<f64> = curve.iter().map(|p| (p.x - 10.0).abs()).collect();
        assert!(offsets.iter().all(|&d| d <= amplitude + 1e-9));
        assert!(offsets[1..8].iter().any(|&d| d > 1e-6));
        assert!(offsets[0] < 1e-9 && offsets[8] < 1e-9);
    }
}
