use std::collections::{BTreeSet, HashSet};

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{LineString, Polygon};

use crate::math::intersect_2d::segment_hit_params;
use crate::math::polygon_2d::{rotate_to_canonical_start, signed_area_2d};
use crate::math::{distance, Coord, CoordIndex};

use super::kernel::segments;

/// Builds the faces of the planar arrangement formed by `lines`.
///
/// All segments are noded against each other first (crossings, touches and
/// collinear overlaps all split), dangling edges are pruned, and every
/// bounded face is traced with the left-hand rule. Clockwise cycles become
/// holes of the smallest face that encloses them. Faces thinner than `tol`
/// are dropped.
#[must_use]
pub fn polygonize(lines: &[LineString<f64>], tol: f64) -> Vec<Polygon<f64>> {
    let graph = PlanarGraph::build(lines, tol);
    let cycles = graph.trace_cycles();

    let mut shells: Vec<(f64, Polygon<f64>)> = Vec::new();
    let mut holes: Vec<Vec<Coord>> = Vec::new();
    for cycle in cycles {
        let area = signed_area_2d(&cycle);
        let perimeter: f64 = (0..cycle.len())
            .map(|i| distance(cycle[i], cycle[(i + 1) % cycle.len()]))
            .sum();
        if area.abs() <= tol * perimeter {
            continue;
        }
        if area > 0.0 {
            let ring = closed(rotate_to_canonical_start(&cycle, tol));
            shells.push((area, Polygon::new(ring, Vec::new())));
        } else {
            holes.push(cycle);
        }
    }

    let mut interiors: Vec<Vec<LineString<f64>>> = vec![Vec::new(); shells.len()];
    for hole in holes {
        let owner = shells
            .iter()
            .enumerate()
            .filter(|(_, (_, shell))| encloses(shell, &hole))
            .min_by(|(_, (a, _)), (_, (b, _))| a.total_cmp(b))
            .map(|(i, _)| i);
        // Unowned clockwise cycles are the outer boundary of a component.
        if let Some(i) = owner {
            interiors[i].push(closed(hole));
        }
    }

    shells
        .into_iter()
        .zip(interiors)
        .map(|((_, shell), holes)| {
            let (exterior, _) = shell.into_inner();
            Polygon::new(exterior, holes)
        })
        .collect()
}

fn closed(mut ring: Vec<Coord>) -> LineString<f64> {
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    LineString::new(ring)
}

/// A hole candidate belongs to a shell from another component, so its
/// vertices are either all strictly inside the shell or none are.
fn encloses(shell: &Polygon<f64>, cycle: &[Coord]) -> bool {
    cycle
        .iter()
        .map(|c| shell.coordinate_position(c))
        .find(|pos| *pos != CoordPos::OnBoundary)
        == Some(CoordPos::Inside)
}

/// Noded, deduplicated segment graph.
struct PlanarGraph {
    nodes: Vec<Coord>,
    /// Neighbours of each node, sorted counter-clockwise by angle.
    adjacency: Vec<Vec<usize>>,
}

impl PlanarGraph {
    fn build(lines: &[LineString<f64>], tol: f64) -> Self {
        let segs: Vec<(Coord, Coord)> = lines.iter().flat_map(|l| segments(l, tol)).collect();

        let mut index: CoordIndex<usize> = CoordIndex::new(tol);
        let mut nodes: Vec<Coord> = Vec::new();
        let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();

        for (i, &(a0, a1)) in segs.iter().enumerate() {
            let len = distance(a0, a1);
            let mut params = vec![0.0, 1.0];
            for (j, &(b0, b1)) in segs.iter().enumerate() {
                if i != j {
                    params.extend(segment_hit_params(a0, a1, b0, b1, tol));
                }
            }
            params.sort_by(f64::total_cmp);
            params.dedup_by(|b, a| (*b - *a) * len <= tol);

            let mut prev: Option<usize> = None;
            for t in params {
                let c = a0 + (a1 - a0) * t;
                let id = index.find_or_insert_with(c, || {
                    nodes.push(c);
                    nodes.len() - 1
                });
                if let Some(p) = prev {
                    if p != id {
                        edges.insert((p.min(id), p.max(id)));
                    }
                }
                prev = Some(id);
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for &(u, v) in &edges {
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        prune_dangles(&mut adjacency);

        for (u, nbrs) in adjacency.iter_mut().enumerate() {
            let origin = nodes[u];
            nbrs.sort_by(|&a, &b| angle(origin, nodes[a]).total_cmp(&angle(origin, nodes[b])));
        }

        Self { nodes, adjacency }
    }

    /// Traces every directed edge into the cycle keeping its face on the left.
    fn trace_cycles(&self) -> Vec<Vec<Coord>> {
        let mut visited: HashSet<(usize, usize)> = HashSet::new();
        let mut cycles = Vec::new();

        for (start, nbrs) in self.adjacency.iter().enumerate() {
            for &next in nbrs {
                if visited.contains(&(start, next)) {
                    continue;
                }
                let mut cycle = Vec::new();
                let (mut u, mut v) = (start, next);
                while visited.insert((u, v)) {
                    cycle.push(self.nodes[u]);
                    let around = &self.adjacency[v];
                    let Some(k) = around.iter().position(|&w| w == u) else {
                        break;
                    };
                    let w = around[(k + around.len() - 1) % around.len()];
                    (u, v) = (v, w);
                }
                if cycle.len() >= 3 {
                    cycles.push(cycle);
                }
            }
        }
        cycles
    }
}

fn angle(origin: Coord, to: Coord) -> f64 {
    (to.y - origin.y).atan2(to.x - origin.x)
}

fn prune_dangles(adjacency: &mut [Vec<usize>]) {
    let mut stack: Vec<usize> = (0..adjacency.len())
        .filter(|&u| adjacency[u].len() == 1)
        .collect();
    while let Some(u) = stack.pop() {
        let Some(&v) = adjacency[u].first() else {
            continue;
        };
        adjacency[u].clear();
        adjacency[v].retain(|&w| w != u);
        if adjacency[v].len() == 1 {
            stack.push(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{Area, Rect};

    const TOL: f64 = 1e-9;

    fn ring(x0: f64, y0: f64, x1: f64, y1: f64) -> LineString<f64> {
        Rect::new((x0, y0), (x1, y1)).to_polygon().exterior().clone()
    }

    fn sorted_areas(polys: &[Polygon<f64>]) -> Vec<f64> {
        let mut areas: Vec<f64> = polys.iter().map(Area::unsigned_area).collect();
        areas.sort_by(f64::total_cmp);
        areas
    }

    #[test]
    fn single_square() {
        let faces = polygonize(&[ring(0.0, 0.0, 1.0, 1.0)], TOL);
        assert_eq!(faces.len(), 1);
        assert_relative_eq!(faces[0].unsigned_area(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn overlapping_squares_give_three_faces() {
        let faces = polygonize(&[ring(0.0, 0.0, 2.0, 2.0), ring(1.0, 1.0, 3.0, 3.0)], TOL);
        let areas = sorted_areas(&faces);
        assert_eq!(areas.len(), 3, "areas={areas:?}");
        assert_relative_eq!(areas[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(areas[1], 3.0, epsilon = 1e-12);
        assert_relative_eq!(areas[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn nested_square_becomes_hole() {
        let faces = polygonize(&[ring(0.0, 0.0, 3.0, 3.0), ring(1.0, 1.0, 2.0, 2.0)], TOL);
        let areas = sorted_areas(&faces);
        assert_eq!(areas.len(), 2);
        assert_relative_eq!(areas[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(areas[1], 8.0, epsilon = 1e-12);
        let outer = faces.iter().find(|p| p.interiors().len() == 1);
        assert!(outer.is_some());
    }

    #[test]
    fn shared_edge_is_not_duplicated() {
        let faces = polygonize(&[ring(0.0, 0.0, 1.0, 1.0), ring(1.0, 0.0, 2.0, 1.0)], TOL);
        assert_eq!(sorted_areas(&faces), vec![1.0, 1.0]);
    }

    #[test]
    fn dangling_edge_is_pruned() {
        let mut lines = vec![ring(0.0, 0.0, 1.0, 1.0)];
        lines.push(LineString::from(vec![(1.0, 0.5), (2.0, 0.5)]));
        let faces = polygonize(&lines, TOL);
        assert_eq!(faces.len(), 1);
        assert_relative_eq!(faces[0].unsigned_area(), 1.0, epsilon = 1e-12);
    }
}
