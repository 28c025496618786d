use geo::{Area, BooleanOps, LineString, MultiPolygon, Polygon};

use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::{collinear_overlap, segments_touch};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::{distance, Coord, CoordIndex};

use super::shape::Shape;

/// Boolean operations over the `geo` kernel, with results snapped back
/// onto a pool of reference vertices.
///
/// The kernel computes on a fixed-precision grid, so vertices it passes
/// through can drift by a few ulps of the bounding box. Snapping onto the
/// input vertices keeps coincident boundaries bit-identical, and the
/// cleaning pass drops sliver rings thinner than the tolerance.
#[derive(Debug, Clone)]
pub struct Kernel {
    tolerance: f64,
    pool: CoordIndex<()>,
}

impl Kernel {
    /// Creates a kernel snapping onto every vertex of `shapes`.
    #[must_use]
    pub fn new<'a>(tolerance: f64, shapes: impl IntoIterator<Item = &'a Shape>) -> Self {
        let pool = CoordIndex::from_coords(tolerance, shapes.into_iter().flat_map(Shape::coords));
        Self { tolerance, pool }
    }

    /// `a` minus `b`.
    #[must_use]
    pub fn difference(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        self.clean(&a.difference(b))
    }

    /// `a` intersected with `b`.
    #[must_use]
    pub fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        self.clean(&a.intersection(b))
    }

    /// Union of every multi-polygon in `parts`.
    #[must_use]
    pub fn union_all<'a>(
        &self,
        parts: impl IntoIterator<Item = &'a MultiPolygon<f64>>,
    ) -> MultiPolygon<f64> {
        let mut total = MultiPolygon::new(Vec::new());
        for part in parts {
            total = total.union(part);
        }
        self.clean(&total)
    }

    /// Snaps every vertex onto the reference pool, removes repeated
    /// vertices and drops rings whose mean width is below the tolerance.
    #[must_use]
    pub fn clean(&self, mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        let polygons = mp
            .iter()
            .filter_map(|polygon| {
                let exterior = self.clean_ring(polygon.exterior())?;
                let interiors = polygon
                    .interiors()
                    .iter()
                    .filter_map(|ring| self.clean_ring(ring))
                    .collect();
                Some(Polygon::new(exterior, interiors))
            })
            .collect();
        MultiPolygon::new(polygons)
    }

    fn clean_ring(&self, ring: &LineString<f64>) -> Option<LineString<f64>> {
        let mut coords: Vec<Coord> = Vec::with_capacity(ring.0.len());
        for &c in &ring.0 {
            let c = self.pool.snap(c);
            if coords.last().is_none_or(|&last| distance(last, c) > self.tolerance) {
                coords.push(c);
            }
        }
        while coords.len() > 1
            && distance(coords[0], coords[coords.len() - 1]) <= self.tolerance
        {
            coords.pop();
        }
        if coords.len() < 3 || is_sliver(&coords, self.tolerance) {
            return None;
        }
        coords.push(coords[0]);
        Some(LineString::new(coords))
    }
}

/// `true` if the ring encloses less area than a strip of width `tol`
/// running along its perimeter.
fn is_sliver(open: &[Coord], tol: f64) -> bool {
    let perimeter: f64 = (0..open.len())
        .map(|i| distance(open[i], open[(i + 1) % open.len()]))
        .sum();
    signed_area_2d(open).abs() <= tol * perimeter
}

/// Segments of a ring or polyline, skipping zero-length ones.
pub fn segments(line: &LineString<f64>, tol: f64) -> Vec<(Coord, Coord)> {
    line.lines()
        .filter(|l| distance(l.start, l.end) > tol)
        .map(|l| (l.start, l.end))
        .collect()
}

/// Fails unless every polygon of `shape` is simple: no ring crosses or
/// touches itself, and no two rings of one polygon meet.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidTopology`] naming `label`, or
/// [`GeometryError::Degenerate`] for a line with no extent.
pub fn validate_shape(label: &str, shape: &Shape, tol: f64) -> Result<()> {
    match shape {
        Shape::Polygon(p) => validate_polygon(label, p, tol),
        Shape::MultiPolygon(mp) => mp.iter().try_for_each(|p| validate_polygon(label, p, tol)),
        Shape::Line(l) => validate_line(label, l, tol),
        Shape::MultiLine(ml) => ml.iter().try_for_each(|l| validate_line(label, l, tol)),
        Shape::Point(_) => Ok(()),
    }
}

/// Fails unless `polygon` is simple with holes that touch nothing.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidTopology`] naming `label`.
pub fn validate_polygon(label: &str, polygon: &Polygon<f64>, tol: f64) -> Result<()> {
    if polygon.unsigned_area() <= tol * tol {
        return Err(invalid(label, "polygon encloses no area"));
    }
    let rings: Vec<Vec<(Coord, Coord)>> = std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| segments(ring, tol))
        .collect();

    for (i, ring) in rings.iter().enumerate() {
        if ring.len() < 3 {
            return Err(invalid(label, &format!("ring {i} has fewer than three edges")));
        }
        check_ring_simple(label, ring, tol)?;
        for (j, other) in rings.iter().enumerate().skip(i + 1) {
            let touches = ring
                .iter()
                .any(|&(a0, a1)| other.iter().any(|&(b0, b1)| segments_touch(a0, a1, b0, b1, tol)));
            if touches {
                return Err(invalid(label, &format!("rings {i} and {j} touch")));
            }
        }
    }
    Ok(())
}

fn validate_line(label: &str, line: &LineString<f64>, tol: f64) -> Result<()> {
    if segments(line, tol).is_empty() {
        return Err(GeometryError::Degenerate(format!("line `{label}` has no extent")).into());
    }
    Ok(())
}

fn check_ring_simple(label: &str, ring: &[(Coord, Coord)], tol: f64) -> Result<()> {
    let n = ring.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a0, a1) = ring[i];
            let (b0, b1) = ring[j];
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            let bad = if adjacent {
                // Neighbours share a vertex; only a fold back along the same line is bad.
                collinear_overlap(a0, a1, b0, b1, tol).is_some()
            } else {
                segments_touch(a0, a1, b0, b1, tol)
            };
            if bad {
                return Err(invalid(
                    label,
                    &format!("ring touches itself near ({}, {})", a0.x, a0.y),
                ));
            }
        }
    }
    Ok(())
}

fn invalid(label: &str, reason: &str) -> crate::error::TesseraError {
    GeometryError::InvalidTopology {
        label: label.to_owned(),
        reason: reason.to_owned(),
    }
    .into()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{line_string, polygon, Rect};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Rect::new((x0, y0), (x1, y1)).to_polygon()
    }

    fn mp(p: Polygon<f64>) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![p])
    }

    #[test]
    fn difference_keeps_exact_vertices() {
        let a = Shape::from(square(0.0, 0.0, 2.0, 1.0));
        let b = Shape::from(square(1.0, 0.0, 3.0, 1.0));
        let kernel = Kernel::new(1e-7, [&a, &b]);
        let diff = kernel.difference(&a.to_multi_polygon().unwrap(), &b.to_multi_polygon().unwrap());
        assert_relative_eq!(diff.unsigned_area(), 1.0, epsilon = 1e-9);
        for c in diff.0[0].exterior().coords() {
            assert!(c.x == 0.0 || c.x == 1.0, "x={}", c.x);
            assert!(c.y == 0.0 || c.y == 1.0, "y={}", c.y);
        }
    }

    #[test]
    fn fully_covered_difference_is_empty() {
        let a = Shape::from(square(0.0, 0.0, 1.0, 1.0));
        let b = Shape::from(square(-1.0, -1.0, 2.0, 2.0));
        let kernel = Kernel::new(1e-7, [&a, &b]);
        let diff = kernel.difference(&a.to_multi_polygon().unwrap(), &b.to_multi_polygon().unwrap());
        assert!(diff.0.is_empty());
    }

    #[test]
    fn union_of_adjacent_squares() {
        let kernel = Kernel::new(1e-7, []);
        let total = kernel.union_all([&mp(square(0.0, 0.0, 1.0, 1.0)), &mp(square(1.0, 0.0, 2.0, 1.0))]);
        assert_eq!(total.0.len(), 1);
        assert_relative_eq!(total.unsigned_area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn clean_drops_slivers() {
        let kernel = Kernel::new(1e-6, []);
        let sliver = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1e-8), (x: 0.0, y: 1e-8)];
        assert!(kernel.clean(&mp(sliver)).0.is_empty());
    }

    #[test]
    fn simple_polygon_with_hole_is_valid() {
        let p = Polygon::new(
            square(0.0, 0.0, 3.0, 3.0).exterior().clone(),
            vec![square(1.0, 1.0, 2.0, 2.0).exterior().clone()],
        );
        validate_polygon("clad", &p, 1e-9).unwrap();
    }

    #[test]
    fn hole_touching_exterior_is_rejected() {
        let p = Polygon::new(
            square(0.0, 0.0, 3.0, 3.0).exterior().clone(),
            vec![line_string![(x: 0.0, y: 1.0), (x: 1.0, y: 1.0), (x: 1.0, y: 2.0), (x: 0.0, y: 1.0)]],
        );
        let err = validate_polygon("clad", &p, 1e-9).unwrap_err();
        assert!(err.to_string().contains("clad"), "{err}");
    }

    #[test]
    fn bowtie_is_rejected() {
        let p = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        assert!(validate_polygon("bowtie", &p, 1e-9).is_err());
    }

    #[test]
    fn degenerate_line_is_rejected() {
        let shape = Shape::from(line_string![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0)]);
        let err = validate_shape("edge", &shape, 1e-9).unwrap_err();
        assert!(matches!(
            err,
            crate::error::TesseraError::Geometry(GeometryError::Degenerate(ref msg)) if msg.contains("edge")
        ));
    }
}
