use geo::{LineString, MultiPolygon, Polygon};
use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::kernel::{validate_polygon, validate_shape};
use crate::geometry::{Kernel, OrderedShapes, Shape};
use crate::math::TOLERANCE;
use crate::operations::split::break_against;

use super::{BrokenCurve, CurveRole, TiledRegion, Tiling};

/// Tiles an ordered collection by letting winning shapes cut losing ones.
///
/// Each areal shape is reduced by every shape that beats it under the
/// collection's precedence, giving one region per label with pairwise
/// disjoint interiors. Every ring and line is then broken against the
/// rings and lines of every other label, so touching regions share
/// identical boundary segments.
pub struct TileOrdered<'a> {
    shapes: &'a OrderedShapes,
    tolerance: f64,
}

impl<'a> TileOrdered<'a> {
    /// Creates a new `TileOrdered` operation with the default tolerance.
    #[must_use]
    pub fn new(shapes: &'a OrderedShapes) -> Self {
        Self {
            shapes,
            tolerance: TOLERANCE,
        }
    }

    /// Sets the coincidence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the tiling.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidTopology`](crate::error::GeometryError)
    /// if an input shape is not simple, or if a region becomes self-touching
    /// once overlaps are resolved.
    pub fn execute(&self) -> Result<Tiling> {
        let tol = self.tolerance;
        let named = self.shapes.shapes();
        for shape in named {
            validate_shape(&shape.label, &shape.shape, tol)?;
        }
        let kernel = Kernel::new(tol, named.iter().map(|s| &s.shape));

        // Step 1: precedence.
        let mut regions: Vec<TiledRegion> = Vec::new();
        for (i, shape) in named.iter().enumerate() {
            let Some(own) = shape.shape.to_multi_polygon() else {
                continue;
            };
            let mut remaining = kernel.clean(&own);
            for winner in self.shapes.winners_over(i) {
                if remaining.0.is_empty() {
                    break;
                }
                if let Some(cut) = winner.shape.to_multi_polygon() {
                    remaining = kernel.difference(&remaining, &cut);
                }
            }
            if remaining.0.is_empty() {
                warn!(label = %shape.label, "region fully overridden by higher-precedence shapes");
                continue;
            }
            for polygon in &remaining {
                validate_polygon(&shape.label, polygon, tol)?;
            }
            regions.push(TiledRegion {
                label: shape.label.clone(),
                polygons: remaining,
            });
        }

        // Step 2: boundary conformance against every other label.
        let lines: Vec<(&str, Vec<LineString<f64>>)> = named
            .iter()
            .filter(|s| matches!(s.shape, Shape::Line(_) | Shape::MultiLine(_)))
            .map(|s| (s.label.as_str(), s.shape.lines()))
            .collect();
        let boundaries: Vec<(&str, Vec<&LineString<f64>>)> = regions
            .iter()
            .map(|r| (r.label.as_str(), rings(&r.polygons)))
            .chain(lines.iter().map(|(l, ls)| (*l, ls.iter().collect())))
            .collect();
        let others_of = |label: &str| -> Vec<&LineString<f64>> {
            boundaries
                .iter()
                .filter(|(l, _)| *l != label)
                .flat_map(|(_, ls)| ls.iter().copied())
                .collect()
        };

        let mut tiling = Tiling::default();
        for region in &regions {
            let others = others_of(&region.label);
            let mut broken = Vec::with_capacity(region.polygons.0.len());
            for polygon in &region.polygons {
                let exterior = break_against(polygon.exterior(), others.iter().copied(), tol);
                let interiors: Vec<LineString<f64>> = polygon
                    .interiors()
                    .iter()
                    .map(|ring| break_against(ring, others.iter().copied(), tol))
                    .collect();
                tiling.curves.push(BrokenCurve {
                    label: region.label.clone(),
                    role: CurveRole::Exterior,
                    line: exterior.clone(),
                });
                tiling.curves.extend(interiors.iter().map(|ring| BrokenCurve {
                    label: region.label.clone(),
                    role: CurveRole::Interior,
                    line: ring.clone(),
                }));
                // Step 3: reassemble.
                broken.push(Polygon::new(exterior, interiors));
            }
            tiling.regions.push(TiledRegion {
                label: region.label.clone(),
                polygons: MultiPolygon::new(broken),
            });
        }

        for (label, ls) in &lines {
            let others = others_of(label);
            for line in ls {
                tiling.curves.push(BrokenCurve {
                    label: (*label).to_owned(),
                    role: CurveRole::Line,
                    line: break_against(line, others.iter().copied(), tol),
                });
            }
        }

        for shape in named {
            if let Shape::Point(p) = &shape.shape {
                tiling.points.push((shape.label.clone(), p.0));
            }
        }

        debug!(
            regions = tiling.regions.len(),
            curves = tiling.curves.len(),
            points = tiling.points.len(),
            "ordered tiling complete"
        );
        Ok(tiling)
    }
}

fn rings(mp: &MultiPolygon<f64>) -> Vec<&LineString<f64>> {
    mp.iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{GeometryError, TesseraError};
    use crate::geometry::{NamedShape, Precedence};
    use approx::assert_relative_eq;
    use geo::{line_string, Area, BooleanOps, Rect};

    fn rect(label: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> NamedShape {
        NamedShape::new(label, Rect::new((x0, y0), (x1, y1)).to_polygon())
    }

    fn tile(shapes: Vec<NamedShape>, precedence: Precedence) -> Tiling {
        let ordered = OrderedShapes::new(shapes, precedence).unwrap();
        TileOrdered::new(&ordered).execute().unwrap()
    }

    fn has_segment(curves: &[&BrokenCurve], a: (f64, f64), b: (f64, f64)) -> bool {
        let close = |p: crate::math::Coord, q: (f64, f64)| {
            (p.x - q.0).abs() < 1e-9 && (p.y - q.1).abs() < 1e-9
        };
        curves.iter().flat_map(|c| c.segments()).any(|(p, q)| {
            (close(p, a) && close(q, b)) || (close(p, b) && close(q, a))
        })
    }

    #[test]
    fn later_shapes_take_precedence() {
        let tiling = tile(
            vec![
                rect("a", 0.0, 0.0, 3.0, 3.0),
                rect("b", 1.0, 1.0, 4.0, 4.0),
                rect("c", 2.0, 2.0, 5.0, 5.0),
            ],
            Precedence::LaterWins,
        );
        // c unchanged, b loses c's share, a loses both.
        assert_relative_eq!(tiling.region("c").unwrap().area(), 9.0, epsilon = 1e-9);
        assert_relative_eq!(tiling.region("b").unwrap().area(), 9.0 - 4.0, epsilon = 1e-9);
        // a ∩ c lies inside a ∩ b, so a loses exactly a ∩ b.
        assert_relative_eq!(tiling.region("a").unwrap().area(), 9.0 - 4.0, epsilon = 1e-9);
    }

    #[test]
    fn earlier_shapes_take_precedence() {
        let tiling = tile(
            vec![rect("core", 1.0, 1.0, 2.0, 2.0), rect("clad", 0.0, 0.0, 3.0, 3.0)],
            Precedence::EarlierWins,
        );
        assert_relative_eq!(tiling.region("core").unwrap().area(), 1.0, epsilon = 1e-9);
        let clad = tiling.region("clad").unwrap();
        assert_relative_eq!(clad.area(), 8.0, epsilon = 1e-9);
        assert_eq!(clad.polygons.0[0].interiors().len(), 1);
    }

    #[test]
    fn regions_cover_inputs_and_are_disjoint() {
        let shapes = vec![
            rect("box", -2.0, -2.0, 2.0, 0.0),
            rect("clad", -2.0, 0.0, 2.0, 2.0),
            rect("core", -0.5, -0.5, 0.5, 0.5),
            rect("heater", 1.5, 1.0, 3.0, 1.5),
        ];
        let tiling = tile(shapes.clone(), Precedence::LaterWins);

        let input_union = shapes
            .iter()
            .filter_map(|s| s.shape.to_multi_polygon())
            .fold(MultiPolygon::new(Vec::new()), |acc, mp| acc.union(&mp));
        let total: f64 = tiling.regions.iter().map(TiledRegion::area).sum();
        assert_relative_eq!(total, input_union.unsigned_area(), epsilon = 1e-9);

        for (i, a) in tiling.regions.iter().enumerate() {
            for b in &tiling.regions[i + 1..] {
                let overlap = a.polygons.intersection(&b.polygons).unsigned_area();
                assert!(overlap < 1e-9, "{} and {} overlap by {overlap}", a.label, b.label);
            }
        }
    }

    #[test]
    fn shared_edge_is_identical_on_both_sides() {
        let tiling = tile(
            vec![rect("core", -1.0, 0.0, 0.0, 1.0), rect("clad", 0.0, 0.0, 1.0, 1.0)],
            Precedence::LaterWins,
        );
        let core: Vec<&BrokenCurve> = tiling.curves_for("core").collect();
        let clad: Vec<&BrokenCurve> = tiling.curves_for("clad").collect();
        assert!(has_segment(&core, (0.0, 0.0), (0.0, 1.0)));
        assert!(has_segment(&clad, (0.0, 0.0), (0.0, 1.0)));
    }

    #[test]
    fn partially_shared_edge_is_split() {
        let tiling = tile(
            vec![rect("clad", 0.0, 0.0, 1.0, 2.0), rect("core", -1.0, 0.5, 0.0, 1.5)],
            Precedence::LaterWins,
        );
        let clad: Vec<&BrokenCurve> = tiling.curves_for("clad").collect();
        let core: Vec<&BrokenCurve> = tiling.curves_for("core").collect();
        assert!(has_segment(&clad, (0.0, 0.5), (0.0, 1.5)));
        assert!(has_segment(&core, (0.0, 0.5), (0.0, 1.5)));
        assert!(has_segment(&clad, (0.0, 0.0), (0.0, 0.5)));
        assert!(has_segment(&clad, (0.0, 1.5), (0.0, 2.0)));
    }

    #[test]
    fn lines_are_broken_against_regions() {
        let tiling = tile(
            vec![
                NamedShape::new("bottom", line_string![(x: -2.0, y: 0.0), (x: 2.0, y: 0.0)]),
                rect("box", -1.0, 0.0, 1.0, 1.0),
            ],
            Precedence::LaterWins,
        );
        let bottom: Vec<&BrokenCurve> = tiling.lines().collect();
        assert_eq!(bottom.len(), 1);
        assert_eq!(bottom[0].line.0.len(), 4);
        let boxed: Vec<&BrokenCurve> = tiling.curves_for("box").collect();
        assert!(has_segment(&bottom, (-1.0, 0.0), (1.0, 0.0)));
        assert!(has_segment(&boxed, (-1.0, 0.0), (1.0, 0.0)));
    }

    #[test]
    fn overridden_region_is_dropped() {
        let tiling = tile(
            vec![rect("hidden", 0.0, 0.0, 1.0, 1.0), rect("cover", -1.0, -1.0, 2.0, 2.0)],
            Precedence::LaterWins,
        );
        assert!(tiling.region("hidden").is_none());
        assert_eq!(tiling.regions.len(), 1);
        assert!(tiling.curves_for("hidden").next().is_none());
    }

    #[test]
    fn self_touching_input_fails_fast() {
        let pinched = Polygon::new(
            Rect::new((0.0, 0.0), (3.0, 3.0)).to_polygon().exterior().clone(),
            vec![line_string![(x: 0.0, y: 1.0), (x: 1.0, y: 1.0), (x: 1.0, y: 2.0), (x: 0.0, y: 1.0)]],
        );
        let ordered = OrderedShapes::new(
            [NamedShape::new("pinched", pinched), rect("other", 5.0, 5.0, 6.0, 6.0)],
            Precedence::LaterWins,
        )
        .unwrap();
        let err = TileOrdered::new(&ordered).execute().unwrap_err();
        assert!(matches!(
            err,
            TesseraError::Geometry(GeometryError::InvalidTopology { ref label, .. }) if label == "pinched"
        ));
    }

    #[test]
    fn region_pinched_by_precedence_fails_fast() {
        // Removing a and b from clad leaves it touching itself at (2, 2).
        let ordered = OrderedShapes::new(
            [
                rect("clad", 0.0, 0.0, 3.0, 3.0),
                rect("a", 1.0, 1.0, 2.0, 2.0),
                rect("b", 2.0, 2.0, 3.0, 3.0),
            ],
            Precedence::LaterWins,
        )
        .unwrap();
        let err = TileOrdered::new(&ordered).execute().unwrap_err();
        assert!(matches!(
            err,
            TesseraError::Geometry(GeometryError::InvalidTopology { ref label, .. }) if label == "clad"
        ));
    }

    #[test]
    fn points_pass_through() {
        let tiling = tile(
            vec![rect("clad", 0.0, 0.0, 1.0, 1.0), NamedShape::new("probe", geo::Point::new(0.5, 0.5))],
            Precedence::LaterWins,
        );
        assert_eq!(tiling.points.len(), 1);
        assert_eq!(tiling.points[0].0, "probe");
    }
}
