use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::Polygon;

use crate::math::distance_2d::coord_to_segments_dist;
use crate::math::Coord;

/// A scalar target element size over the plane.
///
/// Components that do not apply at a location report `f64::INFINITY`, so a
/// [`SizeField::Min`] of them picks the finest size that does apply.
#[derive(Debug, Clone, PartialEq)]
pub enum SizeField {
    /// The same size everywhere.
    Constant(f64),
    /// `field` inside (or on the boundary of) any of `surfaces`, infinite
    /// elsewhere.
    Restrict {
        field: Box<SizeField>,
        surfaces: Vec<Polygon<f64>>,
    },
    /// Grows linearly from `size_min` at `dist_min` from the segments to
    /// `size_max` at `dist_max`, constant beyond either end.
    Threshold {
        segments: Vec<(Coord, Coord)>,
        size_min: f64,
        size_max: f64,
        dist_min: f64,
        dist_max: f64,
    },
    /// Pointwise minimum of the components.
    Min(Vec<SizeField>),
}

impl SizeField {
    /// Target size at `p`.
    #[must_use]
    pub fn evaluate(&self, p: Coord) -> f64 {
        match self {
            Self::Constant(size) => *size,
            Self::Restrict { field, surfaces } => {
                let inside = surfaces
                    .iter()
                    .any(|s| s.coordinate_position(&p) != CoordPos::Outside);
                if inside {
                    field.evaluate(p)
                } else {
                    f64::INFINITY
                }
            }
            Self::Threshold {
                segments,
                size_min,
                size_max,
                dist_min,
                dist_max,
            } => {
                let d = coord_to_segments_dist(p, segments);
                if d <= *dist_min {
                    *size_min
                } else if d >= *dist_max {
                    *size_max
                } else {
                    let t = (d - dist_min) / (dist_max - dist_min);
                    size_min + t * (size_max - size_min)
                }
            }
            Self::Min(fields) => fields
                .iter()
                .map(|f| f.evaluate(p))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Number of leaf components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        match self {
            Self::Constant(_) | Self::Threshold { .. } => 1,
            Self::Restrict { field, .. } => field.component_count(),
            Self::Min(fields) => fields.iter().map(Self::component_count).sum(),
        }
    }
}
