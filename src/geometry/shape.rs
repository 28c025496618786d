use geo::{LineString, MultiLineString, MultiPolygon, Point, Polygon};

use crate::math::Coord;

/// A single input geometry.
///
/// Every site that cares about the kind of shape matches on this enum;
/// there is no runtime type inspection anywhere in the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// An isolated point, embedded as a mesh vertex.
    Point(Point<f64>),
    /// An open or closed polyline.
    Line(LineString<f64>),
    /// A polygon, possibly with holes.
    Polygon(Polygon<f64>),
    /// Several polygons sharing one label.
    MultiPolygon(MultiPolygon<f64>),
    /// Several polylines sharing one label.
    MultiLine(MultiLineString<f64>),
}

impl Shape {
    /// Short human-readable name of the variant.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "point",
            Self::Line(_) => "line",
            Self::Polygon(_) => "polygon",
            Self::MultiPolygon(_) => "multi-polygon",
            Self::MultiLine(_) => "multi-line",
        }
    }

    /// Returns `true` for shapes that enclose area.
    #[must_use]
    pub fn is_areal(&self) -> bool {
        match self {
            Self::Polygon(_) | Self::MultiPolygon(_) => true,
            Self::Point(_) | Self::Line(_) | Self::MultiLine(_) => false,
        }
    }

    /// The areal part of the shape as a multi-polygon, or `None` for
    /// points and lines.
    #[must_use]
    pub fn to_multi_polygon(&self) -> Option<MultiPolygon<f64>> {
        match self {
            Self::Polygon(p) => Some(MultiPolygon::new(vec![p.clone()])),
            Self::MultiPolygon(mp) => Some(mp.clone()),
            Self::Point(_) | Self::Line(_) | Self::MultiLine(_) => None,
        }
    }

    /// The polylines of a linear shape; empty for points and polygons.
    #[must_use]
    pub fn lines(&self) -> Vec<LineString<f64>> {
        match self {
            Self::Line(l) => vec![l.clone()],
            Self::MultiLine(ml) => ml.0.clone(),
            Self::Point(_) | Self::Polygon(_) | Self::MultiPolygon(_) => Vec::new(),
        }
    }

    /// Every vertex of the shape, rings included.
    #[must_use]
    pub fn coords(&self) -> Vec<Coord> {
        match self {
            Self::Point(p) => vec![p.0],
            Self::Line(l) => l.0.clone(),
            Self::MultiLine(ml) => ml.iter().flat_map(|l| l.0.iter().copied()).collect(),
            Self::Polygon(p) => polygon_coords(p),
            Self::MultiPolygon(mp) => mp.iter().flat_map(polygon_coords).collect(),
        }
    }
}

fn polygon_coords(p: &Polygon<f64>) -> Vec<Coord> {
    std::iter::once(p.exterior())
        .chain(p.interiors())
        .flat_map(|ring| ring.0.iter().copied())
        .collect()
}

impl From<Point<f64>> for Shape {
    fn from(p: Point<f64>) -> Self {
        Self::Point(p)
    }
}

impl From<LineString<f64>> for Shape {
    fn from(l: LineString<f64>) -> Self {
        Self::Line(l)
    }
}

impl From<Polygon<f64>> for Shape {
    fn from(p: Polygon<f64>) -> Self {
        Self::Polygon(p)
    }
}

impl From<MultiPolygon<f64>> for Shape {
    fn from(mp: MultiPolygon<f64>) -> Self {
        Self::MultiPolygon(mp)
    }
}

impl From<MultiLineString<f64>> for Shape {
    fn from(ml: MultiLineString<f64>) -> Self {
        Self::MultiLine(ml)
    }
}

/// A shape tagged with the label that names its physical region.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedShape {
    pub label: String,
    pub shape: Shape,
}

impl NamedShape {
    /// Creates a new named shape.
    #[must_use]
    pub fn new(label: impl Into<String>, shape: impl Into<Shape>) -> Self {
        Self {
            label: label.into(),
            shape: shape.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, Area};

    #[test]
    fn areal_kinds() {
        let square: Shape = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)].into();
        let line: Shape = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)].into();
        assert!(square.is_areal());
        assert!(!line.is_areal());
        assert!(line.to_multi_polygon().is_none());
        assert_eq!(square.to_multi_polygon().map(|mp| mp.0.len()), Some(1));
        assert_eq!(line.lines().len(), 1);
        assert!(square.lines().is_empty());
    }

    #[test]
    fn area_of_polygon_with_hole() {
        let shape: Shape = Polygon::new(
            line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 4.0), (x: 0.0, y: 4.0)],
            vec![line_string![(x: 1.0, y: 1.0), (x: 2.0, y: 1.0), (x: 2.0, y: 2.0), (x: 1.0, y: 2.0)]],
        )
        .into();
        let area = shape.to_multi_polygon().map_or(0.0, |mp| mp.unsigned_area());
        assert!((area - 15.0).abs() < 1e-12);
        // Closed rings: 5 + 5 coordinates.
        assert_eq!(shape.coords().len(), 10);
    }

    #[test]
    fn named_shape_kind() {
        let shape = NamedShape::new("pin", Point::new(0.5, 0.5));
        assert_eq!(shape.label, "pin");
        assert_eq!(shape.shape.kind(), "point");
        assert!(shape.shape.to_multi_polygon().is_none());
    }
}
