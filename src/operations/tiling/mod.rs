mod fragments;
mod ordered;

pub use fragments::TileFragments;
pub use ordered::TileOrdered;

use geo::{Area, LineString, MultiPolygon, Polygon};

use crate::math::Coord;

/// One label's share of an ordered tiling.
///
/// Interiors are disjoint from every other region's; rings already carry
/// every vertex needed to match neighbouring regions segment for segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TiledRegion {
    pub label: String,
    pub polygons: MultiPolygon<f64>,
}

impl TiledRegion {
    /// Enclosed area of the region.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.polygons.unsigned_area()
    }
}

/// Where a broken curve came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveRole {
    /// Outer ring of one polygon of a region.
    Exterior,
    /// Hole ring of one polygon of a region.
    Interior,
    /// A line shape.
    Line,
}

/// A curve subdivided so that it matches every neighbouring curve.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenCurve {
    pub label: String,
    pub role: CurveRole,
    pub line: LineString<f64>,
}

impl BrokenCurve {
    /// Consecutive vertex pairs of the curve.
    pub fn segments(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        self.line.lines().map(|l| (l.start, l.end))
    }
}

/// Output of [`TileOrdered`].
#[derive(Debug, Clone, Default)]
pub struct Tiling {
    /// Non-empty areal regions, in collection order.
    pub regions: Vec<TiledRegion>,
    /// Every broken ring of every region, followed by the broken lines.
    pub curves: Vec<BrokenCurve>,
    /// Point shapes, passed through.
    pub points: Vec<(String, Coord)>,
}

impl Tiling {
    /// The region tagged `label`, if it survived overlap resolution.
    #[must_use]
    pub fn region(&self, label: &str) -> Option<&TiledRegion> {
        self.regions.iter().find(|r| r.label == label)
    }

    /// Broken curves tagged `label`.
    pub fn curves_for<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a BrokenCurve> + 'a {
        self.curves.iter().filter(move |c| c.label == label)
    }

    /// Broken line shapes, each as one curve.
    pub fn lines(&self) -> impl Iterator<Item = &BrokenCurve> + '_ {
        self.curves.iter().filter(|c| c.role == CurveRole::Line)
    }
}

/// Output of [`TileFragments`].
#[derive(Debug, Clone, Default)]
pub struct Fragments {
    /// Maximal non-overlapping faces of the overlay.
    pub polygons: Vec<Polygon<f64>>,
    /// For each input label in collection order, the fragments it covers.
    pub labels: Vec<(String, Vec<usize>)>,
}

impl Fragments {
    /// Indices of the fragments covered by `label`.
    #[must_use]
    pub fn fragments_for(&self, label: &str) -> &[usize] {
        self.labels
            .iter()
            .find(|(l, _)| l == label)
            .map_or(&[], |(_, ids)| ids.as_slice())
    }

    /// Labels covering fragment `index`.
    #[must_use]
    pub fn labels_of(&self, index: usize) -> Vec<&str> {
        self.labels
            .iter()
            .filter(|(_, ids)| ids.contains(&index))
            .map(|(l, _)| l.as_str())
            .collect()
    }
}
