use geo::Polygon;

use crate::math::Coord;

slotmap::new_key_type! {
    /// Unique identifier for a point in the mesh tracker.
    pub struct PointId;
}

slotmap::new_key_type! {
    /// Unique identifier for a straight curve segment in the mesh tracker.
    pub struct CurveId;
}

slotmap::new_key_type! {
    /// Unique identifier for a surface in the mesh tracker.
    pub struct SurfaceId;
}

/// A tracked point.
#[derive(Debug, Clone)]
pub struct PointData {
    /// Position of the point.
    pub coord: Coord,
}

/// A straight segment between two tracked points.
///
/// The first label to register the segment becomes its main label; the first
/// different label seen afterwards becomes its secondary label, which marks
/// the segment as an interface between two regions.
#[derive(Debug, Clone)]
pub struct CurveData {
    pub start: PointId,
    pub end: PointId,
    pub main_label: Option<String>,
    pub secondary_label: Option<String>,
}

impl CurveData {
    /// Records `label` as touching this segment.
    pub(crate) fn claim(&mut self, label: &str) {
        match (&self.main_label, &self.secondary_label) {
            (None, _) => self.main_label = Some(label.to_owned()),
            (Some(main), None) if main != label => self.secondary_label = Some(label.to_owned()),
            _ => {}
        }
    }
}

/// A curve with orientation information within a surface loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedCurve {
    /// The curve identifier.
    pub curve: CurveId,
    /// If `true`, the loop runs from the curve's start to its end.
    pub forward: bool,
}

/// A planar surface bounded by closed loops of tracked curves.
#[derive(Debug, Clone)]
pub struct SurfaceData {
    /// The polygon the surface was built from.
    pub polygon: Polygon<f64>,
    /// Outer loop.
    pub exterior: Vec<OrientedCurve>,
    /// Hole loops.
    pub interiors: Vec<Vec<OrientedCurve>>,
}

impl SurfaceData {
    /// Every curve of every loop.
    pub fn boundary(&self) -> impl Iterator<Item = CurveId> + '_ {
        self.exterior
            .iter()
            .chain(self.interiors.iter().flatten())
            .map(|oc| oc.curve)
    }
}

/// Handle to any tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityHandle {
    Point(PointId),
    Curve(CurveId),
    Surface(SurfaceId),
}

impl EntityHandle {
    /// Topological dimension of the entity.
    #[must_use]
    pub fn dimension(self) -> u8 {
        match self {
            Self::Point(_) => 0,
            Self::Curve(_) => 1,
            Self::Surface(_) => 2,
        }
    }
}

/// A named set of entities of one dimension, used for physical tagging.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalGroup {
    pub name: String,
    pub dimension: u8,
    pub entities: Vec<EntityHandle>,
}

/// Segments whose main and secondary labels are the given pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub main: String,
    pub secondary: String,
    pub curves: Vec<CurveId>,
}

impl Interface {
    /// Name of the interface group, `"{main}_{secondary}"`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}_{}", self.main, self.secondary)
    }
}
