use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{InteriorPoint, LineString, MultiPolygon};
use tracing::{debug, warn};

use crate::error::{Result, TilingError};
use crate::geometry::kernel::validate_shape;
use crate::geometry::{polygonize, Kernel, ShapeCollection};
use crate::math::TOLERANCE;

use super::Fragments;

/// Splits an unordered collection into its maximal non-overlapping faces.
///
/// Every pairwise intersection of the shapes (and of their union) is
/// overlaid, the resulting rings are noded and polygonized, and each face is
/// tagged with every label whose shape covers it. An overlap of two shapes
/// therefore becomes one fragment carrying both labels.
pub struct TileFragments<'a> {
    shapes: &'a ShapeCollection,
    tolerance: f64,
}

impl<'a> TileFragments<'a> {
    /// Creates a new `TileFragments` operation with the default tolerance.
    #[must_use]
    pub fn new(shapes: &'a ShapeCollection) -> Self {
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

    /// Executes the fragmentation.
    ///
    /// # Errors
    ///
    /// Returns [`TilingError::UnsupportedShape`] for point and line shapes,
    /// [`GeometryError::InvalidTopology`](crate::error::GeometryError) for
    /// non-simple polygons, and [`TilingError::NoFragments`] if no face of
    /// the overlay is covered by any label.
    pub fn execute(&self) -> Result<Fragments> {
        let tol = self.tolerance;
        let named = self.shapes.shapes();

        if let Some(shape) = named.iter().find(|s| !s.shape.is_areal()) {
            return Err(TilingError::UnsupportedShape {
                label: shape.label.clone(),
                kind: shape.shape.kind(),
            }
            .into());
        }

        let mut areal: Vec<(&str, MultiPolygon<f64>)> = Vec::with_capacity(named.len());
        for shape in named {
            validate_shape(&shape.label, &shape.shape, tol)?;
            if let Some(mp) = shape.shape.to_multi_polygon() {
                areal.push((shape.label.as_str(), mp));
            }
        }

        let kernel = Kernel::new(tol, named.iter().map(|s| &s.shape));
        let total = kernel.union_all(areal.iter().map(|(_, mp)| mp));
        let parts: Vec<MultiPolygon<f64>> = std::iter::once(total)
            .chain(areal.iter().map(|(_, mp)| kernel.clean(mp)))
            .collect();

        let mut rings: Vec<LineString<f64>> = Vec::new();
        for (i, a) in parts.iter().enumerate() {
            for b in &parts[i + 1..] {
                for polygon in &kernel.intersection(a, b) {
                    rings.push(polygon.exterior().clone());
                    rings.extend(polygon.interiors().iter().cloned());
                }
            }
        }

        let faces = polygonize(&rings, tol);
        let candidates = faces.len();
        let mut fragments = Fragments {
            polygons: Vec::with_capacity(candidates),
            labels: areal.iter().map(|(l, _)| ((*l).to_owned(), Vec::new())).collect(),
        };
        for face in faces {
            let Some(probe) = face.interior_point() else {
                continue;
            };
            let covering: Vec<usize> = areal
                .iter()
                .enumerate()
                .filter(|(_, (_, mp))| mp.coordinate_position(&probe.0) == CoordPos::Inside)
                .map(|(k, _)| k)
                .collect();
            if covering.is_empty() {
                warn!(x = probe.x(), y = probe.y(), "dropping fragment covered by no label");
                continue;
            }
            let index = fragments.polygons.len();
            for k in covering {
                fragments.labels[k].1.push(index);
            }
            fragments.polygons.push(face);
        }

        if fragments.polygons.is_empty() {
            return Err(TilingError::NoFragments.into());
        }
        debug!(
            candidates,
            fragments = fragments.polygons.len(),
            labels = fragments.labels.len(),
            "fragment tiling complete"
        );
        Ok(fragments)
    }
}
