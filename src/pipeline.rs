//! One-call entry points from named shapes to a tagged mesh.

use tracing::debug;

use crate::error::Result;
use crate::geometry::{OrderedShapes, ShapeCollection};
use crate::meshing::{Mesh, MeshGenerator, MeshParams, Session};
use crate::operations::{Fragments, TileFragments, TileOrdered, Tiling};
use crate::sizing::ResolutionSpec;
use crate::tracker::MeshTracker;

/// Tiles `shapes` by precedence and meshes the result.
///
/// Lines are registered first, then one physical surface per region
/// polygon, then embedded points.
///
/// # Errors
///
/// Returns an error if the parameters are invalid, the shapes cannot be
/// tiled, or the generator fails.
pub fn mesh_from_ordered(
    shapes: &OrderedShapes,
    resolutions: &ResolutionSpec,
    params: &MeshParams,
    generator: &impl MeshGenerator,
) -> Result<Mesh> {
    let mut session = Session::open(*params)?;
    let tiling = TileOrdered::new(shapes)
        .with_tolerance(params.tolerance)
        .execute()?;
    register_tiling(session.tracker_mut(), &tiling)?;
    session.generate(resolutions, generator)
}

/// Splits `shapes` into boolean fragments and meshes them, tagging each
/// fragment with every label that covers it.
///
/// # Errors
///
/// Returns an error if the parameters are invalid, the shapes cannot be
/// fragmented, or the generator fails.
pub fn mesh_from_fragments(
    shapes: &ShapeCollection,
    resolutions: &ResolutionSpec,
    params: &MeshParams,
    generator: &impl MeshGenerator,
) -> Result<Mesh> {
    let mut session = Session::open(*params)?;
    let fragments = TileFragments::new(shapes)
        .with_tolerance(params.tolerance)
        .execute()?;
    register_fragments(session.tracker_mut(), &fragments)?;
    session.generate(resolutions, generator)
}

/// Registers an ordered tiling in `tracker`.
///
/// # Errors
///
/// Returns an error if a curve collapses to a point.
pub fn register_tiling(tracker: &mut MeshTracker, tiling: &Tiling) -> Result<()> {
    for curve in tiling.lines() {
        tracker.add_or_get_line(&curve.line, &curve.label)?;
    }
    for region in &tiling.regions {
        for polygon in &region.polygons {
            tracker.add_surface(polygon, &region.label, true)?;
        }
    }
    for (label, coord) in &tiling.points {
        tracker.add_point(*coord, label);
    }
    debug!(
        points = tracker.point_count(),
        curves = tracker.curve_count(),
        surfaces = tracker.surface_count(),
        "tiling registered"
    );
    Ok(())
}

/// Registers boolean fragments in `tracker`, one surface per fragment.
///
/// # Errors
///
/// Returns an error if a fragment ring collapses.
pub fn register_fragments(tracker: &mut MeshTracker, fragments: &Fragments) -> Result<()> {
    let mut surfaces = Vec::with_capacity(fragments.polygons.len());
    for (i, polygon) in fragments.polygons.iter().enumerate() {
        surfaces.push(tracker.add_surface(polygon, &format!("fragment{i}"), false)?);
    }
    for (label, indices) in &fragments.labels {
        for &i in indices {
            tracker.assign_label(label, surfaces[i])?;
        }
    }
    debug!(
        curves = tracker.curve_count(),
        surfaces = tracker.surface_count(),
        "fragments registered"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{GeometryError, TesseraError};
    use crate::geometry::{NamedShape, Precedence};
    use crate::meshing::DelaunayMesher;
    use approx::assert_relative_eq;
    use geo::{line_string, Point, Polygon, Rect};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn rect(label: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> NamedShape {
        NamedShape::new(label, Rect::new((x0, y0), (x1, y1)).to_polygon())
    }

    #[test]
    fn waveguide_cross_section() {
        init_tracing();
        let shapes = OrderedShapes::new(
            vec![
                rect("box", -2.0, -1.0, 2.0, 0.0),
                rect("clad", -2.0, 0.0, 2.0, 1.0),
                rect("core", -0.5, 0.0, 0.5, 0.2),
            ],
            Precedence::LaterWins,
        )
        .unwrap();
        let resolutions = ResolutionSpec::new().with("core", 0.05, 0.5).unwrap();
        let params = MeshParams::default()
            .with_sizes(0.02, 0.5)
            .with_interface_groups(true);
        let mesh = mesh_from_ordered(&shapes, &resolutions, &params, &DelaunayMesher::new()).unwrap();

        assert_relative_eq!(mesh.area(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.group_area("core"), 0.2, epsilon = 1e-9);
        assert_relative_eq!(mesh.group_area("clad"), 4.0 - 0.2, epsilon = 1e-9);
        assert_relative_eq!(mesh.group_area("box"), 4.0, epsilon = 1e-9);

        // The box/clad interface runs along y = 0 except under the core.
        assert_relative_eq!(mesh.group_length("box_clad"), 3.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.group_length("box_core"), 1.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.group_length("clad_core"), 1.4, epsilon = 1e-9);

        let names: Vec<&str> = mesh.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(&names[..3], ["box", "clad", "core"]);
    }

    #[test]
    fn lines_and_points_are_embedded() {
        init_tracing();
        let shapes = OrderedShapes::new(
            vec![
                rect("plate", 0.0, 0.0, 2.0, 1.0),
                NamedShape::new("seam", line_string![(x: 0.5, y: 0.5), (x: 1.5, y: 0.5)]),
                NamedShape::new("probe", Point::new(1.0, 0.25)),
            ],
            Precedence::default(),
        )
        .unwrap();
        let mesh = mesh_from_ordered(
            &shapes,
            &ResolutionSpec::new(),
            &MeshParams::default().with_sizes(0.1, 0.5),
            &DelaunayMesher::new(),
        )
        .unwrap();

        assert_relative_eq!(mesh.area(), 2.0, epsilon = 1e-9);
        let seam = mesh.group("seam").unwrap();
        assert_eq!(seam.dimension, 1);
        assert_relative_eq!(mesh.group_length("seam"), 1.0, epsilon = 1e-9);
        let probe = mesh.group("probe").unwrap();
        assert_eq!(probe.dimension, 0);
        assert_eq!(probe.elements.len(), 1);
    }

    #[test]
    fn fragments_keep_overlap_in_both_groups() {
        init_tracing();
        let shapes = ShapeCollection::new(vec![
            rect("a", 0.0, 0.0, 2.0, 2.0),
            rect("b", 1.0, 1.0, 3.0, 3.0),
        ])
        .unwrap();
        let params = MeshParams::default().with_sizes(0.05, 0.5);
        let mesh = mesh_from_fragments(&shapes, &ResolutionSpec::new(), &params, &DelaunayMesher::new())
            .unwrap();

        assert_relative_eq!(mesh.area(), 7.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.group_area("a"), 4.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.group_area("b"), 4.0, epsilon = 1e-9);
        let a = mesh.group("a").unwrap();
        let b = mesh.group("b").unwrap();
        let shared = a.elements.iter().filter(|t| b.elements.contains(t)).count();
        assert!(shared > 0);
    }

    #[test]
    fn invalid_input_fails_before_meshing() {
        init_tracing();
        let pinched = Polygon::new(
            Rect::new((0.0, 0.0), (3.0, 3.0)).to_polygon().exterior().clone(),
            vec![line_string![(x: 0.0, y: 1.0), (x: 1.0, y: 1.0), (x: 1.0, y: 2.0), (x: 0.0, y: 1.0)]],
        );
        let shapes = OrderedShapes::new(vec![NamedShape::new("bad", pinched)], Precedence::default()).unwrap();
        let err = mesh_from_ordered(
            &shapes,
            &ResolutionSpec::new(),
            &MeshParams::default(),
            &DelaunayMesher::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TesseraError::Geometry(GeometryError::InvalidTopology { ref label, .. }) if label == "bad"
        ));
    }
}
