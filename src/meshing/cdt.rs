use std::collections::{HashMap, HashSet, VecDeque};

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::Polygon;
use spade::handles::{FixedFaceHandle, FixedVertexHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};
use tracing::{debug, warn};

use crate::error::{MeshError, Result, TesseraError};
use crate::math::distance_2d::{coord_to_segment_dist, project_param};
use crate::math::polygon_2d::{signed_area_2d, triangle_centroid};
use crate::math::{distance, Coord, CoordIndex, Point2};
use crate::sizing::SizeField;
use crate::tracker::{CurveId, EntityHandle, MeshTracker, SurfaceId};

use super::{Mesh, MeshGenerator, MeshGroup, MeshParams};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;
type FaceKey = FixedFaceHandle<InnerTag>;

/// Size-graded constrained Delaunay mesher.
///
/// Every tracked curve is seeded at the local target size and inserted as a
/// chain of constraint edges; tracked points become vertices. Triangles are
/// kept when their constraint-bounded region lies inside a tracked surface,
/// then refined until the longest edge of each is within the target size.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunayMesher;

impl DelaunayMesher {
    /// Creates a new mesher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MeshGenerator for DelaunayMesher {
    fn generate(&self, tracker: &MeshTracker, field: &SizeField, params: &MeshParams) -> Result<Mesh> {
        params.validate()?;
        let mut builder = Builder::new(params);

        let points: Vec<Coord> = tracker.points().map(|(_, p)| p.coord).collect();
        for &p in &points {
            builder.vertex(p)?;
        }

        // All vertices go in before any constraint.
        let mut chains: Vec<(CurveId, Vec<FixedVertexHandle>)> = Vec::with_capacity(tracker.curve_count());
        for (id, _) in tracker.curves() {
            let (a, b) = tracker.curve_coords(id)?;
            let handles = stations(a, b, &points, field, params)
                .into_iter()
                .map(|c| builder.vertex(c))
                .collect::<Result<Vec<_>>>()?;
            chains.push((id, handles));
        }

        let mut pieces: Vec<(CurveId, Vec<[FixedVertexHandle; 2]>)> = Vec::with_capacity(chains.len());
        for (id, handles) in chains {
            let mut chain = Vec::with_capacity(handles.len());
            for pair in handles.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                if from == to {
                    continue;
                }
                builder.constrain(from, to)?;
                chain.push([from, to]);
            }
            pieces.push((id, chain));
        }

        let surfaces: Vec<(SurfaceId, &Polygon<f64>)> =
            tracker.surfaces().map(|(id, s)| (id, &s.polygon)).collect();
        let mut owner = classify_regions(&builder.cdt, &surfaces);

        let mut passes = 0;
        loop {
            let targets = refinement_targets(&builder.cdt, &owner, field, params);
            if targets.is_empty() {
                break;
            }
            if passes == params.max_refinement_passes {
                warn!(passes, remaining = targets.len(), "refinement pass limit reached");
                break;
            }
            for c in targets {
                builder.vertex(c)?;
            }
            owner = classify_regions(&builder.cdt, &surfaces);
            passes += 1;
        }

        let mesh = builder.finish(tracker, &owner, &pieces)?;
        debug!(
            vertices = mesh.vertices.len(),
            triangles = mesh.triangles.len(),
            edges = mesh.edges.len(),
            passes,
            "mesh generated"
        );
        Ok(mesh)
    }
}

struct Builder<'a> {
    cdt: Cdt,
    index: CoordIndex<FixedVertexHandle>,
    params: &'a MeshParams,
}

impl<'a> Builder<'a> {
    fn new(params: &'a MeshParams) -> Self {
        Self {
            cdt: Cdt::new(),
            index: CoordIndex::new(params.tolerance),
            params,
        }
    }

    /// Returns the vertex at `c`, inserting it unless one lies within
    /// tolerance.
    fn vertex(&mut self, c: Coord) -> Result<FixedVertexHandle> {
        if let Some((_, &handle)) = self.index.find(c) {
            return Ok(handle);
        }
        let handle = self
            .cdt
            .insert(SpadePoint2::new(c.x, c.y))
            .map_err(|e: InsertionError| generator(format!("CDT insert: {e}")))?;
        self.index.insert(c, handle);
        Ok(handle)
    }

    fn constrain(&mut self, from: FixedVertexHandle, to: FixedVertexHandle) -> Result<()> {
        if !self.cdt.can_add_constraint(from, to) {
            let p = self.cdt.vertex(from).position();
            let q = self.cdt.vertex(to).position();
            return Err(generator(format!(
                "curve from ({}, {}) to ({}, {}) crosses another curve",
                p.x, p.y, q.x, q.y
            )));
        }
        self.cdt.add_constraint(from, to);
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn finish(
        &self,
        tracker: &MeshTracker,
        owner: &HashMap<FaceKey, SurfaceId>,
        pieces: &[(CurveId, Vec<[FixedVertexHandle; 2]>)],
    ) -> Result<Mesh> {
        let mut mesh = Mesh::default();
        let mut vertex_map: HashMap<FixedVertexHandle, u32> = HashMap::new();
        let mut emit = |mesh: &mut Mesh, handle: FixedVertexHandle| -> u32 {
            *vertex_map.entry(handle).or_insert_with(|| {
                let p = self.cdt.vertex(handle).position();
                mesh.vertices.push(Point2::new(p.x, p.y));
                (mesh.vertices.len() - 1) as u32
            })
        };

        let mut surface_triangles: HashMap<SurfaceId, Vec<u32>> = HashMap::new();
        for face in self.cdt.inner_faces() {
            let Some(&surface) = owner.get(&face.fix()) else {
                continue;
            };
            let triangle = face.vertices().map(|v| emit(&mut mesh, v.fix()));
            surface_triangles
                .entry(surface)
                .or_default()
                .push(mesh.triangles.len() as u32);
            mesh.triangles.push(triangle);
        }
        if mesh.triangles.is_empty() {
            return Err(generator("no triangle lies inside a tracked surface".into()));
        }

        let mut curve_edges: HashMap<CurveId, Vec<u32>> = HashMap::new();
        for (id, chain) in pieces {
            for &[from, to] in chain {
                let edge = [emit(&mut mesh, from), emit(&mut mesh, to)];
                curve_edges.entry(*id).or_default().push(mesh.edges.len() as u32);
                mesh.edges.push(edge);
            }
        }

        for group in tracker.physical_groups(self.params.interface_groups) {
            let mut elements = Vec::new();
            for entity in &group.entities {
                match *entity {
                    EntityHandle::Surface(s) => {
                        elements.extend(surface_triangles.get(&s).into_iter().flatten());
                    }
                    EntityHandle::Curve(c) => {
                        elements.extend(curve_edges.get(&c).into_iter().flatten());
                    }
                    EntityHandle::Point(p) => {
                        let coord = tracker.point(p)?.coord;
                        if let Some((_, &handle)) = self.index.find(coord) {
                            elements.push(emit(&mut mesh, handle));
                        }
                    }
                }
            }
            mesh.groups.push(MeshGroup {
                name: group.name,
                dimension: group.dimension,
                elements,
            });
        }
        Ok(mesh)
    }
}

fn generator(reason: String) -> TesseraError {
    MeshError::Generator(reason).into()
}

fn coord(p: SpadePoint2<f64>) -> Coord {
    Coord { x: p.x, y: p.y }
}

/// Vertices along segment `a -> b`, ends included: every tracked point
/// lying on the segment, with each stretch between them subdivided at the
/// local target size.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn stations(a: Coord, b: Coord, points: &[Coord], field: &SizeField, params: &MeshParams) -> Vec<Coord> {
    let tol = params.tolerance;
    let len = distance(a, b);
    let mut breaks: Vec<(f64, Coord)> = vec![(0.0, a), (1.0, b)];
    for &p in points {
        let t = project_param(p, a, b);
        if t * len > tol && (1.0 - t) * len > tol && coord_to_segment_dist(p, a, b) <= tol {
            breaks.push((t, p));
        }
    }
    breaks.sort_by(|x, y| x.0.total_cmp(&y.0));
    breaks.dedup_by(|later, earlier| (later.0 - earlier.0) * len <= tol);

    let size = |c: Coord| params.clamp_size(field.evaluate(c)) * params.refine_factor;
    let mut out = Vec::with_capacity(breaks.len());
    for pair in breaks.windows(2) {
        let ((t0, p0), (t1, p1)) = (pair[0], pair[1]);
        let mid = p0 + (p1 - p0) * 0.5;
        let h = size(p0).min(size(p1)).min(size(mid));
        let n = ((t1 - t0) * len / h).ceil().max(1.0) as usize;
        out.push(p0);
        for k in 1..n {
            let t = k as f64 / n as f64;
            out.push(p0 + (p1 - p0) * t);
        }
    }
    if let Some(&(_, last)) = breaks.last() {
        out.push(last);
    }
    out
}

/// Assigns each inner face to the surface containing its region.
///
/// Regions are the connected sets of faces across non-constraint edges;
/// one probe per region, taken from its largest face, decides membership.
fn classify_regions(cdt: &Cdt, surfaces: &[(SurfaceId, &Polygon<f64>)]) -> HashMap<FaceKey, SurfaceId> {
    let mut owner = HashMap::new();
    let mut seen: HashSet<FaceKey> = HashSet::new();

    for start in cdt.inner_faces() {
        if !seen.insert(start.fix()) {
            continue;
        }
        let mut region = vec![start.fix()];
        let mut queue = VecDeque::from([start.fix()]);
        while let Some(fix) = queue.pop_front() {
            for edge in cdt.face(fix).adjacent_edges() {
                if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                    continue;
                }
                if let Some(neighbor) = edge.rev().face().as_inner() {
                    if seen.insert(neighbor.fix()) {
                        region.push(neighbor.fix());
                        queue.push_back(neighbor.fix());
                    }
                }
            }
        }

        let probe = region
            .iter()
            .map(|&fix| {
                let [a, b, c] = cdt.face(fix).vertices().map(|v| coord(v.position()));
                (signed_area_2d(&[a, b, c]).abs(), triangle_centroid(a, b, c))
            })
            .max_by(|x, y| x.0.total_cmp(&y.0))
            .map(|(_, centroid)| centroid);
        let Some(probe) = probe else {
            continue;
        };
        let inside = surfaces
            .iter()
            .find(|(_, polygon)| polygon.coordinate_position(&probe) == CoordPos::Inside);
        if let Some(&(surface, _)) = inside {
            owner.extend(region.into_iter().map(|fix| (fix, surface)));
        }
    }
    owner
}

/// Points to insert so that oversized kept triangles get split: the
/// midpoint of the longest edge, or the centroid when that edge is a
/// constraint.
fn refinement_targets(
    cdt: &Cdt,
    owner: &HashMap<FaceKey, SurfaceId>,
    field: &SizeField,
    params: &MeshParams,
) -> Vec<Coord> {
    let mut targets = Vec::new();
    for face in cdt.inner_faces() {
        if !owner.contains_key(&face.fix()) {
            continue;
        }
        let [a, b, c] = face.vertices().map(|v| coord(v.position()));
        let centroid = triangle_centroid(a, b, c);
        let target = params.clamp_size(field.evaluate(centroid)) * params.refine_factor;

        let mut longest: Option<(f64, Coord, bool)> = None;
        for edge in face.adjacent_edges() {
            let from = coord(edge.from().position());
            let to = coord(edge.to().position());
            let len = distance(from, to);
            if longest.is_none_or(|(best, _, _)| len > best) {
                let constrained = cdt.is_constraint_edge(edge.as_undirected().fix());
                longest = Some((len, from + (to - from) * 0.5, constrained));
            }
        }
        match longest {
            Some((len, midpoint, false)) if len > target => targets.push(midpoint),
            Some((len, _, true)) if len > target => targets.push(centroid),
            _ => {}
        }
    }
    targets
}
