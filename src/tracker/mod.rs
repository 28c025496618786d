pub mod entity;

pub use entity::{
    CurveData, CurveId, EntityHandle, Interface, OrientedCurve, PhysicalGroup, PointData, PointId,
    SurfaceData, SurfaceId,
};

use std::collections::HashMap;

use geo::{LineString, Polygon};
use slotmap::SlotMap;
use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::geometry::kernel::segments;
use crate::math::{distance, Coord, CoordIndex, TOLERANCE};

/// Entities registered under one label.
#[derive(Debug, Clone, Default)]
struct LabelEntities {
    name: String,
    points: Vec<PointId>,
    lines: Vec<CurveId>,
    surfaces: Vec<SurfaceId>,
}

/// Registry of the points, curves and surfaces handed to the mesher.
///
/// Points are deduplicated on a tolerance grid and segments by their
/// unordered endpoint pair, so every boundary shared by two regions is a
/// single curve entity. Labels are kept in first-seen order.
#[derive(Debug)]
pub struct MeshTracker {
    tolerance: f64,
    points: SlotMap<PointId, PointData>,
    curves: SlotMap<CurveId, CurveData>,
    surfaces: SlotMap<SurfaceId, SurfaceData>,
    point_index: CoordIndex<PointId>,
    curve_index: HashMap<(PointId, PointId), CurveId>,
    labels: Vec<LabelEntities>,
    label_index: HashMap<String, usize>,
}

impl Default for MeshTracker {
    fn default() -> Self {
        Self::new(TOLERANCE)
    }
}

impl MeshTracker {
    /// Creates an empty tracker deduplicating within `tolerance`.
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            points: SlotMap::with_key(),
            curves: SlotMap::with_key(),
            surfaces: SlotMap::with_key(),
            point_index: CoordIndex::new(tolerance),
            curve_index: HashMap::new(),
            labels: Vec::new(),
            label_index: HashMap::new(),
        }
    }

    /// Deduplication tolerance.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    // --- Registration ---

    /// Registers an embedded point under `label`.
    pub fn add_point(&mut self, coord: Coord, label: &str) -> PointId {
        let id = self.point_at(coord);
        let entry = self.entry(label);
        if !entry.points.contains(&id) {
            entry.points.push(id);
        }
        id
    }

    /// Returns the segment between `a` and `b`, creating it if needed, and
    /// records `label` on it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DegenerateSegment`] if both ends snap to the
    /// same point.
    pub fn add_or_get_segment(&mut self, a: Coord, b: Coord, label: &str) -> Result<CurveId> {
        self.segment(a, b, Some(label)).map(|oc| oc.curve)
    }

    /// Registers every sub-segment of `line` under `label`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DegenerateSegment`] if the line has no extent.
    pub fn add_or_get_line(&mut self, line: &LineString<f64>, label: &str) -> Result<Vec<CurveId>> {
        let segs = segments(line, self.tolerance);
        let Some(&(first, _)) = segs.first() else {
            return Err(degenerate(line.0.first().copied().unwrap_or(Coord { x: 0.0, y: 0.0 })));
        };
        let mut ids = Vec::with_capacity(segs.len());
        for (a, b) in segs {
            ids.push(self.segment(a, b, Some(label))?.curve);
        }
        debug!(label, segments = ids.len(), x = first.x, y = first.y, "line registered");
        let entry = self.entry(label);
        for &id in &ids {
            if !entry.lines.contains(&id) {
                entry.lines.push(id);
            }
        }
        Ok(ids)
    }

    /// Builds a surface from `polygon`, reusing existing segments for its
    /// loops.
    ///
    /// A physical surface is recorded under `label` and claims its boundary
    /// segments for it. A non-physical one is only registered; it can be
    /// tagged later with [`assign_label`](Self::assign_label).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DegenerateSegment`] if a ring collapses.
    pub fn add_surface(
        &mut self,
        polygon: &Polygon<f64>,
        label: &str,
        physical: bool,
    ) -> Result<SurfaceId> {
        let claim = physical.then_some(label);
        let exterior = self.curve_loop(polygon.exterior(), claim)?;
        let interiors = polygon
            .interiors()
            .iter()
            .map(|ring| self.curve_loop(ring, claim))
            .collect::<Result<Vec<_>>>()?;
        let id = self.surfaces.insert(SurfaceData {
            polygon: polygon.clone(),
            exterior,
            interiors,
        });
        if physical {
            self.entry(label).surfaces.push(id);
        }
        Ok(id)
    }

    /// Tags an existing surface with `label`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::EntityNotFound`] if `surface` is unknown.
    pub fn assign_label(&mut self, label: &str, surface: SurfaceId) -> Result<()> {
        let boundary: Vec<CurveId> = self.surface(surface)?.boundary().collect();
        for id in boundary {
            if let Some(curve) = self.curves.get_mut(id) {
                curve.claim(label);
            }
        }
        let entry = self.entry(label);
        if !entry.surfaces.contains(&surface) {
            entry.surfaces.push(surface);
        }
        Ok(())
    }

    fn point_at(&mut self, coord: Coord) -> PointId {
        let points = &mut self.points;
        self.point_index
            .find_or_insert_with(coord, || points.insert(PointData { coord }))
    }

    fn segment(&mut self, a: Coord, b: Coord, label: Option<&str>) -> Result<OrientedCurve> {
        if distance(a, b) <= self.tolerance {
            return Err(degenerate(a));
        }
        let (pa, pb) = (self.point_at(a), self.point_at(b));
        if pa == pb {
            return Err(degenerate(a));
        }
        let key = (pa.min(pb), pa.max(pb));
        let curve = match self.curve_index.get(&key) {
            Some(&id) => id,
            None => {
                let id = self.curves.insert(CurveData {
                    start: pa,
                    end: pb,
                    main_label: None,
                    secondary_label: None,
                });
                self.curve_index.insert(key, id);
                id
            }
        };
        let data = &mut self.curves[curve];
        if let Some(label) = label {
            data.claim(label);
        }
        Ok(OrientedCurve {
            curve,
            forward: data.start == pa,
        })
    }

    fn curve_loop(
        &mut self,
        ring: &LineString<f64>,
        label: Option<&str>,
    ) -> Result<Vec<OrientedCurve>> {
        segments(ring, self.tolerance)
            .into_iter()
            .map(|(a, b)| self.segment(a, b, label))
            .collect()
    }

    fn entry(&mut self, label: &str) -> &mut LabelEntities {
        let index = match self.label_index.get(label) {
            Some(&i) => i,
            None => {
                self.labels.push(LabelEntities {
                    name: label.to_owned(),
                    ..LabelEntities::default()
                });
                self.label_index.insert(label.to_owned(), self.labels.len() - 1);
                self.labels.len() - 1
            }
        };
        &mut self.labels[index]
    }

    fn lookup(&self, label: &str) -> Option<&LabelEntities> {
        self.label_index.get(label).map(|&i| &self.labels[i])
    }

    // --- Queries ---

    /// Labels in first-seen order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.iter().map(|e| e.name.as_str())
    }

    /// Returns `true` if anything is registered under `label`.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.label_index.contains_key(label)
    }

    /// Surfaces tagged `label`.
    #[must_use]
    pub fn surfaces_for_label(&self, label: &str) -> &[SurfaceId] {
        self.lookup(label).map_or(&[], |e| e.surfaces.as_slice())
    }

    /// Embedded points tagged `label`.
    #[must_use]
    pub fn points_for_label(&self, label: &str) -> &[PointId] {
        self.lookup(label).map_or(&[], |e| e.points.as_slice())
    }

    /// Curves bounding `label`: its line segments, then every segment that
    /// bounds exactly one of its surfaces.
    ///
    /// A segment shared by two surfaces of the same label lies inside the
    /// label's region and is left out.
    #[must_use]
    pub fn curves_for_label(&self, label: &str) -> Vec<CurveId> {
        let Some(entry) = self.lookup(label) else {
            return Vec::new();
        };
        let mut order: Vec<CurveId> = Vec::new();
        let mut count: HashMap<CurveId, usize> = HashMap::new();
        for surface in entry.surfaces.iter().filter_map(|&s| self.surfaces.get(s)) {
            for id in surface.boundary() {
                let n = count.entry(id).or_insert(0);
                if *n == 0 {
                    order.push(id);
                }
                *n += 1;
            }
        }
        let mut curves = entry.lines.clone();
        curves.extend(
            order
                .into_iter()
                .filter(|id| count[id] == 1 && !entry.lines.contains(id)),
        );
        curves
    }

    /// Every entity tagged `label`, points first.
    #[must_use]
    pub fn entities_for_label(&self, label: &str) -> Vec<EntityHandle> {
        let points = self.points_for_label(label).iter().map(|&p| EntityHandle::Point(p));
        let curves = self.curves_for_label(label).into_iter().map(EntityHandle::Curve);
        let surfaces = self.surfaces_for_label(label).iter().map(|&s| EntityHandle::Surface(s));
        points.chain(curves).chain(surfaces).collect()
    }

    /// Segments claimed by two labels, grouped by `(main, secondary)` in
    /// first-seen order.
    #[must_use]
    pub fn interfaces(&self) -> Vec<Interface> {
        let mut out: Vec<Interface> = Vec::new();
        for (id, curve) in &self.curves {
            let (Some(main), Some(secondary)) = (&curve.main_label, &curve.secondary_label) else {
                continue;
            };
            match out.iter_mut().find(|i| &i.main == main && &i.secondary == secondary) {
                Some(interface) => interface.curves.push(id),
                None => out.push(Interface {
                    main: main.clone(),
                    secondary: secondary.clone(),
                    curves: vec![id],
                }),
            }
        }
        out
    }

    /// One group per label, in first-seen order, at the label's highest
    /// dimension; optionally followed by one curve group per interface.
    #[must_use]
    pub fn physical_groups(&self, include_interfaces: bool) -> Vec<PhysicalGroup> {
        let mut groups: Vec<PhysicalGroup> = Vec::new();
        for entry in &self.labels {
            let (dimension, entities): (u8, Vec<EntityHandle>) = if !entry.surfaces.is_empty() {
                (2, entry.surfaces.iter().map(|&s| EntityHandle::Surface(s)).collect())
            } else if !entry.lines.is_empty() {
                (1, entry.lines.iter().map(|&c| EntityHandle::Curve(c)).collect())
            } else {
                (0, entry.points.iter().map(|&p| EntityHandle::Point(p)).collect())
            };
            groups.push(PhysicalGroup {
                name: entry.name.clone(),
                dimension,
                entities,
            });
        }
        if include_interfaces {
            groups.extend(self.interfaces().into_iter().map(|interface| PhysicalGroup {
                name: interface.name(),
                dimension: 1,
                entities: interface.curves.into_iter().map(EntityHandle::Curve).collect(),
            }));
        }
        groups
    }

    // --- Entity access ---

    /// Returns the point data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the tracker.
    pub fn point(&self, id: PointId) -> Result<&PointData> {
        self.points
            .get(id)
            .ok_or_else(|| TrackerError::EntityNotFound("point".into()).into())
    }

    /// Returns the curve data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the tracker.
    pub fn curve(&self, id: CurveId) -> Result<&CurveData> {
        self.curves
            .get(id)
            .ok_or_else(|| TrackerError::EntityNotFound("curve".into()).into())
    }

    /// Returns the surface data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the tracker.
    pub fn surface(&self, id: SurfaceId) -> Result<&SurfaceData> {
        self.surfaces
            .get(id)
            .ok_or_else(|| TrackerError::EntityNotFound("surface".into()).into())
    }

    /// End coordinates of a curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve or one of its points is unknown.
    pub fn curve_coords(&self, id: CurveId) -> Result<(Coord, Coord)> {
        let curve = self.curve(id)?;
        Ok((self.point(curve.start)?.coord, self.point(curve.end)?.coord))
    }

    /// All points, in insertion order.
    pub fn points(&self) -> impl Iterator<Item = (PointId, &PointData)> + '_ {
        self.points.iter()
    }

    /// All curves, in insertion order.
    pub fn curves(&self) -> impl Iterator<Item = (CurveId, &CurveData)> + '_ {
        self.curves.iter()
    }

    /// All surfaces, in insertion order.
    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceId, &SurfaceData)> + '_ {
        self.surfaces.iter()
    }

    /// Number of points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of curves.
    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Number of surfaces.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }
}

fn degenerate(at: Coord) -> crate::error::TesseraError {
    TrackerError::DegenerateSegment { x: at.x, y: at.y }.into()
}
