pub mod field;

pub use field::SizeField;

use tracing::{debug, warn};

use crate::error::{Result, SizingError};
use crate::tracker::MeshTracker;

/// Target element size inside a labelled region, and the distance over
/// which the size relaxes to the global maximum outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub resolution: f64,
    pub distance: f64,
}

/// Per-label resolutions, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ResolutionSpec {
    entries: Vec<(String, Resolution)>,
}

impl ResolutionSpec {
    /// Creates an empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the resolution of `label`.
    ///
    /// # Errors
    ///
    /// Returns [`SizingError::InvalidResolution`] unless both values are
    /// finite and positive.
    pub fn insert(&mut self, label: impl Into<String>, resolution: f64, distance: f64) -> Result<()> {
        let label = label.into();
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(resolution) || !valid(distance) {
            return Err(SizingError::InvalidResolution {
                label,
                resolution,
                distance,
            }
            .into());
        }
        let value = Resolution { resolution, distance };
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((label, value)),
        }
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn with(mut self, label: impl Into<String>, resolution: f64, distance: f64) -> Result<Self> {
        self.insert(label, resolution, distance)?;
        Ok(self)
    }

    /// Resolution of `label`, if any.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<Resolution> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, r)| *r)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Resolution)> + '_ {
        self.entries.iter().map(|(l, r)| (l.as_str(), *r))
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no resolution is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the composite size field for a tracked geometry.
///
/// Each label contributes its resolution as a constant restricted to its
/// surfaces, plus a threshold on the distance to its curves growing from
/// the resolution to `max_size` over the label's distance.
pub struct BuildSizeField<'a> {
    spec: &'a ResolutionSpec,
    max_size: f64,
}

impl<'a> BuildSizeField<'a> {
    /// Creates a new `BuildSizeField` operation.
    #[must_use]
    pub fn new(spec: &'a ResolutionSpec, max_size: f64) -> Self {
        Self { spec, max_size }
    }

    /// Executes the build.
    ///
    /// # Errors
    ///
    /// Returns an error if a surface or curve of a label cannot be resolved
    /// in `tracker`.
    pub fn execute(&self, tracker: &MeshTracker) -> Result<SizeField> {
        let mut components = Vec::new();
        for (label, res) in self.spec.iter() {
            if !tracker.has_label(label) {
                warn!(label, "resolution given for a label with no entities");
                continue;
            }

            let surfaces = tracker
                .surfaces_for_label(label)
                .iter()
                .map(|&id| tracker.surface(id).map(|s| s.polygon.clone()))
                .collect::<Result<Vec<_>>>()?;
            if !surfaces.is_empty() {
                components.push(SizeField::Restrict {
                    field: Box::new(SizeField::Constant(res.resolution)),
                    surfaces,
                });
            }

            let segments = tracker
                .curves_for_label(label)
                .into_iter()
                .map(|id| tracker.curve_coords(id))
                .collect::<Result<Vec<_>>>()?;
            if !segments.is_empty() {
                components.push(SizeField::Threshold {
                    segments,
                    size_min: res.resolution,
                    size_max: self.max_size,
                    dist_min: 0.0,
                    dist_max: res.distance,
                });
            }
        }
        debug!(components = components.len(), "size field built");
        Ok(SizeField::Min(components))
    }
}
