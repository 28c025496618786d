mod cdt;
mod mesh;
mod session;

pub use cdt::DelaunayMesher;
pub use mesh::{Mesh, MeshGroup};
pub use session::Session;

use crate::error::{MeshError, Result};
use crate::math::TOLERANCE;
use crate::sizing::SizeField;
use crate::tracker::MeshTracker;

/// Parameters controlling mesh generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshParams {
    /// Smallest element size the size field is clamped to.
    pub min_size: f64,
    /// Largest element size, also the size far from every resolved label.
    pub max_size: f64,
    /// Coincidence tolerance for tracker deduplication.
    pub tolerance: f64,
    /// Triangles are refined while their longest edge exceeds this factor
    /// times the local target size.
    pub refine_factor: f64,
    /// Upper bound on refinement passes.
    pub max_refinement_passes: usize,
    /// Emit one curve group per pair of touching labels.
    pub interface_groups: bool,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            min_size: 0.01,
            max_size: 0.5,
            tolerance: TOLERANCE,
            refine_factor: 1.0,
            max_refinement_passes: 12,
            interface_groups: false,
        }
    }
}

impl MeshParams {
    /// Sets the size bounds.
    #[must_use]
    pub fn with_sizes(mut self, min_size: f64, max_size: f64) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Sets the coincidence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the refinement factor.
    #[must_use]
    pub fn with_refine_factor(mut self, refine_factor: f64) -> Self {
        self.refine_factor = refine_factor;
        self
    }

    /// Sets the refinement pass limit.
    #[must_use]
    pub fn with_max_refinement_passes(mut self, passes: usize) -> Self {
        self.max_refinement_passes = passes;
        self
    }

    /// Enables or disables interface groups.
    #[must_use]
    pub fn with_interface_groups(mut self, enabled: bool) -> Self {
        self.interface_groups = enabled;
        self
    }

    /// Clamps a size-field value into `[min_size, max_size]`.
    #[must_use]
    pub fn clamp_size(&self, size: f64) -> f64 {
        size.clamp(self.min_size, self.max_size)
    }

    /// Checks that the bounds are positive and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameters`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let problem = if !positive(self.min_size) {
            Some(format!("min_size must be positive, got {}", self.min_size))
        } else if !positive(self.max_size) || self.max_size < self.min_size {
            Some(format!(
                "max_size must be at least min_size ({}), got {}",
                self.min_size, self.max_size
            ))
        } else if !positive(self.tolerance) || self.tolerance >= self.min_size {
            Some(format!("tolerance must be in (0, min_size), got {}", self.tolerance))
        } else if !positive(self.refine_factor) {
            Some(format!("refine_factor must be positive, got {}", self.refine_factor))
        } else {
            None
        };
        match problem {
            Some(reason) => Err(MeshError::InvalidParameters(reason).into()),
            None => Ok(()),
        }
    }
}

/// Turns tracked geometry and a size field into a triangle mesh.
pub trait MeshGenerator {
    /// Generates the mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry cannot be meshed; no partial mesh is
    /// returned.
    fn generate(&self, tracker: &MeshTracker, field: &SizeField, params: &MeshParams) -> Result<Mesh>;
}
