use tracing::debug;

use crate::error::Result;
use crate::sizing::{BuildSizeField, ResolutionSpec};
use crate::tracker::MeshTracker;

use super::{Mesh, MeshGenerator, MeshParams};

/// One mesh build: owns the tracker from geometry registration to mesh
/// generation.
///
/// Every build starts from an empty tracker, so entities never leak from
/// one build into the next.
#[derive(Debug)]
pub struct Session {
    params: MeshParams,
    tracker: MeshTracker,
}

impl Session {
    /// Opens a session with validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameters`](crate::error::MeshError) if
    /// `params` fail validation.
    pub fn open(params: MeshParams) -> Result<Self> {
        params.validate()?;
        debug!(
            min_size = params.min_size,
            max_size = params.max_size,
            "session opened"
        );
        Ok(Self {
            tracker: MeshTracker::new(params.tolerance),
            params,
        })
    }

    /// Parameters of this build.
    #[must_use]
    pub fn params(&self) -> &MeshParams {
        &self.params
    }

    /// The tracker, for inspection.
    #[must_use]
    pub fn tracker(&self) -> &MeshTracker {
        &self.tracker
    }

    /// The tracker, for registering geometry.
    pub fn tracker_mut(&mut self) -> &mut MeshTracker {
        &mut self.tracker
    }

    /// Builds the size field from `resolutions` and runs `generator`,
    /// closing the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the size field cannot be built or the generator
    /// fails.
    pub fn generate(self, resolutions: &ResolutionSpec, generator: &impl MeshGenerator) -> Result<Mesh> {
        let field = BuildSizeField::new(resolutions, self.params.max_size).execute(&self.tracker)?;
        generator.generate(&self.tracker, &field, &self.params)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(
            points = self.tracker.point_count(),
            curves = self.tracker.curve_count(),
            surfaces = self.tracker.surface_count(),
            "session closed"
        );
    }
}
