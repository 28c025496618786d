use thiserror::Error;

/// Top-level error type for the tessera tiling and meshing pipeline.
#[derive(Debug, Error)]
pub enum TesseraError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Tiling(#[from] TilingError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Sizing(#[from] SizingError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Errors related to the validity of input or intermediate geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid topology in `{label}`: {reason}")]
    InvalidTopology { label: String, reason: String },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors raised while building a tiling from a shape collection.
#[derive(Debug, Error)]
pub enum TilingError {
    #[error("label `{0}` appears more than once in the collection")]
    DuplicateLabel(String),

    #[error("shape `{label}` is a {kind}, which fragment tiling does not accept")]
    UnsupportedShape { label: String, kind: &'static str },

    #[error("shape collection is empty")]
    EmptyCollection,

    #[error("fragment tiling produced no labelled fragments")]
    NoFragments,
}

/// Errors raised by the mesh tracker registry.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("segment from ({x}, {y}) has zero length")]
    DegenerateSegment { x: f64, y: f64 },
}

/// Errors related to resolution specifications and size fields.
#[derive(Debug, Error)]
pub enum SizingError {
    #[error("invalid resolution for `{label}`: resolution = {resolution}, distance = {distance}")]
    InvalidResolution {
        label: String,
        resolution: f64,
        distance: f64,
    },
}

/// Errors related to mesh generation.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("invalid mesh parameters: {0}")]
    InvalidParameters(String),

    #[error("mesh generator failed: {0}")]
    Generator(String),
}

/// Convenience type alias for results using [`TesseraError`].
pub type Result<T> = std::result::Result<T, TesseraError>;
