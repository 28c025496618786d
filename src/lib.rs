pub mod error;
pub mod geometry;
pub mod math;
pub mod meshing;
pub mod operations;
pub mod pipeline;
pub mod sizing;
pub mod tracker;

pub use error::{Result, TesseraError};
pub use geometry::{NamedShape, OrderedShapes, Precedence, Shape, ShapeCollection};
pub use meshing::{DelaunayMesher, Mesh, MeshGenerator, MeshGroup, MeshParams, Session};
pub use pipeline::{mesh_from_fragments, mesh_from_ordered};
pub use sizing::{BuildSizeField, Resolution, ResolutionSpec, SizeField};
pub use tracker::MeshTracker;
