pub mod coord_index;
pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;

pub use coord_index::CoordIndex;

/// 2D coordinate type shared with the geometry kernel.
pub type Coord = geo::Coord<f64>;

/// 2D point type used for mesh output.
pub type Point2 = nalgebra::Point2<f64>;

/// Default geometric tolerance for coincidence and collinearity tests.
///
/// Boolean results from the kernel are snapped onto a fixed-precision grid,
/// so this is looser than machine epsilon by several orders of magnitude.
pub const TOLERANCE: f64 = 1e-7;

/// Euclidean distance between two coordinates.
#[must_use]
pub fn distance(a: Coord, b: Coord) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}
