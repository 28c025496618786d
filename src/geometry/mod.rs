pub mod collection;
pub mod kernel;
pub mod polygonize;
pub mod shape;

pub use collection::{OrderedShapes, Precedence, ShapeCollection};
pub use kernel::Kernel;
pub use polygonize::polygonize;
pub use shape::{NamedShape, Shape};
