pub mod split;
pub mod tiling;

pub use split::{break_against, break_curve};
pub use tiling::{
    BrokenCurve, CurveRole, Fragments, TileFragments, TileOrdered, TiledRegion, Tiling,
};
