mod mesh_3d;
mod segment_1d;

pub use mesh_3d::*;
pub use segment_1d::*;
