//! Structured rectilinear meshes for layered device structures
//!
//! Each axis is segmented independently from a list of [`Region1d`], and the three
//! segmentations are combined by [`create_rectilinear_mesh_3d`] into a [`Mesh3d`] with
//! face-neighbour connectivity.

mod connectivity;
mod generate;
mod mesh;
mod primitives;

pub use connectivity::*;
pub use generate::*;
pub use mesh::*;
pub use primitives::*;

use nalgebra::{Point3, RealField, Vector3};

/// The geometric queries a finite volume discretisation needs from a mesh
pub trait FiniteVolumeMesh<T: RealField> {
    fn number_of_cells(&self) -> usize;
    fn centre(&self, index: usize) -> Point3<T>;
    fn size(&self, index: usize) -> Vector3<T>;
    fn volume(&self, index: usize) -> T;
    fn region_of(&self, index: usize) -> usize;
}

impl<T> FiniteVolumeMesh<T> for Mesh3d<T>
where
    T: Copy + RealField,
{
    fn number_of_cells(&self) -> usize {
        self.num_cells()
    }
    fn centre(&self, index: usize) -> Point3<T> {
        self.cell_centre(index)
    }
    fn size(&self, index: usize) -> Vector3<T> {
        self.cell_size(index)
    }
    fn volume(&self, index: usize) -> T {
        self.cell_volume(index)
    }
    fn region_of(&self, index: usize) -> usize {
        self.region(index)
    }
}
