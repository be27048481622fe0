use crate::{Axis, Cell3dConnectivity, Connectivity, Face};
use nalgebra::{Point3, RealField, Vector3};

/// A cell-centred segmentation of a single axis
///
/// The segmentation is described by its `vertices`, the `n + 1` cell boundaries in ascending
/// order, and a `tag` for each of the `n` cells recording the region the cell was generated in.
#[derive(Clone, Debug)]
pub struct Segments1d<T: RealField> {
    vertices: Vec<T>,
    tags: Vec<usize>,
}

impl<T: Copy + RealField> Segments1d<T> {
    pub fn from_vertices_and_tags(vertices: Vec<T>, tags: Vec<usize>) -> Self {
        assert_eq!(
            vertices.len(),
            tags.len() + 1,
            "a segmentation with {} cells needs {} vertices",
            tags.len(),
            tags.len() + 1
        );
        assert!(
            vertices.windows(2).all(|pair| pair[1] > pair[0]),
            "segment vertices must be strictly ascending"
        );
        Self { vertices, tags }
    }

    pub fn num_cells(&self) -> usize {
        self.tags.len()
    }

    pub fn vertices(&self) -> &[T] {
        &self.vertices
    }

    pub fn tags(&self) -> &[usize] {
        &self.tags
    }

    pub fn tag(&self, cell: usize) -> usize {
        self.tags[cell]
    }

    pub fn width(&self, cell: usize) -> T {
        self.vertices[cell + 1] - self.vertices[cell]
    }

    pub fn centre(&self, cell: usize) -> T {
        (self.vertices[cell] + self.vertices[cell + 1]) / (T::one() + T::one())
    }

    pub fn start(&self) -> T {
        self.vertices[0]
    }

    pub fn end(&self) -> T {
        self.vertices[self.vertices.len() - 1]
    }

    pub fn extent(&self) -> T {
        self.end() - self.start()
    }

    pub fn min_width(&self) -> T {
        (0..self.num_cells())
            .map(|cell| self.width(cell))
            .fold(self.extent(), T::min)
    }

    /// Index of the cell whose span contains `coordinate`, clamped into the segmentation
    pub fn locate(&self, coordinate: T) -> usize {
        match self.vertices[1..].iter().position(|&upper| coordinate < upper) {
            Some(cell) => cell,
            None => self.num_cells() - 1,
        }
    }
}

/// A structured rectilinear 3D mesh, the tensor product of three 1D segmentations
///
/// Cells are numbered with `x` fastest and `z` slowest: `index = i + nx * (j + ny * k)`.
/// The region of a cell is the tag carried by its `z` segment, which reflects the layered
/// nature of the devices being meshed.
#[derive(Clone, Debug)]
pub struct Mesh3d<T: RealField> {
    axes: [Segments1d<T>; 3],
    connectivity: Vec<Cell3dConnectivity>,
}

impl<T: Copy + RealField> Mesh3d<T> {
    pub fn from_axes_and_connectivity(
        axes: [Segments1d<T>; 3],
        connectivity: Vec<Cell3dConnectivity>,
    ) -> Self {
        let num_cells = axes.iter().map(|axis| axis.num_cells()).product::<usize>();
        assert_eq!(
            num_cells,
            connectivity.len(),
            "connectivity length ({}) must match the cell count ({})",
            connectivity.len(),
            num_cells
        );
        Self { axes, connectivity }
    }

    pub fn num_cells(&self) -> usize {
        self.connectivity.len()
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (
            self.axes[0].num_cells(),
            self.axes[1].num_cells(),
            self.axes[2].num_cells(),
        )
    }

    pub fn axis(&self, axis: Axis) -> &Segments1d<T> {
        &self.axes[axis.index()]
    }

    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let (nx, ny, _) = self.shape();
        i + nx * (j + ny * k)
    }

    pub fn ijk(&self, index: usize) -> (usize, usize, usize) {
        let (nx, ny, _) = self.shape();
        (index % nx, (index / nx) % ny, index / (nx * ny))
    }

    pub fn connectivity(&self) -> &[Cell3dConnectivity] {
        &self.connectivity
    }

    pub fn neighbour(&self, index: usize, face: Face) -> Option<usize> {
        self.connectivity[index].neighbour(face)
    }

    pub fn region(&self, index: usize) -> usize {
        let (_, _, k) = self.ijk(index);
        self.axes[2].tag(k)
    }

    pub fn cell_size(&self, index: usize) -> Vector3<T> {
        let (i, j, k) = self.ijk(index);
        Vector3::new(
            self.axes[0].width(i),
            self.axes[1].width(j),
            self.axes[2].width(k),
        )
    }

    pub fn cell_centre(&self, index: usize) -> Point3<T> {
        let (i, j, k) = self.ijk(index);
        Point3::new(
            self.axes[0].centre(i),
            self.axes[1].centre(j),
            self.axes[2].centre(k),
        )
    }

    pub fn cell_volume(&self, index: usize) -> T {
        let size = self.cell_size(index);
        size.x * size.y * size.z
    }

    /// The area of the cell faces normal to `axis`
    pub fn face_area(&self, index: usize, axis: Axis) -> T {
        let size = self.cell_size(index);
        match axis {
            Axis::X => size.y * size.z,
            Axis::Y => size.x * size.z,
            Axis::Z => size.x * size.y,
        }
    }

    /// The distance from the cell centre to the face normal to `axis`
    pub fn half_width(&self, index: usize, axis: Axis) -> T {
        self.cell_size(index)[axis.index()] / (T::one() + T::one())
    }

    pub fn extent(&self) -> Vector3<T> {
        Vector3::new(
            self.axes[0].extent(),
            self.axes[1].extent(),
            self.axes[2].extent(),
        )
    }

    pub fn min_cell_size(&self) -> Vector3<T> {
        Vector3::new(
            self.axes[0].min_width(),
            self.axes[1].min_width(),
            self.axes[2].min_width(),
        )
    }

    /// Indices of the cells which touch the given bounding face of the mesh
    pub fn boundary_cells(&self, face: Face) -> Vec<usize> {
        self.connectivity
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.neighbour(face).is_none())
            .map(|(index, _)| index)
            .collect()
    }

    /// Total area of a bounding face of the mesh
    pub fn boundary_area(&self, face: Face) -> T {
        self.boundary_cells(face)
            .into_iter()
            .fold(T::zero(), |acc, index| acc + self.face_area(index, face.axis()))
    }

    pub fn interior_connections(&self, index: usize) -> impl Iterator<Item = (Face, usize)> + '_ {
        Face::ALL
            .into_iter()
            .zip(self.connectivity[index].as_inner().iter())
            .filter_map(|(face, neighbour)| neighbour.map(|n| (face, n)))
    }
}
