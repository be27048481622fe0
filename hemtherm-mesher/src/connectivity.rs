use crate::Face;

/// The neighbours of a single cell in a rectilinear 3D mesh, ordered as `Face::ALL`
///
/// A `None` entry marks a face on the boundary of the mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell3dConnectivity([Option<usize>; 6]);

pub trait Connectivity {
    fn as_inner(&self) -> &[Option<usize>];

    fn num_neighbours(&self) -> usize {
        self.as_inner().iter().filter(|n| n.is_some()).count()
    }

    fn is_boundary(&self) -> bool {
        self.as_inner().iter().any(|n| n.is_none())
    }
}

impl Cell3dConnectivity {
    pub fn new(neighbours: [Option<usize>; 6]) -> Self {
        Self(neighbours)
    }

    pub fn neighbour(&self, face: Face) -> Option<usize> {
        self.0[face.index()]
    }
}

impl Connectivity for Cell3dConnectivity {
    fn as_inner(&self) -> &[Option<usize>] {
        &self.0
    }
}
