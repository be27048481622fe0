use hemtherm_mesher::Mesh3d;
use nalgebra::{DVector, RealField};
use ndarray::Array3;

/// The temperature in K at the centre of every cell of a mesh
#[derive(Clone, Debug, PartialEq)]
pub struct TemperatureField<T: RealField>(DVector<T>);

impl<T: Copy + RealField> TemperatureField<T> {
    pub fn uniform(num_cells: usize, temperature: T) -> Self {
        Self(DVector::from_element(num_cells, temperature))
    }

    pub fn from_vector(values: DVector<T>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> T {
        self.0[index]
    }

    pub fn as_vector(&self) -> &DVector<T> {
        &self.0
    }

    pub fn into_vector(self) -> DVector<T> {
        self.0
    }

    pub fn maximum(&self) -> T {
        self.0.max()
    }

    /// The hottest of the listed cells, or `None` when the list is empty
    pub fn maximum_over(&self, cells: &[usize]) -> Option<T> {
        cells.iter().map(|&index| self.0[index]).reduce(T::max)
    }

    pub fn minimum(&self) -> T {
        self.0.min()
    }

    /// The largest absolute per-cell difference to `other`
    pub fn max_change(&self, other: &Self) -> T {
        (&self.0 - &other.0).amax()
    }

    /// Reshapes the field onto the `(nx, ny, nz)` grid of the mesh it was computed on
    pub fn to_array(&self, mesh: &Mesh3d<T>) -> Array3<T> {
        Array3::from_shape_fn(mesh.shape(), |(i, j, k)| self.0[mesh.index(i, j, k)])
    }
}

impl<T: RealField> AsRef<DVector<T>> for TemperatureField<T> {
    fn as_ref(&self) -> &DVector<T> {
        &self.0
    }
}

#[cfg(test)]
mod test {
    use super::TemperatureField;
    use hemtherm_mesher::{create_rectilinear_mesh_3d, create_unit_segments_1d};
    use nalgebra::DVector;
    use rand::Rng;

    #[test]
    fn array_view_is_indexed_like_the_mesh() {
        let mesh = create_rectilinear_mesh_3d(
            create_unit_segments_1d::<f64>(4),
            create_unit_segments_1d(3),
            create_unit_segments_1d(2),
        );
        let mut rng = rand::thread_rng();
        let values = DVector::from_fn(mesh.num_cells(), |_, _| rng.gen::<f64>());
        let field = TemperatureField::from_vector(values);
        let array = field.to_array(&mesh);
        assert_eq!(array.dim(), (4, 3, 2));
        for index in 0..mesh.num_cells() {
            let (i, j, k) = mesh.ijk(index);
            assert_eq!(array[[i, j, k]], field.get(index));
        }
    }

    #[test]
    fn max_change_is_the_largest_absolute_difference() {
        let a = TemperatureField::from_vector(DVector::from_vec(vec![300f64, 310., 320.]));
        let b = TemperatureField::from_vector(DVector::from_vec(vec![301f64, 305., 320.5]));
        assert_eq!(a.max_change(&b), 5.);
    }
}
