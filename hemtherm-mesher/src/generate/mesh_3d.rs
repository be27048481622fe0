use crate::{Cell3dConnectivity, Mesh3d, Segments1d};
use itertools::iproduct;
use nalgebra::RealField;

/// Forms the tensor product of three segmentations and connects each cell to its face neighbours
pub fn create_rectilinear_mesh_3d<T>(
    x: Segments1d<T>,
    y: Segments1d<T>,
    z: Segments1d<T>,
) -> Mesh3d<T>
where
    T: Copy + RealField,
{
    let (nx, ny, nz) = (x.num_cells(), y.num_cells(), z.num_cells());
    let to_global_index = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

    // `iproduct` iterates the last axis fastest, so the loop order is (k, j, i)
    let connectivity = iproduct!(0..nz, 0..ny, 0..nx)
        .map(|(k, j, i)| {
            Cell3dConnectivity::new([
                (i > 0).then(|| to_global_index(i - 1, j, k)),
                (i + 1 < nx).then(|| to_global_index(i + 1, j, k)),
                (j > 0).then(|| to_global_index(i, j - 1, k)),
                (j + 1 < ny).then(|| to_global_index(i, j + 1, k)),
                (k > 0).then(|| to_global_index(i, j, k - 1)),
                (k + 1 < nz).then(|| to_global_index(i, j, k + 1)),
            ])
        })
        .collect::<Vec<_>>();

    Mesh3d::from_axes_and_connectivity([x, y, z], connectivity)
}

#[cfg(test)]
mod test {
    use super::create_rectilinear_mesh_3d;
    use crate::{create_segments_1d, create_segments_1d_from_regions, Axis, Connectivity, Face};
    use crate::{Grading, Region1d};
    use approx::assert_relative_eq;

    fn box_mesh() -> crate::Mesh3d<f64> {
        create_rectilinear_mesh_3d(
            create_segments_1d(4., 4, 0.),
            create_segments_1d(3., 3, 0.),
            create_segments_1d_from_regions(
                &[Region1d::uniform(1., 2, 0), Region1d::uniform(1., 3, 1)],
                0.,
            ),
        )
    }

    #[test]
    fn cell_indices_round_trip_through_ijk() {
        let mesh = box_mesh();
        assert_eq!(mesh.num_cells(), 4 * 3 * 5);
        for index in 0..mesh.num_cells() {
            let (i, j, k) = mesh.ijk(index);
            assert_eq!(mesh.index(i, j, k), index);
        }
    }

    #[test]
    fn neighbours_are_symmetric() {
        let mesh = box_mesh();
        for index in 0..mesh.num_cells() {
            for face in Face::ALL {
                if let Some(neighbour) = mesh.neighbour(index, face) {
                    assert_eq!(mesh.neighbour(neighbour, face.opposite()), Some(index));
                }
            }
        }
    }

    #[test]
    fn boundary_faces_have_the_expected_number_of_cells() {
        let mesh = box_mesh();
        assert_eq!(mesh.boundary_cells(Face::ZMin).len(), 12);
        assert_eq!(mesh.boundary_cells(Face::XMax).len(), 15);
        assert_eq!(mesh.boundary_cells(Face::YMin).len(), 20);
        assert_relative_eq!(mesh.boundary_area(Face::ZMax), 12.);
        assert_relative_eq!(mesh.boundary_area(Face::XMin), 6.);
    }

    #[test]
    fn interior_cells_have_six_neighbours() {
        let mesh = box_mesh();
        let index = mesh.index(1, 1, 2);
        assert_eq!(mesh.connectivity()[index].num_neighbours(), 6);
        assert!(!mesh.connectivity()[index].is_boundary());
        assert_eq!(mesh.interior_connections(index).count(), 6);
    }

    #[test]
    fn regions_are_read_from_the_stacking_axis() {
        let mesh = box_mesh();
        assert_eq!(mesh.region(mesh.index(3, 2, 1)), 0);
        assert_eq!(mesh.region(mesh.index(0, 0, 2)), 1);
        assert_relative_eq!(mesh.cell_size(mesh.index(0, 0, 0))[2], 0.5);
        assert_relative_eq!(mesh.cell_centre(mesh.index(0, 0, 4)).z, 1.0 + 5. / 6.);
    }

    #[test]
    fn cell_volumes_sum_to_the_bounding_box() {
        let mesh = create_rectilinear_mesh_3d(
            create_segments_1d_from_regions(
                &[
                    Region1d::graded(2., 5, 0, Grading::TowardsEnd(1.3)),
                    Region1d::uniform(0.5, 4, 1),
                    Region1d::graded(3., 5, 2, Grading::TowardsStart(1.3)),
                ],
                0.,
            ),
            create_segments_1d(2., 2, 0.),
            create_segments_1d(7., 6, -1.),
        );
        let total = (0..mesh.num_cells())
            .map(|index| mesh.cell_volume(index))
            .sum::<f64>();
        assert_relative_eq!(total, 5.5 * 2. * 7., epsilon = 1e-10);
        assert_relative_eq!(mesh.extent()[0], 5.5);
        assert_relative_eq!(mesh.face_area(0, Axis::Z), mesh.cell_size(0)[0] * 1.);
    }
}
