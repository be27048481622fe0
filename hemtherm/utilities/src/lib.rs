pub mod structures;

use hemtherm::thermal::TemperatureField;
use hemtherm_mesher::{create_rectilinear_mesh_3d, create_segments_1d, Mesh3d};
use nalgebra::DVector;
use rand::{thread_rng, Rng};

/// A uniform box mesh with its lower corner at the origin
pub fn construct_box_mesh(extent: [f64; 3], cells: [usize; 3]) -> Mesh3d<f64> {
    create_rectilinear_mesh_3d(
        create_segments_1d(extent[0], cells[0], 0.),
        create_segments_1d(extent[1], cells[1], 0.),
        create_segments_1d(extent[2], cells[2], 0.),
    )
}

/// A field with every cell drawn uniformly from `[low, high)`
pub fn construct_random_field(num_cells: usize, low: f64, high: f64) -> TemperatureField<f64> {
    let mut rng = thread_rng();
    TemperatureField::from_vector(DVector::from_fn(num_cells, |_, _| {
        rng.gen_range(low..high)
    }))
}
