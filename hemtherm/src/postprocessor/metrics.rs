use super::PostProcessorError;
use crate::thermal::{HeatSource, TemperatureField};
use hemtherm_mesher::{FiniteVolumeMesh, Mesh3d};
use nalgebra::{Point3, RealField};
use ndarray_stats::QuantileExt;

/// The location of the hottest cell in the mesh
#[derive(Clone, Debug, PartialEq)]
pub struct HotSpot<T: RealField> {
    /// Grid coordinate `(i, j, k)` of the cell
    pub cell: (usize, usize, usize),
    /// Position of the cell centre in m
    pub position: Point3<T>,
    pub temperature: T,
}

#[derive(Clone, Debug)]
pub struct Metrics<T: RealField> {
    pub junction_temperature: T,
    /// Junction rise per unit power in K / W
    pub thermal_resistance: T,
    pub hot_spot: HotSpot<T>,
    pub power: T,
    pub reference_temperature: T,
}

/// The hottest temperature over the cells which generate heat
pub fn junction_temperature<T: Copy + RealField>(
    field: &TemperatureField<T>,
    source: &HeatSource<T>,
) -> Result<T, PostProcessorError> {
    field
        .maximum_over(source.active_cells())
        .ok_or(PostProcessorError::NoActiveCells)
}

pub fn thermal_resistance<T: Copy + RealField>(
    junction_temperature: T,
    reference_temperature: T,
    power: T,
) -> Result<T, PostProcessorError> {
    if !(power > T::zero()) {
        return Err(PostProcessorError::NoPower);
    }
    Ok((junction_temperature - reference_temperature) / power)
}

pub fn hot_spot<T: Copy + RealField>(
    mesh: &Mesh3d<T>,
    field: &TemperatureField<T>,
) -> Result<HotSpot<T>, PostProcessorError> {
    let array = field.to_array(mesh);
    let (i, j, k) = array.argmax()?;
    let index = mesh.index(i, j, k);
    Ok(HotSpot {
        cell: (i, j, k),
        position: mesh.centre(index),
        temperature: field.get(index),
    })
}
