//! Global assembly of the finite volume conduction operator
//!
//! Each cell couples to its face neighbours through the series conductance of the two half
//! cells, `G = A / (d_1 / k_1 + d_2 / k_2 + R)` where `R` is any thermal boundary resistance on the
//! shared face. Boundary faces contribute to the diagonal and to a fixed source vector.

use super::{BoundaryCondition, BoundaryConditions, TemperatureField};
use crate::{
    device::info_desk::{MaterialError, MaterialModel},
    error::{CsrError, ThermalError},
};
use hemtherm_mesher::{Face, Mesh3d};
use nalgebra::{DVector, RealField};
use nalgebra_sparse::{pattern::SparsityPattern, CsrMatrix};

/// The assembled linear system `A T = b + Q` without the volumetric source `Q`
#[derive(Clone, Debug)]
pub struct ThermalOperator<T: RealField> {
    /// Conductance matrix in W / K, symmetric positive definite when a sink is present
    pub(crate) matrix: CsrMatrix<T>,
    /// Heat entering through the boundary conductances from the external temperatures, in W
    pub(crate) boundary_source: DVector<T>,
}

impl<T: Copy + RealField> ThermalOperator<T> {
    pub fn matrix(&self) -> &CsrMatrix<T> {
        &self.matrix
    }

    pub fn boundary_source(&self) -> &DVector<T> {
        &self.boundary_source
    }

    pub fn diagonal(&self) -> DVector<T> {
        diagonal(&self.matrix)
    }

    /// The matrix with `shift` added to its diagonal
    pub(crate) fn shifted(&self, shift: &DVector<T>) -> Result<CsrMatrix<T>, CsrError> {
        let mut matrix = self.matrix.clone();
        for (i, &value) in shift.iter().enumerate() {
            let mut row = matrix.row_mut(i);
            let (columns, values) = row.cols_and_values_mut();
            let position = columns.binary_search(&i).map_err(|_| {
                CsrError::Access(format!("diagonal entry {} is missing from the pattern", i))
            })?;
            values[position] += value;
        }
        Ok(matrix)
    }
}

/// An assembler for CSR matrices.
///
/// The sparsity pattern only depends on the mesh so it is built once and reused every time the
/// operator is reassembled with new conductivities.
#[derive(Debug, Clone)]
pub struct CsrAssembler<T: RealField> {
    pattern: SparsityPattern,
    marker: std::marker::PhantomData<T>,
}

impl<T: Copy + RealField> CsrAssembler<T> {
    pub fn from_mesh(mesh: &Mesh3d<T>) -> Result<Self, CsrError> {
        Ok(Self {
            pattern: Self::assemble_sparsity_pattern(mesh)?,
            marker: std::marker::PhantomData,
        })
    }

    /// Construct the full CsrMatrix sparsity pattern from the mesh connectivity
    fn assemble_sparsity_pattern(mesh: &Mesh3d<T>) -> Result<SparsityPattern, CsrError> {
        let num_rows = mesh.num_cells();

        let mut matrix_entries = std::collections::BTreeSet::new();
        for i in 0..num_rows {
            matrix_entries.insert((i, i)); // The diagonal element
            for (_, j) in mesh.interior_connections(i) {
                matrix_entries.insert((i, j));
            }
        }

        let mut offsets = Vec::with_capacity(num_rows + 1);
        let mut column_indices = Vec::with_capacity(matrix_entries.len());
        offsets.push(0);
        for (i, j) in matrix_entries {
            while i + 1 > offsets.len() {
                offsets.push(column_indices.len());
            }
            column_indices.push(j);
        }

        while offsets.len() < (num_rows + 1) {
            offsets.push(column_indices.len())
        }

        Ok(SparsityPattern::try_from_offsets_and_indices(
            num_rows,
            num_rows,
            offsets,
            column_indices,
        )?)
    }

    pub fn pattern(&self) -> &SparsityPattern {
        &self.pattern
    }

    /// Assembles the conduction operator for the given per-cell conductivities
    pub fn assemble<Materials>(
        &self,
        mesh: &Mesh3d<T>,
        materials: &Materials,
        boundary_conditions: &BoundaryConditions<T>,
        conductivities: &DVector<T>,
    ) -> Result<ThermalOperator<T>, ThermalError<T>>
    where
        Materials: MaterialModel<T>,
    {
        let initial_matrix_values = vec![T::zero(); self.pattern.nnz()];
        let mut matrix =
            CsrMatrix::try_from_pattern_and_values(self.pattern.clone(), initial_matrix_values)
                .map_err(CsrError::from)?;
        let mut boundary_source = DVector::zeros(mesh.num_cells());

        for i in 0..mesh.num_cells() {
            let mut row = matrix.row_mut(i);
            let (columns, values) = row.cols_and_values_mut();
            let mut diagonal = T::zero();
            for (face, j) in mesh.interior_connections(i) {
                let conductance = interface_conductance(mesh, materials, conductivities, i, j, face);
                let position = columns.binary_search(&j).map_err(|_| {
                    CsrError::Access(format!("entry ({}, {}) is missing from the pattern", i, j))
                })?;
                values[position] -= conductance;
                diagonal += conductance;
            }
            for face in Face::ALL {
                if mesh.neighbour(i, face).is_some() {
                    continue;
                }
                if let Some((conductance, temperature)) = boundary_conductance(
                    mesh,
                    boundary_conditions.condition(face),
                    conductivities[i],
                    i,
                    face,
                ) {
                    diagonal += conductance;
                    boundary_source[i] += conductance * temperature;
                }
            }
            let position = columns.binary_search(&i).map_err(|_| {
                CsrError::Access(format!("diagonal entry {} is missing from the pattern", i))
            })?;
            values[position] += diagonal;
        }

        Ok(ThermalOperator {
            matrix,
            boundary_source,
        })
    }
}

/// Evaluates the conductivity of every cell at the temperature of the cell
pub fn cell_conductivities<T, Materials>(
    mesh: &Mesh3d<T>,
    materials: &Materials,
    field: &TemperatureField<T>,
) -> Result<DVector<T>, MaterialError<T>>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
{
    let values = (0..mesh.num_cells())
        .map(|index| materials.conductivity(mesh.region(index), field.get(index)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DVector::from_vec(values))
}

/// The effective conductivity of the interface between two equal cells, the harmonic mean
pub fn interface_conductivity<T: Copy + RealField>(k1: T, k2: T) -> T {
    (T::one() + T::one()) * k1 * k2 / (k1 + k2)
}

/// The conductance in W / K between cell `i` and its neighbour `j` across `face` of `i`
pub(crate) fn interface_conductance<T, Materials>(
    mesh: &Mesh3d<T>,
    materials: &Materials,
    conductivities: &DVector<T>,
    i: usize,
    j: usize,
    face: Face,
) -> T
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
{
    let axis = face.axis();
    let area = mesh.face_area(i, axis);
    let (region_i, region_j) = (mesh.region(i), mesh.region(j));
    // A boundary resistance belongs to the lower face of the layer above the interface
    let resistance = match face {
        _ if region_i == region_j => T::zero(),
        Face::ZMax => materials.boundary_resistance(region_j),
        Face::ZMin => materials.boundary_resistance(region_i),
        _ => T::zero(),
    };
    let (half_i, half_j) = (mesh.half_width(i, axis), mesh.half_width(j, axis));
    if half_i == half_j && resistance == T::zero() {
        return area * interface_conductivity(conductivities[i], conductivities[j])
            / (half_i + half_j);
    }
    area / (half_i / conductivities[i] + half_j / conductivities[j] + resistance)
}

/// The conductance in W / K from the centre of a boundary cell to the exterior, and the exterior temperature
pub(crate) fn boundary_conductance<T: Copy + RealField>(
    mesh: &Mesh3d<T>,
    condition: &BoundaryCondition<T>,
    conductivity: T,
    index: usize,
    face: Face,
) -> Option<(T, T)> {
    let axis = face.axis();
    let area = mesh.face_area(index, axis);
    let half_cell = area * conductivity / mesh.half_width(index, axis);
    match *condition {
        BoundaryCondition::Isothermal { temperature } => Some((half_cell, temperature)),
        BoundaryCondition::Convective { h, ambient } if h > T::zero() => {
            let film = h * area;
            Some((T::one() / (T::one() / film + T::one() / half_cell), ambient))
        }
        _ => None,
    }
}

/// Heat leaving the domain through each face in W, ordered as `Face::ALL`
pub fn boundary_heat_flow<T: Copy + RealField>(
    mesh: &Mesh3d<T>,
    boundary_conditions: &BoundaryConditions<T>,
    conductivities: &DVector<T>,
    field: &TemperatureField<T>,
) -> [T; 6] {
    let mut flows = [T::zero(); 6];
    for face in Face::ALL {
        let condition = boundary_conditions.condition(face);
        for index in mesh.boundary_cells(face) {
            if let Some((conductance, temperature)) =
                boundary_conductance(mesh, condition, conductivities[index], index, face)
            {
                flows[face.index()] += conductance * (field.get(index) - temperature);
            }
        }
    }
    flows
}

pub(crate) fn diagonal<T: Copy + RealField>(matrix: &CsrMatrix<T>) -> DVector<T> {
    DVector::from_iterator(
        matrix.nrows(),
        matrix.row_iter().enumerate().map(|(i, row)| {
            row.col_indices()
                .iter()
                .position(|&j| j == i)
                .map(|position| row.values()[position])
                .unwrap_or_else(T::zero)
        }),
    )
}
