//! # Thermal
//!
//! The finite volume heat conduction solver. A [`ThermalProblem`] binds a mesh to a material
//! model and a set of boundary conditions, and owns the sparsity pattern of the conduction
//! operator. Steady, transient and electro-thermally coupled solves are all driven from it.
//!
//! Problems are constructed through the [`ThermalProblemBuilder`]:
//!
//! ```ignore
//! let problem = ThermalProblemBuilder::new()
//!     .with_mesh(&mesh)
//!     .with_materials(&info_desk)
//!     .with_boundary_conditions(&boundary_conditions)
//!     .build()?;
//! let solution = problem.solve_steady(&source, &Convergence::default())?;
//! ```

mod boundary;
mod convergence;
mod coupling;
mod field;
mod linear;
mod operator;
mod source;
mod steady;
mod transient;

pub use boundary::{BoundaryCondition, BoundaryConditions};
pub use convergence::Convergence;
pub use coupling::{CoupledSolution, Coupling, PowerModel, SelfHeating};
pub use field::TemperatureField;
pub use operator::{interface_conductivity, CsrAssembler, ThermalOperator};
pub use source::{Continuous, DutyCycle, HeatSource, SourceProfile};
pub use steady::{solve_steady, SteadySolution};
pub use transient::{
    solve_transient, TimeScheme, TransientSample, TransientSamples, TransientSettings,
    TransientSimulation,
};

use crate::{device::info_desk::MaterialModel, error::ThermalError};
use hemtherm_mesher::Mesh3d;
use nalgebra::{DVector, RealField};
use std::marker::PhantomData;

/// Builder for a `ThermalProblem`
pub struct ThermalProblemBuilder<T, RefMesh, RefMaterials, RefBoundaryConditions> {
    mesh: RefMesh,
    materials: RefMaterials,
    boundary_conditions: RefBoundaryConditions,
    marker: PhantomData<T>,
}

impl<T> ThermalProblemBuilder<T, (), (), ()> {
    /// Initialise an empty ThermalProblemBuilder
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            mesh: (),
            materials: (),
            boundary_conditions: (),
            marker: PhantomData,
        }
    }
}

impl<T, RefMesh, RefMaterials, RefBoundaryConditions>
    ThermalProblemBuilder<T, RefMesh, RefMaterials, RefBoundaryConditions>
{
    /// Attach the problem's `Mesh`
    pub fn with_mesh<Mesh>(
        self,
        mesh: &Mesh,
    ) -> ThermalProblemBuilder<T, &Mesh, RefMaterials, RefBoundaryConditions> {
        ThermalProblemBuilder {
            mesh,
            materials: self.materials,
            boundary_conditions: self.boundary_conditions,
            marker: PhantomData,
        }
    }

    /// Attach the material model queried for conductivity and heat capacity
    pub fn with_materials<Materials>(
        self,
        materials: &Materials,
    ) -> ThermalProblemBuilder<T, RefMesh, &Materials, RefBoundaryConditions> {
        ThermalProblemBuilder {
            mesh: self.mesh,
            materials,
            boundary_conditions: self.boundary_conditions,
            marker: PhantomData,
        }
    }

    /// Attach the condition on each face of the domain
    pub fn with_boundary_conditions<BoundaryConditions>(
        self,
        boundary_conditions: &BoundaryConditions,
    ) -> ThermalProblemBuilder<T, RefMesh, RefMaterials, &BoundaryConditions> {
        ThermalProblemBuilder {
            mesh: self.mesh,
            materials: self.materials,
            boundary_conditions,
            marker: PhantomData,
        }
    }
}

/// A heat conduction problem on a fixed mesh
pub struct ThermalProblem<'a, T: RealField, Materials> {
    mesh: &'a Mesh3d<T>,
    materials: &'a Materials,
    boundary_conditions: &'a BoundaryConditions<T>,
    assembler: CsrAssembler<T>,
}

impl<'a, T, Materials>
    ThermalProblemBuilder<T, &'a Mesh3d<T>, &'a Materials, &'a BoundaryConditions<T>>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
{
    /// Validates the problem and builds the operator sparsity pattern
    pub fn build(self) -> Result<ThermalProblem<'a, T, Materials>, ThermalError<T>> {
        self.boundary_conditions.validate()?;
        if self.mesh.num_cells() == 0 {
            return Err(ThermalError::configuration("mesh", "the mesh has no cells"));
        }
        // Every region present in the mesh must be known to the material model
        let mut regions = self.mesh.axis(hemtherm_mesher::Axis::Z).tags().to_vec();
        regions.dedup();
        for region in regions {
            self.materials.density(region)?;
        }
        let assembler = CsrAssembler::from_mesh(self.mesh)?;
        tracing::debug!(
            "Built thermal problem with {} cells and {} operator entries",
            self.mesh.num_cells(),
            assembler.pattern().nnz()
        );
        Ok(ThermalProblem {
            mesh: self.mesh,
            materials: self.materials,
            boundary_conditions: self.boundary_conditions,
            assembler,
        })
    }
}

impl<'a, T, Materials> ThermalProblem<'a, T, Materials>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
{
    pub fn mesh(&self) -> &'a Mesh3d<T> {
        self.mesh
    }

    pub fn materials(&self) -> &'a Materials {
        self.materials
    }

    pub fn boundary_conditions(&self) -> &'a BoundaryConditions<T> {
        self.boundary_conditions
    }

    /// The temperature of the first sink face, used to initialise and to reference solves
    pub fn reference_temperature(&self) -> Result<T, ThermalError<T>> {
        self.boundary_conditions.reference_temperature()
    }

    pub(crate) fn conductivities(
        &self,
        field: &TemperatureField<T>,
    ) -> Result<DVector<T>, ThermalError<T>> {
        Ok(operator::cell_conductivities(self.mesh, self.materials, field)?)
    }

    /// Assembles the conduction operator with the conductivity evaluated at `field`
    pub fn assemble(
        &self,
        field: &TemperatureField<T>,
    ) -> Result<ThermalOperator<T>, ThermalError<T>> {
        let conductivities = self.conductivities(field)?;
        self.assembler.assemble(
            self.mesh,
            self.materials,
            self.boundary_conditions,
            &conductivities,
        )
    }

    /// Heat capacity of every cell in J / K at the temperatures in `field`
    pub fn heat_capacities(
        &self,
        field: &TemperatureField<T>,
    ) -> Result<DVector<T>, ThermalError<T>> {
        let values = (0..self.mesh.num_cells())
            .map(|index| -> Result<T, ThermalError<T>> {
                Ok(self
                    .materials
                    .volumetric_heat_capacity(self.mesh.region(index), field.get(index))?
                    * self.mesh.cell_volume(index))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DVector::from_vec(values))
    }

    /// Heat leaving through each face of the domain in W, ordered as `Face::ALL`
    pub fn boundary_heat_flow(&self, field: &TemperatureField<T>) -> Result<[T; 6], ThermalError<T>> {
        let conductivities = self.conductivities(field)?;
        Ok(operator::boundary_heat_flow(
            self.mesh,
            self.boundary_conditions,
            &conductivities,
            field,
        ))
    }

    pub(crate) fn check_source(&self, source: &HeatSource<T>) -> Result<(), ThermalError<T>> {
        if source.density().len() != self.mesh.num_cells() {
            return Err(ThermalError::configuration(
                "heat source",
                format!(
                    "the source has {} entries but the mesh has {} cells",
                    source.density().len(),
                    self.mesh.num_cells()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{BoundaryCondition, BoundaryConditions, ThermalProblemBuilder};
    use crate::device::info_desk::UniformMaterial;
    use crate::error::ThermalError;
    use hemtherm_mesher::{create_rectilinear_mesh_3d, create_unit_segments_1d};

    #[test]
    fn problems_without_a_sink_are_rejected_at_build() {
        let mesh = create_rectilinear_mesh_3d(
            create_unit_segments_1d::<f64>(2),
            create_unit_segments_1d(2),
            create_unit_segments_1d(2),
        );
        let materials = UniformMaterial::new(1f64, 1., 1.).unwrap();
        let conditions = BoundaryConditions::uniform(BoundaryCondition::Adiabatic);
        let result = ThermalProblemBuilder::new()
            .with_mesh(&mesh)
            .with_materials(&materials)
            .with_boundary_conditions(&conditions)
            .build();
        assert!(matches!(result, Err(ThermalError::IllPosedBoundary)));
    }
}
