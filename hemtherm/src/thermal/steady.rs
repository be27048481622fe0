use super::{
    convergence::DivergenceMonitor, linear::conjugate_gradient, Convergence, HeatSource,
    TemperatureField, ThermalProblem, ThermalProblemBuilder,
};
use crate::{
    device::info_desk::MaterialModel,
    error::ThermalError,
    thermal::BoundaryConditions,
};
use hemtherm_mesher::Mesh3d;
use nalgebra::RealField;

/// The result of a steady state solve
#[derive(Clone, Debug)]
pub struct SteadySolution<T: RealField> {
    pub(crate) temperature: TemperatureField<T>,
    pub(crate) iterations: usize,
    pub(crate) converged: bool,
    /// The maximum per-cell change on the final pass in K
    pub(crate) change: T,
}

impl<T: Copy + RealField> SteadySolution<T> {
    pub fn temperature(&self) -> &TemperatureField<T> {
        &self.temperature
    }

    pub fn into_temperature(self) -> TemperatureField<T> {
        self.temperature
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn change(&self) -> T {
        self.change
    }
}

impl<'a, T, Materials> ThermalProblem<'a, T, Materials>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
{
    /// Solves for the steady temperature, starting from the sink reference temperature
    pub fn solve_steady(
        &self,
        source: &HeatSource<T>,
        convergence: &Convergence<T>,
    ) -> Result<SteadySolution<T>, ThermalError<T>> {
        let initial =
            TemperatureField::uniform(self.mesh.num_cells(), self.reference_temperature()?);
        self.solve_steady_from(source, convergence, initial)
    }

    /// Solves for the steady temperature using `initial` as the first estimate
    ///
    /// Each pass evaluates the conductivity of every cell at the current estimate, solves the
    /// linearised conduction problem and relaxes towards the result. Reaching the iteration cap
    /// is not an error: the last estimate is returned flagged as unconverged.
    pub fn solve_steady_from(
        &self,
        source: &HeatSource<T>,
        convergence: &Convergence<T>,
        initial: TemperatureField<T>,
    ) -> Result<SteadySolution<T>, ThermalError<T>> {
        convergence.validate()?;
        self.check_source(source)?;
        if initial.len() != self.mesh.num_cells() {
            return Err(ThermalError::configuration(
                "initial temperature",
                "the field does not match the mesh",
            ));
        }

        let cell_power = source.cell_power(self.mesh);
        let mut field = initial;
        let mut monitor = DivergenceMonitor::new(convergence.divergence_window());
        let mut change = T::zero();

        for iteration in 1..=convergence.maximum_iterations() {
            let operator = self.assemble(&field)?;
            let rhs = &operator.boundary_source + &cell_power;
            let linear = conjugate_gradient(
                &operator.matrix,
                &rhs,
                field.as_vector(),
                convergence.linear_tolerance(),
                convergence.maximum_linear_iterations(),
            )?;

            let previous = field.as_vector();
            let relaxed = previous + (&linear.solution - previous) * convergence.relaxation();
            let next = TemperatureField::from_vector(relaxed);
            change = next.max_change(&field);
            field = next;

            tracing::info!(
                "Steady iteration {}: max change {} K, peak temperature {} K ({} linear iterations, relative residual {})",
                iteration,
                change,
                field.maximum(),
                linear.iterations,
                linear.residual
            );

            if change < convergence.tolerance() {
                return Ok(SteadySolution {
                    temperature: field,
                    iterations: iteration,
                    converged: true,
                    change,
                });
            }
            if monitor.record(change) {
                return Err(ThermalError::Divergence {
                    window: convergence.divergence_window(),
                    change,
                });
            }
        }

        tracing::warn!(
            "Steady solve stopped after {} iterations without converging, last change {} K",
            convergence.maximum_iterations(),
            change
        );
        Ok(SteadySolution {
            temperature: field,
            iterations: convergence.maximum_iterations(),
            converged: false,
            change,
        })
    }
}

/// Solves a steady problem in one call
///
/// Builds a `ThermalProblem` from its parts and runs the fixed point iteration with the default
/// linear solver settings.
pub fn solve_steady<T, Materials>(
    mesh: &Mesh3d<T>,
    source: &HeatSource<T>,
    materials: &Materials,
    boundary_conditions: &BoundaryConditions<T>,
    tolerance: T,
    maximum_iterations: usize,
) -> Result<SteadySolution<T>, ThermalError<T>>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
{
    let problem = ThermalProblemBuilder::new()
        .with_mesh(mesh)
        .with_materials(materials)
        .with_boundary_conditions(boundary_conditions)
        .build()?;
    problem.solve_steady(source, &Convergence::new(tolerance, maximum_iterations))
}

#[cfg(test)]
mod test {
    use super::solve_steady;
    use crate::device::info_desk::{MaterialError, MaterialModel, UniformMaterial};
    use crate::error::ThermalError;
    use crate::thermal::{
        BoundaryCondition, BoundaryConditions, Convergence, HeatSource, ThermalProblemBuilder,
    };
    use approx::assert_relative_eq;
    use hemtherm_mesher::{create_rectilinear_mesh_3d, create_segments_1d, Face, Mesh3d};
    use nalgebra::{DVector, Point3};

    fn bar() -> Mesh3d<f64> {
        create_rectilinear_mesh_3d(
            create_segments_1d(1e-5, 2, 0.),
            create_segments_1d(1e-5, 2, 0.),
            create_segments_1d(1e-4, 20, 0.),
        )
    }

    #[test]
    fn zero_source_with_uniform_sinks_returns_the_sink_temperature() {
        let mesh = bar();
        let materials = UniformMaterial::new(150., 3000., 700.).unwrap();
        let conditions =
            BoundaryConditions::uniform(BoundaryCondition::Isothermal { temperature: 320. });
        let solution = solve_steady(
            &mesh,
            &HeatSource::zeros(mesh.num_cells()),
            &materials,
            &conditions,
            1e-3,
            15,
        )
        .unwrap();
        assert!(solution.converged());
        for index in 0..mesh.num_cells() {
            assert_relative_eq!(solution.temperature().get(index), 320., max_relative = 1e-10);
        }
    }

    #[test]
    fn constant_conductivity_bar_matches_the_analytic_rise() {
        let mesh = bar();
        let k = 100.;
        let materials = UniformMaterial::new(k, 3000., 700.).unwrap();
        let conditions = BoundaryConditions::single_sink(
            Face::ZMin,
            BoundaryCondition::Isothermal { temperature: 300. },
        );
        // All the power enters the top cell layer
        let power = 1e-3;
        let source = HeatSource::from_box(
            &mesh,
            &Point3::new(0., 0., 0.95e-4),
            &Point3::new(1e-5, 1e-5, 1e-4),
            power,
        )
        .unwrap();
        let solution = solve_steady(&mesh, &source, &materials, &conditions, 1e-3, 15).unwrap();

        // The heated layer centre sits half a cell below the top surface
        let area = 1e-10;
        let length = 1e-4 - 2.5e-6;
        let expected = 300. + power * length / (k * area);
        let top = mesh.index(0, 0, 19);
        assert_relative_eq!(solution.temperature().get(top), expected, max_relative = 1e-6);
    }

    struct Runaway;

    impl MaterialModel<f64> for Runaway {
        fn conductivity(&self, _region: usize, temperature: f64) -> Result<f64, MaterialError<f64>> {
            // Conductivity collapses as the device heats, so each pass heats it further
            Ok(1e4 / temperature.powi(2))
        }

        fn density(&self, _region: usize) -> Result<f64, MaterialError<f64>> {
            Ok(1.)
        }

        fn specific_heat(&self, _region: usize, _temperature: f64) -> Result<f64, MaterialError<f64>> {
            Ok(1.)
        }
    }

    #[test]
    fn thermal_runaway_is_reported_as_divergence() {
        let mesh = bar();
        let conditions = BoundaryConditions::single_sink(
            Face::ZMin,
            BoundaryCondition::Isothermal { temperature: 300. },
        );
        let source = HeatSource::from_density(DVector::from_element(mesh.num_cells(), 1e10));
        let materials = Runaway;
        let problem = ThermalProblemBuilder::new()
            .with_mesh(&mesh)
            .with_materials(&materials)
            .with_boundary_conditions(&conditions)
            .build()
            .unwrap();
        let result = problem.solve_steady(&source, &Convergence::new(1e-3, 50));
        assert!(matches!(result, Err(ThermalError::Divergence { .. })));
    }
}
