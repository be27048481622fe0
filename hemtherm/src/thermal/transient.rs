//! Time stepping of the heat equation `C dT/dt = -A(T) T + b + s(t) Q`
//!
//! The explicit scheme is forward Euler and is only stable for time steps below the smallest
//! cell time constant `C_i / A_ii`. The implicit scheme is backward Euler, unconditionally
//! stable, and solves one linear system per step.

use super::{
    linear::{conjugate_gradient, multiply},
    Convergence, HeatSource, SourceProfile, TemperatureField, ThermalOperator, ThermalProblem,
    ThermalProblemBuilder,
};
use crate::{
    device::info_desk::MaterialModel, error::ThermalError, thermal::BoundaryConditions,
};
use hemtherm_mesher::Mesh3d;
use nalgebra::{DVector, RealField};
use nalgebra_sparse::CsrMatrix;
use serde::Deserialize;

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeScheme {
    /// Forward Euler
    Explicit,
    /// Backward Euler
    Implicit,
}

impl std::fmt::Display for TimeScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TimeScheme::Explicit => write!(f, "explicit"),
            TimeScheme::Implicit => write!(f, "implicit"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct TransientSettings<T> {
    pub scheme: TimeScheme,
    /// The requested time step in s, shortened so a whole number of steps spans `t_end`
    pub dt: T,
    pub t_end: T,
    /// Interval between emitted samples in s
    pub sample_interval: T,
    /// Re-evaluate conductivity and heat capacity at the current field on every step
    pub update_properties: bool,
}

impl<T: Copy + RealField> TransientSettings<T> {
    fn validate(&self) -> Result<(), ThermalError<T>> {
        for (parameter, value) in [
            ("transient.dt", self.dt),
            ("transient.t_end", self.t_end),
            ("transient.sample_interval", self.sample_interval),
        ] {
            if !(value > T::zero()) {
                return Err(ThermalError::configuration(
                    parameter,
                    format!("must be positive, found {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// The temperature field at a single instant
#[derive(Clone, Debug)]
pub struct TransientSample<T: RealField> {
    pub time: T,
    pub temperature: TemperatureField<T>,
}

/// A prepared transient run
///
/// Construction performs every check which can fail before stepping, including the explicit
/// stability bound. The run itself is driven by [`TransientSimulation::samples`].
pub struct TransientSimulation<'p, 'a, T: RealField, Materials, Profile> {
    problem: &'p ThermalProblem<'a, T, Materials>,
    cell_power: DVector<T>,
    profile: Profile,
    settings: TransientSettings<T>,
    linear_tolerance: T,
    maximum_linear_iterations: usize,
    initial: TemperatureField<T>,
    steps: usize,
    dt: T,
    sample_every: usize,
    /// Operator and heat capacities when the properties are frozen at the initial field
    frozen: Option<StepOperator<T>>,
}

#[derive(Clone, Debug)]
struct StepOperator<T: RealField> {
    operator: ThermalOperator<T>,
    capacity: DVector<T>,
    /// `A + C / dt` for the implicit scheme
    shifted: Option<CsrMatrix<T>>,
}

/// The largest stable forward Euler step, `min_i C_i / A_ii`
pub(crate) fn explicit_stability_limit<T: Copy + RealField>(
    operator: &ThermalOperator<T>,
    capacity: &DVector<T>,
) -> T {
    operator
        .diagonal()
        .iter()
        .zip(capacity.iter())
        .filter(|(&diagonal, _)| diagonal > T::zero())
        .fold(T::max_value().unwrap_or_else(T::one), |limit, (&diagonal, &capacity)| {
            limit.min(capacity / diagonal)
        })
}

impl<'a, T, Materials> ThermalProblem<'a, T, Materials>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
{
    /// Prepares a transient run from a uniform field at the sink reference temperature
    pub fn transient<'p, Profile>(
        &'p self,
        source: &HeatSource<T>,
        profile: Profile,
        settings: TransientSettings<T>,
        convergence: &Convergence<T>,
    ) -> Result<TransientSimulation<'p, 'a, T, Materials, Profile>, ThermalError<T>>
    where
        Profile: SourceProfile<T>,
    {
        let initial =
            TemperatureField::uniform(self.mesh.num_cells(), self.reference_temperature()?);
        self.transient_from(source, profile, settings, convergence, initial)
    }

    pub fn transient_from<'p, Profile>(
        &'p self,
        source: &HeatSource<T>,
        profile: Profile,
        settings: TransientSettings<T>,
        convergence: &Convergence<T>,
        initial: TemperatureField<T>,
    ) -> Result<TransientSimulation<'p, 'a, T, Materials, Profile>, ThermalError<T>>
    where
        Profile: SourceProfile<T>,
    {
        settings.validate()?;
        self.check_source(source)?;
        if initial.len() != self.mesh.num_cells() {
            return Err(ThermalError::configuration(
                "initial temperature",
                "the field does not match the mesh",
            ));
        }

        // Ratios within round-off of an integer are not rounded up to an extra step
        let ratio = settings.t_end / settings.dt;
        let nearest = ratio.round();
        let steps = if (ratio - nearest).abs() <= T::from_f64(1e-9).unwrap() * nearest {
            nearest
        } else {
            ratio.ceil()
        };
        let steps = steps
            .to_subset()
            .map(|steps: f64| steps as usize)
            .unwrap_or(1)
            .max(1);
        let dt = settings.t_end / T::from_usize(steps).unwrap();
        let sample_every = (settings.sample_interval / dt)
            .round()
            .to_subset()
            .map(|every: f64| every as usize)
            .unwrap_or(1)
            .max(1);

        let step_operator = self.step_operator(&initial, settings.scheme, dt)?;
        if settings.scheme == TimeScheme::Explicit {
            let limit = explicit_stability_limit(&step_operator.operator, &step_operator.capacity);
            if settings.dt > limit {
                return Err(ThermalError::Stability {
                    dt: settings.dt,
                    limit,
                });
            }
        }

        tracing::info!(
            "Prepared {} transient: {} steps of {} s, sampling every {} steps",
            settings.scheme,
            steps,
            dt,
            sample_every
        );

        let frozen = (!settings.update_properties).then(|| step_operator);
        Ok(TransientSimulation {
            problem: self,
            cell_power: source.cell_power(self.mesh),
            profile,
            settings,
            linear_tolerance: convergence.linear_tolerance(),
            maximum_linear_iterations: convergence.maximum_linear_iterations(),
            initial,
            steps,
            dt,
            sample_every,
            frozen,
        })
    }

    fn step_operator(
        &self,
        field: &TemperatureField<T>,
        scheme: TimeScheme,
        dt: T,
    ) -> Result<StepOperator<T>, ThermalError<T>> {
        let operator = self.assemble(field)?;
        let capacity = self.heat_capacities(field)?;
        let shifted = match scheme {
            TimeScheme::Explicit => None,
            TimeScheme::Implicit => Some(operator.shifted(&(&capacity / dt))?),
        };
        Ok(StepOperator {
            operator,
            capacity,
            shifted,
        })
    }
}

impl<'p, 'a, T, Materials, Profile> TransientSimulation<'p, 'a, T, Materials, Profile>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
    Profile: SourceProfile<T>,
{
    /// The time step actually taken in s
    pub fn dt(&self) -> T {
        self.dt
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn settings(&self) -> &TransientSettings<T> {
        &self.settings
    }

    /// A lazy sequence of samples, starting at `t = 0` and ending at `t_end`
    ///
    /// Every call restarts the run from the initial field. The sequence ends after the first
    /// error, samples already produced remain valid.
    pub fn samples(&self) -> TransientSamples<'_, 'p, 'a, T, Materials, Profile> {
        TransientSamples {
            simulation: self,
            field: self.initial.clone(),
            step: 0,
            started: false,
            finished: false,
        }
    }

    fn advance(
        &self,
        field: &TemperatureField<T>,
        step: usize,
    ) -> Result<TemperatureField<T>, ThermalError<T>> {
        let owned;
        let step_operator = match &self.frozen {
            Some(frozen) => frozen,
            None => {
                owned = self
                    .problem
                    .step_operator(field, self.settings.scheme, self.dt)?;
                &owned
            }
        };
        let StepOperator {
            operator,
            capacity,
            shifted,
        } = step_operator;

        let current = field.as_vector();
        let next = match shifted {
            None => {
                if self.frozen.is_none() {
                    let limit = explicit_stability_limit(operator, capacity);
                    if self.settings.dt > limit {
                        return Err(ThermalError::Stability {
                            dt: self.settings.dt,
                            limit,
                        });
                    }
                }
                let time = self.dt * T::from_usize(step).unwrap();
                let rhs = &operator.boundary_source + &self.cell_power * self.profile.scale(time);
                let mut flux = DVector::zeros(current.len());
                multiply(&operator.matrix, current, &mut flux);
                current + (rhs - flux).component_div(capacity) * self.dt
            }
            Some(shifted) => {
                let time = self.dt * T::from_usize(step + 1).unwrap();
                let rhs = current.component_mul(capacity) / self.dt
                    + &operator.boundary_source
                    + &self.cell_power * self.profile.scale(time);
                conjugate_gradient(
                    shifted,
                    &rhs,
                    current,
                    self.linear_tolerance,
                    self.maximum_linear_iterations,
                )?
                .solution
            }
        };
        Ok(TemperatureField::from_vector(next))
    }
}

/// Iterator over the samples of a transient run
pub struct TransientSamples<'s, 'p, 'a, T: RealField, Materials, Profile> {
    simulation: &'s TransientSimulation<'p, 'a, T, Materials, Profile>,
    field: TemperatureField<T>,
    step: usize,
    started: bool,
    finished: bool,
}

impl<'s, 'p, 'a, T, Materials, Profile> Iterator for TransientSamples<'s, 'p, 'a, T, Materials, Profile>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
    Profile: SourceProfile<T>,
{
    type Item = Result<TransientSample<T>, ThermalError<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(Ok(TransientSample {
                time: T::zero(),
                temperature: self.field.clone(),
            }));
        }
        let simulation = self.simulation;
        while self.step < simulation.steps {
            match simulation.advance(&self.field, self.step) {
                Ok(next) => self.field = next,
                Err(error) => {
                    self.finished = true;
                    return Some(Err(error));
                }
            }
            self.step += 1;
            if self.step % simulation.sample_every == 0 || self.step == simulation.steps {
                tracing::debug!(
                    "Transient step {} of {}, peak temperature {} K",
                    self.step,
                    simulation.steps,
                    self.field.maximum()
                );
                return Some(Ok(TransientSample {
                    time: simulation.dt * T::from_usize(self.step).unwrap(),
                    temperature: self.field.clone(),
                }));
            }
        }
        self.finished = true;
        None
    }
}

/// Runs a transient problem in one call, collecting every sample
pub fn solve_transient<T, Materials, Profile>(
    mesh: &Mesh3d<T>,
    source: &HeatSource<T>,
    profile: Profile,
    materials: &Materials,
    boundary_conditions: &BoundaryConditions<T>,
    settings: TransientSettings<T>,
) -> Result<Vec<TransientSample<T>>, ThermalError<T>>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
    Profile: SourceProfile<T>,
{
    let problem = ThermalProblemBuilder::new()
        .with_mesh(mesh)
        .with_materials(materials)
        .with_boundary_conditions(boundary_conditions)
        .build()?;
    let simulation = problem.transient(source, profile, settings, &Convergence::default())?;
    let samples = simulation.samples().collect();
    samples
}

#[cfg(test)]
mod test {
    use super::{solve_transient, TimeScheme, TransientSettings};
    use crate::device::info_desk::UniformMaterial;
    use crate::error::ThermalError;
    use crate::thermal::{
        BoundaryCondition, BoundaryConditions, Continuous, Convergence, HeatSource,
        ThermalProblemBuilder,
    };
    use approx::assert_relative_eq;
    use hemtherm_mesher::{create_rectilinear_mesh_3d, create_segments_1d, Face, Mesh3d};
    use nalgebra::DVector;

    fn column() -> Mesh3d<f64> {
        create_rectilinear_mesh_3d(
            create_segments_1d(1e-5, 1, 0.),
            create_segments_1d(1e-5, 1, 0.),
            create_segments_1d(1e-4, 10, 0.),
        )
    }

    fn settings(scheme: TimeScheme, dt: f64) -> TransientSettings<f64> {
        TransientSettings {
            scheme,
            dt,
            t_end: 1e-4,
            sample_interval: 1e-5,
            update_properties: false,
        }
    }

    #[test]
    fn samples_cover_the_whole_run() {
        let mesh = column();
        let materials = UniformMaterial::new(130., 2329., 705.).unwrap();
        let conditions = BoundaryConditions::single_sink(
            Face::ZMin,
            BoundaryCondition::Isothermal { temperature: 300. },
        );
        let source = HeatSource::from_density(DVector::from_element(mesh.num_cells(), 1e12));
        let samples = solve_transient(
            &mesh,
            &source,
            Continuous,
            &materials,
            &conditions,
            settings(TimeScheme::Implicit, 1e-6),
        )
        .unwrap();
        assert_eq!(samples.len(), 11);
        assert_relative_eq!(samples[0].time, 0.);
        assert_relative_eq!(samples[10].time, 1e-4, max_relative = 1e-12);
        // A heated column warms monotonically from its initial temperature
        assert!(samples
            .windows(2)
            .all(|pair| pair[1].temperature.maximum() > pair[0].temperature.maximum()));
    }

    #[test]
    fn samples_restart_on_every_call() {
        let mesh = column();
        let materials = UniformMaterial::new(130., 2329., 705.).unwrap();
        let conditions = BoundaryConditions::single_sink(
            Face::ZMin,
            BoundaryCondition::Isothermal { temperature: 300. },
        );
        let source = HeatSource::from_density(DVector::from_element(mesh.num_cells(), 1e12));
        let problem = ThermalProblemBuilder::new()
            .with_mesh(&mesh)
            .with_materials(&materials)
            .with_boundary_conditions(&conditions)
            .build()
            .unwrap();
        let simulation = problem
            .transient(
                &source,
                Continuous,
                settings(TimeScheme::Implicit, 1e-6),
                &Convergence::default(),
            )
            .unwrap();
        let first = simulation.samples().take(3).collect::<Result<Vec<_>, _>>().unwrap();
        let second = simulation.samples().take(3).collect::<Result<Vec<_>, _>>().unwrap();
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.time, b.time);
            assert_eq!(a.temperature, b.temperature);
        }
    }

    #[test]
    fn explicit_and_implicit_agree_for_small_steps() {
        let mesh = column();
        let materials = UniformMaterial::new(130., 2329., 705.).unwrap();
        let conditions = BoundaryConditions::single_sink(
            Face::ZMin,
            BoundaryCondition::Isothermal { temperature: 300. },
        );
        let source = HeatSource::from_density(DVector::from_element(mesh.num_cells(), 1e12));
        let run = |scheme| {
            solve_transient(
                &mesh,
                &source,
                Continuous,
                &materials,
                &conditions,
                settings(scheme, 1e-8),
            )
            .unwrap()
        };
        let explicit = run(TimeScheme::Explicit);
        let implicit = run(TimeScheme::Implicit);
        let (a, b) = (&explicit[10].temperature, &implicit[10].temperature);
        assert!(a.max_change(b) < 1e-2 * (b.maximum() - 300.));
    }

    #[test]
    fn explicit_steps_above_the_stability_limit_fail_before_stepping() {
        let mesh = column();
        let materials = UniformMaterial::new(130., 2329., 705.).unwrap();
        let conditions = BoundaryConditions::single_sink(
            Face::ZMin,
            BoundaryCondition::Isothermal { temperature: 300. },
        );
        let source = HeatSource::zeros(mesh.num_cells());
        let result = solve_transient(
            &mesh,
            &source,
            Continuous,
            &materials,
            &conditions,
            settings(TimeScheme::Explicit, 1e-5),
        );
        match result {
            Err(ThermalError::Stability { dt, limit }) => {
                assert_eq!(dt, 1e-5);
                assert!(limit < dt);
            }
            _ => panic!("expected a stability error"),
        }
    }
}
