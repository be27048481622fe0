use super::{Convergence, HeatSource, SteadySolution, TemperatureField, ThermalProblem};
use crate::{device::info_desk::MaterialModel, error::ThermalError};
use nalgebra::RealField;

/// Dissipated power as a function of the junction temperature
pub trait PowerModel<T> {
    fn power(&mut self, junction_temperature: T) -> T;
}

impl<T, F> PowerModel<T> for F
where
    F: FnMut(T) -> T,
{
    fn power(&mut self, junction_temperature: T) -> T {
        self(junction_temperature)
    }
}

/// Self heating at a fixed drain bias
///
/// The drain current falls with temperature as the channel mobility degrades,
/// `I(T) = I0 (T / T0)^-m`, so the dissipated power is `V I(T)`.
#[derive(Clone, Debug)]
pub struct SelfHeating<T> {
    voltage: T,
    current: T,
    reference_temperature: T,
    exponent: T,
}

impl<T: Copy + RealField> SelfHeating<T> {
    pub fn new(voltage: T, current: T, reference_temperature: T, exponent: T) -> Self {
        Self {
            voltage,
            current,
            reference_temperature,
            exponent,
        }
    }

    pub fn current(&self, junction_temperature: T) -> T {
        self.current * (junction_temperature / self.reference_temperature).powf(-self.exponent)
    }
}

impl<T: Copy + RealField> PowerModel<T> for SelfHeating<T> {
    fn power(&mut self, junction_temperature: T) -> T {
        self.voltage * self.current(junction_temperature)
    }
}

/// Stopping criteria for the electro-thermal loop
#[derive(Clone, Debug)]
pub struct Coupling<T> {
    /// Change in junction temperature between passes for convergence, in K
    pub(crate) tolerance: T,
    pub(crate) maximum_iterations: usize,
}

impl<T: Copy + RealField> Coupling<T> {
    pub fn new(tolerance: T, maximum_iterations: usize) -> Self {
        Self {
            tolerance,
            maximum_iterations,
        }
    }
}

impl<T: Copy + RealField> Default for Coupling<T> {
    fn default() -> Self {
        Self {
            tolerance: T::from_f64(0.1).unwrap(),
            maximum_iterations: 20,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CoupledSolution<T: RealField> {
    pub(crate) solution: SteadySolution<T>,
    /// The heat source carrying the final power
    pub(crate) source: HeatSource<T>,
    pub(crate) power: T,
    pub(crate) junction_temperature: T,
    pub(crate) iterations: usize,
    pub(crate) converged: bool,
}

impl<T: Copy + RealField> CoupledSolution<T> {
    pub fn solution(&self) -> &SteadySolution<T> {
        &self.solution
    }

    pub fn source(&self) -> &HeatSource<T> {
        &self.source
    }

    pub fn power(&self) -> T {
        self.power
    }

    pub fn junction_temperature(&self) -> T {
        self.junction_temperature
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn converged(&self) -> bool {
        self.converged
    }
}

impl<'a, T, Materials> ThermalProblem<'a, T, Materials>
where
    T: Copy + RealField,
    Materials: MaterialModel<T>,
{
    /// Iterates the steady solve with the power fed back from the junction temperature
    ///
    /// `source` fixes the spatial distribution of the heat, its magnitude is rescaled on each
    /// pass to the power returned by `model`. Each steady solve starts from the previous field.
    pub fn solve_coupled<Model>(
        &self,
        source: &HeatSource<T>,
        mut model: Model,
        convergence: &Convergence<T>,
        coupling: &Coupling<T>,
    ) -> Result<CoupledSolution<T>, ThermalError<T>>
    where
        Model: PowerModel<T>,
    {
        if !(coupling.tolerance > T::zero()) || coupling.maximum_iterations == 0 {
            return Err(ThermalError::configuration(
                "coupling",
                "the tolerance must be positive and at least one iteration allowed",
            ));
        }
        let base_power = source.total_power(self.mesh);
        if !(base_power > T::zero()) {
            return Err(ThermalError::configuration(
                "heat source",
                "the coupled solve needs a source with positive power to rescale",
            ));
        }

        let mut field =
            TemperatureField::uniform(self.mesh.num_cells(), self.reference_temperature()?);
        let mut power = model.power(field.maximum_over(source.active_cells()).unwrap_or_else(T::zero));
        let mut previous_junction: Option<T> = None;

        for iteration in 1..=coupling.maximum_iterations {
            check_power(power)?;
            let scaled = source.scaled(power / base_power);
            let solution = self.solve_steady_from(&scaled, convergence, field)?;
            let junction_temperature = solution
                .temperature()
                .maximum_over(scaled.active_cells())
                .unwrap_or_else(|| solution.temperature().maximum());
            field = solution.temperature().clone();

            tracing::info!(
                "Coupling iteration {}: {} W gives a junction temperature of {} K",
                iteration,
                power,
                junction_temperature
            );

            let settled = previous_junction
                .map(|previous| (junction_temperature - previous).abs() < coupling.tolerance)
                .unwrap_or(false);
            if settled || iteration == coupling.maximum_iterations {
                if !settled {
                    tracing::warn!(
                        "Electro-thermal loop stopped after {} iterations without converging",
                        iteration
                    );
                }
                return Ok(CoupledSolution {
                    solution,
                    source: scaled,
                    power,
                    junction_temperature,
                    iterations: iteration,
                    converged: settled,
                });
            }
            previous_junction = Some(junction_temperature);
            power = model.power(junction_temperature);
        }
        unreachable!("the loop returns on its final iteration")
    }
}

fn check_power<T: Copy + RealField>(power: T) -> Result<(), ThermalError<T>> {
    if !(power >= T::zero()) || !power.is_finite() {
        return Err(ThermalError::configuration(
            "power model",
            format!("returned a non-physical power of {} W", power),
        ));
    }
    Ok(())
}
