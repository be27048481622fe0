//! # Calculations
//!
//! Delegated functions from `App` which read a single device file, solve it and write its results.
//! Each call owns every structure it builds, so several devices can be solved in parallel.

use super::{Calculation, Configuration, HemthermError};
use crate::{
    constants::CURRENT_EXPONENT,
    device::{
        build_heat_source, build_mesh,
        info_desk::{BuildInfoDesk, DeviceInfoDesk},
        Device, Resolution,
    },
    error::ThermalError,
    postprocessor::{Metrics, PostProcessorBuilder, ResultsWriter},
    thermal::{
        BoundaryConditions, Continuous, DutyCycle, HeatSource, SelfHeating, SourceProfile,
        TemperatureField, ThermalProblem, ThermalProblemBuilder,
    },
};
use nalgebra::RealField;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// The outcome of one device calculation
pub(crate) struct Report<T: RealField> {
    pub(crate) device: Device<T>,
    pub(crate) calculation: Calculation,
    pub(crate) metrics: Metrics<T>,
    /// Iterations of the outer loop, steady passes or coupling passes
    pub(crate) iterations: usize,
    pub(crate) converged: bool,
    pub(crate) number_of_cells: usize,
    pub(crate) output: PathBuf,
}

pub(crate) fn run_device<T>(
    path: &Path,
    config: &Configuration<T>,
    calculation: Calculation,
    resolution: Resolution,
) -> Result<Report<T>, HemthermError<T>>
where
    T: Copy + DeserializeOwned + RealField + Send + Sync,
{
    let device: Device<T> = Device::build(path.to_path_buf())?;
    let _span = tracing::info_span!("device", name = %device.name).entered();

    let info_desk = device.build_device_info_desk();
    let mesh = build_mesh(&device, resolution, config.mesh.maximum_growth_rate)?;
    let source = build_heat_source(&mesh, &device, device.dissipated_power()?)?;
    let boundary_conditions = BoundaryConditions::from_device(&device.boundaries);
    let problem = ThermalProblemBuilder::new()
        .with_mesh(&mesh)
        .with_materials(&info_desk)
        .with_boundary_conditions(&boundary_conditions)
        .build()?;

    let label = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| device.name.clone());
    let writer = ResultsWriter::create(&config.global.results_directory, &label)?;
    tracing::info!(
        "Solving {} with {} cells at {} resolution, writing to {}",
        label,
        mesh.num_cells(),
        resolution,
        writer.directory().display()
    );

    let (field, source, iterations, converged) = match calculation {
        Calculation::Steady => {
            let solution = problem.solve_steady(&source, &config.convergence())?;
            let (iterations, converged) = (solution.iterations(), solution.converged());
            (solution.into_temperature(), source, iterations, converged)
        }
        Calculation::Coupled => {
            let model = self_heating(&device, problem.reference_temperature()?)?;
            let coupled =
                problem.solve_coupled(&source, model, &config.convergence(), &config.coupling())?;
            (
                coupled.solution().temperature().clone(),
                coupled.source().clone(),
                coupled.iterations(),
                coupled.converged(),
            )
        }
        Calculation::Transient => {
            let field = match &device.operating_point.pulse {
                Some(pulse) => {
                    let profile = DutyCycle::new(pulse.period, pulse.pulse_width, pulse.cycles)?;
                    run_transient(&problem, &source, profile, config, &writer)?
                }
                None => run_transient(&problem, &source, Continuous, config, &writer)?,
            };
            (field, source, 1, true)
        }
    };

    log_energy_balance(&problem, &field, &source)?;

    let postprocessor = PostProcessorBuilder::new().with_mesh(&mesh).build();
    let metrics = postprocessor.metrics(&field, &source, problem.reference_temperature()?)?;
    writer.write_temperature(&mesh, &field)?;
    writer.write_profile(&mesh, &field, &metrics.hot_spot)?;

    Ok(Report {
        calculation,
        metrics,
        iterations,
        converged,
        number_of_cells: mesh.num_cells(),
        output: writer.directory().to_path_buf(),
        device,
    })
}

/// The bias dependent power model of the device, which needs a drain voltage and current
fn self_heating<T: Copy + RealField>(
    device: &Device<T>,
    reference_temperature: T,
) -> Result<SelfHeating<T>, ThermalError<T>> {
    let point = &device.operating_point;
    match (point.drain_voltage, point.drain_current) {
        (Some(voltage), Some(current)) => Ok(SelfHeating::new(
            voltage,
            current,
            reference_temperature,
            point
                .current_exponent
                .unwrap_or_else(|| T::from_f64(CURRENT_EXPONENT).unwrap()),
        )),
        _ => Err(ThermalError::configuration(
            "operating_point",
            "a coupled calculation needs both `drain_voltage` and `drain_current`",
        )),
    }
}

/// Runs a transient from the ambient temperature, returning the final field
///
/// The samples produced before a failure are still written out.
fn run_transient<T, Profile>(
    problem: &ThermalProblem<'_, T, DeviceInfoDesk<T>>,
    source: &HeatSource<T>,
    profile: Profile,
    config: &Configuration<T>,
    writer: &ResultsWriter,
) -> Result<TemperatureField<T>, HemthermError<T>>
where
    T: Copy + RealField + Send + Sync,
    Profile: SourceProfile<T>,
{
    let initial =
        TemperatureField::uniform(problem.mesh().num_cells(), config.global.ambient_temperature);
    let simulation = problem.transient_from(
        source,
        profile,
        config.transient.clone(),
        &config.convergence(),
        initial,
    )?;

    let mut samples = Vec::new();
    let mut failure = None;
    for sample in simulation.samples() {
        match sample {
            Ok(sample) => samples.push(sample),
            Err(error) => {
                failure = Some(error);
                break;
            }
        }
    }
    writer.write_transient(&samples, source.active_cells())?;
    if let Some(error) = failure {
        return Err(error.into());
    }
    samples
        .pop()
        .map(|sample| sample.temperature)
        .ok_or_else(|| {
            ThermalError::<T>::configuration("transient", "the run produced no samples").into()
        })
}

fn log_energy_balance<T: Copy + RealField>(
    problem: &ThermalProblem<'_, T, DeviceInfoDesk<T>>,
    field: &TemperatureField<T>,
    source: &HeatSource<T>,
) -> Result<(), ThermalError<T>> {
    let flows = problem.boundary_heat_flow(field)?;
    let outflow = flows.iter().fold(T::zero(), |acc, &flow| acc + flow);
    tracing::info!(
        "Energy balance: {} W generated, {} W leaves through the boundaries",
        source.total_power(problem.mesh()),
        outflow
    );
    Ok(())
}
