//! # Postprocessor
//!
//! Derived scalar metrics of a solved temperature field and the CSV snapshots written by the
//! binary.

mod metrics;
mod writer;

pub use metrics::{hot_spot, junction_temperature, thermal_resistance, HotSpot, Metrics};
pub use writer::ResultsWriter;

use crate::thermal::{HeatSource, TemperatureField};
use hemtherm_mesher::Mesh3d;
use miette::Diagnostic;
use nalgebra::RealField;
use std::marker::PhantomData;

#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum PostProcessorError {
    #[error("the heat source has no active cells, the junction temperature is undefined")]
    #[diagnostic(code(hemtherm::postprocessor::no_active_cells))]
    NoActiveCells,
    #[error("the dissipated power must be positive to define a thermal resistance")]
    #[diagnostic(code(hemtherm::postprocessor::no_power))]
    NoPower,
    #[error(transparent)]
    #[diagnostic(code(hemtherm::postprocessor::empty_field))]
    EmptyField(#[from] ndarray_stats::errors::MinMaxError),
    #[error(transparent)]
    #[diagnostic(code(hemtherm::postprocessor::io))]
    Io(#[from] std::io::Error),
}

pub struct PostProcessorBuilder<T, RefMesh> {
    mesh: RefMesh,
    marker: PhantomData<T>,
}

pub struct PostProcessor<'a, T: RealField> {
    mesh: &'a Mesh3d<T>,
}

impl<T: RealField> PostProcessorBuilder<T, ()> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        PostProcessorBuilder {
            mesh: (),
            marker: PhantomData,
        }
    }
}

impl<T: RealField, RefMesh> PostProcessorBuilder<T, RefMesh> {
    pub fn with_mesh<Mesh>(self, mesh: &Mesh) -> PostProcessorBuilder<T, &Mesh> {
        PostProcessorBuilder {
            mesh,
            marker: PhantomData,
        }
    }
}

impl<'a, T: RealField> PostProcessorBuilder<T, &'a Mesh3d<T>> {
    pub fn build(self) -> PostProcessor<'a, T> {
        PostProcessor { mesh: self.mesh }
    }
}

impl<'a, T: Copy + RealField> PostProcessor<'a, T> {
    /// Evaluates every metric of a converged field
    ///
    /// `reference_temperature` is the temperature of the heat sink the resistance is measured
    /// against.
    pub fn metrics(
        &self,
        field: &TemperatureField<T>,
        source: &HeatSource<T>,
        reference_temperature: T,
    ) -> Result<Metrics<T>, PostProcessorError> {
        let junction_temperature = junction_temperature(field, source)?;
        let power = source.total_power(self.mesh);
        Ok(Metrics {
            junction_temperature,
            thermal_resistance: thermal_resistance(
                junction_temperature,
                reference_temperature,
                power,
            )?,
            hot_spot: hot_spot(self.mesh, field)?,
            power,
            reference_temperature,
        })
    }
}
