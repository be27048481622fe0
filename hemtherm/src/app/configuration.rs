use crate::device::Resolution;
use crate::thermal::{Convergence, Coupling, TransientSettings};
use color_eyre::eyre::eyre;
use config::{Config, Environment, File};
use nalgebra::RealField;
use serde::{de::DeserializeOwned, Deserialize};
use std::{env, path::PathBuf};

#[derive(Debug, Deserialize)]
pub(crate) struct Configuration<T> {
    pub(crate) global: GlobalConfiguration<T>,
    pub(crate) mesh: MeshConfiguration<T>,
    pub(crate) steady: SteadyConfiguration<T>,
    pub(crate) linear: LinearConfiguration<T>,
    pub(crate) transient: TransientSettings<T>,
    pub(crate) coupling: CouplingConfiguration<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GlobalConfiguration<T> {
    /// Temperature of the device at the start of a transient run in K
    pub(crate) ambient_temperature: T,
    pub(crate) results_directory: PathBuf,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeshConfiguration<T> {
    pub(crate) resolution: Resolution,
    pub(crate) maximum_growth_rate: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SteadyConfiguration<T> {
    pub(crate) tolerance: T,
    pub(crate) maximum_iterations: usize,
    pub(crate) divergence_window: usize,
    pub(crate) relaxation: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinearConfiguration<T> {
    pub(crate) tolerance: T,
    pub(crate) maximum_iterations: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CouplingConfiguration<T> {
    pub(crate) tolerance: T,
    pub(crate) maximum_iterations: usize,
}

impl<T: DeserializeOwned> Configuration<T> {
    pub(crate) fn build() -> color_eyre::Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let directory = concat!(env!("CARGO_MANIFEST_DIR"), "/../.config");

        let s = Config::builder()
            // The default settings for the simulation which we use in the general case
            .add_source(File::with_name(&format!("{}/default", directory)))
            // The override settings which may be set by the user, optional
            .add_source(File::with_name(&format!("{}/{}", directory, run_mode)).required(false))
            // Individual values set in the environment with the `HEMTHERM` prefix
            .add_source(Environment::with_prefix("HEMTHERM").separator("__"))
            .build()?;

        s.try_deserialize()
            .map_err(|e| eyre!(format!("Failed to deserialize the config file: {:?}", e)))
    }
}

impl<T: Copy + RealField> Configuration<T> {
    pub(crate) fn convergence(&self) -> Convergence<T> {
        Convergence::new(self.steady.tolerance, self.steady.maximum_iterations)
            .with_divergence_window(self.steady.divergence_window)
            .with_relaxation(self.steady.relaxation)
            .with_linear_solver(self.linear.tolerance, self.linear.maximum_iterations)
    }

    pub(crate) fn coupling(&self) -> Coupling<T> {
        Coupling::new(self.coupling.tolerance, self.coupling.maximum_iterations)
    }
}

#[cfg(test)]
mod test {
    use super::Configuration;
    use crate::device::Resolution;

    #[test]
    fn default_configuration_deserializes() {
        let config = Configuration::<f64>::build().unwrap();
        assert_eq!(config.steady.maximum_iterations, 15);
        assert_eq!(config.steady.tolerance, 1.);
        assert_eq!(config.mesh.resolution, Resolution::Medium);
        assert!(config.convergence().validate().is_ok());
    }
}
