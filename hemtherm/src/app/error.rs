// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//! The error type for the binary

use miette::Diagnostic;
use nalgebra::RealField;

#[derive(thiserror::Error, Debug, Diagnostic)]
pub(crate) enum HemthermError<T: RealField + Send + Sync> {
    #[error(transparent)]
    #[diagnostic(code(hemtherm::io_error))]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    #[diagnostic(code(hemtherm::config_error))]
    ConfigError(#[from] config::ConfigError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Thermal(#[from] crate::error::ThermalError<T>),
    #[error(transparent)]
    #[diagnostic(transparent)]
    PostProcessor(#[from] crate::postprocessor::PostProcessorError),
}

#[cfg(test)]
mod test {
    use super::HemthermError;

    fn assert_send_sync<E: Send + Sync + 'static>() {}

    #[test]
    fn device_failures_can_be_returned_from_the_parallel_sweep() {
        assert_send_sync::<HemthermError<f64>>();
        let error: HemthermError<f64> =
            crate::error::ThermalError::configuration("mesh", "the mesh has no cells").into();
        let report = miette::Report::new(error);
        assert!(report.to_string().contains("mesh"));
    }
}
