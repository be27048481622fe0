// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//! Errors raised while building and solving a thermal problem

use crate::device::info_desk::MaterialError;
use miette::Diagnostic;
use nalgebra::RealField;

#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum BuildError {
    #[error(transparent)]
    Csr(#[from] CsrError),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// General error for Csr construction, patterns and element access problems
///
/// Failures reported by `nalgebra_sparse` are stored rendered, so the error can cross threads.
pub enum CsrError {
    #[error("{0}")]
    Access(String),
    #[error("invalid sparsity pattern: {0}")]
    Pattern(String),
    #[error("invalid sparse matrix: {0}")]
    Construction(String),
}

impl From<nalgebra_sparse::pattern::SparsityPatternFormatError> for CsrError {
    fn from(error: nalgebra_sparse::pattern::SparsityPatternFormatError) -> Self {
        Self::Pattern(error.to_string())
    }
}

impl From<nalgebra_sparse::SparseFormatError> for CsrError {
    fn from(error: nalgebra_sparse::SparseFormatError) -> Self {
        Self::Construction(error.to_string())
    }
}

/// Failures of a thermal solve
///
/// Each variant is raised at the point of detection and never retried. A solve which
/// fails returns no temperature field.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ThermalError<T: RealField> {
    #[error("no boundary face removes heat from the device")]
    #[diagnostic(
        code(hemtherm::ill_posed_boundary),
        help("set at least one face to `isothermal`, or to `convective` with a positive heat transfer coefficient")
    )]
    IllPosedBoundary,
    #[error("the maximum temperature change grew for {window} consecutive iterations, reaching {change} K")]
    #[diagnostic(
        code(hemtherm::divergence),
        help("reduce `steady.relaxation`, or reduce the dissipated power")
    )]
    Divergence { window: usize, change: T },
    #[error("time step {dt} s exceeds the explicit stability limit of {limit} s, reduce dt below {limit} s")]
    #[diagnostic(
        code(hemtherm::stability),
        help("reduce `transient.dt`, or switch `transient.scheme` to `implicit`")
    )]
    Stability { dt: T, limit: T },
    #[error(transparent)]
    #[diagnostic(code(hemtherm::range))]
    Range(#[from] MaterialError<T>),
    #[error("invalid value for `{parameter}`: {reason}")]
    #[diagnostic(code(hemtherm::configuration))]
    Configuration { parameter: String, reason: String },
    #[error("the linear solve did not reach a residual of {tolerance} in {iterations} iterations (residual {residual})")]
    #[diagnostic(
        code(hemtherm::linear_solver),
        help("increase `linear.maximum_iterations` or relax `linear.tolerance`")
    )]
    LinearSolver {
        iterations: usize,
        residual: T,
        tolerance: T,
    },
    #[error(transparent)]
    #[diagnostic(code(hemtherm::build))]
    Build(#[from] BuildError),
}

impl<T: RealField> ThermalError<T> {
    pub(crate) fn configuration(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

impl<T: RealField> From<CsrError> for ThermalError<T> {
    fn from(error: CsrError) -> Self {
        Self::Build(BuildError::Csr(error))
    }
}
