//! Jacobi preconditioned conjugate gradients for the symmetric positive definite conduction operator

use crate::error::ThermalError;
use nalgebra::{DVector, RealField};
use nalgebra_sparse::CsrMatrix;

/// Outcome of a converged linear solve
#[derive(Clone, Debug)]
pub(crate) struct LinearSolution<T: RealField> {
    pub(crate) solution: DVector<T>,
    pub(crate) iterations: usize,
    pub(crate) residual: T,
}

pub(crate) fn multiply<T: Copy + RealField>(matrix: &CsrMatrix<T>, x: &DVector<T>, y: &mut DVector<T>) {
    for (i, row) in matrix.row_iter().enumerate() {
        y[i] = row
            .col_indices()
            .iter()
            .zip(row.values())
            .fold(T::zero(), |acc, (&j, &value)| acc + value * x[j]);
    }
}

/// Solves `matrix x = rhs` starting from `initial`
///
/// Converges when the residual 2-norm falls below `tolerance` times the norm of `rhs`.
pub(crate) fn conjugate_gradient<T: Copy + RealField>(
    matrix: &CsrMatrix<T>,
    rhs: &DVector<T>,
    initial: &DVector<T>,
    tolerance: T,
    maximum_iterations: usize,
) -> Result<LinearSolution<T>, ThermalError<T>> {
    let n = rhs.len();
    let rhs_norm = rhs.norm();
    if rhs_norm == T::zero() {
        return Ok(LinearSolution {
            solution: DVector::zeros(n),
            iterations: 0,
            residual: T::zero(),
        });
    }
    let target = tolerance * rhs_norm;

    let inverse_diagonal = super::operator::diagonal(matrix).map(|value| {
        if value > T::zero() {
            T::one() / value
        } else {
            T::one()
        }
    });

    let mut x = initial.clone();
    let mut product = DVector::zeros(n);
    multiply(matrix, &x, &mut product);
    let mut r = rhs - &product;
    let mut residual = r.norm();
    if residual <= target {
        return Ok(LinearSolution {
            solution: x,
            iterations: 0,
            residual: residual / rhs_norm,
        });
    }

    let mut z = r.component_mul(&inverse_diagonal);
    let mut p = z.clone();
    let mut rz = r.dot(&z);

    for iteration in 1..=maximum_iterations {
        multiply(matrix, &p, &mut product);
        let curvature = p.dot(&product);
        if curvature <= T::zero() {
            break;
        }
        let alpha = rz / curvature;
        x.axpy(alpha, &p, T::one());
        r.axpy(-alpha, &product, T::one());

        residual = r.norm();
        if residual <= target {
            tracing::debug!(
                "Conjugate gradient converged in {} iterations, relative residual {}",
                iteration,
                residual / rhs_norm
            );
            return Ok(LinearSolution {
                solution: x,
                iterations: iteration,
                residual: residual / rhs_norm,
            });
        }

        z = r.component_mul(&inverse_diagonal);
        let rz_next = r.dot(&z);
        let beta = rz_next / rz;
        p.axpy(T::one(), &z, beta);
        rz = rz_next;
    }

    Err(ThermalError::LinearSolver {
        iterations: maximum_iterations,
        residual: residual / rhs_norm,
        tolerance,
    })
}
