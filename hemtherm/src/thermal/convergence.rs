use nalgebra::RealField;

/// Stopping criteria for the nonlinear loop and the linear solve nested inside it
#[derive(Clone, Debug)]
pub struct Convergence<T>
where
    T: RealField,
{
    /// Maximum per-cell temperature change between passes for convergence, in K
    pub(crate) tolerance: T,
    pub(crate) maximum_iterations: usize,
    /// Number of consecutive growing changes which is treated as divergence
    pub(crate) divergence_window: usize,
    /// Under-relaxation factor in `(0, 1]` applied to each update of the field
    pub(crate) relaxation: T,
    /// Relative residual of the preconditioned conjugate gradient solve
    pub(crate) linear_tolerance: T,
    pub(crate) maximum_linear_iterations: usize,
}

impl<T: Copy + RealField> Default for Convergence<T> {
    fn default() -> Self {
        Self {
            tolerance: T::one(),
            maximum_iterations: 15,
            divergence_window: 3,
            relaxation: T::one(),
            linear_tolerance: T::from_f64(1e-10).unwrap(),
            maximum_linear_iterations: 10_000,
        }
    }
}

impl<T: Copy + RealField> Convergence<T> {
    pub fn new(tolerance: T, maximum_iterations: usize) -> Self {
        Self {
            tolerance,
            maximum_iterations,
            ..Default::default()
        }
    }

    pub fn with_divergence_window(mut self, divergence_window: usize) -> Self {
        self.divergence_window = divergence_window;
        self
    }

    pub fn with_relaxation(mut self, relaxation: T) -> Self {
        self.relaxation = relaxation;
        self
    }

    pub fn with_linear_solver(mut self, tolerance: T, maximum_iterations: usize) -> Self {
        self.linear_tolerance = tolerance;
        self.maximum_linear_iterations = maximum_iterations;
        self
    }

    pub fn tolerance(&self) -> T {
        self.tolerance
    }

    pub fn maximum_iterations(&self) -> usize {
        self.maximum_iterations
    }

    pub fn divergence_window(&self) -> usize {
        self.divergence_window
    }

    pub fn relaxation(&self) -> T {
        self.relaxation
    }

    pub fn linear_tolerance(&self) -> T {
        self.linear_tolerance
    }

    pub fn maximum_linear_iterations(&self) -> usize {
        self.maximum_linear_iterations
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::ThermalError<T>> {
        use crate::error::ThermalError;
        if !(self.tolerance > T::zero()) {
            return Err(ThermalError::configuration(
                "steady.tolerance",
                format!("must be positive, found {}", self.tolerance),
            ));
        }
        if self.maximum_iterations == 0 {
            return Err(ThermalError::configuration(
                "steady.maximum_iterations",
                "at least one iteration is required",
            ));
        }
        if self.divergence_window == 0 {
            return Err(ThermalError::configuration(
                "steady.divergence_window",
                "the window must span at least one iteration",
            ));
        }
        if !(self.relaxation > T::zero() && self.relaxation <= T::one()) {
            return Err(ThermalError::configuration(
                "steady.relaxation",
                format!("must lie in (0, 1], found {}", self.relaxation),
            ));
        }
        if !(self.linear_tolerance > T::zero()) || self.maximum_linear_iterations == 0 {
            return Err(ThermalError::configuration(
                "linear",
                "the tolerance must be positive and at least one iteration allowed",
            ));
        }
        Ok(())
    }
}

/// Watches the change metric of successive passes for sustained growth
#[derive(Clone, Debug)]
pub(crate) struct DivergenceMonitor<T> {
    window: usize,
    previous: Option<T>,
    increases: usize,
}

impl<T: Copy + RealField> DivergenceMonitor<T> {
    pub(crate) fn new(window: usize) -> Self {
        Self {
            window,
            previous: None,
            increases: 0,
        }
    }

    /// Records the latest change, returning `true` once it has grown `window` times in a row
    pub(crate) fn record(&mut self, change: T) -> bool {
        match self.previous {
            Some(previous) if change > previous => self.increases += 1,
            _ => self.increases = 0,
        }
        self.previous = Some(change);
        self.increases >= self.window
    }
}
