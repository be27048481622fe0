use crate::error::ThermalError;
use hemtherm_mesher::Mesh3d;
use nalgebra::{DVector, Point3, RealField};

/// Volumetric power density in W / m^3 for every cell in the mesh
#[derive(Clone, Debug)]
pub struct HeatSource<T: RealField> {
    density: DVector<T>,
    active: Vec<usize>,
}

impl<T: Copy + RealField> HeatSource<T> {
    pub fn zeros(num_cells: usize) -> Self {
        Self {
            density: DVector::zeros(num_cells),
            active: Vec::new(),
        }
    }

    pub fn from_density(density: DVector<T>) -> Self {
        let active = density
            .iter()
            .enumerate()
            .filter(|(_, &value)| value != T::zero())
            .map(|(index, _)| index)
            .collect();
        Self { density, active }
    }

    /// Spreads `power` uniformly through the cells whose centres lie inside the box `[lower, upper]`
    pub fn from_box(
        mesh: &Mesh3d<T>,
        lower: &Point3<T>,
        upper: &Point3<T>,
        power: T,
    ) -> Result<Self, ThermalError<T>> {
        let active = (0..mesh.num_cells())
            .filter(|&index| {
                let centre = mesh.cell_centre(index);
                (0..3).all(|axis| centre[axis] >= lower[axis] && centre[axis] <= upper[axis])
            })
            .collect::<Vec<_>>();
        if active.is_empty() {
            return Err(ThermalError::configuration(
                "heat source",
                "the heated box does not contain the centre of any cell, refine the mesh",
            ));
        }
        let volume = active
            .iter()
            .fold(T::zero(), |acc, &index| acc + mesh.cell_volume(index));
        let mut density = DVector::zeros(mesh.num_cells());
        for &index in active.iter() {
            density[index] = power / volume;
        }
        Ok(Self { density, active })
    }

    pub fn density(&self) -> &DVector<T> {
        &self.density
    }

    /// Cells with a non-zero power density
    pub fn active_cells(&self) -> &[usize] {
        &self.active
    }

    /// The power injected into each cell in W
    pub fn cell_power(&self, mesh: &Mesh3d<T>) -> DVector<T> {
        DVector::from_iterator(
            self.density.len(),
            self.density
                .iter()
                .enumerate()
                .map(|(index, &density)| density * mesh.cell_volume(index)),
        )
    }

    pub fn total_power(&self, mesh: &Mesh3d<T>) -> T {
        self.active.iter().fold(T::zero(), |acc, &index| {
            acc + self.density[index] * mesh.cell_volume(index)
        })
    }

    /// The same distribution carrying `factor` times the power
    pub fn scaled(&self, factor: T) -> Self {
        Self {
            density: &self.density * factor,
            active: self.active.clone(),
        }
    }
}

/// Time modulation of a heat source
///
/// The source applied at time `t` is the steady source multiplied by `scale(t)`.
pub trait SourceProfile<T> {
    fn scale(&self, time: T) -> T;
}

impl<T, F> SourceProfile<T> for F
where
    F: Fn(T) -> T,
{
    fn scale(&self, time: T) -> T {
        self(time)
    }
}

/// A source which is always on
#[derive(Copy, Clone, Debug)]
pub struct Continuous;

impl<T: RealField> SourceProfile<T> for Continuous {
    fn scale(&self, _time: T) -> T {
        T::one()
    }
}

/// A pulse train of `cycles` pulses of length `pulse_width`, repeating every `period`
///
/// The source is switched off once the final period has elapsed.
#[derive(Copy, Clone, Debug)]
pub struct DutyCycle<T> {
    pub period: T,
    pub pulse_width: T,
    pub cycles: usize,
}

impl<T: Copy + RealField> DutyCycle<T> {
    pub fn new(period: T, pulse_width: T, cycles: usize) -> Result<Self, ThermalError<T>> {
        if period <= T::zero() || pulse_width <= T::zero() || pulse_width > period {
            return Err(ThermalError::configuration(
                "pulse",
                format!(
                    "the pulse width ({} s) must be positive and no longer than the period ({} s)",
                    pulse_width, period
                ),
            ));
        }
        if cycles == 0 {
            return Err(ThermalError::configuration(
                "pulse.cycles",
                "at least one cycle is required",
            ));
        }
        Ok(Self {
            period,
            pulse_width,
            cycles,
        })
    }

    pub fn duty(&self) -> T {
        self.pulse_width / self.period
    }
}

impl<T: Copy + RealField> SourceProfile<T> for DutyCycle<T> {
    fn scale(&self, time: T) -> T {
        if time < T::zero() {
            return T::zero();
        }
        let elapsed = (time / self.period).floor();
        if elapsed >= T::from_usize(self.cycles).unwrap() {
            return T::zero();
        }
        if time - elapsed * self.period < self.pulse_width {
            T::one()
        } else {
            T::zero()
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Continuous, DutyCycle, HeatSource, SourceProfile};
    use crate::error::ThermalError;
    use approx::assert_relative_eq;
    use hemtherm_mesher::{create_rectilinear_mesh_3d, create_segments_1d};
    use nalgebra::Point3;

    #[test]
    fn box_source_carries_the_requested_power() {
        let mesh = create_rectilinear_mesh_3d(
            create_segments_1d(1f64, 10, 0.),
            create_segments_1d(1f64, 10, 0.),
            create_segments_1d(1f64, 10, 0.),
        );
        let source = HeatSource::from_box(
            &mesh,
            &Point3::new(0.2, 0.2, 0.8),
            &Point3::new(0.4, 0.6, 1.0),
            3.,
        )
        .unwrap();
        assert_eq!(source.active_cells().len(), 2 * 4 * 2);
        assert_relative_eq!(source.total_power(&mesh), 3., max_relative = 1e-12);
        assert_relative_eq!(source.cell_power(&mesh).sum(), 3., max_relative = 1e-12);
        assert_relative_eq!(source.scaled(0.5).total_power(&mesh), 1.5, max_relative = 1e-12);
    }

    #[test]
    fn empty_box_is_rejected() {
        let mesh = create_rectilinear_mesh_3d(
            create_segments_1d(1f64, 2, 0.),
            create_segments_1d(1f64, 2, 0.),
            create_segments_1d(1f64, 2, 0.),
        );
        assert!(HeatSource::from_box(
            &mesh,
            &Point3::new(0.3, 0.3, 0.3),
            &Point3::new(0.4, 0.4, 0.4),
            1.
        )
        .is_err());
    }

    #[test]
    fn duty_cycle_switches_off_between_pulses_and_after_the_train() {
        let profile = DutyCycle::new(1e-3f64, 2.5e-4, 2).unwrap();
        assert_relative_eq!(profile.scale(0.), 1.);
        assert_relative_eq!(profile.scale(2e-4), 1.);
        assert_relative_eq!(profile.scale(5e-4), 0.);
        assert_relative_eq!(profile.scale(1.1e-3), 1.);
        assert_relative_eq!(profile.scale(2.1e-3), 0.);
        assert_relative_eq!(profile.duty(), 0.25);
        assert!(DutyCycle::new(1e-3f64, 2e-3, 1).is_err());
    }

    #[test]
    fn pulse_train_needs_at_least_one_cycle() {
        assert!(matches!(
            DutyCycle::new(1e-3f64, 2.5e-4, 0),
            Err(ThermalError::Configuration { .. })
        ));
    }

    #[test]
    fn closures_and_continuous_sources_are_profiles() {
        let ramp = |time: f64| time * 2.;
        assert_relative_eq!(ramp.scale(0.25), 0.5);
        assert_relative_eq!(SourceProfile::<f64>::scale(&Continuous, 12.), 1.);
    }
}
