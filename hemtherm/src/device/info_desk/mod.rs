//! Generates and returns compile-time defined thermal properties
//!
//! This module defines the `Material` enum which represents all materials implemented
//! in the simulation software, and the `MaterialModel` trait through which the solver queries
//! conductivity, density and specific heat without knowing how they are tabulated.

mod materials;

pub use materials::Material;

use super::Device;
use crate::constants::REFERENCE_TEMPERATURE;
use miette::Diagnostic;
use nalgebra::RealField;

#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum MaterialError<T: RealField> {
    #[error("temperature {temperature} K lies outside the validated range [{minimum}, {maximum}] K of {material}")]
    #[diagnostic(
        code(hemtherm::material::range),
        help("reduce the dissipated power or improve the heat sinking of the device")
    )]
    OutOfRange {
        material: String,
        temperature: T,
        minimum: T,
        maximum: T,
    },
    #[error("region {region} was requested but the material model describes {number_of_regions} regions")]
    #[diagnostic(code(hemtherm::material::region))]
    UnknownRegion {
        region: usize,
        number_of_regions: usize,
    },
    #[error("{parameter} must be positive, found {value}")]
    #[diagnostic(code(hemtherm::material::non_physical))]
    NonPhysical { parameter: &'static str, value: T },
}

/// The material capability consumed by the thermal solver
///
/// Regions are indexed as in the mesh, for a device built from a layer stack the region of a
/// cell is the index of its layer counted from the bottom of the substrate.
pub trait MaterialModel<T: RealField> {
    /// Thermal conductivity in W / m K
    fn conductivity(&self, region: usize, temperature: T) -> Result<T, MaterialError<T>>;
    /// Mass density in kg / m^3
    fn density(&self, region: usize) -> Result<T, MaterialError<T>>;
    /// Specific heat capacity in J / kg K
    fn specific_heat(&self, region: usize, temperature: T) -> Result<T, MaterialError<T>>;
    /// Thermal boundary resistance in m^2 K / W at the interface below `region`
    fn boundary_resistance(&self, _region: usize) -> T {
        T::zero()
    }

    /// Heat capacity per unit volume in J / m^3 K
    fn volumetric_heat_capacity(&self, region: usize, temperature: T) -> Result<T, MaterialError<T>>
    where
        T: Copy,
    {
        Ok(self.density(region)? * self.specific_heat(region, temperature)?)
    }
}

/// Thermal parameters for a single layer
///
/// This contains the information which can be determined at compile time, ie that which is NOT
/// defined by the end user
#[derive(Clone, Debug)]
pub struct LayerInfoDesk<T: RealField> {
    material: Material,
    /// Conductivity at the reference temperature
    conductivity: T,
    /// The exponent `alpha` in `k(T) = k_300 (T / 300)^(-alpha)`
    conductivity_exponent: T,
    density: T,
    /// Specific heat at the reference temperature
    specific_heat: T,
    /// The slope `beta` in `c_p(T) = c_300 (1 + beta (T - 300))`
    specific_heat_slope: T,
    temperature_range: (T, T),
}

impl<T: Copy + RealField> LayerInfoDesk<T> {
    pub fn material(&self) -> Material {
        self.material
    }

    fn check_range(&self, temperature: T) -> Result<(), MaterialError<T>> {
        let (minimum, maximum) = self.temperature_range;
        if temperature < minimum || temperature > maximum {
            return Err(MaterialError::OutOfRange {
                material: self.material.to_string(),
                temperature,
                minimum,
                maximum,
            });
        }
        Ok(())
    }

    pub fn conductivity_at(&self, temperature: T) -> Result<T, MaterialError<T>> {
        self.check_range(temperature)?;
        let reference = T::from_f64(REFERENCE_TEMPERATURE).unwrap();
        Ok(self.conductivity * (temperature / reference).powf(-self.conductivity_exponent))
    }

    pub fn specific_heat_at(&self, temperature: T) -> Result<T, MaterialError<T>> {
        self.check_range(temperature)?;
        let reference = T::from_f64(REFERENCE_TEMPERATURE).unwrap();
        Ok(self.specific_heat * (T::one() + self.specific_heat_slope * (temperature - reference)))
    }
}

/// Struct holding the thermal information for every layer in the device
#[derive(Clone, Debug)]
pub struct DeviceInfoDesk<T: RealField> {
    /// Each layer in the stack, ordered from the bottom of the substrate
    pub(crate) layers: Vec<LayerInfoDesk<T>>,
    /// Each layer in the stack has a thermal boundary resistance at its lower interface
    pub(crate) boundary_resistances: Vec<T>,
}

impl<T: Copy + RealField> DeviceInfoDesk<T> {
    fn layer(&self, region: usize) -> Result<&LayerInfoDesk<T>, MaterialError<T>> {
        self.layers.get(region).ok_or(MaterialError::UnknownRegion {
            region,
            number_of_regions: self.layers.len(),
        })
    }

    pub fn number_of_regions(&self) -> usize {
        self.layers.len()
    }
}

impl<T: Copy + RealField> MaterialModel<T> for DeviceInfoDesk<T> {
    fn conductivity(&self, region: usize, temperature: T) -> Result<T, MaterialError<T>> {
        self.layer(region)?.conductivity_at(temperature)
    }

    fn density(&self, region: usize) -> Result<T, MaterialError<T>> {
        Ok(self.layer(region)?.density)
    }

    fn specific_heat(&self, region: usize, temperature: T) -> Result<T, MaterialError<T>> {
        self.layer(region)?.specific_heat_at(temperature)
    }

    fn boundary_resistance(&self, region: usize) -> T {
        self.boundary_resistances
            .get(region)
            .copied()
            .unwrap_or_else(T::zero)
    }
}

/// Temperature independent properties shared by every region
#[derive(Copy, Clone, Debug)]
pub struct UniformMaterial<T> {
    conductivity: T,
    density: T,
    specific_heat: T,
}

impl<T: Copy + RealField> UniformMaterial<T> {
    pub fn new(conductivity: T, density: T, specific_heat: T) -> Result<Self, MaterialError<T>> {
        for (parameter, value) in [
            ("conductivity", conductivity),
            ("density", density),
            ("specific heat", specific_heat),
        ] {
            if value <= T::zero() {
                return Err(MaterialError::NonPhysical { parameter, value });
            }
        }
        Ok(Self {
            conductivity,
            density,
            specific_heat,
        })
    }
}

impl<T: Copy + RealField> MaterialModel<T> for UniformMaterial<T> {
    fn conductivity(&self, _region: usize, _temperature: T) -> Result<T, MaterialError<T>> {
        Ok(self.conductivity)
    }

    fn density(&self, _region: usize) -> Result<T, MaterialError<T>> {
        Ok(self.density)
    }

    fn specific_heat(&self, _region: usize, _temperature: T) -> Result<T, MaterialError<T>> {
        Ok(self.specific_heat)
    }
}

/// A helper trait to build an instance of `DeviceInfoDesk`
pub trait BuildInfoDesk<T: RealField> {
    /// Builds a single instance of `DeviceInfoDesk`
    fn build_device_info_desk(&self) -> DeviceInfoDesk<T>;
}

impl<T: Copy + RealField> BuildInfoDesk<T> for Device<T> {
    fn build_device_info_desk(&self) -> DeviceInfoDesk<T> {
        let layers = self
            .iter()
            .map(|layer| layer.material.get_info())
            .collect();
        let boundary_resistances = self
            .iter()
            .map(|layer| layer.boundary_resistance.unwrap_or_else(T::zero))
            .collect();
        DeviceInfoDesk {
            layers,
            boundary_resistances,
        }
    }
}
