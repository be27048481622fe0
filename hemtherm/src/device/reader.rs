use super::Material;
use crate::{
    constants::{MICROMETRE, NANOMETRE, TWO_DEG_OFFSET},
    error::ThermalError,
    thermal::BoundaryCondition,
};
use config::{Config, File};
use nalgebra::RealField;
use serde::Deserialize;
use std::{collections::BTreeMap, ops::Deref, path::PathBuf};

/// A device description, read from a `.toml` file
///
/// Layers are listed from the bottom of the substrate to the top surface. Thicknesses are in
/// nanometres and lateral dimensions in micrometres, the accessors on `Device` convert to metres.
#[derive(Clone, Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + RealField"))]
pub struct Device<T> {
    pub name: String,
    pub dimensions: Dimensions<T>,
    pub gate: Gate<T>,
    pub operating_point: OperatingPoint<T>,
    pub boundaries: Boundaries<T>,
    pub layers: Vec<Layer<T>>,
}

impl<T> Deref for Device<T> {
    type Target = Vec<Layer<T>>;

    fn deref(&self) -> &Self::Target {
        &self.layers
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + RealField"))]
pub struct Layer<T> {
    pub name: String,
    pub material: Material,
    /// Layer thickness in nm
    pub thickness: T,
    pub layer_type: LayerType,
    #[serde(default)]
    pub doping_type: DopingType,
    /// Doping concentration in cm^-3
    #[serde(default = "zero")]
    pub doping_concentration: T,
    /// Alloy fractions, for example `{ Al = 0.05, Ga = 0.95 }`
    pub composition: Option<BTreeMap<String, T>>,
    /// Thermal boundary resistance at the lower interface of the layer in m^2 K / W
    pub boundary_resistance: Option<T>,
}

fn zero<T: RealField>() -> T {
    T::zero()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Substrate,
    Nucleation,
    Buffer,
    Channel,
    Spacer,
    Barrier,
    Cap,
    Passivation,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self {
            LayerType::Substrate => "substrate",
            LayerType::Nucleation => "nucleation",
            LayerType::Buffer => "buffer",
            LayerType::Channel => "channel",
            LayerType::Spacer => "spacer",
            LayerType::Barrier => "barrier",
            LayerType::Cap => "cap",
            LayerType::Passivation => "passivation",
        };
        write!(f, "{}", label)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DopingType {
    N,
    P,
    Undoped,
}

impl Default for DopingType {
    fn default() -> Self {
        Self::Undoped
    }
}

/// Lateral extent of the simulated region, in micrometres
#[derive(Clone, Debug, Deserialize)]
pub struct Dimensions<T> {
    /// Length along the source to drain direction
    pub device_length: T,
    pub gate_width: T,
}

/// Gate placement and the extent of the heat generating region beneath it
#[derive(Clone, Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + RealField"))]
pub struct Gate<T> {
    /// Distance from the source edge to the start of the gate in micrometres
    pub position: T,
    /// Gate length in micrometres
    pub length: T,
    /// Depth of the dissipating region measured down from the top of the channel, in nm
    pub heat_depth: T,
    /// Extension of the dissipating region beyond the drain edge of the gate, in micrometres
    #[serde(default = "zero")]
    pub drain_extension: T,
}

/// The bias point of the device
///
/// Dissipated power is given either directly or as the product of the drain voltage and current.
#[derive(Clone, Debug, Deserialize)]
pub struct OperatingPoint<T> {
    /// Dissipated power in W
    pub power: Option<T>,
    /// Drain voltage in V
    pub drain_voltage: Option<T>,
    /// Drain current in A
    pub drain_current: Option<T>,
    /// Exponent `m` of the drain current degradation `I(T) = I_0 (T / T_0)^(-m)`
    pub current_exponent: Option<T>,
    pub pulse: Option<Pulse<T>>,
}

/// Pulsed operation, all times in seconds
#[derive(Clone, Debug, Deserialize)]
pub struct Pulse<T> {
    pub period: T,
    pub pulse_width: T,
    pub cycles: usize,
}

/// Boundary conditions for the bottom of the substrate, the top surface and the four sides
#[derive(Clone, Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Boundaries<T> {
    pub bottom: BoundaryCondition<T>,
    #[serde(default)]
    pub top: BoundaryCondition<T>,
    #[serde(default)]
    pub sides: BoundaryCondition<T>,
}

impl<T: Copy + RealField + serde::de::DeserializeOwned> Device<T> {
    /// Reads and validates a device file
    pub fn build(path: PathBuf) -> Result<Self, ThermalError<T>> {
        let s = Config::builder()
            .add_source(File::from(path.clone()))
            .build()
            .map_err(|e| ThermalError::configuration(path.display().to_string(), e.to_string()))?;
        let device: Self = s.try_deserialize().map_err(|e| {
            ThermalError::configuration(
                path.display().to_string(),
                format!("failed to deserialize device: {}", e),
            )
        })?;
        device.validate()?;
        Ok(device)
    }
}

impl<T: Copy + RealField> Device<T> {
    /// Checks the physical consistency of the description
    pub fn validate(&self) -> Result<(), ThermalError<T>> {
        if self.layers.is_empty() {
            return Err(ThermalError::configuration(
                "layers",
                "the device must contain at least one layer",
            ));
        }
        for layer in self.iter() {
            if layer.thickness <= T::zero() {
                return Err(ThermalError::configuration(
                    format!("layers.{}.thickness", layer.name),
                    format!("layer thickness must be positive, found {} nm", layer.thickness),
                ));
            }
            if layer.doping_concentration < T::zero() {
                return Err(ThermalError::configuration(
                    format!("layers.{}.doping_concentration", layer.name),
                    "doping concentration cannot be negative",
                ));
            }
            if let Some(resistance) = layer.boundary_resistance {
                if resistance < T::zero() {
                    return Err(ThermalError::configuration(
                        format!("layers.{}.boundary_resistance", layer.name),
                        "thermal boundary resistance cannot be negative",
                    ));
                }
            }
        }

        if self.dimensions.device_length <= T::zero() {
            return Err(ThermalError::configuration(
                "dimensions.device_length",
                "must be positive",
            ));
        }
        if self.dimensions.gate_width <= T::zero() {
            return Err(ThermalError::configuration(
                "dimensions.gate_width",
                "must be positive",
            ));
        }

        let gate = &self.gate;
        if gate.length <= T::zero() || gate.position < T::zero() {
            return Err(ThermalError::configuration(
                "gate",
                "the gate length must be positive and the gate position non-negative",
            ));
        }
        if gate.drain_extension < T::zero() {
            return Err(ThermalError::configuration(
                "gate.drain_extension",
                "cannot be negative",
            ));
        }
        if gate.position + gate.length + gate.drain_extension > self.dimensions.device_length {
            return Err(ThermalError::configuration(
                "gate.position",
                format!(
                    "the heated region must end within the device length of {} um",
                    self.dimensions.device_length
                ),
            ));
        }

        let channel = self.channel_index()?;
        if gate.heat_depth <= T::zero() || gate.heat_depth > self.layers[channel].thickness {
            return Err(ThermalError::configuration(
                "gate.heat_depth",
                format!(
                    "must lie in (0, {}] nm, the thickness of the channel",
                    self.layers[channel].thickness
                ),
            ));
        }

        self.dissipated_power()?;
        if let Some(pulse) = &self.operating_point.pulse {
            if pulse.period <= T::zero()
                || pulse.pulse_width <= T::zero()
                || pulse.pulse_width > pulse.period
            {
                return Err(ThermalError::configuration(
                    "operating_point.pulse",
                    "the pulse width must be positive and no longer than the period",
                ));
            }
            if pulse.cycles == 0 {
                return Err(ThermalError::configuration(
                    "operating_point.pulse.cycles",
                    "at least one cycle is required",
                ));
            }
        }
        Ok(())
    }

    /// The index of the channel layer, counted from the bottom of the stack
    pub fn channel_index(&self) -> Result<usize, ThermalError<T>> {
        self.iter()
            .position(|layer| layer.layer_type == LayerType::Channel)
            .ok_or_else(|| {
                ThermalError::configuration(
                    "layers",
                    "no layer has `layer_type = \"channel\"`, so the heated region is undefined",
                )
            })
    }

    /// The dissipated power in W at the nominal operating point
    pub fn dissipated_power(&self) -> Result<T, ThermalError<T>> {
        let point = &self.operating_point;
        let power = match (point.power, point.drain_voltage, point.drain_current) {
            (Some(power), _, _) => power,
            (None, Some(voltage), Some(current)) => voltage * current,
            _ => {
                return Err(ThermalError::configuration(
                    "operating_point",
                    "give either `power`, or both `drain_voltage` and `drain_current`",
                ))
            }
        };
        if power <= T::zero() {
            return Err(ThermalError::configuration(
                "operating_point.power",
                format!("the dissipated power must be positive, found {} W", power),
            ));
        }
        Ok(power)
    }

    /// Total thickness of the stack in nm
    pub fn total_thickness(&self) -> T {
        self.iter()
            .fold(T::zero(), |acc, layer| acc + layer.thickness)
    }

    /// Thickness of the layers grown on the substrate in nm
    pub fn epitaxial_thickness(&self) -> T {
        self.iter()
            .filter(|layer| layer.layer_type != LayerType::Substrate)
            .fold(T::zero(), |acc, layer| acc + layer.thickness)
    }

    /// Depths of the epitaxial layer interfaces measured from the top surface in nm, starting at zero
    pub fn layer_boundaries(&self) -> Vec<T> {
        let mut depth = T::zero();
        let mut boundaries = vec![depth];
        for layer in self
            .iter()
            .rev()
            .filter(|layer| layer.layer_type != LayerType::Substrate)
        {
            depth += layer.thickness;
            boundaries.push(depth);
        }
        boundaries
    }

    /// Approximate depth of the two dimensional electron gas below the top surface in nm
    ///
    /// The gas forms just beneath the barrier, so the depth accumulates the cap and barrier from the
    /// top down and adds a fixed offset once the barrier is passed.
    pub fn two_deg_depth(&self) -> T {
        let mut depth = T::zero();
        for layer in self.iter().rev() {
            match layer.layer_type {
                LayerType::Cap => depth += layer.thickness,
                LayerType::Barrier => {
                    depth += layer.thickness + T::from_f64(TWO_DEG_OFFSET).unwrap();
                    break;
                }
                _ => {}
            }
        }
        depth
    }

    pub fn device_length(&self) -> T {
        self.dimensions.device_length * T::from_f64(MICROMETRE).unwrap()
    }

    pub fn gate_width(&self) -> T {
        self.dimensions.gate_width * T::from_f64(MICROMETRE).unwrap()
    }

    /// Start and end of the heated region along the device length, in metres
    pub fn heated_span(&self) -> (T, T) {
        let micrometre = T::from_f64(MICROMETRE).unwrap();
        let start = self.gate.position * micrometre;
        let end = (self.gate.position + self.gate.length + self.gate.drain_extension) * micrometre;
        (start, end)
    }

    /// Thickness of each layer in metres, from the bottom of the stack
    pub fn layer_thicknesses(&self) -> Vec<T> {
        let nanometre = T::from_f64(NANOMETRE).unwrap();
        self.iter()
            .map(|layer| layer.thickness * nanometre)
            .collect()
    }

    /// Height above the bottom of the substrate of the lower and upper faces of the heated slab, in metres
    pub fn heated_heights(&self) -> Result<(T, T), ThermalError<T>> {
        let channel = self.channel_index()?;
        let thicknesses = self.layer_thicknesses();
        let channel_top = thicknesses[..=channel]
            .iter()
            .fold(T::zero(), |acc, &thickness| acc + thickness);
        let depth = self.gate.heat_depth * T::from_f64(NANOMETRE).unwrap();
        Ok((channel_top - depth, channel_top))
    }
}
