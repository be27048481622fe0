//! Reference HEMT layer stacks
//!
//! An InAlN/GaN heterostructure grown on one of four substrates, with the default gate and
//! operating point used throughout the examples and benchmarks.

use super::{
    reader::{Boundaries, Dimensions, DopingType, Gate, Layer, LayerType, OperatingPoint},
    Device, Material,
};
use crate::thermal::BoundaryCondition;
use nalgebra::RealField;
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub enum Substrate {
    SiC,
    Si,
    Sapphire,
    GaN,
}

impl Substrate {
    pub const ALL: [Substrate; 4] = [
        Substrate::SiC,
        Substrate::Si,
        Substrate::Sapphire,
        Substrate::GaN,
    ];

    /// Standard wafer thickness in nm
    fn thickness(&self) -> f64 {
        match self {
            Substrate::SiC => 350_000.,
            Substrate::Si => 525_000.,
            Substrate::Sapphire => 430_000.,
            Substrate::GaN => 300_000.,
        }
    }

    fn material(&self) -> Material {
        match self {
            Substrate::SiC => Material::SiC,
            Substrate::Si => Material::Si,
            Substrate::Sapphire => Material::Sapphire,
            Substrate::GaN => Material::GaN,
        }
    }

    /// Whether GaN is grown on a foreign substrate, and needs a nucleation layer
    fn is_foreign(&self) -> bool {
        !matches!(self, Substrate::GaN)
    }
}

impl std::fmt::Display for Substrate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.material())
    }
}

fn layer<T: Copy + RealField>(
    name: &str,
    material: Material,
    thickness: f64,
    layer_type: LayerType,
    doping: Option<(DopingType, f64)>,
) -> Layer<T> {
    let (doping_type, doping_concentration) = doping.unwrap_or((DopingType::Undoped, 0.));
    Layer {
        name: name.into(),
        material,
        thickness: T::from_f64(thickness).unwrap(),
        layer_type,
        doping_type,
        doping_concentration: T::from_f64(doping_concentration).unwrap(),
        composition: None,
        boundary_resistance: None,
    }
}

impl<T: Copy + RealField> Device<T> {
    /// The reference InAlN/GaN HEMT on the given substrate
    ///
    /// A 0.25 um gate starts 1.5 um from the source edge of a 10 um long, 100 um wide device,
    /// dissipating 50 mW in the top 50 nm of the channel. The bottom of the substrate is held at 300K.
    pub fn default_hemt(substrate: Substrate) -> Self {
        let t = |value: f64| T::from_f64(value).unwrap();
        let mut layers = vec![layer(
            "Substrate",
            substrate.material(),
            substrate.thickness(),
            LayerType::Substrate,
            None,
        )];
        if substrate.is_foreign() {
            layers.push(layer(
                "Nucleation",
                Material::AlN,
                100.,
                LayerType::Nucleation,
                None,
            ));
        }
        layers.extend([
            layer("Buffer1", Material::AlGaN, 500., LayerType::Buffer, None),
            layer(
                "Buffer2",
                Material::GaN,
                1500.,
                LayerType::Buffer,
                Some((DopingType::N, 1e16)),
            ),
            layer(
                "Channel",
                Material::GaN,
                300.,
                LayerType::Channel,
                Some((DopingType::N, 1e16)),
            ),
            layer("Spacer", Material::AlN, 1., LayerType::Spacer, None),
            layer(
                "Barrier",
                Material::InAlN,
                15.,
                LayerType::Barrier,
                Some((DopingType::N, 5e18)),
            ),
            layer(
                "Cap",
                Material::GaN,
                2.,
                LayerType::Cap,
                Some((DopingType::N, 2e19)),
            ),
        ]);

        Self {
            name: format!("InAlN/GaN HEMT on {}", substrate),
            dimensions: Dimensions {
                device_length: t(10.0),
                gate_width: t(100.0),
            },
            gate: Gate {
                position: t(1.5),
                length: t(0.25),
                heat_depth: t(50.0),
                drain_extension: T::zero(),
            },
            operating_point: OperatingPoint {
                power: Some(t(0.05)),
                drain_voltage: None,
                drain_current: None,
                current_exponent: None,
                pulse: None,
            },
            boundaries: Boundaries {
                bottom: BoundaryCondition::Isothermal { temperature: t(300.0) },
                top: BoundaryCondition::Adiabatic,
                sides: BoundaryCondition::Adiabatic,
            },
            layers,
        }
    }

    /// Inserts a p-doped AlGaN back barrier directly beneath the channel
    pub fn with_back_barrier(mut self, thickness: T, doping_concentration: T) -> Self {
        let mut composition = BTreeMap::new();
        composition.insert("Al".to_string(), T::from_f64(0.05).unwrap());
        composition.insert("Ga".to_string(), T::from_f64(0.95).unwrap());
        let back_barrier = Layer {
            name: "BackBarrier".into(),
            material: Material::AlGaN,
            thickness,
            layer_type: LayerType::Buffer,
            doping_type: DopingType::P,
            doping_concentration,
            composition: Some(composition),
            boundary_resistance: None,
        };
        let position = self
            .layers
            .iter()
            .position(|layer| layer.layer_type == LayerType::Channel)
            .unwrap_or(self.layers.len());
        self.layers.insert(position, back_barrier);
        self
    }

    /// Adds a passivation layer on top of the stack
    pub fn with_passivation(mut self, material: Material, thickness: T) -> Self {
        self.layers.push(Layer {
            name: "Passivation".into(),
            material,
            thickness,
            layer_type: LayerType::Passivation,
            doping_type: DopingType::Undoped,
            doping_concentration: T::zero(),
            composition: None,
            boundary_resistance: None,
        });
        self
    }
}
