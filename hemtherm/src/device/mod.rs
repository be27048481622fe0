//! Controls the deserialization and storage of the top-level device structure,
//! and the `MaterialModel` capability which yields the thermal properties necessary
//! to run the simulation

/// The info-desk traits which describe the material parameters used in the simulation
pub mod info_desk;
/// Conversion of a device into a tagged rectilinear mesh and a heat source
mod mesh;
/// The deserialization and storage of the `Device`
pub(crate) mod reader;
/// The reference layer stacks
mod stacks;

pub use info_desk::Material;
pub use mesh::{build_heat_source, build_mesh, Resolution};
pub use reader::{
    Boundaries, Device, Dimensions, DopingType, Gate, Layer, LayerType, OperatingPoint, Pulse,
};
pub use stacks::Substrate;
