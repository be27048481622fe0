use hemtherm::{
    device::{build_heat_source, build_mesh, info_desk::UniformMaterial, Device, Resolution},
    thermal::{BoundaryCondition, BoundaryConditions, HeatSource},
};
use hemtherm_mesher::{Face, Mesh3d};
use std::path::PathBuf;

/// Conductivity of GaN at room temperature in W / m K
pub const GAN_CONDUCTIVITY: f64 = 230.;

pub fn structure_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../structures")
        .join(name)
}

pub fn construct_device(name: &str) -> Device<f64> {
    Device::build(structure_path(name)).unwrap()
}

/// The 300 um GaN slab, heated over its top face and sunk at the bottom
pub fn construct_gan_slab(
    resolution: Resolution,
    power: f64,
) -> (Device<f64>, Mesh3d<f64>, HeatSource<f64>) {
    let device = construct_device("gan_slab.toml");
    let mesh = build_mesh(&device, resolution, 1.2).unwrap();
    let source = build_heat_source(&mesh, &device, power).unwrap();
    (device, mesh, source)
}

/// GaN with its room temperature properties held fixed
pub fn construct_constant_gan() -> UniformMaterial<f64> {
    UniformMaterial::new(GAN_CONDUCTIVITY, 6150., 490.).unwrap()
}

pub fn construct_substrate_sink(temperature: f64) -> BoundaryConditions<f64> {
    BoundaryConditions::single_sink(Face::ZMin, BoundaryCondition::Isothermal { temperature })
}
