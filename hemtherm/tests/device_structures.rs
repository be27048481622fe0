use hemtherm::{
    device::{
        build_heat_source, build_mesh, info_desk::BuildInfoDesk, Device, Resolution, Substrate,
    },
    postprocessor::junction_temperature,
    thermal::{BoundaryConditions, Convergence, Coupling, SelfHeating, ThermalProblemBuilder},
};
use rayon::prelude::*;
use utilities::structures::construct_device;

fn junction_at(device: &Device<f64>, power: f64) -> f64 {
    let info_desk = device.build_device_info_desk();
    let mesh = build_mesh(device, Resolution::Coarse, 1.3).unwrap();
    let source = build_heat_source(&mesh, device, power).unwrap();
    let conditions = BoundaryConditions::from_device(&device.boundaries);
    let problem = ThermalProblemBuilder::new()
        .with_mesh(&mesh)
        .with_materials(&info_desk)
        .with_boundary_conditions(&conditions)
        .build()
        .unwrap();
    let solution = problem
        .solve_steady(&source, &Convergence::new(1e-2, 30))
        .unwrap();
    assert!(solution.converged());
    junction_temperature(solution.temperature(), &source).unwrap()
}

#[test]
fn bundled_structures_are_valid() {
    for name in [
        "hemt_sic.toml",
        "hemt_si.toml",
        "hemt_sapphire.toml",
        "gan_slab.toml",
    ] {
        let device = construct_device(name);
        assert!(device.validate().is_ok(), "{} failed validation", name);
        assert!(device.dissipated_power().unwrap() > 0.);
    }
}

#[test]
fn substrate_conductivity_orders_the_junction_temperature() {
    let junctions = vec![Substrate::SiC, Substrate::Si, Substrate::Sapphire]
        .into_par_iter()
        .map(|substrate| junction_at(&Device::default_hemt(substrate), 0.01))
        .collect::<Vec<_>>();
    assert!(junctions[0] > 300.);
    assert!(junctions[0] < junctions[1]);
    assert!(junctions[1] < junctions[2]);
}

#[test]
fn self_heating_settles_below_the_cold_power() {
    let device = construct_device("hemt_sic.toml");
    let info_desk = device.build_device_info_desk();
    let mesh = build_mesh(&device, Resolution::Coarse, 1.3).unwrap();
    let source = build_heat_source(&mesh, &device, 1.).unwrap();
    let conditions = BoundaryConditions::from_device(&device.boundaries);
    let problem = ThermalProblemBuilder::new()
        .with_mesh(&mesh)
        .with_materials(&info_desk)
        .with_boundary_conditions(&conditions)
        .build()
        .unwrap();

    let point = &device.operating_point;
    let (voltage, current) = (
        point.drain_voltage.unwrap(),
        point.drain_current.unwrap(),
    );
    let model = SelfHeating::new(voltage, current, 300., 1.5);
    let coupled = problem
        .solve_coupled(
            &source,
            model,
            &Convergence::new(1e-2, 30),
            &Coupling::default(),
        )
        .unwrap();

    assert!(coupled.converged());
    assert!(coupled.junction_temperature() > 300.);
    // The hot device draws less current than it would at the sink temperature
    assert!(coupled.power() < voltage * current);
    let expected = SelfHeating::new(voltage, current, 300., 1.5)
        .current(coupled.junction_temperature())
        * voltage;
    approx::assert_relative_eq!(coupled.power(), expected, max_relative = 1e-2);
}
