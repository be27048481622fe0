use approx::assert_relative_eq;
use hemtherm::{
    device::{
        build_heat_source, build_mesh, info_desk::BuildInfoDesk, Device, Resolution, Substrate,
    },
    postprocessor::{junction_temperature, thermal_resistance, PostProcessorBuilder},
    thermal::{
        solve_steady, BoundaryCondition, BoundaryConditions, Convergence, HeatSource,
        ThermalProblemBuilder,
    },
};
use hemtherm_mesher::Face;
use utilities::{
    construct_box_mesh,
    structures::{construct_constant_gan, construct_gan_slab, construct_substrate_sink},
};

#[test]
fn zero_source_with_isothermal_faces_stays_at_the_boundary_temperature() {
    let mesh = construct_box_mesh([20e-6, 10e-6, 5e-6], [6, 4, 5]);
    let materials = construct_constant_gan();
    let conditions =
        BoundaryConditions::uniform(BoundaryCondition::Isothermal { temperature: 345. });
    let solution = solve_steady(
        &mesh,
        &HeatSource::zeros(mesh.num_cells()),
        &materials,
        &conditions,
        1.,
        15,
    )
    .unwrap();
    assert!(solution.converged());
    for index in 0..mesh.num_cells() {
        assert_relative_eq!(solution.temperature().get(index), 345., epsilon = 1e-9);
    }
}

#[test]
fn gan_slab_resistance_matches_one_dimensional_conduction() {
    let (_, mesh, source) = construct_gan_slab(Resolution::Fine, 1.);
    let materials = construct_constant_gan();
    let conditions = construct_substrate_sink(300.);
    let solution = solve_steady(&mesh, &source, &materials, &conditions, 1e-3, 15).unwrap();

    let tj = junction_temperature(solution.temperature(), &source).unwrap();
    let resistance = thermal_resistance(tj, 300., source.total_power(&mesh)).unwrap();
    let expected = 300e-6 / (230. * 100e-12);
    assert_relative_eq!(resistance, expected, max_relative = 0.03);
}

#[test]
fn constant_conductivity_gives_a_power_independent_resistance() {
    let materials = construct_constant_gan();
    let conditions = construct_substrate_sink(300.);
    let mut previous_tj = 300.;
    let mut resistances = Vec::new();
    for power in [0.1, 0.2, 0.4, 0.8] {
        let (_, mesh, source) = construct_gan_slab(Resolution::Coarse, power);
        let solution = solve_steady(&mesh, &source, &materials, &conditions, 1e-3, 15).unwrap();
        let tj = junction_temperature(solution.temperature(), &source).unwrap();
        assert!(tj > previous_tj);
        previous_tj = tj;
        resistances.push(thermal_resistance(tj, 300., power).unwrap());
    }
    for resistance in resistances.iter().skip(1) {
        assert_relative_eq!(*resistance, resistances[0], max_relative = 1e-6);
    }
}

#[test]
fn generated_heat_leaves_through_the_sinks() {
    let device: Device<f64> = Device::default_hemt(Substrate::SiC);
    let mesh = build_mesh(&device, Resolution::Coarse, 1.3).unwrap();
    let source = build_heat_source(&mesh, &device, 0.05).unwrap();
    let materials = construct_constant_gan();
    let conditions = construct_substrate_sink(300.).with_face(
        Face::ZMax,
        BoundaryCondition::Convective {
            h: 1e5,
            ambient: 290.,
        },
    );
    let problem = ThermalProblemBuilder::new()
        .with_mesh(&mesh)
        .with_materials(&materials)
        .with_boundary_conditions(&conditions)
        .build()
        .unwrap();
    let solution = problem
        .solve_steady(&source, &Convergence::new(1e-3, 15))
        .unwrap();

    let flows = problem.boundary_heat_flow(solution.temperature()).unwrap();
    let outflow: f64 = flows.iter().sum();
    assert_relative_eq!(outflow, source.total_power(&mesh), max_relative = 1e-6);
    // Adiabatic sides carry nothing
    for face in [Face::XMin, Face::XMax, Face::YMin, Face::YMax] {
        assert_eq!(flows[face.index()], 0.);
    }
    assert!(flows[Face::ZMin.index()] > flows[Face::ZMax.index()]);
}

#[test]
fn hemt_on_sic_reaches_a_converged_junction_temperature() {
    let device: Device<f64> = Device::default_hemt(Substrate::SiC);
    let info_desk = device.build_device_info_desk();
    let mesh = build_mesh(&device, Resolution::Coarse, 1.3).unwrap();
    let source = build_heat_source(&mesh, &device, device.dissipated_power().unwrap()).unwrap();
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

    let metrics = PostProcessorBuilder::new()
        .with_mesh(&mesh)
        .build()
        .metrics(solution.temperature(), &source, 300.)
        .unwrap();
    assert!(metrics.junction_temperature > 300.);
    assert!(metrics.junction_temperature < 900.);
    assert!(metrics.thermal_resistance > 0.);
    // The hottest cell sits in the heated channel under the gate
    let channel = device.channel_index().unwrap();
    let (i, j, k) = metrics.hot_spot.cell;
    assert_eq!(mesh.region(mesh.index(i, j, k)), channel);
    assert!(source.active_cells().contains(&mesh.index(i, j, k)));
}
