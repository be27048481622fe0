use hemtherm::{
    device::Resolution,
    error::ThermalError,
    thermal::{
        Continuous, Convergence, DutyCycle, HeatSource, TemperatureField, ThermalProblemBuilder,
        TimeScheme, TransientSettings,
    },
};
use utilities::structures::{construct_constant_gan, construct_gan_slab, construct_substrate_sink};

fn settings(scheme: TimeScheme, dt: f64, t_end: f64) -> TransientSettings<f64> {
    TransientSettings {
        scheme,
        dt,
        t_end,
        sample_interval: t_end / 10.,
        update_properties: false,
    }
}

#[test]
fn hot_slab_relaxes_monotonically_towards_the_sink() {
    let (_, mesh, _) = construct_gan_slab(Resolution::Coarse, 0.);
    let materials = construct_constant_gan();
    let conditions = construct_substrate_sink(300.);
    let problem = ThermalProblemBuilder::new()
        .with_mesh(&mesh)
        .with_materials(&materials)
        .with_boundary_conditions(&conditions)
        .build()
        .unwrap();

    let simulation = problem
        .transient_from(
            &HeatSource::zeros(mesh.num_cells()),
            Continuous,
            settings(TimeScheme::Implicit, 1e-5, 1e-3),
            &Convergence::default(),
            TemperatureField::uniform(mesh.num_cells(), 400.),
        )
        .unwrap();
    let samples = simulation
        .samples()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(samples.len(), 11);

    for pair in samples.windows(2) {
        let (earlier, later) = (&pair[0].temperature, &pair[1].temperature);
        for index in 0..mesh.num_cells() {
            assert!(later.get(index) <= earlier.get(index) + 1e-6);
            assert!(later.get(index) >= 300. - 1e-6);
        }
    }
    let last = &samples.last().unwrap().temperature;
    assert!(last.maximum() < 400.);
}

#[test]
fn explicit_step_beyond_the_stability_limit_is_rejected_before_stepping() {
    let (_, mesh, source) = construct_gan_slab(Resolution::Coarse, 0.1);
    let materials = construct_constant_gan();
    let conditions = construct_substrate_sink(300.);
    let problem = ThermalProblemBuilder::new()
        .with_mesh(&mesh)
        .with_materials(&materials)
        .with_boundary_conditions(&conditions)
        .build()
        .unwrap();

    let result = problem.transient(
        &source,
        Continuous,
        settings(TimeScheme::Explicit, 1., 10.),
        &Convergence::default(),
    );
    assert!(matches!(result, Err(ThermalError::Stability { .. })));
}

#[test]
fn pulsed_heating_stays_cooler_than_continuous_heating() {
    let (_, mesh, source) = construct_gan_slab(Resolution::Coarse, 0.1);
    let materials = construct_constant_gan();
    let conditions = construct_substrate_sink(300.);
    let problem = ThermalProblemBuilder::new()
        .with_mesh(&mesh)
        .with_materials(&materials)
        .with_boundary_conditions(&conditions)
        .build()
        .unwrap();
    let settings = settings(TimeScheme::Implicit, 1e-6, 1e-4);

    let final_maximum = |samples: Vec<hemtherm::thermal::TransientSample<f64>>| {
        samples.last().unwrap().temperature.maximum()
    };
    let continuous = problem
        .transient(&source, Continuous, settings.clone(), &Convergence::default())
        .unwrap()
        .samples()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let pulsed = problem
        .transient(
            &source,
            DutyCycle::new(2e-5, 5e-6, 5).unwrap(),
            settings,
            &Convergence::default(),
        )
        .unwrap()
        .samples()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let continuous = final_maximum(continuous);
    let pulsed = final_maximum(pulsed);
    assert!(continuous > pulsed);
    assert!(pulsed >= 300.);
}
