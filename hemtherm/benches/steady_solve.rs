use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hemtherm::{
    device::{
        build_heat_source, build_mesh, info_desk::BuildInfoDesk, Device, Resolution, Substrate,
    },
    thermal::{BoundaryConditions, Convergence, TemperatureField, ThermalProblemBuilder},
};
use utilities::construct_random_field;

pub fn bench_assembly(c: &mut Criterion) {
    let device: Device<f64> = Device::default_hemt(Substrate::SiC);
    let info_desk = device.build_device_info_desk();
    let conditions = BoundaryConditions::from_device(&device.boundaries);

    let mut group = c.benchmark_group("assemble");
    for resolution in [Resolution::Coarse, Resolution::Medium] {
        let mesh = build_mesh(&device, resolution, 1.3).unwrap();
        let problem = ThermalProblemBuilder::new()
            .with_mesh(&mesh)
            .with_materials(&info_desk)
            .with_boundary_conditions(&conditions)
            .build()
            .unwrap();
        let field = construct_random_field(mesh.num_cells(), 300., 400.);
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &field,
            |b, field: &TemperatureField<f64>| b.iter(|| problem.assemble(black_box(field))),
        );
    }
    group.finish();
}

pub fn bench_steady_solve(c: &mut Criterion) {
    let device: Device<f64> = Device::default_hemt(Substrate::SiC);
    let info_desk = device.build_device_info_desk();
    let conditions = BoundaryConditions::from_device(&device.boundaries);
    let convergence = Convergence::new(1e-2, 30);

    let mut group = c.benchmark_group("solve_steady");
    group.sample_size(10);
    for resolution in [Resolution::Coarse, Resolution::Medium] {
        let mesh = build_mesh(&device, resolution, 1.3).unwrap();
        let source = build_heat_source(&mesh, &device, 0.05).unwrap();
        let problem = ThermalProblemBuilder::new()
            .with_mesh(&mesh)
            .with_materials(&info_desk)
            .with_boundary_conditions(&conditions)
            .build()
            .unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &source,
            |b, source| b.iter(|| problem.solve_steady(black_box(source), &convergence)),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_assembly, bench_steady_solve);
criterion_main!(benches);
