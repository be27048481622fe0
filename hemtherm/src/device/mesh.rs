use super::Device;
use crate::{error::ThermalError, thermal::HeatSource};
use hemtherm_mesher::{
    create_rectilinear_mesh_3d, create_segments_1d_from_regions, Grading, Mesh3d, Region1d,
};
use nalgebra::{Point3, RealField};

/// Mesh density presets
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Deserialize, clap::ArgEnum)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Coarse,
    Medium,
    Fine,
    Ultra,
}

impl Resolution {
    /// Cells across each lateral region along the device length
    pub fn lateral_cells(&self) -> usize {
        match self {
            Resolution::Coarse => 4,
            Resolution::Medium => 8,
            Resolution::Fine => 12,
            Resolution::Ultra => 20,
        }
    }

    /// Cells through each layer of the stack
    pub fn cells_per_layer(&self) -> usize {
        match self {
            Resolution::Coarse => 3,
            Resolution::Medium => 5,
            Resolution::Fine => 8,
            Resolution::Ultra => 12,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Resolution::Coarse => write!(f, "coarse"),
            Resolution::Medium => write!(f, "medium"),
            Resolution::Fine => write!(f, "fine"),
            Resolution::Ultra => write!(f, "ultra"),
        }
    }
}

/// Meshes the device, refining laterally towards the gate and vertically towards the top of each layer
///
/// The channel is split at the lower face of the heated slab so the heat source occupies whole cells.
pub fn build_mesh<T: Copy + RealField>(
    device: &Device<T>,
    resolution: Resolution,
    maximum_growth_rate: T,
) -> Result<Mesh3d<T>, ThermalError<T>> {
    if maximum_growth_rate < T::one() {
        return Err(ThermalError::configuration(
            "mesh.maximum_growth_rate",
            format!("must be at least 1, found {}", maximum_growth_rate),
        ));
    }
    device.validate()?;

    let lateral = resolution.lateral_cells();
    let (heat_start, heat_end) = device.heated_span();
    let gate_end = device.gate.position + device.gate.length;
    let gate_end = gate_end * T::from_f64(crate::constants::MICROMETRE).unwrap();
    let length = device.device_length();

    // Regions of zero width are dropped, a gate may sit flush with either end of the device
    let mut x_regions = Vec::with_capacity(4);
    if heat_start > T::zero() {
        x_regions.push(Region1d::graded(
            heat_start,
            lateral,
            0,
            Grading::TowardsEnd(maximum_growth_rate),
        ));
    }
    x_regions.push(Region1d::uniform(gate_end - heat_start, (lateral / 2).max(2), 0));
    if heat_end > gate_end {
        x_regions.push(Region1d::uniform(heat_end - gate_end, (lateral / 2).max(2), 0));
    }
    if length > heat_end {
        x_regions.push(Region1d::graded(
            length - heat_end,
            2 * lateral,
            0,
            Grading::TowardsStart(maximum_growth_rate),
        ));
    }
    let x = create_segments_1d_from_regions(&x_regions, T::zero());

    // The solution does not vary across the gate width when the sides are adiabatic
    let y = create_segments_1d_from_regions(
        &[Region1d::uniform(device.gate_width(), (lateral / 4).max(1), 0)],
        T::zero(),
    );

    let cells = resolution.cells_per_layer();
    let channel = device.channel_index()?;
    let (heat_bottom, heat_top) = device.heated_heights()?;
    let mut z_regions = Vec::with_capacity(device.len() + 1);
    for (index, thickness) in device.layer_thicknesses().into_iter().enumerate() {
        let grading = Grading::TowardsEnd(maximum_growth_rate);
        if index == channel {
            let heated = heat_top - heat_bottom;
            if thickness > heated {
                z_regions.push(Region1d::graded(thickness - heated, cells, index, grading));
            }
            z_regions.push(Region1d::uniform(heated, (cells / 2).max(2), index));
        } else if index == 0 {
            z_regions.push(Region1d::graded(thickness, 2 * cells, index, grading));
        } else {
            z_regions.push(Region1d::graded(thickness, cells, index, grading));
        }
    }
    let z = create_segments_1d_from_regions(&z_regions, T::zero());

    tracing::debug!(
        "Meshed {} at {} resolution: {} x {} x {} cells",
        device.name,
        resolution,
        x.num_cells(),
        y.num_cells(),
        z.num_cells()
    );

    Ok(create_rectilinear_mesh_3d(x, y, z))
}

/// Spreads `power` uniformly over the heated slab beneath the gate
pub fn build_heat_source<T: Copy + RealField>(
    mesh: &Mesh3d<T>,
    device: &Device<T>,
    power: T,
) -> Result<HeatSource<T>, ThermalError<T>> {
    let (start, end) = device.heated_span();
    let (bottom, top) = device.heated_heights()?;
    HeatSource::from_box(
        mesh,
        &Point3::new(start, T::zero(), bottom),
        &Point3::new(end, device.gate_width(), top),
        power,
    )
}

#[cfg(test)]
mod test {
    use super::{build_heat_source, build_mesh, Resolution};
    use crate::device::{Device, Substrate};
    use approx::assert_relative_eq;
    use hemtherm_mesher::Axis;

    #[test]
    fn mesh_spans_the_whole_device() {
        let device: Device<f64> = Device::default_hemt(Substrate::SiC);
        let mesh = build_mesh(&device, Resolution::Coarse, 1.3).unwrap();
        let extent = mesh.extent();
        assert_relative_eq!(extent[0], 10e-6, max_relative = 1e-12);
        assert_relative_eq!(extent[1], 100e-6, max_relative = 1e-12);
        assert_relative_eq!(extent[2], 352_418e-9, max_relative = 1e-12);
    }

    #[test]
    fn every_layer_owns_cells_in_stack_order() {
        let device: Device<f64> = Device::default_hemt(Substrate::Si);
        let mesh = build_mesh(&device, Resolution::Medium, 1.2).unwrap();
        let tags = mesh.axis(Axis::Z).tags();
        assert!(tags.windows(2).all(|pair| pair[1] >= pair[0]));
        for region in 0..device.len() {
            assert!(tags.contains(&region));
        }
    }

    #[test]
    fn heat_source_fills_the_slab_under_the_gate() {
        let device: Device<f64> = Device::default_hemt(Substrate::SiC);
        let mesh = build_mesh(&device, Resolution::Coarse, 1.3).unwrap();
        let source = build_heat_source(&mesh, &device, 0.5).unwrap();
        assert_relative_eq!(source.total_power(&mesh), 0.5, max_relative = 1e-10);

        let heated_volume = source
            .active_cells()
            .iter()
            .map(|&cell| mesh.cell_volume(cell))
            .sum::<f64>();
        assert_relative_eq!(heated_volume, 0.25e-6 * 100e-6 * 50e-9, max_relative = 1e-8);

        let channel = device.channel_index().unwrap();
        assert!(source
            .active_cells()
            .iter()
            .all(|&cell| mesh.region(cell) == channel));
    }

    #[test]
    fn drain_extension_widens_the_heated_region() {
        let mut device: Device<f64> = Device::default_hemt(Substrate::SiC);
        device.gate.drain_extension = 0.5;
        let mesh = build_mesh(&device, Resolution::Coarse, 1.3).unwrap();
        let source = build_heat_source(&mesh, &device, 1.0).unwrap();
        let heated_volume = source
            .active_cells()
            .iter()
            .map(|&cell| mesh.cell_volume(cell))
            .sum::<f64>();
        assert_relative_eq!(heated_volume, 0.75e-6 * 100e-6 * 50e-9, max_relative = 1e-8);
    }

    #[test]
    fn gate_covering_the_whole_length_meshes_without_empty_regions() {
        let mut device: Device<f64> = Device::default_hemt(Substrate::SiC);
        device.gate.position = 0.;
        device.gate.length = device.dimensions.device_length;
        let mesh = build_mesh(&device, Resolution::Coarse, 1.3).unwrap();
        assert_eq!(mesh.axis(Axis::X).num_cells(), 2);
        let source = build_heat_source(&mesh, &device, 1.0).unwrap();
        assert_relative_eq!(source.total_power(&mesh), 1.0, max_relative = 1e-10);
    }

    #[test]
    fn growth_rate_below_one_is_rejected() {
        let device: Device<f64> = Device::default_hemt(Substrate::SiC);
        assert!(build_mesh(&device, Resolution::Coarse, 0.9).is_err());
    }
}
