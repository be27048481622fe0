use super::HotSpot;
use crate::thermal::{TemperatureField, TransientSample};
use hemtherm_mesher::{Axis, FiniteVolumeMesh, Mesh3d};
use nalgebra::RealField;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes CSV snapshots of a run into its own timestamped directory
#[derive(Clone, Debug)]
pub struct ResultsWriter {
    directory: PathBuf,
}

impl ResultsWriter {
    /// Creates `root/<label>_<timestamp>` to hold the output of one run
    pub fn create(root: &Path, label: &str) -> io::Result<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let directory = root.join(format!("{}_{}", label, stamp));
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    /// Writes into an existing directory
    pub fn in_directory(directory: PathBuf) -> io::Result<Self> {
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// One row per cell: centre position, region and temperature
    pub fn write_temperature<T, Mesh>(
        &self,
        mesh: &Mesh,
        field: &TemperatureField<T>,
    ) -> io::Result<PathBuf>
    where
        T: Copy + RealField,
        Mesh: FiniteVolumeMesh<T>,
    {
        if mesh.number_of_cells() != field.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "field length ({}) doesn't match the cell count ({})",
                    field.len(),
                    mesh.number_of_cells()
                ),
            ));
        }
        let path = self.directory.join("temperature.csv");
        let mut file = File::create(&path)?;
        writeln!(file, "x,y,z,region,temperature")?;
        for index in 0..mesh.number_of_cells() {
            let centre = mesh.centre(index);
            writeln!(
                file,
                "{},{},{},{},{}",
                centre.x,
                centre.y,
                centre.z,
                mesh.region_of(index),
                field.get(index)
            )?;
        }
        Ok(path)
    }

    /// The vertical temperature profile through the hot spot, from the top surface down
    pub fn write_profile<T: Copy + RealField>(
        &self,
        mesh: &Mesh3d<T>,
        field: &TemperatureField<T>,
        hot_spot: &HotSpot<T>,
    ) -> io::Result<PathBuf> {
        let path = self.directory.join("profile.csv");
        let mut file = File::create(&path)?;
        let z_axis = mesh.axis(Axis::Z);
        let top = z_axis.end();
        let (i, j, _) = hot_spot.cell;
        writeln!(file, "depth,region,temperature")?;
        for k in (0..z_axis.num_cells()).rev() {
            let index = mesh.index(i, j, k);
            writeln!(
                file,
                "{},{},{}",
                top - z_axis.centre(k),
                mesh.region(index),
                field.get(index)
            )?;
        }
        Ok(path)
    }

    /// Time history of the peak and junction temperatures of a transient run
    pub fn write_transient<T: Copy + RealField>(
        &self,
        samples: &[TransientSample<T>],
        active_cells: &[usize],
    ) -> io::Result<PathBuf> {
        let path = self.directory.join("transient.csv");
        let mut file = File::create(&path)?;
        writeln!(file, "time,maximum_temperature,junction_temperature")?;
        for sample in samples {
            let junction = sample
                .temperature
                .maximum_over(active_cells)
                .unwrap_or_else(|| sample.temperature.maximum());
            writeln!(
                file,
                "{},{},{}",
                sample.time,
                sample.temperature.maximum(),
                junction
            )?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod test {
    use super::ResultsWriter;
    use crate::postprocessor::hot_spot;
    use crate::thermal::TemperatureField;
    use hemtherm_mesher::{create_rectilinear_mesh_3d, create_unit_segments_1d};
    use rand::Rng;

    #[test]
    fn snapshots_have_a_header_and_one_row_per_entry() {
        let mesh = create_rectilinear_mesh_3d(
            create_unit_segments_1d::<f64>(3),
            create_unit_segments_1d(2),
            create_unit_segments_1d(4),
        );
        let mut rng = rand::thread_rng();
        let field = TemperatureField::from_vector(nalgebra::DVector::from_fn(
            mesh.num_cells(),
            |_, _| 300. + 50. * rng.gen::<f64>(),
        ));
        let directory = std::env::temp_dir().join(format!("hemtherm_writer_{}", rng.gen::<u64>()));
        let writer = ResultsWriter::in_directory(directory.clone()).unwrap();

        let temperature = writer.write_temperature(&mesh, &field).unwrap();
        let contents = std::fs::read_to_string(temperature).unwrap();
        assert_eq!(contents.lines().count(), mesh.num_cells() + 1);
        assert!(contents.starts_with("x,y,z,region,temperature"));

        let spot = hot_spot(&mesh, &field).unwrap();
        let profile = writer.write_profile(&mesh, &field, &spot).unwrap();
        let contents = std::fs::read_to_string(profile).unwrap();
        assert_eq!(contents.lines().count(), 5);

        std::fs::remove_dir_all(directory).unwrap();
    }
}
