//! # App
//!
//! The command line application. Device files are matched from a path or glob pattern, solved in
//! parallel and summarised on the console.

mod calculations;
mod configuration;
mod error;
mod styles;
mod telemetry;

pub(crate) use configuration::Configuration;
pub(crate) use error::HemthermError;

use crate::device::Resolution;
use calculations::Report;
use clap::{ArgEnum, Parser};
use color_eyre::eyre::eyre;
use glob::glob;
use nalgebra::RealField;
use owo_colors::OwoColorize;
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use styles::Styles;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct App {
    /// A device file, or a glob pattern matching several device files
    file_path: Option<String>,
    #[clap(arg_enum, short, long, default_value = "info")]
    log_level: LogLevel,
    #[clap(arg_enum, short, long, default_value = "steady")]
    calculation: Calculation,
    /// Overrides the mesh resolution set in the configuration
    #[clap(arg_enum, short, long)]
    resolution: Option<Resolution>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
enum LogLevel {
    Trace,
    Info,
    Debug,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
pub(crate) enum Calculation {
    Steady,
    Transient,
    Coupled,
}

impl std::fmt::Display for Calculation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Calculation::Steady => write!(f, "steady"),
            Calculation::Transient => write!(f, "transient"),
            Calculation::Coupled => write!(f, "coupled"),
        }
    }
}

const DEFAULT_STRUCTURES: &str = "structures/*.toml";

pub fn run<T>() -> color_eyre::Result<()>
where
    T: Copy + DeserializeOwned + RealField + Send + Sync,
{
    let cli = App::parse();
    let config: Configuration<T> = Configuration::build()?;

    std::fs::create_dir_all(&config.global.results_directory)?;
    let (subscriber, _guard) =
        telemetry::get_subscriber(cli.log_level, &config.global.results_directory);
    telemetry::init_subscriber(subscriber)?;

    let pattern = cli
        .file_path
        .unwrap_or_else(|| DEFAULT_STRUCTURES.to_string());
    let files = glob(&pattern)?.collect::<Result<Vec<PathBuf>, _>>()?;
    if files.is_empty() {
        return Err(eyre!("No device files match `{}`", pattern));
    }
    let resolution = cli.resolution.unwrap_or(config.mesh.resolution);
    tracing::info!(
        "Running a {} calculation on {} device file(s)",
        cli.calculation,
        files.len()
    );

    // Each device is an independent problem
    let results = files
        .par_iter()
        .map(|path| calculations::run_device(path, &config, cli.calculation, resolution))
        .collect::<Vec<_>>();

    let styles = Styles::for_stdout();
    let term = console::Term::stdout();
    let mut failures = 0;
    let mut reports = Vec::new();
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(report) => {
                print_report(&term, &styles, &report)?;
                reports.push(report);
            }
            Err(error) => {
                failures += 1;
                term.write_line(&format!(
                    "{} {}: {}",
                    "failed".style(styles.error_style),
                    path.display(),
                    error
                ))?;
                tracing::error!("{:?}", miette::Report::new(error));
            }
        }
    }
    if files.len() > 1 {
        print_summary(&term, &styles, &reports)?;
        term.write_line(&format!(
            "{} of {} devices solved",
            files.len() - failures,
            files.len()
        ))?;
    }
    if failures > 0 {
        return Err(eyre!("{} device(s) failed", failures));
    }
    Ok(())
}

fn print_report<T: Copy + RealField>(
    term: &console::Term,
    styles: &Styles,
    report: &Report<T>,
) -> std::io::Result<()> {
    let device = &report.device;
    term.write_line(&format!(
        "{} ({} calculation, {} cells)",
        device.name.style(styles.device_style),
        report.calculation,
        report.number_of_cells
    ))?;
    // The stack is listed from the top surface down
    for layer in device.iter().rev() {
        term.write_line(&format!(
            "    {:<12} {:<10} {:>10} nm  {}",
            layer.name.style(styles.layer_style),
            layer.material.to_string(),
            layer.thickness,
            layer.layer_type
        ))?;
    }
    let metrics = &report.metrics;
    term.write_line(&format!(
        "    junction temperature {} K, thermal resistance {} K/W at {} W",
        metrics.junction_temperature.style(styles.value_style),
        metrics.thermal_resistance.style(styles.value_style),
        metrics.power
    ))?;
    term.write_line(&format!(
        "    hot spot at cell {:?}, ({}, {}, {}) m",
        metrics.hot_spot.cell,
        metrics.hot_spot.position.x,
        metrics.hot_spot.position.y,
        metrics.hot_spot.position.z
    ))?;
    if !report.converged {
        term.write_line(&format!(
            "    {}",
            format!("did not converge in {} iterations", report.iterations)
                .style(styles.warning_style)
        ))?;
    }
    term.write_line(&format!("    results in {}", report.output.display()))?;
    Ok(())
}

/// One line per solved device, sorted from the coolest junction to the hottest
fn print_summary<T: Copy + RealField>(
    term: &console::Term,
    styles: &Styles,
    reports: &[Report<T>],
) -> std::io::Result<()> {
    let mut order = (0..reports.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        reports[a]
            .metrics
            .junction_temperature
            .partial_cmp(&reports[b].metrics.junction_temperature)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    term.write_line(&format!(
        "{:<36} {:>14} {:>14} {:>12}",
        "device", "Tj (K)", "Rth (K/W)", "power (W)"
    ))?;
    for index in order {
        let report = &reports[index];
        let metrics = &report.metrics;
        term.write_line(&format!(
            "{:<36} {:>14.2} {:>14.2} {:>12.4}",
            report.device.name.style(styles.device_style),
            metrics.junction_temperature,
            metrics.thermal_resistance,
            metrics.power
        ))?;
    }
    Ok(())
}
