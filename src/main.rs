// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS experiment runner
//!
//! Runs segmented master-equation experiments described in YAML.
//!
//! # Usage
//!
//! ```bash
//! # Run an experiment and write results and a plot
//! qubit-os-exp run rabi.yaml --output results.json --plot rabi.svg
//!
//! # Check an experiment description without running it
//! qubit-os-exp validate rabi.yaml
//!
//! # Show effective configuration
//! qubit-os-exp config
//!
//! # Sample a colormap
//! qubit-os-exp colormap viridis --count 5
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ndarray::Array2;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_experiment::experiment::{ExperimentDescription, SimulationResult};
use qubit_os_experiment::lindblad::RungeKuttaSolver;
use qubit_os_experiment::plot::{
    multi_panel_image, plot_common_x, render, sample_colormap, AxisValues, Axes, Colormap,
};
use qubit_os_experiment::solver::MasterEquationSolver;
use qubit_os_experiment::validation::{validate_experiment, validate_resource_limits};
use qubit_os_experiment::{config::Config, Result, VERSION};

/// QubitOS segmented experiment runner
#[derive(Parser)]
#[command(name = "qubit-os-exp")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Segmented master-equation experiments")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an experiment description
    Run {
        /// Experiment description (YAML)
        file: PathBuf,

        /// Write a JSON result report here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write an SVG plot of the expectation values here
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Write an SVG grid of |ρ| at each segment start and at the end here
        #[arg(long)]
        states_plot: Option<PathBuf>,

        /// Maximum integration step
        #[arg(long, env = "QUBITOS_SOLVER_MAX_STEP")]
        max_step: Option<f64>,
    },

    /// Validate an experiment description without running it
    Validate {
        /// Experiment description (YAML)
        file: PathBuf,
    },

    /// Show effective configuration
    Config,

    /// Print colors sampled from a colormap
    Colormap {
        /// Colormap name, optionally with an `_r` suffix
        name: String,

        /// Number of samples
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    // Initialize logging
    init_logging(&config.logging.level, &config.logging.format);

    match cli.command {
        Commands::Run {
            file,
            output,
            plot,
            states_plot,
            max_step,
        } => {
            if let Some(step) = max_step {
                config.solver.max_step = step;
            }
            config.validate()?;

            let experiment = ExperimentDescription::load(&file)?.build()?;
            validate_resource_limits(&experiment, &config.validation.limits)?;

            let solver = RungeKuttaSolver::from_config(&config.solver);
            info!(
                version = VERSION,
                file = %file.display(),
                solver = solver.name(),
                max_step = solver.max_step(),
                "Running experiment"
            );

            let result = experiment.run(&solver)?;
            let report = result.report(solver.name());

            match output {
                Some(path) => {
                    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                    info!(path = %path.display(), "Wrote results");
                }
                None => println!("{}", serde_json::to_string_pretty(&report)?),
            }

            if let Some(path) = plot {
                write_plot(&result, &config, &path)?;
            }
            if let Some(path) = states_plot {
                write_state_plot(&result, &config, &path)?;
            }
        }

        Commands::Validate { file } => {
            let checked = ExperimentDescription::load(&file)
                .and_then(|desc| desc.build())
                .and_then(|exp| {
                    validate_experiment(&exp)?;
                    validate_resource_limits(&exp, &config.validation.limits)?;
                    Ok(exp)
                });
            match checked {
                Ok(exp) => {
                    println!(
                        "Experiment is valid: {} segments, {} trajectory points",
                        exp.segments().len(),
                        exp.expected_len()
                    );
                }
                Err(e) => {
                    error!(error = %e, "Invalid experiment");
                    eprintln!("Experiment error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Colormap { name, count } => {
            for color in sample_colormap(&name, count)? {
                println!(
                    "{}  rgba({:.4}, {:.4}, {:.4}, {:.1})",
                    color, color.r, color.g, color.b, color.a
                );
            }
        }
    }

    Ok(())
}

/// Initialize logging with tracing.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Plot expectation values over time, or purity when there are no observables.
fn write_plot(result: &SimulationResult, config: &Config, path: &Path) -> Result<()> {
    let times = result.trajectory.times();
    let axes = Axes::new().with_labels("t", "value");

    let axes = if result.expectations.is_empty() {
        plot_common_x(
            times,
            &[result.trajectory.purities()],
            Some(axes.with_title("Purity")),
            None,
            Some(&["purity"][..]),
        )?
    } else {
        let series: Vec<Vec<f64>> = result.expectations.rows().iter().map(|r| r.real()).collect();
        let labels = result.expectations.labels();
        plot_common_x(
            times,
            &series,
            Some(axes.with_title("Expectation values")),
            None,
            Some(labels.as_slice()),
        )?
    };

    let svg = render::axes_to_svg(&axes, (config.plot.width, config.plot.height))?;
    std::fs::write(path, svg)?;
    info!(path = %path.display(), "Wrote plot");
    Ok(())
}

/// Heatmaps of |ρ| at every segment start and at the final time.
fn write_state_plot(result: &SimulationResult, config: &Config, path: &Path) -> Result<()> {
    let trajectory = &result.trajectory;
    let mut indices = trajectory.segment_starts().to_vec();
    indices.push(trajectory.len().saturating_sub(1));
    indices.dedup();

    let dim = trajectory.states().first().map_or(0, |s| s.dim());
    let axis: Vec<f64> = (0..dim).map(|k| k as f64).collect();
    let zs: Vec<Array2<f64>> = indices
        .iter()
        .map(|&i| trajectory.states()[i].to_density_matrix().mapv(|z| z.norm()))
        .collect();
    let labels: Vec<String> = indices
        .iter()
        .map(|&i| format!("t = {:.3}", trajectory.times()[i]))
        .collect();
    let labels: Vec<&str> = labels.iter().map(String::as_str).collect();

    let grid = multi_panel_image(
        &AxisValues::Shared(axis.clone()),
        &AxisValues::Shared(axis),
        &zs,
        Some(labels.as_slice()),
    )?
    .with_columns(config.plot.panel_columns)
    .with_colormap(Colormap::by_name(&config.plot.colormap)?);

    let svg = render::image_grid_to_svg(&grid, (config.plot.width, config.plot.height))?;
    std::fs::write(path, svg)?;
    info!(path = %path.display(), panels = zs.len(), "Wrote state plot");
    Ok(())
}
