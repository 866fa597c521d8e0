//! CLI command handlers.
//!
//! This module contains the execution logic for each CLI command.
//! Extracted to enable comprehensive testing of command behavior.

use std::path::Path;
use std::process::ExitCode;

use crate::config::ValidationConfig;
use crate::edd::analytical::{predict, AnalyticalInputs};
use crate::edd::regime::classify;
use crate::error::SimResult;
use crate::report::{render_table, Reporter};
use crate::scenarios::inclined_plane::check_alpha_s;
use crate::sweep::SweepOrchestrator;

use super::args::RunOverrides;
use super::output::{print_artifacts, print_classification, print_help, print_prediction, print_version};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            config_path,
            overrides,
        } => run_sweep(config_path.as_deref(), &overrides),
        Command::Classify {
            alpha_s,
            config_path,
        } => classify_point(alpha_s, config_path.as_deref()),
        Command::Predict {
            alpha_s,
            config_path,
        } => predict_point(alpha_s, config_path.as_deref()),
        Command::Inspect { results_path } => inspect_results(&results_path),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Load a configuration file, or the reference case when no path is given.
///
/// # Errors
///
/// Returns error if the file cannot be read or fails validation.
pub fn load_config(path: Option<&Path>) -> SimResult<ValidationConfig> {
    path.map_or_else(|| Ok(ValidationConfig::default()), ValidationConfig::load)
}

/// Apply command-line overrides to a configuration.
#[must_use]
pub fn apply_overrides(mut config: ValidationConfig, overrides: &RunOverrides) -> ValidationConfig {
    if let Some(workers) = overrides.workers {
        config.sweep.workers = Some(workers);
    }
    if let Some(final_time) = overrides.final_time {
        config.integration.final_time = final_time;
    }
    if let Some(output) = &overrides.output {
        config.report.output_path.clone_from(output);
    }
    if overrides.no_plot {
        config.report.plot = false;
    }
    if overrides.no_save {
        config.report.save_figure = false;
        config.report.save_results = false;
    }
    config
}

/// Run the full sweep and report it.
#[must_use]
pub fn run_sweep(config_path: Option<&Path>, overrides: &RunOverrides) -> ExitCode {
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║     frictionval - Rolling Friction on an Inclined Plane       ║");
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    let config = match load_config(config_path) {
        Ok(config) => apply_overrides(config, overrides),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    let orchestrator = match SweepOrchestrator::new(config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    println!(
        "Sweeping {} inclinations on {} workers (final time {} s, dt {} s)\n",
        orchestrator.config().sweep.alpha_s.len(),
        orchestrator.num_workers(),
        orchestrator.config().integration.final_time,
        orchestrator.config().integration.dt,
    );

    let results = match orchestrator.run() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    match Reporter::new(orchestrator.config().report.clone()).report(&results) {
        Ok(artifacts) => {
            print_artifacts(&artifacts);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Classify one sweep point.
#[must_use]
pub fn classify_point(alpha_s: f64, config_path: Option<&Path>) -> ExitCode {
    let config = match load_config(config_path).and_then(|c| check_alpha_s(alpha_s).map(|()| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    let classification = classify(
        config.friction.forward_static_mu(),
        config.rod.mass,
        config.gravity,
        alpha_s * std::f64::consts::PI,
    );
    print_classification(alpha_s, &classification);
    ExitCode::SUCCESS
}

/// Print the closed-form energies of one sweep point.
#[must_use]
pub fn predict_point(alpha_s: f64, config_path: Option<&Path>) -> ExitCode {
    let config = match load_config(config_path).and_then(|c| check_alpha_s(alpha_s).map(|()| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    let alpha = alpha_s * std::f64::consts::PI;
    let classification = classify(
        config.friction.forward_static_mu(),
        config.rod.mass,
        config.gravity,
        alpha,
    );
    let final_time = config.integration.final_time;
    let prediction = predict(
        classification.regime,
        final_time,
        &AnalyticalInputs {
            mass: config.rod.mass,
            radius: config.rod.base_radius,
            gravity: config.gravity,
            alpha,
            kinetic_mu: config.friction.forward_kinetic_mu(),
        },
    );
    print_prediction(alpha_s, final_time, &classification, &prediction);
    ExitCode::SUCCESS
}

/// Print the table of a saved result blob.
#[must_use]
pub fn inspect_results(path: &Path) -> ExitCode {
    match Reporter::load_results(path) {
        Ok(results) => {
            println!("{} ({} points)\n", path.display(), results.len());
            println!("{}", render_table(&results));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
