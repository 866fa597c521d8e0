//! CLI output formatting.
//!
//! This module contains all output formatting functions for the CLI.
//! Extracted to enable testing of output generation.

use crate::edd::analytical::EnergyPrediction;
use crate::edd::regime::Classification;
use crate::report::ReportArtifacts;

/// Print version information.
pub fn print_version() {
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            println!("frictionval {} ({hash})", env!("CARGO_PKG_VERSION"));
        }
        _ => println!("frictionval {}", env!("CARGO_PKG_VERSION")),
    }
}

/// Print help message.
pub fn print_help() {
    println!(
        r"frictionval - Rolling friction of a Cosserat rod on an inclined plane

USAGE:
    frictionval <COMMAND> [OPTIONS]

COMMANDS:
    run [config.yaml]              Run the inclination sweep
        -j, --workers <N>          Worker threads (default: all CPUs)
        --final-time <T>           Final simulation time in seconds
        -o, --output <PATH>        Output path without extension
        --no-plot                  Do not print the comparison table
        --no-save                  Write neither figure nor results

    classify <alpha_s> [config]    Show the rolling regime of one inclination
    predict <alpha_s> [config]     Show the closed-form energies of one inclination
    inspect <results.dat>          Print the table of a saved sweep

    help                           Show this help message
    version                        Show version information

The inclination is alpha = alpha_s * pi with alpha_s in [0, 0.5].
Log verbosity follows RUST_LOG (default: info).

EXAMPLES:
    frictionval run
    frictionval run case.yaml --workers 4 --final-time 0.1
    frictionval classify 0.3
    frictionval inspect rolling_friction_on_inclined_plane.dat
"
    );
}

/// Print a regime classification.
pub fn print_classification(alpha_s: f64, classification: &Classification) {
    println!("alpha_s:       {alpha_s}");
    println!("regime:        {}", classification.regime);
    println!("force_noslip:  {:.6}", classification.forces.force_noslip);
    println!("force_slip:    {:.6}", classification.forces.force_slip);
}

/// Print a closed-form energy prediction.
pub fn print_prediction(
    alpha_s: f64,
    final_time: f64,
    classification: &Classification,
    prediction: &EnergyPrediction,
) {
    print_classification(alpha_s, classification);
    println!("time:          {final_time} s");
    println!("translational: {:.9e} J", prediction.translational);
    println!("rotational:    {:.9e} J", prediction.rotational);
}

/// Print the files written by a report.
pub fn print_artifacts(artifacts: &ReportArtifacts) {
    let written = [
        ("figure", &artifacts.figure),
        ("table", &artifacts.table),
        ("results", &artifacts.results),
        ("summary", &artifacts.summary),
    ];
    for (label, path) in written {
        if let Some(path) = path {
            println!("✓ {label} written to {}", path.display());
        }
    }
}
