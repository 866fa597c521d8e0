//! CLI module tests.

use super::args::{Args, Command, RunOverrides};
use super::commands::{
    apply_overrides, classify_point, inspect_results, load_config, predict_point, run_cli,
};
use super::output::{print_help, print_version};
use crate::config::ValidationConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// ============================================================================
// Args parsing tests
// ============================================================================

#[test]
fn test_parse_no_args_shows_help() {
    let args = Args::parse_from(["frictionval"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_help_flags() {
    for flag in ["-h", "--help", "help"] {
        let args = Args::parse_from(["frictionval", flag]);
        assert_eq!(args.command, Command::Help);
    }
}

#[test]
fn test_parse_version_flags() {
    for flag in ["-V", "--version", "version"] {
        let args = Args::parse_from(["frictionval", flag]);
        assert_eq!(args.command, Command::Version);
    }
}

#[test]
fn test_parse_unknown_command_shows_help() {
    let args = Args::parse_from(["frictionval", "simulate"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_run_defaults() {
    let args = Args::parse_from(["frictionval", "run"]);
    assert_eq!(
        args.command,
        Command::Run {
            config_path: None,
            overrides: RunOverrides::default(),
        }
    );
}

#[test]
fn test_parse_run_with_options() {
    let args = Args::parse_from([
        "frictionval",
        "run",
        "case.yaml",
        "--workers",
        "4",
        "--final-time",
        "0.1",
        "-o",
        "out/sweep",
        "--no-plot",
        "--no-save",
    ]);
    assert_eq!(
        args.command,
        Command::Run {
            config_path: Some(PathBuf::from("case.yaml")),
            overrides: RunOverrides {
                workers: Some(4),
                final_time: Some(0.1),
                output: Some(PathBuf::from("out/sweep")),
                no_plot: true,
                no_save: true,
            },
        }
    );
}

#[test]
fn test_parse_run_bad_number_is_ignored() {
    let args = Args::parse_from(["frictionval", "run", "--workers", "many"]);
    match args.command {
        Command::Run { overrides, .. } => assert_eq!(overrides.workers, None),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_parse_classify() {
    let args = Args::parse_from(["frictionval", "classify", "0.3", "case.yaml"]);
    assert_eq!(
        args.command,
        Command::Classify {
            alpha_s: 0.3,
            config_path: Some(PathBuf::from("case.yaml")),
        }
    );
}

#[test]
fn test_parse_predict_without_config() {
    let args = Args::parse_from(["frictionval", "predict", "0.05"]);
    assert_eq!(
        args.command,
        Command::Predict {
            alpha_s: 0.05,
            config_path: None,
        }
    );
}

#[test]
fn test_parse_classify_requires_number() {
    let args = Args::parse_from(["frictionval", "classify", "steep"]);
    assert_eq!(args.command, Command::Help);
    let args = Args::parse_from(["frictionval", "predict"]);
    assert_eq!(args.command, Command::Help);
}

#[test]
fn test_parse_inspect() {
    let args = Args::parse_from(["frictionval", "inspect", "sweep.dat"]);
    assert_eq!(
        args.command,
        Command::Inspect {
            results_path: PathBuf::from("sweep.dat"),
        }
    );
    let args = Args::parse_from(["frictionval", "inspect"]);
    assert_eq!(args.command, Command::Help);
}

// ============================================================================
// Command tests
// ============================================================================

#[test]
fn test_load_config_defaults_without_path() {
    let config = load_config(None).unwrap();
    assert_eq!(config, ValidationConfig::default());
}

#[test]
fn test_load_config_missing_file() {
    assert!(load_config(Some(Path::new("/nonexistent/case.yaml"))).is_err());
}

#[test]
fn test_apply_overrides() {
    let overrides = RunOverrides {
        workers: Some(3),
        final_time: Some(0.25),
        output: Some(PathBuf::from("elsewhere")),
        no_plot: true,
        no_save: true,
    };
    let config = apply_overrides(ValidationConfig::default(), &overrides);
    assert_eq!(config.sweep.workers, Some(3));
    assert!((config.integration.final_time - 0.25).abs() < f64::EPSILON);
    assert_eq!(config.report.output_path, PathBuf::from("elsewhere"));
    assert!(!config.report.plot);
    assert!(!config.report.save_figure);
    assert!(!config.report.save_results);
}

#[test]
fn test_apply_no_overrides_keeps_config() {
    let config = apply_overrides(ValidationConfig::default(), &RunOverrides::default());
    assert_eq!(config, ValidationConfig::default());
}

#[test]
fn test_classify_and_predict_succeed() {
    assert_eq!(classify_point(0.3, None), ExitCode::SUCCESS);
    assert_eq!(predict_point(0.05, None), ExitCode::SUCCESS);
}

#[test]
fn test_classify_rejects_out_of_range() {
    assert_eq!(classify_point(0.9, None), ExitCode::from(1));
    assert_eq!(predict_point(-0.1, None), ExitCode::from(1));
}

#[test]
fn test_inspect_missing_file_fails() {
    assert_eq!(
        inspect_results(Path::new("/nonexistent/sweep.dat")),
        ExitCode::from(1)
    );
}

#[test]
fn test_run_cli_help_and_version() {
    assert_eq!(
        run_cli(Args {
            command: Command::Help
        }),
        ExitCode::SUCCESS
    );
    assert_eq!(
        run_cli(Args {
            command: Command::Version
        }),
        ExitCode::SUCCESS
    );
}

#[test]
fn test_run_cli_small_sweep_writes_results() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("case.yaml");
    std::fs::write(
        &config_path,
        "rod:\n  n_elements: 3\nintegration:\n  final_time: 0.001\n  dt: 0.00001\n  snapshots: 2\nsweep:\n  alpha_s: [0.1, 0.3]\n  workers: 2\n",
    )
    .unwrap();
    let output = dir.path().join("sweep");

    let code = run_cli(Args {
        command: Command::Run {
            config_path: Some(config_path),
            overrides: RunOverrides {
                output: Some(output.clone()),
                no_plot: true,
                ..RunOverrides::default()
            },
        },
    });
    assert_eq!(code, ExitCode::SUCCESS);
    assert!(output.with_extension("svg").exists());
    assert!(output.with_extension("csv").exists());

    let dat = output.with_extension("dat");
    assert!(dat.exists());
    assert_eq!(inspect_results(&dat), ExitCode::SUCCESS);
}

#[test]
fn test_run_cli_invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("bad.yaml");
    std::fs::write(&config_path, "sweep:\n  alpha_s: [0.7]\n").unwrap();
    let code = run_cli(Args {
        command: Command::Run {
            config_path: Some(config_path),
            overrides: RunOverrides::default(),
        },
    });
    assert_eq!(code, ExitCode::from(1));
}

// ============================================================================
// Output tests
// ============================================================================

#[test]
fn test_print_functions_do_not_panic() {
    print_help();
    print_version();
}
