//! CLI argument parsing.
//!
//! This module provides the argument parser for the frictionval CLI.
//! Extracted to enable comprehensive testing of argument parsing logic.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Command-line overrides applied on top of the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    /// Worker thread count.
    pub workers: Option<usize>,
    /// Final simulation time.
    pub final_time: Option<f64>,
    /// Output path without extension.
    pub output: Option<PathBuf>,
    /// Suppress the comparison table.
    pub no_plot: bool,
    /// Write neither figure nor result blob.
    pub no_save: bool,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the inclination sweep
    Run {
        /// Optional YAML configuration.
        config_path: Option<PathBuf>,
        /// Command-line overrides.
        overrides: RunOverrides,
    },
    /// Classify the regime of one sweep point
    Classify {
        /// Sweep value.
        alpha_s: f64,
        /// Optional YAML configuration.
        config_path: Option<PathBuf>,
    },
    /// Print the closed-form energies of one sweep point
    Predict {
        /// Sweep value.
        alpha_s: f64,
        /// Optional YAML configuration.
        config_path: Option<PathBuf>,
    },
    /// Print the table of a saved result blob
    Inspect {
        /// Path to the `.dat` file.
        results_path: PathBuf,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Internal parsing from a vector of strings.
    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(args),
            "classify" => Self::parse_point_command(args, "classify"),
            "predict" => Self::parse_point_command(args, "predict"),
            "inspect" => Self::parse_inspect_command(args),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => {
                eprintln!("Unknown command: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    /// Parse the 'run' command arguments.
    fn parse_run_command(args: &[String]) -> Command {
        let mut config_path = None;
        let mut overrides = RunOverrides::default();

        let mut i = 2;
        while i < args.len() {
            match args[i].as_str() {
                "--workers" | "-j" => {
                    overrides.workers = args.get(i + 1).and_then(|v| v.parse().ok());
                    i += 2;
                }
                "--final-time" => {
                    overrides.final_time = args.get(i + 1).and_then(|v| v.parse().ok());
                    i += 2;
                }
                "--output" | "-o" => {
                    overrides.output = args.get(i + 1).map(PathBuf::from);
                    i += 2;
                }
                "--no-plot" => {
                    overrides.no_plot = true;
                    i += 1;
                }
                "--no-save" => {
                    overrides.no_save = true;
                    i += 1;
                }
                flag if flag.starts_with('-') => {
                    eprintln!("Warning: ignoring unknown option {flag}");
                    i += 1;
                }
                path => {
                    if config_path.is_none() {
                        config_path = Some(PathBuf::from(path));
                    }
                    i += 1;
                }
            }
        }

        Command::Run {
            config_path,
            overrides,
        }
    }

    /// Parse 'classify' and 'predict', which share `<alpha_s> [config]`.
    fn parse_point_command(args: &[String], name: &str) -> Command {
        let Some(alpha_s) = args.get(2).and_then(|v| v.parse::<f64>().ok()) else {
            eprintln!("Error: '{name}' command requires a numeric alpha_s");
            return Command::Help;
        };
        let config_path = args.get(3).map(PathBuf::from);

        if name == "classify" {
            Command::Classify {
                alpha_s,
                config_path,
            }
        } else {
            Command::Predict {
                alpha_s,
                config_path,
            }
        }
    }

    /// Parse the 'inspect' command arguments.
    fn parse_inspect_command(args: &[String]) -> Command {
        if args.len() < 3 {
            eprintln!("Error: 'inspect' command requires a results file");
            return Command::Help;
        }

        Command::Inspect {
            results_path: PathBuf::from(&args[2]),
        }
    }
}
