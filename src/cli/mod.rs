//! CLI module for frictionval.
//!
//! This module contains all CLI logic extracted from main.rs to enable
//! full test coverage. The entry point `run_cli` can be called from main.rs
//! with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, RunOverrides};
pub use commands::{
    apply_overrides, classify_point, inspect_results, load_config, predict_point, run_cli,
    run_sweep,
};
pub use output::{
    print_artifacts, print_classification, print_help, print_prediction, print_version,
};

#[cfg(test)]
mod tests;
