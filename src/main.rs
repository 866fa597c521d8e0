//! frictionval CLI - rolling friction validation sweep
//!
//! Command-line interface for running the inclined-plane validation.

use std::process::ExitCode;

use frictionval::cli::{run_cli, Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    run_cli(Args::parse())
}
