//! Inclination sweep orchestration.
//!
//! One experiment per `alpha_s`, dispatched on a [`SweepExecutor`]. Each
//! task builds its own scenario, so workers share nothing but the abort
//! flag. A failing point aborts the whole sweep and is reported as
//! `SimError::SweepPoint` with its index and value.

pub mod executor;

use tracing::info;

pub use executor::{SweepExecutor, TaskFailure};

use crate::config::ValidationConfig;
use crate::edd::experiment::{simulate_point, ValidationResult};
use crate::error::{SimError, SimResult};

/// Sweep values in hundredths: coarse steps, a fine band around the
/// rolling/sliding transition, then coarse again.
const DEFAULT_SWEEP_HUNDREDTHS: [u8; 14] = [5, 10, 15, 20, 25, 26, 27, 28, 29, 30, 35, 40, 45, 50];

/// Reference sweep: `0.05..=0.25` by 0.05, `0.26..=0.29` by 0.01 and
/// `0.30..=0.50` by 0.05.
#[must_use]
pub fn default_sweep() -> Vec<f64> {
    DEFAULT_SWEEP_HUNDREDTHS
        .iter()
        .map(|h| f64::from(*h) / 100.0)
        .collect()
}

/// Runs a configured sweep.
#[derive(Debug, Clone)]
pub struct SweepOrchestrator {
    config: ValidationConfig,
    executor: SweepExecutor,
}

impl SweepOrchestrator {
    /// Create an orchestrator for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error.
    pub fn new(config: ValidationConfig) -> SimResult<Self> {
        config.check()?;
        let executor = SweepExecutor::with_workers(config.workers());
        Ok(Self { config, executor })
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Worker count.
    #[must_use]
    pub const fn num_workers(&self) -> usize {
        self.executor.num_workers()
    }

    /// Run the configured sweep values.
    ///
    /// # Errors
    ///
    /// Returns `SimError::SweepPoint` for the lowest-index failing point.
    pub fn run(&self) -> SimResult<Vec<ValidationResult>> {
        self.run_values(&self.config.sweep.alpha_s)
    }

    /// Run an explicit list of sweep values, returning results in the same
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `SimError::SweepPoint` for the lowest-index failing point.
    pub fn run_values(&self, alpha_s: &[f64]) -> SimResult<Vec<ValidationResult>> {
        info!(
            points = alpha_s.len(),
            workers = self.executor.num_workers(),
            final_time = self.config.integration.final_time,
            dt = self.config.integration.dt,
            "sweep started"
        );
        let results = self
            .executor
            .execute(alpha_s, |_, value| simulate_point(&self.config, *value))
            .map_err(|failure| SimError::SweepPoint {
                index: failure.index,
                alpha_s: alpha_s[failure.index],
                source: Box::new(failure.error),
            })?;
        info!(points = results.len(), "sweep finished");
        Ok(results)
    }
}
