//! Jidoka (自働化) - stop the line on anomalous rod state.
//!
//! The guard inspects a rod every `check_interval` steps during
//! integration and stops the run the moment a position, velocity, angular
//! velocity or director entry becomes NaN or infinite. A diverged run is
//! reported as an error instead of producing garbage energies.

use serde::{Deserialize, Serialize};

use crate::domains::rod::CosseratRod;
use crate::engine::math::Vec3;
use crate::error::{SimError, SimResult};

/// Jidoka guard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JidokaConfig {
    /// NaN/Inf detection enabled.
    #[serde(default = "default_true")]
    pub check_finite: bool,
    /// Steps between inspections (0 inspects only the final state).
    #[serde(default = "default_check_interval")]
    pub check_interval: usize,
}

const fn default_true() -> bool {
    true
}

const fn default_check_interval() -> usize {
    1000
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            check_interval: default_check_interval(),
        }
    }
}

/// Jidoka guard for autonomous anomaly detection on rod state.
///
/// # Example
///
/// ```rust
/// use frictionval::engine::jidoka::{JidokaConfig, JidokaGuard};
///
/// let guard = JidokaGuard::new(JidokaConfig::default());
/// assert!(guard.due(1000));
/// assert!(!guard.due(999));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JidokaGuard {
    config: JidokaConfig,
}

impl JidokaGuard {
    /// Create a new Jidoka guard with given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self { config }
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }

    /// Whether step `step` (1-based) is an inspection step.
    #[must_use]
    pub const fn due(&self, step: usize) -> bool {
        self.config.check_finite
            && self.config.check_interval > 0
            && step % self.config.check_interval == 0
    }

    /// Inspect a rod (Jidoka inspection).
    ///
    /// # Errors
    ///
    /// Returns `SimError::NonFiniteValue` naming the first offending entry.
    pub fn check(&self, rod: &CosseratRod) -> SimResult<()> {
        if !self.config.check_finite {
            return Ok(());
        }
        check_vectors("positions", rod.positions())?;
        check_vectors("velocities", rod.velocities())?;
        check_vectors("omegas", rod.omegas())?;
        for (i, q) in rod.directors().iter().enumerate() {
            if !q.is_finite() {
                return Err(SimError::NonFiniteValue {
                    location: format!("directors[{i}]"),
                });
            }
        }
        Ok(())
    }
}

fn check_vectors(name: &str, values: &[Vec3]) -> SimResult<()> {
    for (i, v) in values.iter().enumerate() {
        for (axis, component) in ["x", "y", "z"].iter().zip(v.to_array()) {
            if !component.is_finite() {
                return Err(SimError::NonFiniteValue {
                    location: format!("{name}[{i}].{axis}"),
                });
            }
        }
    }
    Ok(())
}
