//! Error types for frictionval.
//!
//! Every fallible operation returns `Result<T, SimError>` instead of
//! panicking. Construction and degenerate-sweep errors surface before any
//! integration starts, so a zero-energy result is always a real outcome.

use thiserror::Error;

/// Result type alias for frictionval operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all frictionval operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Jidoka Violations =====
    /// Numerical instability detected (NaN or Inf).
    #[error("Jidoka: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    // ===== Construction Errors =====
    /// A scenario, rod or contact parameter is out of its admissible range.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== Degenerate Sweep Errors =====
    /// The requested run would take no integration steps.
    #[error("Degenerate run: final_time={final_time:e} with dt={dt:e} yields no integration steps")]
    DegenerateSweep {
        /// Requested final time.
        final_time: f64,
        /// Requested timestep.
        dt: f64,
    },

    // ===== Worker Failures =====
    /// One sweep point failed; the whole sweep was aborted.
    #[error("Sweep point {index} (alpha_s = {alpha_s}) failed: {source}")]
    SweepPoint {
        /// Position of the failing point in the sweep input.
        index: usize,
        /// Sweep value of the failing point.
        alpha_s: f64,
        /// Underlying failure.
        #[source]
        source: Box<SimError>,
    },

    // ===== Engine Errors =====
    /// Rod engine error.
    #[error("Physics error: {0}")]
    Physics(String),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-parameter error.
    #[must_use]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a physics (rod engine) error.
    #[must_use]
    pub fn physics(message: impl Into<String>) -> Self {
        Self::Physics(message.into())
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create an I/O error with a message (wraps in `std::io::Error`).
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }

    /// Check if this error is a Jidoka violation (requires immediate stop).
    #[must_use]
    pub const fn is_jidoka_violation(&self) -> bool {
        matches!(self, Self::NonFiniteValue { .. })
    }

    /// Check if this error was raised before integration could begin.
    #[must_use]
    pub const fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::Config { .. }
                | Self::YamlParse(_)
                | Self::Validation(_)
                | Self::DegenerateSweep { .. }
        )
    }
}
