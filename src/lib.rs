//! # frictionval
//!
//! Validation of a Cosserat-rod friction model against closed-form
//! mechanics.
//!
//! A slender rod rests on a plane inclined by `α = alpha_s·π`. For each
//! inclination of a sweep the crate:
//! - builds the rod, gravity and anisotropic Coulomb contact ([`scenarios`])
//! - integrates it with a symplectic stepper ([`domains`])
//! - classifies the motion as pure rolling or slip-then-roll and evaluates
//!   the closed-form energies ([`edd`])
//! - runs all inclinations on a work-stealing pool ([`sweep`]) and reports
//!   the comparison ([`report`])
//!
//! ## Example
//!
//! ```rust
//! use frictionval::prelude::*;
//!
//! let c = classify(0.4, 1.0, -9.80665, 0.3 * std::f64::consts::PI);
//! assert_eq!(c.regime, Regime::SlipThenRoll);
//!
//! let config = ValidationConfig::builder()
//!     .final_time(0.1)
//!     .alpha_s(vec![0.05, 0.3])
//!     .build();
//! assert!(config.check().is_ok());
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
    clippy::too_many_arguments
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod cli;
pub mod config;
pub mod domains;
pub mod edd;
pub mod engine;
pub mod error;
pub mod report;
pub mod scenarios;
pub mod sweep;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{ValidationConfig, ValidationConfigBuilder};
    pub use crate::domains::{CosseratRod, PositionVerlet, RodSystem};
    pub use crate::edd::{
        classify, predict, simulate_point, AnalyticalInputs, EnergyPrediction, ExperimentDriver,
        Regime, ValidationResult,
    };
    pub use crate::engine::jidoka::{JidokaConfig, JidokaGuard};
    pub use crate::error::{SimError, SimResult};
    pub use crate::report::{ReportOptions, Reporter};
    pub use crate::scenarios::{FrictionParams, InclinedPlaneScenario, ScenarioParams};
    pub use crate::sweep::{default_sweep, SweepExecutor, SweepOrchestrator};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
