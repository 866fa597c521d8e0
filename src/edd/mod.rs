//! Equation-Driven Development (EDD) of the friction model.
//!
//! Every simulated energy is checked against a governing equation:
//!
//! 1. [`regime`] decides from a force balance whether the rod rolls or
//!    slides
//! 2. [`analytical`] gives the closed-form energies for that regime
//! 3. [`experiment`] runs the rod engine and pairs its energies with the
//!    closed forms evaluated on the same parameters
//!
//! Classifier and predictor are pure functions; only the experiment
//! touches the engine.

pub mod analytical;
pub mod experiment;
pub mod regime;

pub use analytical::{predict, AnalyticalInputs, EnergyPrediction};
pub use experiment::{simulate_point, ExperimentDriver, ValidationResult};
pub use regime::{classify, critical_angle, Classification, Regime, RegimeForces};
