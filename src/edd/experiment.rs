//! One validation experiment: simulate, classify, predict, compare.
//!
//! The driver integrates a built [`InclinedPlaneScenario`] to the final
//! time, reads the rod's kinetic energies, and evaluates the regime
//! classifier and analytical predictor with the very same mass, gravity,
//! inclination and friction coefficients.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::analytical::{predict, AnalyticalInputs, EnergyPrediction};
use super::regime::{classify, Regime, RegimeForces};
use crate::config::{IntegrationConfig, ValidationConfig};
use crate::domains::rod::CosseratRod;
use crate::domains::timestepper::{
    integrate, IntegrationOptions, PositionVerlet, RodHistory, SymplecticStepper,
};
use crate::engine::jidoka::{JidokaConfig, JidokaGuard};
use crate::error::{SimError, SimResult};
use crate::scenarios::inclined_plane::InclinedPlaneScenario;

/// Outcome of one sweep point.
///
/// Owns the final rod and its recorded history; nothing in it changes after
/// the driver returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    alpha_s: f64,
    rod: CosseratRod,
    history: RodHistory,
    regime: Regime,
    forces: RegimeForces,
    simulated: EnergyPrediction,
    analytical: EnergyPrediction,
}

impl ValidationResult {
    /// Sweep value.
    #[must_use]
    pub const fn alpha_s(&self) -> f64 {
        self.alpha_s
    }

    /// Rod state at the final time.
    #[must_use]
    pub const fn rod(&self) -> &CosseratRod {
        &self.rod
    }

    /// Recorded positions, directors and velocities.
    #[must_use]
    pub const fn history(&self) -> &RodHistory {
        &self.history
    }

    /// Classified regime.
    #[must_use]
    pub const fn regime(&self) -> Regime {
        self.regime
    }

    /// Forces behind the classification.
    #[must_use]
    pub const fn forces(&self) -> RegimeForces {
        self.forces
    }

    /// Simulated translational kinetic energy.
    #[must_use]
    pub const fn translational_energy(&self) -> f64 {
        self.simulated.translational
    }

    /// Simulated rotational kinetic energy.
    #[must_use]
    pub const fn rotational_energy(&self) -> f64 {
        self.simulated.rotational
    }

    /// Closed-form translational kinetic energy.
    #[must_use]
    pub const fn analytical_translational_energy(&self) -> f64 {
        self.analytical.translational
    }

    /// Closed-form rotational kinetic energy.
    #[must_use]
    pub const fn analytical_rotational_energy(&self) -> f64 {
        self.analytical.rotational
    }

    /// Relative error of the simulated translational energy, or `None` when
    /// the prediction is zero.
    #[must_use]
    pub fn translational_error(&self) -> Option<f64> {
        relative_error(self.simulated.translational, self.analytical.translational)
    }

    /// Relative error of the simulated rotational energy, or `None` when the
    /// prediction is zero.
    #[must_use]
    pub fn rotational_error(&self) -> Option<f64> {
        relative_error(self.simulated.rotational, self.analytical.rotational)
    }
}

fn relative_error(simulated: f64, analytical: f64) -> Option<f64> {
    (analytical.abs() > f64::EPSILON).then(|| (simulated - analytical).abs() / analytical.abs())
}

/// Runs scenarios to the final time with a fixed-step symplectic stepper.
#[derive(Debug, Clone)]
pub struct ExperimentDriver<S = PositionVerlet> {
    stepper: S,
    integration: IntegrationConfig,
    jidoka: JidokaConfig,
}

impl ExperimentDriver<PositionVerlet> {
    /// Position-Verlet driver using the integration and guard settings of a
    /// configuration.
    #[must_use]
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(
            PositionVerlet::new(),
            config.integration.clone(),
            config.jidoka.clone(),
        )
    }
}

impl<S: SymplecticStepper> ExperimentDriver<S> {
    /// Create a driver.
    #[must_use]
    pub const fn new(stepper: S, integration: IntegrationConfig, jidoka: JidokaConfig) -> Self {
        Self {
            stepper,
            integration,
            jidoka,
        }
    }

    /// Integration settings.
    #[must_use]
    pub const fn integration(&self) -> &IntegrationConfig {
        &self.integration
    }

    /// Run one scenario.
    ///
    /// # Errors
    ///
    /// - `SimError::DegenerateSweep` before any integration if the step
    ///   count would be zero
    /// - `SimError::NonFiniteValue` if the rod state diverges
    /// - composition errors from the engine
    pub fn run(&self, scenario: InclinedPlaneScenario) -> SimResult<ValidationResult> {
        let total_steps = self.integration.total_steps()?;
        let save_every = self.integration.save_every(total_steps);
        let final_time = self.integration.final_time;

        let alpha_s = scenario.alpha_s();
        let alpha = scenario.alpha();
        let mass = scenario.params().mass;
        let gravity = scenario.gravity();
        let classification = classify(scenario.friction().forward_static_mu(), mass, gravity, alpha);
        let analytical = predict(
            classification.regime,
            final_time,
            &AnalyticalInputs {
                mass,
                radius: scenario.params().base_radius,
                gravity,
                alpha,
                kinetic_mu: scenario.friction().forward_kinetic_mu(),
            },
        );

        info!(
            alpha_s,
            total_steps,
            regime = %classification.regime,
            "sweep point started"
        );

        let (mut system, id) = scenario.into_system()?;
        let options = IntegrationOptions {
            save_every,
            guard: JidokaGuard::new(self.jidoka.clone()),
        };
        let mut histories = integrate(&self.stepper, &mut system, final_time, total_steps, &options)?;
        let history = if id.index() < histories.len() {
            histories.swap_remove(id.index())
        } else {
            RodHistory::default()
        };
        let rod = system
            .into_rod(id)
            .ok_or_else(|| SimError::physics("scenario rod missing after integration"))?;

        let simulated = EnergyPrediction {
            translational: rod.translational_energy(),
            rotational: rod.rotational_energy(),
        };
        info!(
            alpha_s,
            translational = simulated.translational,
            rotational = simulated.rotational,
            analytical_translational = analytical.translational,
            analytical_rotational = analytical.rotational,
            "sweep point finished"
        );

        Ok(ValidationResult {
            alpha_s,
            rod,
            history,
            regime: classification.regime,
            forces: classification.forces,
            simulated,
            analytical,
        })
    }
}

/// Build and run the scenario for one `alpha_s` under `config`.
///
/// # Errors
///
/// Propagates construction, degenerate-step and engine errors.
pub fn simulate_point(config: &ValidationConfig, alpha_s: f64) -> SimResult<ValidationResult> {
    let scenario = InclinedPlaneScenario::build(&config.rod, &config.friction, config.gravity, alpha_s)?;
    ExperimentDriver::from_config(config).run(scenario)
}
