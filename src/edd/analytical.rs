//! Closed-form energies of a cylinder on an incline.
//!
//! With `I = ½ m r²` and the signed gravity `g`:
//!
//! ```text
//! pure rolling:    E_t = 2 m (g t sin α)² / 9
//!                  E_r = 2 I (g t sin α / (3 r))²
//! slip-then-roll:  E_t = m (g t (sin α - μ_k cos α))² / 2
//!                  E_r = (μ_k m g r t cos α)² / (2 I)
//! ```

use serde::{Deserialize, Serialize};

use super::regime::Regime;

/// Parameters the closed forms depend on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticalInputs {
    /// Rod mass (kg).
    pub mass: f64,
    /// Rod radius (m).
    pub radius: f64,
    /// Signed gravitational acceleration.
    pub gravity: f64,
    /// Inclination (radians).
    pub alpha: f64,
    /// Kinetic friction coefficient used while sliding.
    pub kinetic_mu: f64,
}

impl AnalyticalInputs {
    /// Moment of inertia about the rod axis, `½ m r²`.
    #[must_use]
    pub fn moment_of_inertia(&self) -> f64 {
        0.5 * self.mass * self.radius * self.radius
    }
}

/// Predicted kinetic energies at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyPrediction {
    /// Translational kinetic energy (J).
    pub translational: f64,
    /// Rotational kinetic energy (J).
    pub rotational: f64,
}

impl EnergyPrediction {
    /// Sum of both parts.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.translational + self.rotational
    }
}

/// Closed-form energies at time `t` for the given regime.
#[must_use]
pub fn predict(regime: Regime, t: f64, inputs: &AnalyticalInputs) -> EnergyPrediction {
    let AnalyticalInputs {
        mass,
        radius,
        gravity,
        alpha,
        kinetic_mu,
    } = *inputs;
    let inertia = inputs.moment_of_inertia();
    let (sin, cos) = alpha.sin_cos();

    match regime {
        Regime::PureRolling => {
            let drive = gravity * t * sin;
            EnergyPrediction {
                translational: 2.0 * mass * drive * drive / 9.0,
                rotational: 2.0 * inertia * (drive / (3.0 * radius)).powi(2),
            }
        }
        Regime::SlipThenRoll => {
            let slide = gravity * t * (sin - kinetic_mu * cos);
            let spin = kinetic_mu * mass * gravity * radius * t * cos;
            EnergyPrediction {
                translational: mass * slide * slide / 2.0,
                rotational: spin * spin / (2.0 * inertia),
            }
        }
    }
}
