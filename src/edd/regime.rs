//! Rolling regime classification by force balance.
//!
//! A rod of mass `m` on a plane inclined by `α` rolls without slipping as
//! long as the friction needed for rolling stays within the static limit:
//!
//! ```text
//! F_noslip = -m g sin α / 3
//! F_slip   =  μ_s m g cos α
//! |F_noslip| <= |F_slip|  =>  pure rolling
//! ```
//!
//! With `tan α = 3 μ_s` the two forces are equal and the rod still rolls.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Motion regime of a rod on an incline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Static friction holds the contact point at rest.
    PureRolling,
    /// The contact point slides; kinetic friction drives the spin.
    SlipThenRoll,
}

impl Regime {
    /// Label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PureRolling => "pure-rolling",
            Self::SlipThenRoll => "slip-then-roll",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two forces compared by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeForces {
    /// Friction force required for rolling without slip.
    pub force_noslip: f64,
    /// Largest static friction force available.
    pub force_slip: f64,
}

impl RegimeForces {
    /// Evaluate both forces for mass `mass`, signed gravity `gravity`,
    /// inclination `alpha` (radians) and static coefficient `static_mu`.
    #[must_use]
    pub fn new(static_mu: f64, mass: f64, gravity: f64, alpha: f64) -> Self {
        let (sin, cos) = alpha.sin_cos();
        Self {
            force_noslip: -mass * gravity * sin / 3.0,
            force_slip: static_mu * mass * gravity * cos,
        }
    }

    /// Apply the force-balance criterion. Equality counts as rolling.
    #[must_use]
    pub fn regime(&self) -> Regime {
        if self.force_noslip.abs() <= self.force_slip.abs() {
            Regime::PureRolling
        } else {
            Regime::SlipThenRoll
        }
    }
}

/// Outcome of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Selected regime.
    pub regime: Regime,
    /// Forces the decision was based on.
    pub forces: RegimeForces,
}

/// Classify the motion regime from static parameters.
#[must_use]
pub fn classify(static_mu: f64, mass: f64, gravity: f64, alpha: f64) -> Classification {
    let forces = RegimeForces::new(static_mu, mass, gravity, alpha);
    Classification {
        regime: forces.regime(),
        forces,
    }
}

/// Inclination at which the regime switches, `atan(3 μ_s)`.
#[must_use]
pub fn critical_angle(static_mu: f64) -> f64 {
    (3.0 * static_mu).atan()
}
