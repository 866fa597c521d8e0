//! External load contributors.
//!
//! A forcing adds to a rod's external force/torque accumulators once per
//! dynamic step, after internal loads are known. Forcings run in the order
//! they were registered, so contact models that react to the total load
//! must be added after body forces such as gravity.

use super::rod::CosseratRod;
use crate::engine::math::Vec3;

/// External load contributor trait.
pub trait Forcing {
    /// Add nodal forces.
    fn apply_forces(&self, rod: &mut CosseratRod, time: f64);

    /// Add element torques (material frame).
    fn apply_torques(&self, _rod: &mut CosseratRod, _time: f64) {}

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Uniform gravitational acceleration acting on every node.
#[derive(Debug, Clone)]
pub struct GravityForces {
    /// Gravitational acceleration vector.
    pub acc_gravity: Vec3,
}

impl GravityForces {
    /// Standard gravity magnitude (m/s²).
    pub const STANDARD_GRAVITY: f64 = 9.80665;

    /// Create a gravity forcing.
    #[must_use]
    pub const fn new(acc_gravity: Vec3) -> Self {
        Self { acc_gravity }
    }
}

impl Default for GravityForces {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -Self::STANDARD_GRAVITY, 0.0))
    }
}

impl Forcing for GravityForces {
    fn apply_forces(&self, rod: &mut CosseratRod, _time: f64) {
        let masses = rod.masses().to_vec();
        for (f, m) in rod.external_forces_mut().iter_mut().zip(masses) {
            *f += self.acc_gravity.scale(m);
        }
    }

    fn name(&self) -> &'static str {
        "gravity"
    }
}
