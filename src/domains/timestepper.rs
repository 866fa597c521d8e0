//! Fixed-step symplectic time integration of a [`RodSystem`].
//!
//! Position Verlet, second order and symplectic:
//!
//! ```text
//! x_{n+1/2} = x_n + (h/2) v_n          Q_{n+1/2} = exp(-(h/2) ω_n) Q_n
//! v_{n+1}   = v_n + h a(x_{n+1/2})     ω_{n+1}   = ω_n + h α(x_{n+1/2})
//! x_{n+1}   = x_{n+1/2} + (h/2) v_{n+1}  (and likewise for Q)
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::system::RodSystem;
use crate::engine::jidoka::JidokaGuard;
use crate::engine::math::{Mat3, Vec3};
use crate::error::{SimError, SimResult};

/// Fixed-step symplectic stepper trait.
pub trait SymplecticStepper {
    /// Advance the system from `time` by `dt`, returning the new time.
    fn do_step(&self, system: &mut RodSystem, time: f64, dt: f64) -> f64;

    /// Get the error order of this stepper.
    fn error_order(&self) -> u32;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Position Verlet stepper.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionVerlet;

impl PositionVerlet {
    /// Create a new position Verlet stepper.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SymplecticStepper for PositionVerlet {
    fn do_step(&self, system: &mut RodSystem, time: f64, dt: f64) -> f64 {
        let half_dt = 0.5 * dt;
        system.kinematic_step(time, half_dt);
        let mid = time + half_dt;
        system.dynamic_step(mid, dt);
        system.kinematic_step(mid, half_dt);
        time + dt
    }

    fn error_order(&self) -> u32 {
        2
    }

    fn name(&self) -> &'static str {
        "position-verlet"
    }
}

/// Snapshots of one rod over time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RodHistory {
    /// Snapshot times.
    pub times: Vec<f64>,
    /// Nodal positions per snapshot.
    pub positions: Vec<Vec<Vec3>>,
    /// Element directors per snapshot.
    pub directors: Vec<Vec<Mat3>>,
    /// Nodal velocities per snapshot.
    pub velocities: Vec<Vec<Vec3>>,
}

impl RodHistory {
    /// Number of recorded snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    fn record(&mut self, time: f64, rod: &super::rod::CosseratRod) {
        self.times.push(time);
        self.positions.push(rod.positions().to_vec());
        self.directors.push(rod.directors().to_vec());
        self.velocities.push(rod.velocities().to_vec());
    }
}

/// Options for [`integrate`].
#[derive(Debug, Clone, Default)]
pub struct IntegrationOptions {
    /// Record a snapshot every `save_every` steps (0 records only the
    /// initial and final state).
    pub save_every: usize,
    /// Stop-on-error inspection.
    pub guard: JidokaGuard,
}

/// Integrate a finalized system from `t = 0` to `final_time` in
/// `total_steps` fixed steps.
///
/// Returns one history per rod, in registration order. The initial and
/// final states are always recorded.
///
/// # Errors
///
/// - `SimError::DegenerateSweep` if `total_steps` is zero or `final_time`
///   is not finite and positive
/// - `SimError::Physics` if the system was not finalized
/// - `SimError::NonFiniteValue` if the Jidoka guard trips
pub fn integrate<S: SymplecticStepper>(
    stepper: &S,
    system: &mut RodSystem,
    final_time: f64,
    total_steps: usize,
    options: &IntegrationOptions,
) -> SimResult<Vec<RodHistory>> {
    let dt = final_time / total_steps as f64;
    if total_steps == 0 || !(final_time.is_finite() && final_time > 0.0) {
        return Err(SimError::DegenerateSweep { final_time, dt });
    }
    if !system.is_finalized() {
        return Err(SimError::physics("system must be finalized before integration"));
    }

    debug!(
        stepper = stepper.name(),
        total_steps,
        dt,
        save_every = options.save_every,
        "integration started"
    );

    let mut histories = vec![RodHistory::default(); system.n_rods()];
    for (history, rod) in histories.iter_mut().zip(system.rods()) {
        history.record(0.0, rod);
    }

    let mut time = 0.0;
    for step in 1..=total_steps {
        time = stepper.do_step(system, time, dt);

        if options.guard.due(step) {
            for rod in system.rods() {
                options.guard.check(rod)?;
            }
        }
        if step == total_steps || (options.save_every > 0 && step % options.save_every == 0) {
            for (history, rod) in histories.iter_mut().zip(system.rods()) {
                history.record(time, rod);
            }
        }
    }

    for rod in system.rods() {
        options.guard.check(rod)?;
    }
    debug!(final_time = time, "integration finished");
    Ok(histories)
}
