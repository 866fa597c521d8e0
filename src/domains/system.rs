//! System composition: rods, boundary conditions and forcings.
//!
//! A `RodSystem` is assembled once (append rods, attach constraints and
//! forcings), then finalized. Only a finalized system can be integrated,
//! and a finalized system accepts no further registrations.

use tracing::debug;

use super::forcing::Forcing;
use super::rod::CosseratRod;
use crate::error::{SimError, SimResult};

/// Boundary condition trait.
pub trait BoundaryCondition {
    /// Constrain positions and directors after a kinematic update.
    fn constrain_values(&self, rod: &mut CosseratRod, time: f64);

    /// Constrain velocities and angular velocities after a dynamic update.
    fn constrain_rates(&self, rod: &mut CosseratRod, time: f64);
}

/// Unconstrained rod: dynamics come from loads alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeRod;

impl BoundaryCondition for FreeRod {
    fn constrain_values(&self, _rod: &mut CosseratRod, _time: f64) {}

    fn constrain_rates(&self, _rod: &mut CosseratRod, _time: f64) {}
}

/// Handle to a rod registered in a [`RodSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RodId(usize);

impl RodId {
    /// Position of the rod in registration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Collection of rods with their constraints and forcings.
#[derive(Default)]
pub struct RodSystem {
    rods: Vec<CosseratRod>,
    constraints: Vec<(usize, Box<dyn BoundaryCondition + Send + Sync>)>,
    forcings: Vec<(usize, Box<dyn Forcing + Send + Sync>)>,
    finalized: bool,
}

impl std::fmt::Debug for RodSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodSystem")
            .field("rods", &self.rods.len())
            .field("constraints", &self.constraints.len())
            .field(
                "forcings",
                &self.forcings.iter().map(|(_, f)| f.name()).collect::<Vec<_>>(),
            )
            .field("finalized", &self.finalized)
            .finish()
    }
}

impl RodSystem {
    /// Create an empty system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rod.
    ///
    /// # Errors
    ///
    /// Returns error if the system is already finalized.
    pub fn append(&mut self, rod: CosseratRod) -> SimResult<RodId> {
        self.ensure_open()?;
        self.rods.push(rod);
        Ok(RodId(self.rods.len() - 1))
    }

    /// Attach a boundary condition to a rod.
    ///
    /// # Errors
    ///
    /// Returns error if the system is finalized or the rod is unknown.
    pub fn constrain<B>(&mut self, id: RodId, condition: B) -> SimResult<()>
    where
        B: BoundaryCondition + Send + Sync + 'static,
    {
        self.ensure_open()?;
        self.ensure_known(id)?;
        self.constraints.push((id.0, Box::new(condition)));
        Ok(())
    }

    /// Attach a forcing to a rod. Forcings run in registration order.
    ///
    /// # Errors
    ///
    /// Returns error if the system is finalized or the rod is unknown.
    pub fn add_forcing_to<F>(&mut self, id: RodId, forcing: F) -> SimResult<()>
    where
        F: Forcing + Send + Sync + 'static,
    {
        self.ensure_open()?;
        self.ensure_known(id)?;
        debug!(rod = id.0, forcing = forcing.name(), "forcing attached");
        self.forcings.push((id.0, Box::new(forcing)));
        Ok(())
    }

    /// Close the system for registration and make it ready to integrate.
    ///
    /// # Errors
    ///
    /// Returns error if the system holds no rod or was already finalized.
    pub fn finalize(&mut self) -> SimResult<()> {
        self.ensure_open()?;
        if self.rods.is_empty() {
            return Err(SimError::physics("cannot finalize a system without rods"));
        }
        self.finalized = true;
        debug!(
            rods = self.rods.len(),
            forcings = self.forcings.len(),
            "system finalized"
        );
        Ok(())
    }

    /// Whether [`finalize`](Self::finalize) has been called.
    #[must_use]
    pub const fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of rods.
    #[must_use]
    pub fn n_rods(&self) -> usize {
        self.rods.len()
    }

    /// Borrow a rod.
    #[must_use]
    pub fn rod(&self, id: RodId) -> Option<&CosseratRod> {
        self.rods.get(id.0)
    }

    /// All rods in registration order.
    #[must_use]
    pub fn rods(&self) -> &[CosseratRod] {
        &self.rods
    }

    /// Consume the system and take ownership of one rod.
    #[must_use]
    pub fn into_rod(mut self, id: RodId) -> Option<CosseratRod> {
        if id.0 < self.rods.len() {
            Some(self.rods.swap_remove(id.0))
        } else {
            None
        }
    }

    pub(crate) fn kinematic_step(&mut self, time: f64, prefac: f64) {
        for rod in &mut self.rods {
            rod.kinematic_update(prefac);
        }
        for (i, bc) in &self.constraints {
            bc.constrain_values(&mut self.rods[*i], time);
        }
    }

    pub(crate) fn dynamic_step(&mut self, time: f64, dt: f64) {
        for rod in &mut self.rods {
            rod.reset_external_loads();
            rod.compute_internal_forces_and_torques();
        }
        for (i, forcing) in &self.forcings {
            forcing.apply_forces(&mut self.rods[*i], time);
            forcing.apply_torques(&mut self.rods[*i], time);
        }
        for rod in &mut self.rods {
            rod.dynamic_update(dt);
        }
        for (i, bc) in &self.constraints {
            bc.constrain_rates(&mut self.rods[*i], time);
        }
    }

    fn ensure_open(&self) -> SimResult<()> {
        if self.finalized {
            Err(SimError::physics("system already finalized"))
        } else {
            Ok(())
        }
    }

    fn ensure_known(&self, id: RodId) -> SimResult<()> {
        if id.0 < self.rods.len() {
            Ok(())
        } else {
            Err(SimError::physics(format!("unknown rod id {}", id.0)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::forcing::GravityForces;
    use crate::domains::rod::StraightRodSpec;
    use crate::engine::math::Vec3;

    fn rod() -> CosseratRod {
        CosseratRod::straight_rod(&StraightRodSpec {
            n_elements: 2,
            start: Vec3::zero(),
            direction: Vec3::new(0.0, 0.0, 1.0),
            normal: Vec3::new(0.0, 1.0, 0.0),
            base_length: 1.0,
            base_radius: 0.025,
            density: 500.0,
            nu: 0.0,
            youngs_modulus: 1e6,
            poisson_ratio: 0.5,
            shear_matrix: None,
        })
        .unwrap()
    }

    #[test]
    fn test_compose_and_finalize() {
        let mut system = RodSystem::new();
        let id = system.append(rod()).unwrap();
        system.constrain(id, FreeRod).unwrap();
        system.add_forcing_to(id, GravityForces::default()).unwrap();
        assert!(!system.is_finalized());
        system.finalize().unwrap();
        assert!(system.is_finalized());
        assert_eq!(system.n_rods(), 1);
        assert!(system.rod(id).is_some());
    }

    #[test]
    fn test_registration_after_finalize_rejected() {
        let mut system = RodSystem::new();
        let id = system.append(rod()).unwrap();
        system.finalize().unwrap();
        assert!(system.add_forcing_to(id, GravityForces::default()).is_err());
        assert!(system.append(rod()).is_err());
        assert!(system.finalize().is_err());
    }

    #[test]
    fn test_empty_system_cannot_finalize() {
        let mut system = RodSystem::new();
        assert!(system.finalize().is_err());
    }

    #[test]
    fn test_unknown_rod_rejected() {
        let mut system = RodSystem::new();
        assert!(system.constrain(RodId(3), FreeRod).is_err());
    }

    #[test]
    fn test_into_rod_takes_ownership() {
        let mut system = RodSystem::new();
        let id = system.append(rod()).unwrap();
        let rod = system.into_rod(id).unwrap();
        assert_eq!(rod.n_elements(), 2);
    }

    #[test]
    fn test_free_fall_under_gravity() {
        let mut system = RodSystem::new();
        let id = system.append(rod()).unwrap();
        system.constrain(id, FreeRod).unwrap();
        system.add_forcing_to(id, GravityForces::default()).unwrap();
        system.finalize().unwrap();

        let dt = 1e-4;
        system.dynamic_step(0.0, dt);
        let v = system.rod(id).unwrap().center_of_mass_velocity();
        assert!((v.y + 9.80665 * dt).abs() < 1e-12);
    }
}
