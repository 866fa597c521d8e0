//! Rod-mechanics engine.
//!
//! The validation experiment consumes this engine only through a handful of
//! contracts:
//!
//! - rod construction: [`CosseratRod::straight_rod`]
//! - system composition: [`RodSystem`] (append, constrain, add forcing, finalize)
//! - loads: [`GravityForces`], [`AnisotropicFrictionalPlane`]
//! - boundary conditions: [`FreeRod`]
//! - time integration: [`integrate`] with [`PositionVerlet`]
//! - energy accessors: [`CosseratRod::translational_energy`],
//!   [`CosseratRod::rotational_energy`]

pub mod forcing;
pub mod friction;
pub mod kernels;
pub mod rod;
pub mod system;
pub mod timestepper;

pub use forcing::{Forcing, GravityForces};
pub use friction::AnisotropicFrictionalPlane;
pub use rod::{CosseratRod, StraightRodSpec};
pub use system::{BoundaryCondition, FreeRod, RodId, RodSystem};
pub use timestepper::{integrate, IntegrationOptions, PositionVerlet, RodHistory, SymplecticStepper};
