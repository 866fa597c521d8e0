//! Rod on an inclined frictional plane.
//!
//! A straight horizontal rod rests on a plane tilted by `α = alpha_s·π`
//! about the rod axis. Gravity pulls along `-y`; the plane is placed so
//! that its surface touches the rod's lower edge at the origin:
//!
//! ```text
//! origin = (-r sin α, -r cos α, 0)
//! normal = normalize(sin α, cos α, 0)
//! ```
//!
//! Building a scenario is pure: every call produces a fresh rod and fresh
//! load objects, so sweep points never share state.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use crate::domains::forcing::GravityForces;
use crate::domains::friction::AnisotropicFrictionalPlane;
use crate::domains::rod::{CosseratRod, StraightRodSpec};
use crate::domains::system::{FreeRod, RodId, RodSystem};
use crate::engine::math::{Mat3, Vec3};
use crate::error::{SimError, SimResult};

/// Largest admissible sweep value (`α = π/2`, a vertical plane).
pub const MAX_ALPHA_S: f64 = 0.5;

/// Standard gravitational acceleration along `y` (m/s²).
pub const DEFAULT_GRAVITY: f64 = -9.80665;

/// Rod geometry and material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioParams {
    /// Number of elements.
    #[validate(range(min = 1))]
    pub n_elements: usize,
    /// First node position.
    pub start: [f64; 3],
    /// Unit axial direction.
    pub direction: [f64; 3],
    /// Unit normal, orthogonal to `direction`.
    pub normal: [f64; 3],
    /// Rest length (m).
    #[validate(range(exclusive_min = 0.0))]
    pub base_length: f64,
    /// Cross-section radius (m).
    #[validate(range(exclusive_min = 0.0))]
    pub base_radius: f64,
    /// Total mass (kg).
    #[validate(range(exclusive_min = 0.0))]
    pub mass: f64,
    /// Internal damping coefficient.
    #[validate(range(min = 0.0))]
    pub nu: f64,
    /// Young's modulus (Pa).
    #[validate(range(exclusive_min = 0.0))]
    pub youngs_modulus: f64,
    /// Poisson ratio.
    #[validate(range(exclusive_min = -1.0, max = 0.5))]
    pub poisson_ratio: f64,
    /// Shear/stretch stiffness override, row-major.
    pub shear_matrix: Option<[[f64; 3]; 3]>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            n_elements: 50,
            start: [0.0, 0.0, 0.0],
            direction: [0.0, 0.0, 1.0],
            normal: [0.0, 1.0, 0.0],
            base_length: 1.0,
            base_radius: 0.025,
            mass: 1.0,
            nu: 1e-6,
            youngs_modulus: 1e9,
            poisson_ratio: 0.5,
            shear_matrix: Some([[1e4, 0.0, 0.0], [0.0, 1e4, 0.0], [0.0, 0.0, 1e4]]),
        }
    }
}

impl ScenarioParams {
    /// Cross-section area `π r²`.
    #[must_use]
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.base_radius * self.base_radius
    }

    /// Density implied by mass, length and radius.
    #[must_use]
    pub fn density(&self) -> f64 {
        self.mass / (self.base_length * self.area())
    }

    /// Moment of inertia of a solid cylinder about its axis, `½ m r²`.
    #[must_use]
    pub fn moment_of_inertia(&self) -> f64 {
        0.5 * self.mass * self.base_radius * self.base_radius
    }

    /// Check schema ranges and the geometric invariants.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Validation` for out-of-range fields and
    /// `SimError::InvalidParameter` for non-unit or non-orthogonal axes or
    /// a non-finite density.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.rod_spec().validate()?;
        let density = self.density();
        if !(density.is_finite() && density > 0.0) {
            return Err(SimError::invalid(
                "density",
                format!("must be positive and finite, got {density}"),
            ));
        }
        Ok(())
    }

    /// Construction spec for the engine.
    #[must_use]
    pub fn rod_spec(&self) -> StraightRodSpec {
        StraightRodSpec {
            n_elements: self.n_elements,
            start: Vec3::from_array(self.start),
            direction: Vec3::from_array(self.direction),
            normal: Vec3::from_array(self.normal),
            base_length: self.base_length,
            base_radius: self.base_radius,
            density: self.density(),
            nu: self.nu,
            youngs_modulus: self.youngs_modulus,
            poisson_ratio: self.poisson_ratio,
            shear_matrix: self.shear_matrix.map(|rows| Mat3 { rows }),
        }
    }
}

/// Contact and Coulomb friction parameters.
///
/// Coefficient triples are ordered `[forward, backward, sideways]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct FrictionParams {
    /// Penalty stiffness against penetration.
    #[validate(range(min = 0.0))]
    pub k: f64,
    /// Damping on normal velocity.
    #[validate(range(min = 0.0))]
    pub nu: f64,
    /// Slip velocity below which static friction fully applies.
    #[validate(range(exclusive_min = 0.0))]
    pub slip_velocity_tol: f64,
    /// Static coefficients.
    pub static_mu: [f64; 3],
    /// Kinetic coefficients.
    pub kinetic_mu: [f64; 3],
}

impl Default for FrictionParams {
    fn default() -> Self {
        Self {
            k: 10.0,
            nu: 1e-4,
            slip_velocity_tol: 1e-4,
            static_mu: [0.4; 3],
            kinetic_mu: [0.2; 3],
        }
    }
}

impl FrictionParams {
    /// Forward static coefficient, the one the regime classifier uses.
    #[must_use]
    pub const fn forward_static_mu(&self) -> f64 {
        self.static_mu[0]
    }

    /// Forward kinetic coefficient, the one the sliding energies use.
    #[must_use]
    pub const fn forward_kinetic_mu(&self) -> f64 {
        self.kinetic_mu[0]
    }

    /// Whether any kinetic coefficient exceeds its static counterpart.
    #[must_use]
    pub fn kinetic_exceeds_static(&self) -> bool {
        self.kinetic_mu
            .iter()
            .zip(&self.static_mu)
            .any(|(kinetic, stat)| kinetic > stat)
    }

    /// Check ranges and coefficient signs.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Validation` for out-of-range fields and
    /// `SimError::InvalidParameter` for negative or non-finite coefficients.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        for (name, triple) in [("static_mu", self.static_mu), ("kinetic_mu", self.kinetic_mu)] {
            if triple.iter().any(|mu| !(mu.is_finite() && *mu >= 0.0)) {
                return Err(SimError::invalid(
                    name,
                    format!("coefficients must be finite and non-negative, got {triple:?}"),
                ));
            }
        }
        Ok(())
    }
}

/// Position and orientation of the contact plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneDescription {
    /// A point on the plane.
    pub origin: Vec3,
    /// Unit normal.
    pub normal: Vec3,
}

impl PlaneDescription {
    /// Plane tilted by `α = alpha_s·π`, touching a rod of `radius` that lies
    /// along `z` through the origin.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameter` if `alpha_s` is not finite or lies
    /// outside `[0, 0.5]`.
    pub fn inclined(alpha_s: f64, radius: f64) -> SimResult<Self> {
        check_alpha_s(alpha_s)?;
        let alpha = alpha_s * std::f64::consts::PI;
        let (sin, cos) = alpha.sin_cos();
        Ok(Self {
            origin: Vec3::new(-radius * sin, -radius * cos, 0.0),
            normal: Vec3::new(sin, cos, 0.0).normalize(),
        })
    }
}

/// Reject sweep values outside `[0, MAX_ALPHA_S]`.
///
/// # Errors
///
/// Returns `SimError::InvalidParameter` naming `alpha_s`.
pub fn check_alpha_s(alpha_s: f64) -> SimResult<()> {
    if alpha_s.is_finite() && (0.0..=MAX_ALPHA_S).contains(&alpha_s) {
        Ok(())
    } else {
        Err(SimError::invalid(
            "alpha_s",
            format!("must lie in [0, {MAX_ALPHA_S}], got {alpha_s}"),
        ))
    }
}

/// Everything needed to run one sweep point, not yet registered with an
/// engine system.
#[derive(Debug, Clone)]
pub struct InclinedPlaneScenario {
    alpha_s: f64,
    params: ScenarioParams,
    friction: FrictionParams,
    gravity: f64,
    plane: PlaneDescription,
    rod: CosseratRod,
    boundary: FreeRod,
    gravity_forces: GravityForces,
    contact: AnisotropicFrictionalPlane,
}

impl InclinedPlaneScenario {
    /// Build the rod and its loads for one `alpha_s`.
    ///
    /// `gravity` is the signed acceleration along `y`
    /// ([`DEFAULT_GRAVITY`] by default).
    ///
    /// # Errors
    ///
    /// Returns a construction error for an out-of-range `alpha_s`, a
    /// non-finite gravity, or invalid rod/friction parameters.
    pub fn build(
        params: &ScenarioParams,
        friction: &FrictionParams,
        gravity: f64,
        alpha_s: f64,
    ) -> SimResult<Self> {
        params.check()?;
        friction.check()?;
        if !gravity.is_finite() {
            return Err(SimError::invalid("gravity", "must be finite"));
        }
        if friction.kinetic_exceeds_static() {
            warn!(
                static_mu = ?friction.static_mu,
                kinetic_mu = ?friction.kinetic_mu,
                "kinetic friction exceeds static friction"
            );
        }

        let plane = PlaneDescription::inclined(alpha_s, params.base_radius)?;
        let rod = CosseratRod::straight_rod(&params.rod_spec())?;
        let contact = AnisotropicFrictionalPlane::new(
            plane.origin,
            plane.normal,
            friction.k,
            friction.nu,
            friction.slip_velocity_tol,
            friction.static_mu,
            friction.kinetic_mu,
        )?;

        debug!(alpha_s, n_elements = params.n_elements, "scenario built");
        Ok(Self {
            alpha_s,
            params: params.clone(),
            friction: friction.clone(),
            gravity,
            plane,
            rod,
            boundary: FreeRod,
            gravity_forces: GravityForces::new(Vec3::new(0.0, gravity, 0.0)),
            contact,
        })
    }

    /// Sweep value.
    #[must_use]
    pub const fn alpha_s(&self) -> f64 {
        self.alpha_s
    }

    /// Inclination angle in radians.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha_s * std::f64::consts::PI
    }

    /// Rod parameters.
    #[must_use]
    pub const fn params(&self) -> &ScenarioParams {
        &self.params
    }

    /// Friction parameters.
    #[must_use]
    pub const fn friction(&self) -> &FrictionParams {
        &self.friction
    }

    /// Signed gravitational acceleration along `y`.
    #[must_use]
    pub const fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Contact plane.
    #[must_use]
    pub const fn plane(&self) -> &PlaneDescription {
        &self.plane
    }

    /// Rod as constructed, before any integration.
    #[must_use]
    pub const fn rod(&self) -> &CosseratRod {
        &self.rod
    }

    /// Register rod, boundary condition, gravity and contact with a new
    /// system and finalize it. Gravity is added before contact so the
    /// plane reacts to the full load.
    ///
    /// # Errors
    ///
    /// Propagates system composition errors.
    pub fn into_system(self) -> SimResult<(RodSystem, RodId)> {
        let mut system = RodSystem::new();
        let id = system.append(self.rod)?;
        system.constrain(id, self.boundary)?;
        system.add_forcing_to(id, self.gravity_forces)?;
        system.add_forcing_to(id, self.contact)?;
        system.finalize()?;
        Ok((system, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_reference_case() {
        let params = ScenarioParams::default();
        assert_eq!(params.n_elements, 50);
        assert!((params.density() - 1.0 / (std::f64::consts::PI * 0.025 * 0.025)).abs() < 1e-9);
        assert!((params.moment_of_inertia() - 0.5 * 0.025 * 0.025).abs() < 1e-15);
        params.check().unwrap();
        FrictionParams::default().check().unwrap();
    }

    #[test]
    fn test_forward_coefficients_drive_the_closed_forms() {
        let friction = FrictionParams {
            static_mu: [0.1, 0.4, 0.4],
            kinetic_mu: [0.05, 0.2, 0.2],
            ..FrictionParams::default()
        };
        assert!((friction.forward_static_mu() - 0.1).abs() < f64::EPSILON);
        assert!((friction.forward_kinetic_mu() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_plane_geometry() {
        let plane = PlaneDescription::inclined(0.25, 0.025).unwrap();
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!((plane.origin.x + 0.025 * s).abs() < 1e-15);
        assert!((plane.origin.y + 0.025 * s).abs() < 1e-15);
        assert!((plane.normal.x - s).abs() < 1e-15);
        assert!((plane.normal.y - s).abs() < 1e-15);
    }

    #[test]
    fn test_flat_plane() {
        let plane = PlaneDescription::inclined(0.0, 0.025).unwrap();
        assert_eq!(plane.normal, Vec3::new(0.0, 1.0, 0.0));
        assert!((plane.origin.y + 0.025).abs() < f64::EPSILON);
    }

    #[test]
    fn test_plane_normal_is_unit() {
        for i in 0..=50 {
            let alpha_s = f64::from(i) * 0.01;
            let plane = PlaneDescription::inclined(alpha_s, 0.025).unwrap();
            assert!((plane.normal.magnitude() - 1.0).abs() <= 1e-12, "alpha_s = {alpha_s}");
        }
    }

    #[test]
    fn test_alpha_s_out_of_range_rejected() {
        for bad in [-0.01, 0.51, f64::NAN, f64::INFINITY] {
            let err = PlaneDescription::inclined(bad, 0.025).unwrap_err();
            assert!(err.is_construction_error());
        }
    }

    #[test]
    fn test_non_orthogonal_axes_rejected() {
        let params = ScenarioParams {
            normal: [0.0, 0.6, 0.8],
            ..ScenarioParams::default()
        };
        assert!(params.check().is_err());
    }

    #[test]
    fn test_non_unit_direction_rejected() {
        let params = ScenarioParams {
            direction: [0.0, 0.0, 2.0],
            ..ScenarioParams::default()
        };
        let err = params.check().unwrap_err();
        assert!(err.is_construction_error());
    }

    #[test]
    fn test_invalid_poisson_ratio_rejected() {
        let params = ScenarioParams {
            poisson_ratio: 0.7,
            ..ScenarioParams::default()
        };
        assert!(matches!(params.check(), Err(SimError::Validation(_))));
    }

    #[test]
    fn test_negative_friction_rejected() {
        let friction = FrictionParams {
            static_mu: [0.4, -0.1, 0.4],
            ..FrictionParams::default()
        };
        assert!(friction.check().is_err());
    }

    #[test]
    fn test_kinetic_above_static_is_detected_but_accepted() {
        let friction = FrictionParams {
            kinetic_mu: [0.5; 3],
            ..FrictionParams::default()
        };
        assert!(friction.kinetic_exceeds_static());
        let params = ScenarioParams {
            n_elements: 4,
            ..ScenarioParams::default()
        };
        assert!(InclinedPlaneScenario::build(&params, &friction, DEFAULT_GRAVITY, 0.1).is_ok());
    }

    #[test]
    fn test_build_registers_rod_and_loads() {
        let params = ScenarioParams {
            n_elements: 4,
            ..ScenarioParams::default()
        };
        let scenario = InclinedPlaneScenario::build(
            &params,
            &FrictionParams::default(),
            DEFAULT_GRAVITY,
            0.1,
        )
        .unwrap();
        assert_eq!(scenario.rod().n_elements(), 4);
        assert!((scenario.alpha() - 0.1 * std::f64::consts::PI).abs() < 1e-15);
        assert!((scenario.rod().total_mass() - 1.0).abs() < 1e-12);

        let (system, id) = scenario.into_system().unwrap();
        assert!(system.is_finalized());
        assert_eq!(id.index(), 0);
        assert!(format!("{system:?}").contains("anisotropic-frictional-plane"));
    }

    #[test]
    fn test_build_is_pure() {
        let params = ScenarioParams {
            n_elements: 3,
            ..ScenarioParams::default()
        };
        let friction = FrictionParams::default();
        let a = InclinedPlaneScenario::build(&params, &friction, DEFAULT_GRAVITY, 0.2).unwrap();
        let b = InclinedPlaneScenario::build(&params, &friction, DEFAULT_GRAVITY, 0.2).unwrap();
        assert_eq!(a.rod().positions(), b.rod().positions());
        assert_eq!(a.plane(), b.plane());
    }
}
