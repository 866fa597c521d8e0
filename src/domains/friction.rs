//! Anisotropic Coulomb friction against an infinite plane.
//!
//! Contact is resolved per element in four passes, each seeing the loads
//! added by the previous ones:
//!
//! 1. normal response: cancel the compressive load along the plane normal,
//!    plus a penalty spring `k` on penetration and a damper `nu` on normal
//!    velocity;
//! 2. kinetic friction along the projected rod axis (forward/backward μ
//!    selected by the sign of the axial velocity);
//! 3. kinetic rolling friction (sideways μ) opposing the contact-point slip
//!    velocity, with its torque about the rod axis;
//! 4. static axial and rolling friction, capped at `μ_s N` and scaled by a
//!    slip function that fades static friction out between one and two slip
//!    tolerances.
//!
//! Friction coefficient triples are ordered `[forward, backward, sideways]`.

use super::forcing::Forcing;
use super::kernels;
use super::rod::{CosseratRod, AXIS_TOLERANCE};
use crate::engine::math::Vec3;
use crate::error::{SimError, SimResult};

/// Distance above the surface still treated as contact.
pub const SURFACE_TOLERANCE: f64 = 1e-4;

/// Regularisation added to norms before normalising.
const NORM_EPSILON: f64 = 1e-14;

/// Frictional plane contact model.
#[derive(Debug, Clone)]
pub struct AnisotropicFrictionalPlane {
    k: f64,
    nu: f64,
    plane_origin: Vec3,
    plane_normal: Vec3,
    slip_velocity_tol: f64,
    static_mu: [f64; 3],
    kinetic_mu: [f64; 3],
}

impl AnisotropicFrictionalPlane {
    /// Create a frictional plane.
    ///
    /// `plane_normal` must already be unit length; the plane does not
    /// normalise on the caller's behalf.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameter` for a non-unit normal, negative
    /// contact stiffness/damping, a non-positive slip tolerance or negative
    /// friction coefficients.
    pub fn new(
        plane_origin: Vec3,
        plane_normal: Vec3,
        k: f64,
        nu: f64,
        slip_velocity_tol: f64,
        static_mu: [f64; 3],
        kinetic_mu: [f64; 3],
    ) -> SimResult<Self> {
        if !plane_origin.is_finite() {
            return Err(SimError::invalid("plane_origin", "must be finite"));
        }
        let mag = plane_normal.magnitude();
        if !plane_normal.is_finite() || (mag - 1.0).abs() > AXIS_TOLERANCE {
            return Err(SimError::invalid(
                "plane_normal",
                format!("must be normalised before use, |n| = {mag}"),
            ));
        }
        for (name, value) in [("k", k), ("nu", nu)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::invalid(
                    name,
                    format!("must be finite and non-negative, got {value}"),
                ));
            }
        }
        if !(slip_velocity_tol.is_finite() && slip_velocity_tol > 0.0) {
            return Err(SimError::invalid(
                "slip_velocity_tol",
                format!("must be finite and positive, got {slip_velocity_tol}"),
            ));
        }
        for (name, mu) in [("static_mu", static_mu), ("kinetic_mu", kinetic_mu)] {
            if mu.iter().any(|m| !(m.is_finite() && *m >= 0.0)) {
                return Err(SimError::invalid(
                    name,
                    format!("coefficients must be finite and non-negative, got {mu:?}"),
                ));
            }
        }
        Ok(Self {
            k,
            nu,
            plane_origin,
            plane_normal,
            slip_velocity_tol,
            static_mu,
            kinetic_mu,
        })
    }

    /// Plane origin.
    #[must_use]
    pub const fn plane_origin(&self) -> Vec3 {
        self.plane_origin
    }

    /// Plane unit normal.
    #[must_use]
    pub const fn plane_normal(&self) -> Vec3 {
        self.plane_normal
    }

    /// Static friction coefficients `[forward, backward, sideways]`.
    #[must_use]
    pub const fn static_mu(&self) -> [f64; 3] {
        self.static_mu
    }

    /// Kinetic friction coefficients `[forward, backward, sideways]`.
    #[must_use]
    pub const fn kinetic_mu(&self) -> [f64; 3] {
        self.kinetic_mu
    }

    /// Apply the normal response and return, per element, the magnitude of
    /// the load-cancelling response and whether the element touches the
    /// plane.
    fn apply_normal_force(&self, rod: &mut CosseratRod) -> (Vec<f64>, Vec<bool>) {
        let n = self.plane_normal;
        let element_x = kernels::node_to_element(rod.positions());
        let element_v = kernels::node_to_element(rod.velocities());
        let element_total = element_total_forces(rod);

        let mut response = vec![0.0; rod.n_elements()];
        let mut in_contact = vec![false; rod.n_elements()];
        for i in 0..rod.n_elements() {
            let normal_component = element_total[i].dot(&n);
            // A load pulling away from the plane gets no response.
            let plane_response = if normal_component > 0.0 {
                Vec3::zero()
            } else {
                -n.scale(normal_component)
            };
            let gap = n.dot(&(element_x[i] - self.plane_origin)) - rod.radii()[i];
            let elastic = -n.scale(self.k * gap.min(0.0));
            let damping = -n.scale(self.nu * n.dot(&element_v[i]));

            if gap <= SURFACE_TOLERANCE {
                in_contact[i] = true;
                response[i] = plane_response.magnitude();
                kernels::add_element_load_to_nodes(
                    rod.external_forces_mut(),
                    i,
                    plane_response + elastic + damping,
                );
            }
        }
        (response, in_contact)
    }
}

impl Forcing for AnisotropicFrictionalPlane {
    fn apply_forces(&self, rod: &mut CosseratRod, _time: f64) {
        let (response, in_contact) = self.apply_normal_force(rod);
        let n_elements = rod.n_elements();
        let n = self.plane_normal;
        let [mu_s_forward, mu_s_backward, mu_s_side] = self.static_mu;
        let [mu_k_forward, mu_k_backward, mu_k_side] = self.kinetic_mu;

        let element_v = kernels::node_to_element(rod.velocities());
        let mut axial = Vec::with_capacity(n_elements);
        let mut rolling = Vec::with_capacity(n_elements);
        let mut axial_slip = Vec::with_capacity(n_elements);
        let mut rolling_slip = Vec::with_capacity(n_elements);

        // Kinetic friction along the axis projected into the plane.
        for i in 0..n_elements {
            let tangent = rod.tangents()[i];
            let in_plane = tangent - n.scale(n.dot(&tangent));
            let axis = in_plane.scale(1.0 / (in_plane.magnitude() + NORM_EPSILON));
            let speed = element_v[i].dot(&axis);
            let sign = sign(speed);
            let mu = 0.5 * (mu_k_forward * (1.0 + sign) + mu_k_backward * (1.0 - sign));
            let slip = slip_function(speed.abs(), self.slip_velocity_tol);
            let kinetic = -axis.scale((1.0 - slip) * mu * response[i] * sign);
            if in_contact[i] {
                kernels::add_element_load_to_nodes(rod.external_forces_mut(), i, kinetic);
            }
            axial.push(axis);
            rolling.push(axis.cross(&n));
            axial_slip.push(slip);
        }

        // Kinetic rolling friction on the contact-point slip velocity.
        for i in 0..n_elements {
            let q = rod.directors()[i];
            let arm = -n.scale(rod.radii()[i]);
            let omega = rod.omegas()[i];
            let spin_velocity = q.transpose_mul_vec(&omega.cross(&q.mul_vec(&arm)));
            let slip_speed = element_v[i].dot(&rolling[i]) + spin_velocity.dot(&rolling[i]);
            let slip_velocity = rolling[i].scale(slip_speed);
            let slip_mag = slip_velocity.magnitude();
            let slip = slip_function(slip_mag, self.slip_velocity_tol);
            let direction = slip_velocity.scale(1.0 / (slip_mag + NORM_EPSILON));
            let kinetic = -direction.scale((1.0 - slip) * mu_k_side * response[i]);
            if in_contact[i] {
                kernels::add_element_load_to_nodes(rod.external_forces_mut(), i, kinetic);
                rod.external_torques_mut()[i] += q.mul_vec(&arm.cross(&kinetic));
            }
            rolling_slip.push(slip);
        }

        // Static axial friction: resist the net axial load up to μ_s N.
        let element_total = element_total_forces(rod);
        for i in 0..n_elements {
            let load = element_total[i].dot(&axial[i]);
            let sign = sign(load);
            let mu = 0.5 * (mu_s_forward * (1.0 + sign) + mu_s_backward * (1.0 - sign));
            let cap = axial_slip[i] * mu * response[i];
            let static_force = -axial[i].scale(load.abs().min(cap) * sign);
            if in_contact[i] {
                kernels::add_element_load_to_nodes(rod.external_forces_mut(), i, static_force);
            }
        }

        // Static rolling friction: the force that would enforce rolling
        // without slip for a solid cylinder, capped at μ_s N.
        for i in 0..n_elements {
            let q = rod.directors()[i];
            let radius = rod.radii()[i];
            let arm = -n.scale(radius);
            let torque = q.transpose_mul_vec(
                &(rod.internal_torques()[i] + rod.external_torques()[i]),
            );
            let axial_torque = torque.dot(&axial[i]);
            let rolling_load = element_total[i].dot(&rolling[i]);
            let noslip = -((radius * rolling_load - 2.0 * axial_torque) / 3.0 / radius);
            let cap = rolling_slip[i] * mu_s_side * response[i];
            let static_force = rolling[i].scale(noslip.abs().min(cap) * sign(noslip));
            if in_contact[i] {
                kernels::add_element_load_to_nodes(rod.external_forces_mut(), i, static_force);
                rod.external_torques_mut()[i] += q.mul_vec(&arm.cross(&static_force));
            }
        }
    }

    fn name(&self) -> &'static str {
        "anisotropic-frictional-plane"
    }
}

/// Sum of internal and external nodal loads, lumped onto elements.
fn element_total_forces(rod: &CosseratRod) -> Vec<Vec3> {
    let nodal: Vec<Vec3> = rod
        .internal_forces()
        .iter()
        .zip(rod.external_forces())
        .map(|(a, b)| *a + *b)
        .collect();
    kernels::nodes_to_elements(&nodal)
}

/// Sign with `sign(0) = 0`.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// 1 while sticking (`|v| ≤ tol`), fading linearly to 0 at `|v| = 2 tol`.
#[must_use]
pub fn slip_function(slip_speed: f64, tolerance: f64) -> f64 {
    if slip_speed.abs() > tolerance {
        (1.0 - (slip_speed.abs() / tolerance - 1.0).min(1.0)).abs()
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::forcing::GravityForces;
    use crate::domains::rod::StraightRodSpec;

    fn rod() -> CosseratRod {
        let radius = 0.025;
        let spec = StraightRodSpec {
            n_elements: 4,
            start: Vec3::zero(),
            direction: Vec3::new(0.0, 0.0, 1.0),
            normal: Vec3::new(0.0, 1.0, 0.0),
            base_length: 1.0,
            base_radius: radius,
            density: 1.0 / (std::f64::consts::PI * radius * radius),
            nu: 0.0,
            youngs_modulus: 1e9,
            poisson_ratio: 0.5,
            shear_matrix: None,
        };
        CosseratRod::straight_rod(&spec).unwrap()
    }

    fn flat_plane() -> AnisotropicFrictionalPlane {
        AnisotropicFrictionalPlane::new(
            Vec3::new(0.0, -0.025, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            10.0,
            1e-4,
            1e-4,
            [0.4, 0.4, 0.4],
            [0.2, 0.2, 0.2],
        )
        .unwrap()
    }

    fn total(forces: &[Vec3]) -> Vec3 {
        forces.iter().fold(Vec3::zero(), |acc, f| acc + *f)
    }

    #[test]
    fn test_slip_function_profile() {
        assert_eq!(slip_function(0.0, 1e-4), 1.0);
        assert_eq!(slip_function(1e-4, 1e-4), 1.0);
        assert!((slip_function(1.5e-4, 1e-4) - 0.5).abs() < 1e-9);
        assert_eq!(slip_function(1.0, 1e-4), 0.0);
    }

    #[test]
    fn test_resting_rod_is_supported() {
        let mut rod = rod();
        rod.compute_internal_forces_and_torques();
        GravityForces::new(Vec3::new(0.0, -9.80665, 0.0)).apply_forces(&mut rod, 0.0);
        flat_plane().apply_forces(&mut rod, 0.0);

        let net = total(rod.external_forces());
        assert!(net.magnitude() < 1e-9, "net force on resting rod {net:?}");
    }

    #[test]
    fn test_plane_out_of_reach_applies_nothing() {
        let mut rod = rod();
        let plane = AnisotropicFrictionalPlane::new(
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            10.0,
            1e-4,
            1e-4,
            [0.4; 3],
            [0.2; 3],
        )
        .unwrap();
        rod.compute_internal_forces_and_torques();
        GravityForces::default().apply_forces(&mut rod, 0.0);
        let before = total(rod.external_forces());
        plane.apply_forces(&mut rod, 0.0);
        assert_eq!(total(rod.external_forces()), before);
    }

    #[test]
    fn test_static_rolling_friction_opposes_downslope_load() {
        let alpha: f64 = 0.1 * std::f64::consts::PI;
        let normal = Vec3::new(alpha.sin(), alpha.cos(), 0.0);
        let plane = AnisotropicFrictionalPlane::new(
            normal.scale(-0.025),
            normal,
            10.0,
            1e-4,
            1e-4,
            [0.4; 3],
            [0.2; 3],
        )
        .unwrap();
        let mut rod = rod();
        rod.compute_internal_forces_and_torques();
        GravityForces::default().apply_forces(&mut rod, 0.0);
        plane.apply_forces(&mut rod, 0.0);

        // Down-slope direction in the plane.
        let downslope = Vec3::new(alpha.cos(), -alpha.sin(), 0.0);
        let along = total(rod.external_forces()).dot(&downslope);
        let g = 9.80665;
        // Rolling without slip leaves 2/3 of the down-slope pull.
        let expected = 2.0 / 3.0 * g * alpha.sin();
        assert!(
            (along - expected).abs() < 1e-6,
            "down-slope force {along}, expected {expected}"
        );
        // The friction torque spins the rod about -z (rolling toward +x).
        let torque_z: f64 = rod
            .external_torques()
            .iter()
            .zip(rod.directors())
            .map(|(t, q)| q.transpose_mul_vec(t).z)
            .sum();
        assert!(torque_z < 0.0);
    }

    #[test]
    fn test_rejects_unnormalised_normal() {
        let err = AnisotropicFrictionalPlane::new(
            Vec3::zero(),
            Vec3::new(0.3, 1.0, 0.0),
            10.0,
            1e-4,
            1e-4,
            [0.4; 3],
            [0.2; 3],
        )
        .unwrap_err();
        assert!(err.to_string().contains("plane_normal"));
    }

    #[test]
    fn test_rejects_negative_coefficients() {
        let result = AnisotropicFrictionalPlane::new(
            Vec3::zero(),
            Vec3::new(0.0, 1.0, 0.0),
            10.0,
            1e-4,
            1e-4,
            [0.4, -0.1, 0.4],
            [0.2; 3],
        );
        assert!(result.is_err());
    }
}
