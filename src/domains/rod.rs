//! Discretised Cosserat rod.
//!
//! The rod is a chain of `n` elements between `n + 1` nodes. Nodes carry
//! translational state (position, velocity, lumped mass), elements carry
//! rotational state (director, angular velocity in the material frame, mass
//! second moment of inertia). Internal loads come from shear/stretch strain
//! on elements and bend/twist curvature on the `n - 1` Voronoi regions.
//!
//! # Energy accessors
//!
//! ```text
//! E_trans = ½ Σ_nodes    m |v|²
//! E_rot   = ½ Σ_elements ω · J ω
//! ```

use serde::{Deserialize, Serialize};

use super::kernels;
use crate::engine::math::{Mat3, Vec3};
use crate::error::{SimError, SimResult};

/// Tolerance for unit-length and orthogonality checks on rod axes.
pub const AXIS_TOLERANCE: f64 = 1e-9;

/// Construction parameters for a straight rod.
///
/// The shear matrix is part of construction; a built rod's stiffness never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraightRodSpec {
    /// Number of elements.
    pub n_elements: usize,
    /// Position of the first node.
    pub start: Vec3,
    /// Unit axial direction (becomes `d3`).
    pub direction: Vec3,
    /// Unit normal orthogonal to `direction` (becomes `d1`).
    pub normal: Vec3,
    /// Total rest length.
    pub base_length: f64,
    /// Cross-section radius.
    pub base_radius: f64,
    /// Material density.
    pub density: f64,
    /// Dissipation coefficient for internal damping.
    pub nu: f64,
    /// Young's modulus.
    pub youngs_modulus: f64,
    /// Poisson ratio.
    pub poisson_ratio: f64,
    /// Shear/stretch stiffness override applied to every element.
    #[serde(default)]
    pub shear_matrix: Option<Mat3>,
}

impl StraightRodSpec {
    /// Check the geometric and material invariants of the rod.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameter` naming the first offending
    /// parameter.
    pub fn validate(&self) -> SimResult<()> {
        if self.n_elements == 0 {
            return Err(SimError::invalid("n_elements", "rod needs at least one element"));
        }
        positive("base_length", self.base_length)?;
        positive("base_radius", self.base_radius)?;
        positive("density", self.density)?;
        positive("youngs_modulus", self.youngs_modulus)?;
        if !(self.nu.is_finite() && self.nu >= 0.0) {
            return Err(SimError::invalid(
                "nu",
                format!("damping must be finite and non-negative, got {}", self.nu),
            ));
        }
        if !(self.poisson_ratio > -1.0 && self.poisson_ratio <= 0.5) {
            return Err(SimError::invalid(
                "poisson_ratio",
                format!("must lie in (-1, 0.5], got {}", self.poisson_ratio),
            ));
        }
        if !self.start.is_finite() {
            return Err(SimError::invalid("start", "must be finite"));
        }
        unit("direction", &self.direction)?;
        unit("normal", &self.normal)?;
        let overlap = self.direction.dot(&self.normal);
        if overlap.abs() > AXIS_TOLERANCE {
            return Err(SimError::invalid(
                "normal",
                format!("must be orthogonal to direction, dot product is {overlap:e}"),
            ));
        }
        if let Some(shear) = &self.shear_matrix {
            if !shear.is_finite() {
                return Err(SimError::invalid("shear_matrix", "must be finite"));
            }
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(
            name,
            format!("must be finite and positive, got {value}"),
        ))
    }
}

fn unit(name: &str, v: &Vec3) -> SimResult<()> {
    let mag = v.magnitude();
    if v.is_finite() && (mag - 1.0).abs() <= AXIS_TOLERANCE {
        Ok(())
    } else {
        Err(SimError::invalid(
            name,
            format!("must be a unit vector, |v| = {mag}"),
        ))
    }
}

/// Discretised Cosserat rod state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosseratRod {
    n_elements: usize,

    // Nodal quantities (n + 1).
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    masses: Vec<f64>,
    internal_forces: Vec<Vec3>,
    external_forces: Vec<Vec3>,

    // Elemental quantities (n).
    directors: Vec<Mat3>,
    omegas: Vec<Vec3>,
    mass_second_moments: Vec<Mat3>,
    inv_mass_second_moments: Vec<Mat3>,
    radii: Vec<f64>,
    rest_lengths: Vec<f64>,
    lengths: Vec<f64>,
    tangents: Vec<Vec3>,
    dilatations: Vec<f64>,
    dilatation_rates: Vec<f64>,
    shear_matrices: Vec<Mat3>,
    internal_stresses: Vec<Vec3>,
    internal_torques: Vec<Vec3>,
    external_torques: Vec<Vec3>,

    // Voronoi quantities (n - 1).
    rest_voronoi_lengths: Vec<f64>,
    voronoi_dilatations: Vec<f64>,
    kappas: Vec<Vec3>,
    bend_matrices: Vec<Mat3>,

    nu: f64,
}

impl CosseratRod {
    /// Build a straight, unstrained rod at rest.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameter` if the spec violates any rod
    /// invariant (see [`StraightRodSpec::validate`]).
    pub fn straight_rod(spec: &StraightRodSpec) -> SimResult<Self> {
        spec.validate()?;

        let n = spec.n_elements;
        let rest_length = spec.base_length / n as f64;
        let area = std::f64::consts::PI * spec.base_radius * spec.base_radius;
        let binormal = spec.direction.cross(&spec.normal);
        let director = Mat3::from_rows(spec.normal, binormal, spec.direction);

        let positions: Vec<Vec3> = (0..=n)
            .map(|i| spec.start + spec.direction * (i as f64 * rest_length))
            .collect();

        let element_mass = spec.density * area * rest_length;
        let mut masses = vec![0.0; n + 1];
        for i in 0..n {
            masses[i] += 0.5 * element_mass;
            masses[i + 1] += 0.5 * element_mass;
        }

        // Second moment of area of a circular section: I1 = I2 = A²/(4π), I3 = I1 + I2.
        let i1 = area * area / (4.0 * std::f64::consts::PI);
        let moment = Mat3::diagonal(i1, i1, 2.0 * i1).scale(spec.density * rest_length);

        let shear_modulus = spec.youngs_modulus / (2.0 * (1.0 + spec.poisson_ratio));
        let alpha_c = 4.0 / 3.0;
        let shear = spec.shear_matrix.unwrap_or_else(|| {
            Mat3::diagonal(
                alpha_c * shear_modulus * area,
                alpha_c * shear_modulus * area,
                spec.youngs_modulus * area,
            )
        });
        let bend_element = Mat3::diagonal(
            spec.youngs_modulus * i1,
            spec.youngs_modulus * i1,
            shear_modulus * 2.0 * i1,
        );

        let n_voronoi = n.saturating_sub(1);
        Ok(Self {
            n_elements: n,
            positions,
            velocities: vec![Vec3::zero(); n + 1],
            masses,
            internal_forces: vec![Vec3::zero(); n + 1],
            external_forces: vec![Vec3::zero(); n + 1],
            directors: vec![director; n],
            omegas: vec![Vec3::zero(); n],
            mass_second_moments: vec![moment; n],
            inv_mass_second_moments: vec![moment.diagonal_inverse(); n],
            radii: vec![spec.base_radius; n],
            rest_lengths: vec![rest_length; n],
            lengths: vec![rest_length; n],
            tangents: vec![spec.direction; n],
            dilatations: vec![1.0; n],
            dilatation_rates: vec![0.0; n],
            shear_matrices: vec![shear; n],
            internal_stresses: vec![Vec3::zero(); n],
            internal_torques: vec![Vec3::zero(); n],
            external_torques: vec![Vec3::zero(); n],
            rest_voronoi_lengths: vec![rest_length; n_voronoi],
            voronoi_dilatations: vec![1.0; n_voronoi],
            kappas: vec![Vec3::zero(); n_voronoi],
            // Uniform rod: the rest-length weighted average of equal bend matrices.
            bend_matrices: vec![bend_element; n_voronoi],
            nu: spec.nu,
        })
    }

    /// Number of elements.
    #[must_use]
    pub const fn n_elements(&self) -> usize {
        self.n_elements
    }

    /// Nodal positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Nodal velocities.
    #[must_use]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Mutable nodal velocities.
    #[must_use]
    pub fn velocities_mut(&mut self) -> &mut [Vec3] {
        &mut self.velocities
    }

    /// Lumped nodal masses.
    #[must_use]
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Element directors (rows `d1, d2, d3`).
    #[must_use]
    pub fn directors(&self) -> &[Mat3] {
        &self.directors
    }

    /// Element angular velocities in the material frame.
    #[must_use]
    pub fn omegas(&self) -> &[Vec3] {
        &self.omegas
    }

    /// Mutable element angular velocities.
    #[must_use]
    pub fn omegas_mut(&mut self) -> &mut [Vec3] {
        &mut self.omegas
    }

    /// Element radii.
    #[must_use]
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Current element tangents.
    #[must_use]
    pub fn tangents(&self) -> &[Vec3] {
        &self.tangents
    }

    /// Element shear/stretch stiffness matrices.
    #[must_use]
    pub fn shear_matrices(&self) -> &[Mat3] {
        &self.shear_matrices
    }

    /// Element mass second moments of inertia.
    #[must_use]
    pub fn mass_second_moments(&self) -> &[Mat3] {
        &self.mass_second_moments
    }

    /// Nodal internal forces from the last dynamic step.
    #[must_use]
    pub fn internal_forces(&self) -> &[Vec3] {
        &self.internal_forces
    }

    /// Nodal external forces accumulated for the current step.
    #[must_use]
    pub fn external_forces(&self) -> &[Vec3] {
        &self.external_forces
    }

    /// Mutable nodal external forces.
    #[must_use]
    pub fn external_forces_mut(&mut self) -> &mut [Vec3] {
        &mut self.external_forces
    }

    /// Element internal torques (material frame).
    #[must_use]
    pub fn internal_torques(&self) -> &[Vec3] {
        &self.internal_torques
    }

    /// Element external torques (material frame).
    #[must_use]
    pub fn external_torques(&self) -> &[Vec3] {
        &self.external_torques
    }

    /// Mutable element external torques.
    #[must_use]
    pub fn external_torques_mut(&mut self) -> &mut [Vec3] {
        &mut self.external_torques
    }

    /// Total mass.
    #[must_use]
    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// Translational kinetic energy summed over nodes.
    #[must_use]
    pub fn translational_energy(&self) -> f64 {
        self.masses
            .iter()
            .zip(&self.velocities)
            .map(|(m, v)| 0.5 * m * v.magnitude_squared())
            .sum()
    }

    /// Rotational kinetic energy summed over elements.
    #[must_use]
    pub fn rotational_energy(&self) -> f64 {
        self.omegas
            .iter()
            .zip(&self.mass_second_moments)
            .map(|(w, j)| 0.5 * w.dot(&j.mul_vec(w)))
            .sum()
    }

    /// Velocity of the centre of mass.
    #[must_use]
    pub fn center_of_mass_velocity(&self) -> Vec3 {
        let momentum = self
            .masses
            .iter()
            .zip(&self.velocities)
            .fold(Vec3::zero(), |acc, (m, v)| acc + v.scale(*m));
        momentum.scale(1.0 / self.total_mass())
    }

    /// Advance positions and directors by `prefac` using current rates.
    pub(crate) fn kinematic_update(&mut self, prefac: f64) {
        for (x, v) in self.positions.iter_mut().zip(&self.velocities) {
            *x += v.scale(prefac);
        }
        for (q, w) in self.directors.iter_mut().zip(&self.omegas) {
            *q = q.rotate(prefac, w);
        }
    }

    /// Advance velocities and angular velocities by `dt` from the current
    /// internal + external loads.
    pub(crate) fn dynamic_update(&mut self, dt: f64) {
        for i in 0..=self.n_elements {
            let total = self.internal_forces[i] + self.external_forces[i];
            self.velocities[i] += total.scale(dt / self.masses[i]);
        }
        for i in 0..self.n_elements {
            let total = self.internal_torques[i] + self.external_torques[i];
            let alpha = self.inv_mass_second_moments[i]
                .mul_vec(&total)
                .scale(self.dilatations[i]);
            self.omegas[i] += alpha.scale(dt);
        }
    }

    /// Zero the external load accumulators.
    pub(crate) fn reset_external_loads(&mut self) {
        self.external_forces.fill(Vec3::zero());
        self.external_torques.fill(Vec3::zero());
    }

    /// Recompute strains, stresses and the resulting internal forces and
    /// torques from the current kinematic state.
    pub(crate) fn compute_internal_forces_and_torques(&mut self) {
        self.compute_geometry();
        self.compute_internal_forces();
        self.compute_internal_torques();
    }

    fn compute_geometry(&mut self) {
        for i in 0..self.n_elements {
            let edge = self.positions[i + 1] - self.positions[i];
            let length = edge.magnitude();
            let rate = self.velocities[i + 1] - self.velocities[i];
            self.lengths[i] = length;
            self.tangents[i] = edge.scale(1.0 / length);
            self.dilatations[i] = length / self.rest_lengths[i];
            self.dilatation_rates[i] = edge.dot(&rate) / length / self.rest_lengths[i];
        }
        for i in 0..self.n_elements.saturating_sub(1) {
            let voronoi_length = 0.5 * (self.lengths[i] + self.lengths[i + 1]);
            self.voronoi_dilatations[i] = voronoi_length / self.rest_voronoi_lengths[i];
            self.kappas[i] = self.directors[i]
                .inv_rotate(&self.directors[i + 1])
                .scale(1.0 / self.rest_voronoi_lengths[i]);
        }
    }

    fn compute_internal_forces(&mut self) {
        // Shear/stretch strain σ = e Q t - d3, stress n = S σ.
        let lab_stresses: Vec<Vec3> = (0..self.n_elements)
            .map(|i| {
                let q = &self.directors[i];
                let sigma = q.mul_vec(&self.tangents[i]).scale(self.dilatations[i])
                    - Vec3::new(0.0, 0.0, 1.0);
                let stress = self.shear_matrices[i].mul_vec(&sigma);
                self.internal_stresses[i] = stress;
                q.transpose_mul_vec(&stress).scale(1.0 / self.dilatations[i])
            })
            .collect();

        let element_velocities = kernels::node_to_element(&self.velocities);
        let damping: Vec<Vec3> = element_velocities
            .iter()
            .zip(&self.lengths)
            .map(|(v, l)| v.scale(self.nu * l))
            .collect();
        let nodal_damping = kernels::quadrature(&damping);

        let forces = kernels::difference(&lab_stresses);
        for ((out, f), d) in self.internal_forces.iter_mut().zip(forces).zip(nodal_damping) {
            *out = f - d;
        }
    }

    fn compute_internal_torques(&mut self) {
        let n_voronoi = self.n_elements.saturating_sub(1);

        let mut scaled_couples = Vec::with_capacity(n_voronoi);
        let mut curvature_couples = Vec::with_capacity(n_voronoi);
        for i in 0..n_voronoi {
            let inv_cube = 1.0 / self.voronoi_dilatations[i].powi(3);
            let couple = self.bend_matrices[i].mul_vec(&self.kappas[i]);
            scaled_couples.push(couple.scale(inv_cube));
            curvature_couples.push(
                self.kappas[i]
                    .cross(&couple)
                    .scale(self.rest_voronoi_lengths[i] * inv_cube),
            );
        }
        let bend_twist_2d = kernels::difference(&scaled_couples);
        let bend_twist_3d = kernels::quadrature(&curvature_couples);

        for i in 0..self.n_elements {
            let q = &self.directors[i];
            let e = self.dilatations[i];
            let w = self.omegas[i];
            let shear_stretch = q
                .mul_vec(&self.tangents[i])
                .cross(&self.internal_stresses[i])
                .scale(self.rest_lengths[i]);
            let j_omega_upon_e = self.mass_second_moments[i].mul_vec(&w).scale(1.0 / e);
            let lagrangian_transport = j_omega_upon_e.cross(&w);
            let unsteady_dilatation = j_omega_upon_e.scale(self.dilatation_rates[i] / e);
            let damping = w.scale(self.nu * self.lengths[i]);

            // Single-element rods have no Voronoi region and no bend couple.
            let (bend_2d, bend_3d) = if n_voronoi == 0 {
                (Vec3::zero(), Vec3::zero())
            } else {
                (bend_twist_2d[i], bend_twist_3d[i])
            };

            self.internal_torques[i] = bend_2d
                + bend_3d
                + shear_stretch
                + lagrangian_transport
                + unsteady_dilatation
                - damping;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(n: usize) -> StraightRodSpec {
        let radius = 0.025;
        let length = 1.0;
        let mass = 1.0;
        StraightRodSpec {
            n_elements: n,
            start: Vec3::zero(),
            direction: Vec3::new(0.0, 0.0, 1.0),
            normal: Vec3::new(0.0, 1.0, 0.0),
            base_length: length,
            base_radius: radius,
            density: mass / (length * std::f64::consts::PI * radius * radius),
            nu: 1e-6,
            youngs_modulus: 1e9,
            poisson_ratio: 0.5,
            shear_matrix: Some(Mat3::identity().scale(1e4)),
        }
    }

    #[test]
    fn test_straight_rod_geometry() {
        let rod = CosseratRod::straight_rod(&spec(10)).unwrap();
        assert_eq!(rod.n_elements(), 10);
        assert_eq!(rod.positions().len(), 11);
        assert_eq!(rod.directors().len(), 10);
        let last = rod.positions()[10];
        assert!((last.z - 1.0).abs() < 1e-12);
        assert!((rod.total_mass() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_director_rows_are_normal_binormal_tangent() {
        let rod = CosseratRod::straight_rod(&spec(2)).unwrap();
        let q = rod.directors()[0];
        assert_eq!(q.row(0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(q.row(2), Vec3::new(0.0, 0.0, 1.0));
        // d2 = d3 × d1
        assert_eq!(q.row(1), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_shear_override_is_applied_at_construction() {
        let rod = CosseratRod::straight_rod(&spec(3)).unwrap();
        for s in rod.shear_matrices() {
            assert_eq!(*s, Mat3::identity().scale(1e4));
        }

        let mut default_shear = spec(3);
        default_shear.shear_matrix = None;
        let rod = CosseratRod::straight_rod(&default_shear).unwrap();
        assert!(rod.shear_matrices()[0].rows[2][2] > 1e6);
    }

    #[test]
    fn test_axial_inertia_matches_solid_cylinder() {
        let rod = CosseratRod::straight_rod(&spec(5)).unwrap();
        let axial: f64 = rod.mass_second_moments().iter().map(|j| j.rows[2][2]).sum();
        let expected = 0.5 * 1.0 * 0.025 * 0.025;
        assert!((axial - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn test_rest_rod_has_zero_energy_and_no_internal_load() {
        let mut rod = CosseratRod::straight_rod(&spec(4)).unwrap();
        rod.compute_internal_forces_and_torques();
        assert_eq!(rod.translational_energy(), 0.0);
        assert_eq!(rod.rotational_energy(), 0.0);
        for f in rod.internal_forces() {
            assert!(f.magnitude() < 1e-9, "unexpected internal force {f:?}");
        }
        for t in rod.internal_torques() {
            assert!(t.magnitude() < 1e-9, "unexpected internal torque {t:?}");
        }
    }

    #[test]
    fn test_energy_accessors() {
        let mut rod = CosseratRod::straight_rod(&spec(2)).unwrap();
        for v in rod.velocities_mut() {
            *v = Vec3::new(2.0, 0.0, 0.0);
        }
        assert!((rod.translational_energy() - 2.0).abs() < 1e-12);

        for w in rod.omegas_mut() {
            *w = Vec3::new(0.0, 0.0, 4.0);
        }
        let axial_inertia = 0.5 * 0.025 * 0.025;
        let expected = 0.5 * axial_inertia * 16.0;
        assert!((rod.rotational_energy() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_stretch_produces_restoring_force() {
        let mut rod = CosseratRod::straight_rod(&spec(1)).unwrap();
        rod.positions[1] = rod.positions[1] + Vec3::new(0.0, 0.0, 1e-3);
        rod.compute_internal_forces_and_torques();
        // First node pulled toward +z, last node toward -z.
        assert!(rod.internal_forces()[0].z > 0.0);
        assert!(rod.internal_forces()[1].z < 0.0);
    }

    #[test]
    fn test_invalid_specs_rejected() {
        let mut s = spec(3);
        s.n_elements = 0;
        assert!(CosseratRod::straight_rod(&s).is_err());

        let mut s = spec(3);
        s.base_radius = -0.1;
        assert!(matches!(
            CosseratRod::straight_rod(&s),
            Err(SimError::InvalidParameter { .. })
        ));

        let mut s = spec(3);
        s.direction = Vec3::new(0.0, 0.0, 2.0);
        assert!(CosseratRod::straight_rod(&s).is_err());

        let mut s = spec(3);
        s.normal = Vec3::new(0.0, 0.6, 0.8);
        assert!(CosseratRod::straight_rod(&s).is_err());

        let mut s = spec(3);
        s.density = f64::NAN;
        assert!(CosseratRod::straight_rod(&s).is_err());
    }
}
