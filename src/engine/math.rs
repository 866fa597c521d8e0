//! Small fixed-size linear algebra for rod state.
//!
//! `Vec3` carries positions, velocities, forces and torques. `Mat3` carries
//! directors (rows are the material frame `d1, d2, d3` expressed in the lab
//! frame), shear/bend stiffness matrices and mass second moments.

use serde::{Deserialize, Serialize};

/// 3D vector for positions, velocities, forces and torques.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Zero vector.
    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Build from a `[x, y, z]` array.
    #[must_use]
    pub const fn from_array(a: [f64; 3]) -> Self {
        Self { x: a[0], y: a[1], z: a[2] }
    }

    /// Components as an array.
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Magnitude squared.
    #[must_use]
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude (length).
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    /// Dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Normalize to unit vector. Returns zero for a (near) zero vector.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag < f64::EPSILON {
            Self::zero()
        } else {
            self.scale(1.0 / mag)
        }
    }

    /// Scale by scalar.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Check if all components are finite.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // is_finite not const
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl std::ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// Row-major 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3 {
    /// Matrix rows.
    pub rows: [[f64; 3]; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat3 {
    /// Identity matrix.
    #[must_use]
    pub const fn identity() -> Self {
        Self::diagonal(1.0, 1.0, 1.0)
    }

    /// Diagonal matrix.
    #[must_use]
    pub const fn diagonal(a: f64, b: f64, c: f64) -> Self {
        Self {
            rows: [[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]],
        }
    }

    /// Matrix whose rows are the given vectors.
    #[must_use]
    pub const fn from_rows(r0: Vec3, r1: Vec3, r2: Vec3) -> Self {
        Self {
            rows: [[r0.x, r0.y, r0.z], [r1.x, r1.y, r1.z], [r2.x, r2.y, r2.z]],
        }
    }

    /// Row `i` as a vector.
    #[must_use]
    pub const fn row(&self, i: usize) -> Vec3 {
        Vec3::from_array(self.rows[i])
    }

    /// Matrix-vector product.
    #[must_use]
    pub fn mul_vec(&self, v: &Vec3) -> Vec3 {
        Vec3::new(self.row(0).dot(v), self.row(1).dot(v), self.row(2).dot(v))
    }

    /// Transposed matrix-vector product (`Mᵀ v`).
    #[must_use]
    pub fn transpose_mul_vec(&self, v: &Vec3) -> Vec3 {
        self.row(0) * v.x + self.row(1) * v.y + self.row(2) * v.z
    }

    /// Matrix-matrix product.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * other.rows[k][j]).sum();
            }
        }
        Self { rows }
    }

    /// Transpose.
    #[must_use]
    pub fn transpose(&self) -> Self {
        let r = &self.rows;
        Self {
            rows: [
                [r[0][0], r[1][0], r[2][0]],
                [r[0][1], r[1][1], r[2][1]],
                [r[0][2], r[1][2], r[2][2]],
            ],
        }
    }

    /// Scale every entry.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        let mut rows = self.rows;
        for cell in rows.iter_mut().flatten() {
            *cell *= s;
        }
        Self { rows }
    }

    /// Entry-wise sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut rows = self.rows;
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell += other.rows[i][j];
            }
        }
        Self { rows }
    }

    /// Trace.
    #[must_use]
    pub fn trace(&self) -> f64 {
        self.rows[0][0] + self.rows[1][1] + self.rows[2][2]
    }

    /// Inverse of a diagonal matrix (off-diagonal entries are ignored).
    ///
    /// Mass second moments of a circular section are diagonal in the
    /// material frame, which is all the rod needs.
    #[must_use]
    pub fn diagonal_inverse(&self) -> Self {
        Self::diagonal(
            1.0 / self.rows[0][0],
            1.0 / self.rows[1][1],
            1.0 / self.rows[2][2],
        )
    }

    /// Check if all entries are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }

    /// Rotate a director by `angle = scale * |axis|` about `axis`
    /// (expressed in the material frame).
    ///
    /// Uses the exponential map `Q ← exp(-θ[k]ₓ) Q`, i.e.
    /// `R = I - sinθ K + (1 - cosθ) K²` applied from the left.
    #[must_use]
    pub fn rotate(&self, scale: f64, axis: &Vec3) -> Self {
        let mag = axis.magnitude();
        if mag < 1e-14 {
            return *self;
        }
        let theta = scale * mag;
        let k = axis.scale(1.0 / mag);
        let skew = Self {
            rows: [[0.0, -k.z, k.y], [k.z, 0.0, -k.x], [-k.y, k.x, 0.0]],
        };
        let skew2 = skew.mul(&skew);
        let rotation = Self::identity()
            .add(&skew.scale(-theta.sin()))
            .add(&skew2.scale(1.0 - theta.cos()));
        rotation.mul(self)
    }

    /// Rotation vector taking `self` to `next` (`log(next · selfᵀ)`),
    /// expressed in the material frame.
    #[must_use]
    pub fn inv_rotate(&self, next: &Self) -> Vec3 {
        let r = next.mul(&self.transpose());
        let cos_theta = (0.5 * r.trace() - 0.5 - 1e-10).clamp(-1.0, 1.0);
        let theta = cos_theta.acos();
        let axis = Vec3::new(
            r.rows[2][1] - r.rows[1][2],
            r.rows[0][2] - r.rows[2][0],
            r.rows[1][0] - r.rows[0][1],
        );
        axis.scale(-0.5 * theta / (theta + 1e-14).sin())
    }
}
