//! 4×4 homogeneous matrix algebra.
//!
//! Matrices are column-major: element `4 * col + row`, so indices 12–14 hold the
//! translation and index 15 is `1` for every affine transform produced here.

use crate::foundation::core::Affine;

/// A column-major 4×4 homogeneous transform.
///
/// Equality compares the twelve affine entries only; indices 3, 7, 11 and 15 are always
/// `0, 0, 0, 1` for the transforms this crate builds and are ignored.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Matrix(pub [f64; 16]);

const AFFINE_INDICES: [usize; 12] = [0, 1, 2, 4, 5, 6, 8, 9, 10, 12, 13, 14];

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        AFFINE_INDICES.iter().all(|&i| self.0[i] == other.0[i])
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; 16]> for Matrix {
    fn from(m: [f64; 16]) -> Self {
        Self(m)
    }
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ]);

    /// A tiny push towards the viewer, for breaking z ties.
    pub const IN_FRONT: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1e-3, 1.0,
    ]);

    /// A tiny push away from the viewer.
    pub const BEHIND: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, -1e-3, 1.0,
    ]);

    /// Component-wise comparison of the affine entries within `eps`.
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        AFFINE_INDICES
            .iter()
            .all(|&i| (self.0[i] - other.0[i]).abs() <= eps)
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Composes `self ∘ b` over the 3×3 block; `b`'s translation is mapped through `self`
    /// and `self`'s translation is kept. The projective row is reset to `0, 0, 0, 1`.
    pub fn multiply(&self, b: &Self) -> Self {
        let a = &self.0;
        let b = &b.0;
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += a[4 * k + row] * b[4 * col + k];
                }
                if col == 3 {
                    sum += a[12 + row];
                }
                out[4 * col + row] = sum;
            }
        }
        out[15] = 1.0;
        Self(out)
    }

    /// Full 4×4 product `self * b`.
    pub fn multiply4x4(&self, b: &Self) -> Self {
        let a = &self.0;
        let b = &b.0;
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[4 * col + row] = (0..4).map(|k| a[4 * k + row] * b[4 * col + k]).sum();
            }
        }
        Self(out)
    }

    /// Applies `self`, then translates by `t` in the parent frame.
    pub fn then_move(&self, t: [f64; 3]) -> Self {
        let m = &self.0;
        Self([
            m[0],
            m[1],
            m[2],
            0.0,
            m[4],
            m[5],
            m[6],
            0.0,
            m[8],
            m[9],
            m[10],
            0.0,
            m[12] + t[0],
            m[13] + t[1],
            m[14] + t[2],
            1.0,
        ])
    }

    /// Translates by `v` expressed in `m`'s local frame, then applies `m`.
    pub fn move_then(v: [f64; 3], m: &Self) -> Self {
        m.then_move(Self::vec_in_context(v, m))
    }

    /// Rewrites `self` so that it acts about the point `v` instead of the origin.
    pub fn about_origin(v: [f64; 3], m: &Self) -> Self {
        let mapped = Self::vec_in_context(v, m);
        m.then_move([v[0] - mapped[0], v[1] - mapped[1], v[2] - mapped[2]])
    }

    /// Maps `v` through the 3×3 block of `m` (no translation).
    pub fn vec_in_context(v: [f64; 3], m: &Self) -> [f64; 3] {
        let m = &m.0;
        [
            v[0] * m[0] + v[1] * m[4] + v[2] * m[8],
            v[0] * m[1] + v[1] * m[5] + v[2] * m[9],
            v[0] * m[2] + v[1] * m[6] + v[2] * m[10],
        ]
    }

    /// Pure translation.
    pub fn translate(x: f64, y: f64, z: f64) -> Self {
        let mut out = Self::IDENTITY;
        out.0[12] = x;
        out.0[13] = y;
        out.0[14] = z;
        out
    }

    /// Applies `self`, then scales by `s` in the parent frame.
    pub fn then_scale(&self, s: [f64; 3]) -> Self {
        let m = &self.0;
        Self([
            s[0] * m[0],
            s[1] * m[1],
            s[2] * m[2],
            0.0,
            s[0] * m[4],
            s[1] * m[5],
            s[2] * m[6],
            0.0,
            s[0] * m[8],
            s[1] * m[9],
            s[2] * m[10],
            0.0,
            s[0] * m[12],
            s[1] * m[13],
            s[2] * m[14],
            1.0,
        ])
    }

    /// Pure scale.
    pub fn scale(x: f64, y: f64, z: f64) -> Self {
        let mut out = Self::IDENTITY;
        out.0[0] = x;
        out.0[5] = y;
        out.0[10] = z;
        out
    }

    /// Rotation about the x axis (radians).
    pub fn rotate_x(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self([
            1.0, 0.0, 0.0, 0.0, 0.0, c, s, 0.0, 0.0, -s, c, 0.0, 0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the y axis (radians).
    pub fn rotate_y(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self([
            c, 0.0, -s, 0.0, 0.0, 1.0, 0.0, 0.0, s, 0.0, c, 0.0, 0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Rotation about the z axis (radians).
    pub fn rotate_z(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self([
            c, s, 0.0, 0.0, -s, c, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Euler rotation: `rotate_x(phi)`, then `rotate_y(theta)`, then `rotate_z(psi)`,
    /// combined as `Rx * Ry * Rz`.
    pub fn rotate(phi: f64, theta: f64, psi: f64) -> Self {
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_psi, cos_psi) = psi.sin_cos();
        Self([
            cos_theta * cos_psi,
            cos_phi * sin_psi + sin_phi * sin_theta * cos_psi,
            sin_phi * sin_psi - cos_phi * sin_theta * cos_psi,
            0.0,
            -cos_theta * sin_psi,
            cos_phi * cos_psi - sin_phi * sin_theta * sin_psi,
            sin_phi * cos_psi + cos_phi * sin_theta * sin_psi,
            0.0,
            sin_theta,
            -sin_phi * cos_theta,
            cos_phi * cos_theta,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    /// Rotation by `theta` about the unit axis `v`.
    pub fn rotate_axis(v: [f64; 3], theta: f64) -> Self {
        let (sin_theta, cos_theta) = theta.sin_cos();
        let ver_theta = 1.0 - cos_theta;

        let xx_v = v[0] * v[0] * ver_theta;
        let xy_v = v[0] * v[1] * ver_theta;
        let xz_v = v[0] * v[2] * ver_theta;
        let yy_v = v[1] * v[1] * ver_theta;
        let yz_v = v[1] * v[2] * ver_theta;
        let zz_v = v[2] * v[2] * ver_theta;
        let xs = v[0] * sin_theta;
        let ys = v[1] * sin_theta;
        let zs = v[2] * sin_theta;

        Self([
            xx_v + cos_theta,
            xy_v + zs,
            xz_v - ys,
            0.0,
            xy_v - zs,
            yy_v + cos_theta,
            yz_v + xs,
            0.0,
            xz_v + ys,
            yz_v - xs,
            zz_v + cos_theta,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    /// Skew by the given angles (radians).
    pub fn skew(phi: f64, theta: f64, psi: f64) -> Self {
        Self([
            1.0,
            0.0,
            0.0,
            0.0,
            psi.tan(),
            1.0,
            0.0,
            0.0,
            theta.tan(),
            phi.tan(),
            1.0,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ])
    }

    /// Perspective projection with the viewer at `focus_z`.
    pub fn perspective(focus_z: f64) -> Self {
        let mut out = Self::IDENTITY;
        out.0[11] = -1.0 / focus_z;
        out
    }

    /// The translation column.
    pub fn get_translate(&self) -> [f64; 3] {
        [self.0[12], self.0[13], self.0[14]]
    }

    /// Inverse of an affine transform via cofactors of the 3×3 block.
    ///
    /// A singular block yields non-finite entries; callers must not feed degenerate
    /// matrices when they need a usable result.
    pub fn inverse(&self) -> Self {
        let m = &self.0;
        let c0 = m[5] * m[10] - m[6] * m[9];
        let c1 = m[4] * m[10] - m[6] * m[8];
        let c2 = m[4] * m[9] - m[5] * m[8];
        let c4 = m[1] * m[10] - m[2] * m[9];
        let c5 = m[0] * m[10] - m[2] * m[8];
        let c6 = m[0] * m[9] - m[1] * m[8];
        let c8 = m[1] * m[6] - m[2] * m[5];
        let c9 = m[0] * m[6] - m[2] * m[4];
        let c10 = m[0] * m[5] - m[1] * m[4];
        let det = m[0] * c0 - m[1] * c1 + m[2] * c2;
        let inv = 1.0 / det;

        let mut r = [
            inv * c0,
            -inv * c4,
            inv * c8,
            0.0,
            -inv * c1,
            inv * c5,
            -inv * c9,
            0.0,
            inv * c2,
            -inv * c6,
            inv * c10,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ];
        r[12] = -m[12] * r[0] - m[13] * r[4] - m[14] * r[8];
        r[13] = -m[12] * r[1] - m[13] * r[5] - m[14] * r[9];
        r[14] = -m[12] * r[2] - m[13] * r[6] - m[14] * r[10];
        Self(r)
    }

    /// Swaps rows and columns.
    pub fn transpose(&self) -> Self {
        let m = &self.0;
        Self([
            m[0], m[4], m[8], m[12], m[1], m[5], m[9], m[13], m[2], m[6], m[10], m[14], m[3],
            m[7], m[11], m[15],
        ])
    }

    /// Projects onto the xy plane as a 2D affine transform (z terms dropped).
    pub fn to_affine(&self) -> Affine {
        let m = &self.0;
        Affine::new([m[0], m[1], m[4], m[5], m[12], m[13]])
    }

    /// Lifts a 2D affine transform into the xy plane.
    pub fn from_affine(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self([
            a, b, 0.0, 0.0, c, d, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, e, f, 0.0, 1.0,
        ])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/matrix.rs"]
mod tests;
