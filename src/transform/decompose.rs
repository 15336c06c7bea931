//! Decomposition of affine matrices into translate / rotate / skew / scale and back.

use std::f64::consts::PI;

use super::matrix::Matrix;

/// Components of an affine transform as produced by [`Matrix::interpret`].
///
/// `rotate` holds Euler angles `(x, y, z)` in radians and `skew` holds skew angles.
/// Missing fields deserialize to the neutral value (scale `1`, everything else `0`).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Decomposition {
    /// Translation.
    pub translate: [f64; 3],
    /// Euler rotation (radians).
    pub rotate: [f64; 3],
    /// Skew angles (radians).
    pub skew: [f64; 3],
    /// Per-axis scale.
    pub scale: [f64; 3],
}

impl Default for Decomposition {
    fn default() -> Self {
        Self {
            translate: [0.0; 3],
            rotate: [0.0; 3],
            skew: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

fn norm_squared(v: &[f64]) -> f64 {
    v.iter().map(|c| c * c).sum()
}

fn sign(n: f64) -> f64 {
    if n < 0.0 { -1.0 } else { 1.0 }
}

impl Matrix {
    /// QR-style decomposition using two Householder reflections.
    ///
    /// When the first reflection vector vanishes (a collapsed x column) the result carries
    /// only the translation, with zero rotate/skew/scale.
    pub fn interpret(&self) -> Decomposition {
        let m = &self.0;

        let x = [m[0], m[1], m[2]];
        let x_norm = norm_squared(&x).sqrt();
        let v = [x[0] + sign(x[0]) * x_norm, x[1], x[2]];
        let mult = 2.0 / norm_squared(&v);
        if mult >= f64::INFINITY {
            return Decomposition {
                translate: self.get_translate(),
                rotate: [0.0; 3],
                skew: [0.0; 3],
                scale: [0.0; 3],
            };
        }

        let mut q1 = Matrix::IDENTITY;
        q1.0[0] = 1.0 - mult * v[0] * v[0];
        q1.0[5] = 1.0 - mult * v[1] * v[1];
        q1.0[10] = 1.0 - mult * v[2] * v[2];
        q1.0[1] = -mult * v[0] * v[1];
        q1.0[2] = -mult * v[0] * v[2];
        q1.0[6] = -mult * v[1] * v[2];
        q1.0[4] = q1.0[1];
        q1.0[8] = q1.0[2];
        q1.0[9] = q1.0[6];

        let mq1 = q1.multiply(self);

        let x2 = [mq1.0[5], mq1.0[6]];
        let x2_norm = norm_squared(&x2).sqrt();
        let v2 = [x2[0] + sign(x2[0]) * x2_norm, x2[1]];
        let mult2 = 2.0 / norm_squared(&v2);

        let mut q2 = Matrix::IDENTITY;
        q2.0[5] = 1.0 - mult2 * v2[0] * v2[0];
        q2.0[10] = 1.0 - mult2 * v2[1] * v2[1];
        q2.0[6] = -mult2 * v2[0] * v2[1];
        q2.0[9] = q2.0[6];

        let mut q = q2.multiply(&q1);
        let mut r = q.multiply(self);

        // Force a positive diagonal on R; the flips move into Q.
        let remover = Matrix::scale(
            if r.0[0] < 0.0 { -1.0 } else { 1.0 },
            if r.0[5] < 0.0 { -1.0 } else { 1.0 },
            if r.0[10] < 0.0 { -1.0 } else { 1.0 },
        );
        r = r.multiply(&remover);
        q = remover.multiply(&q);
        let q = &q.0;

        let mut rotate = [
            (-q[6]).atan2(q[10]),
            q[2].asin(),
            (-q[1]).atan2(q[0]),
        ];
        if rotate[0] == 0.0 || rotate[0].is_nan() {
            rotate[0] = 0.0;
            rotate[2] = q[4].atan2(q[5]);
        }

        let scale = [r.0[0], r.0[5], r.0[10]];
        let skew = [
            r.0[9].atan2(scale[2]),
            r.0[8].atan2(scale[2]),
            r.0[4].atan2(scale[0]),
        ];

        if rotate[0].abs() + rotate[2].abs() > 1.5 * PI {
            rotate[1] = PI - rotate[1];
            if rotate[1] > PI {
                rotate[1] -= 2.0 * PI;
            }
            if rotate[1] < -PI {
                rotate[1] += 2.0 * PI;
            }
            rotate[0] += if rotate[0] < 0.0 { PI } else { -PI };
            rotate[2] += if rotate[2] < 0.0 { PI } else { -PI };
        }

        Decomposition {
            translate: self.get_translate(),
            rotate,
            skew,
            scale,
        }
    }

    /// Inverse of [`interpret`](Self::interpret): `rotate * skew * scale`, then translate.
    pub fn build(spec: &Decomposition) -> Self {
        let [sx, sy, sz] = spec.scale;
        let [kx, ky, kz] = spec.skew;
        let [rx, ry, rz] = spec.rotate;
        Self::rotate(rx, ry, rz)
            .multiply(&Self::skew(kx, ky, kz))
            .multiply(&Self::scale(sx, sy, sz))
            .then_move(spec.translate)
    }

    /// Blends two transforms by decomposing both and interpolating each component.
    pub fn average(m1: &Self, m2: &Self, t: f64) -> Self {
        let a = m1.interpret();
        let b = m2.interpret();
        let mix = |x: [f64; 3], y: [f64; 3]| -> [f64; 3] {
            [
                (1.0 - t) * x[0] + t * y[0],
                (1.0 - t) * x[1] + t * y[1],
                (1.0 - t) * x[2] + t * y[2],
            ]
        };
        Self::build(&Decomposition {
            translate: mix(a.translate, b.translate),
            rotate: mix(a.rotate, b.rotate),
            skew: mix(a.skew, b.skew),
            scale: mix(a.scale, b.scale),
        })
    }
}

/// Wraps Euler angles into canonical ranges.
///
/// An x rotation of exactly ±90° is ambiguous with z; it is flipped first. Afterwards x lies
/// in `[-π/2, π/2]` and y, z lie in `[-π, π)`.
pub fn normalize_rotation(rotation: [f64; 3]) -> [f64; 3] {
    let mut r = rotation;
    let half = PI * 0.5;

    if r[0] == half || r[0] == -half {
        r[0] = -r[0];
        r[1] = PI - r[1];
        r[2] -= PI;
    }
    if r[0] > half {
        r[0] -= PI;
        r[1] = PI - r[1];
        r[2] -= PI;
    }
    if r[0] < -half {
        r[0] += PI;
        r[1] = -PI - r[1];
        r[2] -= PI;
    }
    for angle in r.iter_mut().skip(1) {
        while *angle < -PI {
            *angle += 2.0 * PI;
        }
        while *angle >= PI {
            *angle -= 2.0 * PI;
        }
    }
    r
}

#[cfg(test)]
#[path = "../../tests/unit/transform/decompose.rs"]
mod tests;
