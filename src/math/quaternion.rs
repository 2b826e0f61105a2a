use super::float3::Float3;
use std::ops::Neg;

/// Above this dot product slerp degrades to a normalized lerp.
const SLERP_LERP_THRESHOLD: f32 = 0.95;

/// Unit quaternion for 3D rotations.
///
/// Every constructor normalizes, so the derived basis vectors are unit length
/// and mutually orthogonal. The basis follows the track convention: `left` is
/// the rotated +X axis, `up` the rotated +Y axis and `front` the rotated +Z
/// axis.
///
/// C-compatible layout for FFI.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Builds a normalized quaternion. A zero-length input yields identity.
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        let len = (x * x + y * y + z * z + w * w).sqrt();
        if len <= f32::EPSILON || !len.is_finite() {
            return Self::IDENTITY;
        }
        let f = 1.0 / len;
        Self {
            x: x * f,
            y: y * f,
            z: z * f,
            w: w * f,
        }
    }

    /// Rotation whose columns are the given orthonormal axes
    /// (`left` -> X, `up` -> Y, `front` -> Z).
    pub fn from_basis(left: Float3, up: Float3, front: Float3) -> Self {
        let (s, u, d) = (left, up, front);
        let trace = s.x + u.y + d.z;
        if trace > 0.0 {
            Self::new(u.z - d.y, d.x - s.z, s.y - u.x, 1.0 + trace)
        } else if s.x > u.y && s.x > d.z {
            Self::new(1.0 + s.x - u.y - d.z, u.x + s.y, d.x + s.z, u.z - d.y)
        } else if u.y > d.z {
            Self::new(u.x + s.y, 1.0 + u.y - s.x - d.z, d.y + u.z, d.x - s.z)
        } else {
            Self::new(d.x + s.z, d.y + u.z, 1.0 + d.z - s.x - u.y, s.y - u.x)
        }
    }

    /// Look rotation: `front` maps onto `dir`, rolled so `up` stays as close
    /// to the requested up vector as possible.
    ///
    /// When `dir` is parallel to `up` the roll is undefined; the rotation is
    /// then built from `dir` alone. A zero `dir` yields a half turn around Y.
    pub fn from_look(dir: Float3, up: Float3) -> Self {
        let side = up.cross(dir);
        if side.magnitude() > f32::EPSILON && dir.magnitude() > f32::EPSILON {
            let d = dir.normalize();
            let s = side.normalize();
            let u = d.cross(s);
            return Self::from_basis(s, u, d);
        }

        let dir_len = dir.magnitude();
        let (x, y, z, w) = (-dir.y, dir.x, 0.0, dir.z + dir_len);
        if (x * x + y * y + z * z + w * w).sqrt() > f32::EPSILON {
            Self::new(x, y, z, w)
        } else {
            Self::new(0.0, 1.0, 0.0, 0.0)
        }
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    pub fn front(self) -> Float3 {
        Float3::new(
            2.0 * (self.x * self.z + self.y * self.w),
            2.0 * (self.y * self.z - self.x * self.w),
            1.0 + 2.0 * (-self.x * self.x - self.y * self.y),
        )
    }

    pub fn left(self) -> Float3 {
        Float3::new(
            1.0 + 2.0 * (-self.y * self.y - self.z * self.z),
            2.0 * (self.x * self.y + self.z * self.w),
            2.0 * (self.x * self.z - self.y * self.w),
        )
    }

    pub fn up(self) -> Float3 {
        Float3::new(
            2.0 * (self.x * self.y - self.z * self.w),
            1.0 + 2.0 * (-self.x * self.x - self.z * self.z),
            2.0 * (self.y * self.z + self.x * self.w),
        )
    }

    fn weighted_sum(q0: Self, q1: Self, t0: f32, t1: f32) -> Self {
        Self::new(
            t0 * q0.x + t1 * q1.x,
            t0 * q0.y + t1 * q1.y,
            t0 * q0.z + t1 * q1.z,
            t0 * q0.w + t1 * q1.w,
        )
    }

    /// Spherical interpolation along the shorter arc, `t = 0` gives `q0`.
    pub fn slerp(q0: Self, q1: Self, t: f32) -> Self {
        let mut dot = q0.dot(q1);
        let mut qs = q1;
        if dot < 0.0 {
            dot = -dot;
            qs = -qs;
        }

        if dot >= SLERP_LERP_THRESHOLD {
            return Self::weighted_sum(q0, qs, 1.0 - t, t);
        }

        let angle = dot.acos();
        let inv_sin = 1.0 / angle.sin();
        let w0 = inv_sin * (angle * (1.0 - t)).sin();
        let w1 = inv_sin * (angle * t).sin();
        Self::weighted_sum(q0, qs, w0, w1)
    }
}

impl Neg for Quaternion {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: -self.w,
        }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}
