//! Rotation and vector math
//!
//! Conventions follow the host rig: Y is up, angles handed to the public
//! constructors are in degrees, quaternions compose right-to-left
//! (`a * b` applies `b` first).

use std::ops::{Add, Mul, Sub};

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const UP: Vec3 = Vec3 {
        x: 0.0,
        y: 1.0,
        z: 0.0,
    };

    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Unit vector in the same direction, or zero for degenerate input
    pub fn normalized(&self) -> Vec3 {
        let len = self.length();
        if len < 1e-6 || !len.is_finite() {
            return Vec3::ZERO;
        }
        Vec3::new(self.x / len, self.y / len, self.z / len)
    }

    /// Shorten the vector to `max_length` if it is longer; non-finite input becomes zero
    pub fn clamp_length(&self, max_length: f32) -> Vec3 {
        if !self.is_finite() {
            return Vec3::ZERO;
        }
        let len = self.length();
        if len <= max_length || len == 0.0 {
            return *self;
        }
        let scale = max_length / len;
        Vec3::new(self.x * scale, self.y * scale, self.z * scale)
    }

    /// Linear interpolation
    pub fn lerp(&self, other: &Vec3, t: f32) -> Vec3 {
        Vec3 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    pub fn distance(&self, other: &Vec3) -> f32 {
        (*self - *other).length()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Rotation quaternion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// Components in `[w, x, y, z]` order
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.w, self.x, self.y, self.z]
    }

    #[inline]
    pub fn from_array(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// Rotation of `angle_deg` degrees around `axis`. A zero axis yields identity.
    pub fn from_axis_angle(angle_deg: f32, axis: Vec3) -> Self {
        let axis = axis.normalized();
        if axis == Vec3::ZERO || !angle_deg.is_finite() {
            return Self::IDENTITY;
        }
        let half = angle_deg.to_radians() * 0.5;
        let s = half.sin();
        Self::new(half.cos(), axis.x * s, axis.y * s, axis.z * s)
    }

    /// Yaw-only rotation around the up axis
    pub fn from_yaw(yaw_deg: f32) -> Self {
        Self::from_axis_angle(yaw_deg, Vec3::UP)
    }

    /// Yaw around up, then pitch around x, then roll around z (degrees)
    pub fn from_euler(yaw_deg: f32, pitch_deg: f32, roll_deg: f32) -> Self {
        Self::from_yaw(yaw_deg)
            * Self::from_axis_angle(pitch_deg, Vec3::new(1.0, 0.0, 0.0))
            * Self::from_axis_angle(roll_deg, Vec3::new(0.0, 0.0, 1.0))
    }

    #[inline]
    pub fn dot(&self, other: &Quat) -> f32 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Unit quaternion in the same direction; degenerate input becomes identity
    pub fn normalize(&self) -> Quat {
        let len = self.norm();
        if len < 0.0001 || !len.is_finite() {
            return Quat::IDENTITY;
        }
        Quat {
            w: self.w / len,
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    pub fn conjugate(&self) -> Quat {
        Quat::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Angle between two rotations in radians, ignoring the double-cover sign
    pub fn angle_to(&self, other: &Quat) -> f32 {
        let dot = self.normalize().dot(&other.normalize()).abs().min(1.0);
        2.0 * dot.acos()
    }

    /// Spherical linear interpolation
    pub fn slerp(&self, other: &Quat, t: f32) -> Quat {
        let mut dot = self.dot(other);

        let other = if dot < 0.0 {
            dot = -dot;
            Quat {
                w: -other.w,
                x: -other.x,
                y: -other.y,
                z: -other.z,
            }
        } else {
            *other
        };

        if dot > 0.9995 {
            // Linear interpolation for very close quaternions
            let result = Quat {
                w: self.w + (other.w - self.w) * t,
                x: self.x + (other.x - self.x) * t,
                y: self.y + (other.y - self.y) * t,
                z: self.z + (other.z - self.z) * t,
            };
            return result.normalize();
        }

        let theta_0 = dot.acos();
        let theta = theta_0 * t;
        let sin_theta = theta.sin();
        let sin_theta_0 = theta_0.sin();

        let s0 = theta.cos() - dot * sin_theta / sin_theta_0;
        let s1 = sin_theta / sin_theta_0;

        Quat {
            w: self.w * s0 + other.w * s1,
            x: self.x * s0 + other.x * s1,
            y: self.y * s0 + other.y * s1,
            z: self.z * s0 + other.z * s1,
        }
    }
}

impl Mul for Quat {
    type Output = Quat;

    fn mul(self, rhs: Quat) -> Quat {
        Quat {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_vec3_clamp_length() {
        let v = Vec3::new(3.0, 4.0, 0.0);
        let clamped = v.clamp_length(1.0);
        assert!(approx(clamped.length(), 1.0));
        assert!(approx(clamped.x, 0.6));

        let short = Vec3::new(0.1, 0.0, 0.0);
        assert_eq!(short.clamp_length(1.0), short);

        let bad = Vec3::new(f32::NAN, 0.0, 0.0);
        assert_eq!(bad.clamp_length(1.0), Vec3::ZERO);
    }

    #[test]
    fn test_axis_angle() {
        let q = Quat::from_axis_angle(90.0, Vec3::UP);
        assert!(approx(q.w, (45.0f32).to_radians().cos()));
        assert!(approx(q.y, (45.0f32).to_radians().sin()));
        assert!(approx(q.norm(), 1.0));

        assert_eq!(Quat::from_axis_angle(30.0, Vec3::ZERO), Quat::IDENTITY);
    }

    #[test]
    fn test_euler_yaw_only() {
        let q = Quat::from_euler(70.0, 0.0, 0.0);
        assert!(q.angle_to(&Quat::from_yaw(70.0)) < 1e-4);
        assert!((Quat::from_euler(10.0, 20.0, 30.0).norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mul_composes_angles() {
        let a = Quat::from_yaw(30.0);
        let b = Quat::from_yaw(60.0);
        let c = a * b;
        assert!(c.angle_to(&Quat::from_yaw(90.0)) < 1e-3);
    }

    #[test]
    fn test_angle_to_ignores_sign() {
        let q = Quat::from_yaw(40.0);
        let neg = Quat::new(-q.w, -q.x, -q.y, -q.z);
        assert!(q.angle_to(&neg) < 1e-3);
        assert!((Quat::IDENTITY.angle_to(&q) - 40f32.to_radians()).abs() < 1e-3);
    }

    #[test]
    fn test_slerp_endpoints_and_midpoint() {
        let a = Quat::IDENTITY;
        let b = Quat::from_yaw(90.0);

        assert!(a.slerp(&b, 0.0).angle_to(&a) < 1e-3);
        assert!(a.slerp(&b, 1.0).angle_to(&b) < 1e-3);
        assert!(a.slerp(&b, 0.5).angle_to(&Quat::from_yaw(45.0)) < 1e-3);
    }

    #[test]
    fn test_normalize_degenerate() {
        assert_eq!(Quat::new(0.0, 0.0, 0.0, 0.0).normalize(), Quat::IDENTITY);
        assert_eq!(
            Quat::new(f32::NAN, 0.0, 0.0, 0.0).normalize(),
            Quat::IDENTITY
        );
        let q = Quat::new(2.0, 0.0, 0.0, 0.0).normalize();
        assert_eq!(q, Quat::IDENTITY);
    }

    fn euler() -> impl proptest::strategy::Strategy<Value = Quat> {
        use proptest::strategy::Strategy;
        (-180.0f32..180.0, -89.0f32..89.0, -180.0f32..180.0)
            .prop_map(|(y, p, r)| Quat::from_euler(y, p, r))
    }

    proptest::proptest! {
        #[test]
        fn prop_slerp_stays_unit(a in euler(), b in euler(), t in 0.0f32..=1.0) {
            let q = a.slerp(&b, t);
            proptest::prop_assert!((q.norm() - 1.0).abs() < 1e-3, "norm {}", q.norm());
        }

        #[test]
        fn prop_normalize_is_unit(c in proptest::array::uniform4(-10.0f32..10.0)) {
            let q = Quat::from_array(c).normalize();
            proptest::prop_assert!((q.norm() - 1.0).abs() < 1e-4);
        }

        #[test]
        fn prop_angle_to_sign_agnostic(a in euler(), b in euler()) {
            let neg = Quat::new(-b.w, -b.x, -b.y, -b.z);
            proptest::prop_assert!((a.angle_to(&b) - a.angle_to(&neg)).abs() < 1e-5);
            proptest::prop_assert!(a.angle_to(&b) <= std::f32::consts::PI + 1e-5);
        }
    }
}
