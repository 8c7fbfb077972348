//! Three-component `f64` vectors in either sensor-local or absolute space.
//!
//! On the wire a vector is a plain `[x, y, z]` array.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// An immutable `(x, y, z)` triple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vector3) -> Vector3 {
        Vector3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy.  The zero vector normalizes to itself so that a
    /// degenerate sensor reading never turns into `NaN`.
    pub fn norm(self) -> Vector3 {
        let len = self.length();
        if len == 0.0 {
            return self;
        }
        self * (1.0 / len)
    }

    /// Angle in radians between `self` and `other`, in `[0, π]`.
    ///
    /// Undefined (`NaN`) when either vector has zero length; every
    /// comparison against a threshold is then `false`, which is what the
    /// classifiers downstream rely on.
    pub fn angle_with(self, other: Vector3) -> f64 {
        let denom = self.length() * other.length();
        if denom == 0.0 {
            return f64::NAN;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }

    pub fn is_zero(self) -> bool {
        self == Vector3::ZERO
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Vector3::new(v[0], v[1], v[2])
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, o: Vector3) -> Vector3 {
        Vector3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, o: Vector3) -> Vector3 {
        Vector3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, s: f64) -> Vector3 {
        Vector3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Vector3> for f64 {
    type Output = Vector3;
    fn mul(self, v: Vector3) -> Vector3 {
        v * self
    }
}
