//! Sensor-local → absolute space.
//!
//! The sensor reports everything relative to itself: `+Y` out of the
//! device, `+X` along its long edge.  A [`SpatialTransform`] places that
//! frame in the room by giving the device's absolute `origin`, the
//! absolute direction its `+Y` points (`normal`) and the absolute direction
//! of its `+X` (`over`).  The third basis vector is `over × normal`.
//!
//! `normal` and `over` are expected to be orthonormal already; nothing here
//! re-orthogonalizes them.

use crate::vector::Vector3;

/// Calibrated placement of the sensor in absolute space.
///
/// Built once at calibration time and never mutated afterwards; a new
/// calibration produces a new value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialTransform {
    origin: Vector3,
    normal: Vector3,
    over:   Vector3,
    /// Columns of the rotation: `[over, normal, over × normal]`.
    basis:  [Vector3; 3],
}

impl SpatialTransform {
    pub fn new(origin: Vector3, normal: Vector3, over: Vector3) -> Self {
        SpatialTransform {
            origin,
            normal,
            over,
            basis: [over, normal, over.cross(normal)],
        }
    }

    /// Sensor frame equals absolute frame.
    pub fn identity() -> Self {
        SpatialTransform::new(
            Vector3::ZERO,
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
        )
    }

    pub fn origin(&self) -> Vector3 { self.origin }
    pub fn normal(&self) -> Vector3 { self.normal }
    pub fn over(&self)   -> Vector3 { self.over }
    pub fn basis(&self)  -> [Vector3; 3] { self.basis }

    /// Rotate a sensor-local direction into absolute space (no translation).
    pub fn transform_direction(&self, v: Vector3) -> Vector3 {
        let [bx, by, bz] = self.basis;
        bx * v.x + by * v.y + bz * v.z
    }

    /// Map a sensor-local point to its absolute location.
    pub fn transform_point(&self, v: Vector3) -> Vector3 {
        self.origin + self.transform_direction(v)
    }
}

impl Default for SpatialTransform {
    fn default() -> Self {
        SpatialTransform::identity()
    }
}
