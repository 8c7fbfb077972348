//! Body-relative compass readings for a single absolute direction.
//!
//! The direction is compared against the six room axes and the closest one
//! is reported as a single glyph:
//!
//! | Axis | Right hand | Left hand | Meaning |
//! |---|---|---|---|
//! | `+X` | `+` | `-` | medial / lateral |
//! | `−X` | `-` | `+` | lateral / medial |
//! | `+Y` | `^` | `^` | cranial |
//! | `−Y` | `v` | `v` | caudal |
//! | `+Z` | `.` | `.` | posterior |
//! | `−Z` | `x` | `x` | anterior |
//!
//! The room is assumed to have norm `(0, 0, 1)` and over `(1, 0, 0)`, with
//! the person squarely facing the sensor.  Installations that are rotated
//! relative to the room will read skewed compass glyphs; the geometry in
//! the hand descriptor stays correct either way.

use crate::vector::Vector3;

/// Room axes in scan order.  Ties go to the earlier entry.
pub const ROOM_AXES: [Vector3; 6] = [
    Vector3::new( 1.0,  0.0,  0.0),
    Vector3::new(-1.0,  0.0,  0.0),
    Vector3::new( 0.0,  1.0,  0.0),
    Vector3::new( 0.0, -1.0,  0.0),
    Vector3::new( 0.0,  0.0,  1.0),
    Vector3::new( 0.0,  0.0, -1.0),
];

/// A compass glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compass {
    Medial,
    Lateral,
    Cranial,
    Caudal,
    Posterior,
    Anterior,
    /// Direction had no defined angle (zero length).
    Unknown,
}

impl Compass {
    /// Closest room axis to `dir`, read for a left or right hand.
    pub fn classify(dir: Vector3, leftish: bool) -> Compass {
        let mut min_angle = 4.0 * std::f64::consts::PI;
        let mut min_axis  = None;

        for (i, axis) in ROOM_AXES.iter().enumerate() {
            let angle = dir.angle_with(*axis);
            if angle < min_angle {
                min_angle = angle;
                min_axis  = Some(i);
            }
        }

        match min_axis {
            Some(0) => if leftish { Compass::Lateral } else { Compass::Medial },
            Some(1) => if leftish { Compass::Medial } else { Compass::Lateral },
            Some(2) => Compass::Cranial,
            Some(3) => Compass::Caudal,
            Some(4) => Compass::Posterior,
            Some(5) => Compass::Anterior,
            _       => Compass::Unknown,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Compass::Medial    => '+',
            Compass::Lateral   => '-',
            Compass::Cranial   => '^',
            Compass::Caudal    => 'v',
            Compass::Posterior => '.',
            Compass::Anterior  => 'x',
            Compass::Unknown   => '_',
        }
    }
}

/// Shorthand for `Compass::classify(dir, leftish).glyph()`.
pub fn compass_glyph(dir: Vector3, leftish: bool) -> char {
    Compass::classify(dir, leftish).glyph()
}
