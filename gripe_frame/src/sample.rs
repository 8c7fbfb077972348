//! Raw tracking data as it arrives from a frame source, still in the
//! sensor's local frame.
//!
//! These are the only types a frame source has to produce.  Hardware
//! drivers, the simulator and replay files all funnel into [`Frame`].

use serde::{Deserialize, Serialize};

use crate::vector::Vector3;

// ════════════════════════════════════════════════════════════════════════════
// Side / Digit
// ════════════════════════════════════════════════════════════════════════════

/// Handedness as reported by the sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "LEFTISH", alias = "left")]
    Left,
    #[serde(rename = "RIGHTISH", alias = "right")]
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left  => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn is_left(self) -> bool {
        self == Side::Left
    }

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            Side::Left  => "LEFTISH",
            Side::Right => "RIGHTISH",
        }
    }
}

/// The five digits, numbered the way the sensor numbers them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Digit {
    Thumb  = 0,
    Index  = 1,
    Middle = 2,
    Ring   = 3,
    Pinky  = 4,
}

impl Digit {
    /// Thumb first, pinky last.
    pub const ALL: [Digit; 5] = [Digit::Thumb, Digit::Index, Digit::Middle, Digit::Ring, Digit::Pinky];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Option<Digit> {
        Digit::ALL.get(i).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Digit::Thumb  => "THUMB",
            Digit::Index  => "INDEX",
            Digit::Middle => "MIDDLE",
            Digit::Ring   => "RING",
            Digit::Pinky  => "PINKY",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger / Hand / Frame
// ════════════════════════════════════════════════════════════════════════════

/// One tracked finger, sensor-local.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Finger {
    pub digit:        Digit,
    /// Stabilized tip position.
    pub tip_position: Vector3,
    pub direction:    Vector3,
    pub extended:     bool,
}

/// One tracked hand, sensor-local.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub side:          Side,
    /// Tracking confidence, 0.0–1.0.
    pub confidence:    f64,
    /// Stabilized palm position.
    pub palm_position: Vector3,
    /// Palm → fingers direction.
    pub direction:     Vector3,
    pub palm_normal:   Vector3,
    #[serde(default)]
    pub fingers:       Vec<Finger>,
}

/// One sensor tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Sensor clock, microseconds.  Monotonic, not wall time.
    pub timestamp: i64,
    #[serde(default)]
    pub hands:     Vec<Hand>,
}

impl Frame {
    pub fn new(timestamp: i64, hands: Vec<Hand>) -> Self {
        Frame { timestamp, hands }
    }

    pub fn empty(timestamp: i64) -> Self {
        Frame { timestamp, hands: Vec::new() }
    }
}
