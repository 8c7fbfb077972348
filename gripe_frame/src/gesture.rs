//! Finger half of the gripe code.
//!
//! Each present digit contributes one glyph, written pinky-first:
//!
//! ```text
//!   index:   0      1     2       3      4
//!   digit:   PINKY  RING  MIDDLE  INDEX  THUMB
//! ```
//!
//! | State | Thumb | Other digits |
//! |---|---|---|
//! | extended | `-` if within 0.3π of `up`, else `\|` | `\|` |
//! | curled | `>` | `x` if within π/4 of the palm normal, else `^` |
//!
//! Digits the sensor did not report stay `_` and are marked occluded; a
//! reported digit carries its sample's `occluded` flag.  An extended index
//! finger also dictates the hand's aim.

use std::f64::consts::PI;

use serde::Serialize;

use crate::sample::Digit;
use crate::vector::Vector3;

/// Extended thumb closer than this to `up` reads as `-`.
pub const THUMB_ALONG_UP_ANGLE: f64 = 0.3 * PI;

/// Curled finger closer than this to the palm normal reads as `x`.
pub const CURL_INTO_PALM_ANGLE: f64 = PI / 4.0;

/// Glyph for a digit that was not observed.
pub const UNOBSERVED: char = '_';

// ════════════════════════════════════════════════════════════════════════════
// FingerSample / FingerDescriptor
// ════════════════════════════════════════════════════════════════════════════

/// A finger already moved into absolute space.  Lives for one encoding pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FingerSample {
    pub digit:        Digit,
    pub tip_location: Vector3,
    /// Unit length (or zero if the sensor gave a zero direction).
    pub direction:    Vector3,
    pub extended:     bool,
    /// Copied onto the finger's descriptor.
    pub occluded:     bool,
}

/// Per-finger record in a hand descriptor.
///
/// `norm` and `over` are part of the wire format but nothing fills them;
/// they are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FingerDescriptor {
    #[serde(rename = "type")]
    pub digit:    Digit,
    pub loc:      Vector3,
    pub norm:     Vector3,
    pub over:     Vector3,
    pub occluded: bool,
}

impl FingerDescriptor {
    /// A digit with no data this frame.
    pub fn unobserved(digit: Digit) -> Self {
        FingerDescriptor {
            digit,
            loc:      Vector3::ZERO,
            norm:     Vector3::ZERO,
            over:     Vector3::ZERO,
            occluded: true,
        }
    }

    /// All five digits unobserved, pinky first.
    pub fn all_unobserved() -> [FingerDescriptor; 5] {
        pinky_first(Digit::ALL.map(FingerDescriptor::unobserved))
    }
}

/// Reorder a thumb-first array so the pinky comes first.
fn pinky_first<T: Copy>(thumb_first: [T; 5]) -> [T; 5] {
    let [t, i, m, r, p] = thumb_first;
    [p, r, m, i, t]
}

// ════════════════════════════════════════════════════════════════════════════
// FingerCode
// ════════════════════════════════════════════════════════════════════════════

/// Result of encoding one hand's fingers.
#[derive(Clone, Debug, PartialEq)]
pub struct FingerCode {
    /// Five glyphs, pinky first.
    pub code:    String,
    /// Pinky first.
    pub fingers: [FingerDescriptor; 5],
    /// Normalized direction of an extended index finger, if any.
    pub aim:     Option<Vector3>,
}

/// Classify a hand's fingers.
///
/// `palm_normal` is the hand's (unnegated) palm normal and `up` the
/// back-of-hand over vector, both absolute.  Fingers are visited in reverse
/// of the order given, so when a digit appears twice the earlier entry has
/// the last word.
pub fn encode_fingers(fingers: &[FingerSample], palm_normal: Vector3, up: Vector3) -> FingerCode {
    let mut glyphs      = [UNOBSERVED; 5];
    let mut descriptors = Digit::ALL.map(FingerDescriptor::unobserved);
    let mut aim         = None;

    for f in fingers.iter().rev() {
        let t = f.digit.index();

        glyphs[4 - t] = match (f.digit, f.extended) {
            (Digit::Thumb, true) => {
                if f.direction.angle_with(up) < THUMB_ALONG_UP_ANGLE { '-' } else { '|' }
            }
            (Digit::Index, true) => {
                aim = Some(f.direction.norm());
                '|'
            }
            (_, true) => '|',
            (Digit::Thumb, false) => '>',
            (_, false) => {
                if f.direction.angle_with(palm_normal) < CURL_INTO_PALM_ANGLE { 'x' } else { '^' }
            }
        };

        let d = &mut descriptors[t];
        d.loc      = f.tip_location;
        d.occluded = f.occluded;
    }

    FingerCode {
        code:    glyphs.iter().collect(),
        fingers: pinky_first(descriptors),
        aim,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP:     Vector3 = Vector3::new(0.0, 0.0, -1.0);
    const NORMAL: Vector3 = Vector3::new(0.0, -1.0, 0.0);

    fn finger(digit: Digit, direction: Vector3, extended: bool) -> FingerSample {
        FingerSample {
            digit,
            tip_location: Vector3::new(digit.index() as f64, 1.0, 2.0),
            direction,
            extended,
            occluded: false,
        }
    }

    #[test]
    fn no_fingers_is_all_underscores() {
        let out = encode_fingers(&[], NORMAL, UP);
        assert_eq!(out.code, "_____");
        assert!(out.fingers.iter().all(|f| f.occluded));
        assert_eq!(out.aim, None);
    }

    #[test]
    fn pointing_index_with_tucked_thumb() {
        let fingers = [
            finger(Digit::Thumb, NORMAL, false),
            finger(Digit::Index, UP, true),
        ];
        let out = encode_fingers(&fingers, NORMAL, UP);
        assert_eq!(out.code, "___|>");
        assert_eq!(out.aim, Some(UP));
    }

    #[test]
    fn thumb_along_up_reads_as_dash() {
        let out = encode_fingers(&[finger(Digit::Thumb, UP, true)], NORMAL, UP);
        assert_eq!(out.code, "____-");
        let out = encode_fingers(&[finger(Digit::Thumb, -UP, true)], NORMAL, UP);
        assert_eq!(out.code, "____|");
    }

    #[test]
    fn curled_fingers_split_on_palm_normal() {
        let fingers = [
            finger(Digit::Middle, NORMAL, false),
            finger(Digit::Ring, -NORMAL, false),
            finger(Digit::Pinky, Vector3::new(0.0, -1.0, -0.5), false),
        ];
        let out = encode_fingers(&fingers, NORMAL, UP);
        // pinky ~27° from the normal → x, ring opposite → ^, middle along → x
        assert_eq!(out.code, "x^x__");
    }

    #[test]
    fn open_hand() {
        let fingers: Vec<_> = Digit::ALL
            .iter()
            .map(|d| finger(*d, Vector3::new(0.0, 0.0, -3.0), true))
            .collect();
        let out = encode_fingers(&fingers, NORMAL, UP);
        assert_eq!(out.code, "||||-");
        assert_eq!(out.aim, Some(UP));
    }

    #[test]
    fn descriptors_are_pinky_first_and_observed() {
        let fingers: Vec<_> = Digit::ALL.iter().map(|d| finger(*d, UP, false)).collect();
        let out = encode_fingers(&fingers, NORMAL, UP);
        let order: Vec<_> = out.fingers.iter().map(|f| f.digit).collect();
        assert_eq!(
            order,
            [Digit::Pinky, Digit::Ring, Digit::Middle, Digit::Index, Digit::Thumb]
        );
        assert!(out.fingers.iter().all(|f| !f.occluded));
        assert_eq!(out.fingers[0].loc, Vector3::new(4.0, 1.0, 2.0));
        assert!(out.fingers.iter().all(|f| f.norm.is_zero() && f.over.is_zero()));
    }

    #[test]
    fn sample_occlusion_reaches_the_descriptor() {
        let mut hidden = finger(Digit::Ring, UP, true);
        hidden.occluded = true;
        let fingers = [hidden, finger(Digit::Index, UP, true)];
        let out = encode_fingers(&fingers, NORMAL, UP);

        // still encoded, just flagged
        assert_eq!(out.code, "_|_|_");
        assert!(out.fingers[1].occluded);
        assert_eq!(out.fingers[1].loc, Vector3::new(3.0, 1.0, 2.0));
        assert!(!out.fingers[3].occluded);
    }

    #[test]
    fn curled_index_does_not_touch_aim() {
        let out = encode_fingers(&[finger(Digit::Index, UP, false)], NORMAL, UP);
        assert_eq!(out.aim, None);
    }

    #[test]
    fn zero_direction_still_encodes() {
        let fingers = [
            finger(Digit::Thumb, Vector3::ZERO, true),
            finger(Digit::Ring, Vector3::ZERO, false),
        ];
        let out = encode_fingers(&fingers, NORMAL, UP);
        assert_eq!(out.code, "_^__|");
    }
}
