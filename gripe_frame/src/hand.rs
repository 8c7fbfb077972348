//! One hand → one [`HandDescriptor`].
//!
//! The gripe string is `<fingers>:<palm><aim>`: the five finger glyphs
//! from [`encode_fingers`], then the compass reading of the palm normal and
//! of the aim.  A right hand pointing forward with its palm down, the other
//! fingers curled into the palm and the thumb tucked reads `xxx|>:vx`.

use serde::Serialize;

use crate::compass::compass_glyph;
use crate::gesture::{encode_fingers, FingerDescriptor, FingerSample};
use crate::sample::{Hand, Side};
use crate::transform::SpatialTransform;
use crate::vector::Vector3;

/// Hands tracked with less confidence than this get an occluded back plane.
pub const MIN_CONFIDENCE: f64 = 0.4;

/// Gripe of a hand that is not in view.
pub const PLACEHOLDER_GRIPE: &str = "_____:__";

/// Back-of-hand plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BackPlane {
    pub loc:      Vector3,
    /// Points out of the back of the hand.
    pub norm:     Vector3,
    /// Points from the pinky side toward the thumb side.
    pub over:     Vector3,
    pub occluded: bool,
}

/// Everything published about one hand.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HandDescriptor {
    pub gripe:   String,
    #[serde(rename = "type")]
    pub side:    Side,
    pub loc:     Vector3,
    pub aim:     Vector3,
    pub back:    BackPlane,
    /// Pinky first.
    pub fingers: [FingerDescriptor; 5],
}

impl HandDescriptor {
    /// Stand-in for a hand the sensor did not see.
    pub fn placeholder(side: Side) -> Self {
        HandDescriptor {
            gripe:   PLACEHOLDER_GRIPE.to_string(),
            side,
            loc:     Vector3::ZERO,
            aim:     Vector3::ZERO,
            back:    BackPlane {
                loc:      Vector3::ZERO,
                norm:     Vector3::ZERO,
                over:     Vector3::ZERO,
                occluded: true,
            },
            fingers: FingerDescriptor::all_unobserved(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.gripe == PLACEHOLDER_GRIPE && self.loc.is_zero()
    }

    /// The five finger glyphs.
    pub fn finger_code(&self) -> &str {
        self.gripe.split(':').next().unwrap_or("")
    }
}

/// Encodes observed hands through a calibrated transform.
#[derive(Clone, Copy, Debug)]
pub struct HandEncoder<'t> {
    transform: &'t SpatialTransform,
}

impl<'t> HandEncoder<'t> {
    pub fn new(transform: &'t SpatialTransform) -> Self {
        HandEncoder { transform }
    }

    pub fn encode(&self, hand: &Hand) -> HandDescriptor {
        let t       = self.transform;
        let leftish = hand.side.is_left();

        let loc   = t.transform_point(hand.palm_position);
        let aim   = t.transform_direction(hand.direction).norm();
        let pnorm = t.transform_direction(hand.palm_normal).norm();
        let norm  = -pnorm;
        let up    = if leftish { -norm.cross(aim) } else { norm.cross(aim) };

        let samples: Vec<FingerSample> = hand
            .fingers
            .iter()
            .map(|f| FingerSample {
                digit:        f.digit,
                tip_location: t.transform_point(f.tip_position),
                direction:    t.transform_direction(f.direction).norm(),
                extended:     f.extended,
                occluded:     false,
            })
            .collect();

        let fingers = encode_fingers(&samples, pnorm, up);
        let aim     = fingers.aim.unwrap_or(aim);

        let gripe = format!(
            "{}:{}{}",
            fingers.code,
            compass_glyph(pnorm, leftish),
            compass_glyph(aim, leftish),
        );

        HandDescriptor {
            gripe,
            side: hand.side,
            loc,
            aim,
            back: BackPlane {
                loc,
                norm,
                over:     up,
                occluded: hand.confidence < MIN_CONFIDENCE,
            },
            fingers: fingers.fingers,
        }
    }
}
