//! Whole frame → ordered pair of hand descriptors.
//!
//! Consumers depend on the exact order, which depends on how many hands
//! were seen:
//!
//! | Hands seen | Output |
//! |---|---|
//! | 0 | `[placeholder(RIGHT), placeholder(LEFT)]` |
//! | 1 | `[observed, placeholder(opposite side)]` |
//! | 2 | both, in sensor order |
//!
//! A sensor occasionally reports a third hand for a frame or two; only the
//! first two are kept.

use crate::hand::{HandDescriptor, HandEncoder};
use crate::sample::{Frame, Hand, Side};
use crate::transform::SpatialTransform;

/// Owns the calibrated transform and encodes frames through it.
#[derive(Clone, Debug, Default)]
pub struct FrameEncoder {
    transform: SpatialTransform,
}

impl FrameEncoder {
    pub fn new(transform: SpatialTransform) -> Self {
        FrameEncoder { transform }
    }

    pub fn transform(&self) -> &SpatialTransform {
        &self.transform
    }

    pub fn encode(&self, frame: &Frame) -> [HandDescriptor; 2] {
        self.encode_hands(&frame.hands)
    }

    pub fn encode_hands(&self, hands: &[Hand]) -> [HandDescriptor; 2] {
        let enc = HandEncoder::new(&self.transform);
        match hands {
            [] => [
                HandDescriptor::placeholder(Side::Right),
                HandDescriptor::placeholder(Side::Left),
            ],
            [only] => [
                enc.encode(only),
                HandDescriptor::placeholder(only.side.opposite()),
            ],
            [first, second, ..] => [enc.encode(first), enc.encode(second)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector3;

    fn hand(side: Side, x: f64) -> Hand {
        Hand {
            side,
            confidence:    1.0,
            palm_position: Vector3::new(x, 150.0, 0.0),
            direction:     Vector3::new(0.0, 0.0, -1.0),
            palm_normal:   Vector3::new(0.0, -1.0, 0.0),
            fingers:       Vec::new(),
        }
    }

    #[test]
    fn no_hands_is_right_then_left_placeholder() {
        let out = FrameEncoder::default().encode(&Frame::empty(7));
        assert_eq!(out[0], HandDescriptor::placeholder(Side::Right));
        assert_eq!(out[1], HandDescriptor::placeholder(Side::Left));
        for d in &out {
            assert!(d.back.occluded);
            assert!(d.fingers.iter().all(|f| f.occluded));
        }
    }

    #[test]
    fn single_hand_comes_first_whatever_its_side() {
        let enc = FrameEncoder::default();
        for side in [Side::Left, Side::Right] {
            let out = enc.encode_hands(&[hand(side, 5.0)]);
            assert_eq!(out[0].side, side);
            assert!(!out[0].is_placeholder());
            assert_eq!(out[1], HandDescriptor::placeholder(side.opposite()));
        }
    }

    #[test]
    fn two_hands_keep_sensor_order() {
        let enc = FrameEncoder::default();
        let out = enc.encode_hands(&[hand(Side::Left, -1.0), hand(Side::Right, 1.0)]);
        assert_eq!(out[0].side, Side::Left);
        assert_eq!(out[1].side, Side::Right);

        let out = enc.encode_hands(&[hand(Side::Right, 1.0), hand(Side::Left, -1.0)]);
        assert_eq!(out[0].side, Side::Right);
        assert_eq!(out[1].side, Side::Left);
    }

    #[test]
    fn extra_hands_are_dropped() {
        let enc = FrameEncoder::default();
        let out = enc.encode_hands(&[
            hand(Side::Right, 1.0),
            hand(Side::Right, 2.0),
            hand(Side::Left, 3.0),
        ]);
        assert_eq!(out[0].loc.x, 1.0);
        assert_eq!(out[1].loc.x, 2.0);
    }
}
