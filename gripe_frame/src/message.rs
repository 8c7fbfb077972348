//! The outbound `gripeframe` message.
//!
//! ```json
//! { "tags": ["gripeframe"],
//!   "payload": { "origins": { "name": "leap-reader-v0.7.9", "clock": 1234 },
//!                "time": 1234,
//!                "hands": [ { "gripe": "_____:__", ... }, { ... } ] } }
//! ```

use serde::Serialize;

use crate::hand::HandDescriptor;

/// Tag carried by every message.
pub const GRIPEFRAME_TAG: &str = "gripeframe";

/// Who produced a message and on what clock.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Origins {
    pub name:  String,
    pub clock: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GripePayload {
    pub origins: Origins,
    /// Sensor clock, not wall time.
    pub time:    i64,
    pub hands:   [HandDescriptor; 2],
}

/// One encoded frame, ready to deposit.  Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameMessage {
    tags:    Vec<String>,
    payload: GripePayload,
}

impl FrameMessage {
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn payload(&self) -> &GripePayload {
        &self.payload
    }

    pub fn time(&self) -> i64 {
        self.payload.time
    }

    pub fn hands(&self) -> &[HandDescriptor; 2] {
        &self.payload.hands
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// `to_json` plus a trailing newline, for line-oriented channels.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        let mut s = serde_json::to_string(self)?;
        s.push('\n');
        Ok(s)
    }
}

/// Stamps encoded hands with an origin identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBuilder {
    origin_name: String,
}

impl MessageBuilder {
    pub fn new(origin_name: impl Into<String>) -> Self {
        MessageBuilder { origin_name: origin_name.into() }
    }

    pub fn origin_name(&self) -> &str {
        &self.origin_name
    }

    pub fn build(&self, time: i64, hands: [HandDescriptor; 2]) -> FrameMessage {
        FrameMessage {
            tags:    vec![GRIPEFRAME_TAG.to_string()],
            payload: GripePayload {
                origins: Origins { name: self.origin_name.clone(), clock: time },
                time,
                hands,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::HandEncoder;
    use crate::sample::{Digit, Finger, Hand, Side};
    use crate::transform::SpatialTransform;
    use crate::vector::Vector3;
    use serde_json::Value;

    fn placeholders() -> [HandDescriptor; 2] {
        [
            HandDescriptor::placeholder(Side::Right),
            HandDescriptor::placeholder(Side::Left),
        ]
    }

    #[test]
    fn build_stamps_time_and_origin() {
        let msg = MessageBuilder::new("leap-reader-v0.7.9").build(99, placeholders());
        assert_eq!(msg.tags(), ["gripeframe".to_string()]);
        assert_eq!(msg.time(), 99);
        assert_eq!(msg.payload().origins, Origins { name: "leap-reader-v0.7.9".into(), clock: 99 });
    }

    #[test]
    fn json_shape() {
        let msg = MessageBuilder::new("test").build(5, placeholders());
        let v: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();

        assert_eq!(v["tags"], serde_json::json!(["gripeframe"]));
        let p = &v["payload"];
        assert_eq!(p["origins"]["name"], "test");
        assert_eq!(p["origins"]["clock"], 5);
        assert_eq!(p["time"], 5);

        let hands = p["hands"].as_array().unwrap();
        assert_eq!(hands.len(), 2);
        let right = &hands[0];
        assert_eq!(right["gripe"], "_____:__");
        assert_eq!(right["type"], "RIGHTISH");
        assert_eq!(right["loc"], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(right["back"]["occluded"], true);
        assert_eq!(right["back"]["over"], serde_json::json!([0.0, 0.0, 0.0]));
        let fingers = right["fingers"].as_array().unwrap();
        assert_eq!(fingers.len(), 5);
        assert_eq!(fingers[0]["type"], "PINKY");
        assert_eq!(fingers[4]["type"], "THUMB");
        assert_eq!(fingers[2]["occluded"], true);
        assert_eq!(hands[1]["type"], "LEFTISH");
    }

    #[test]
    fn json_of_an_observed_hand() {
        let hand = Hand {
            side:          Side::Left,
            confidence:    0.9,
            palm_position: Vector3::new(10.0, 200.0, -5.0),
            direction:     Vector3::new(0.0, 0.0, -1.0),
            palm_normal:   Vector3::new(0.0, -1.0, 0.0),
            fingers: Digit::ALL
                .iter()
                .map(|&digit| Finger {
                    digit,
                    tip_position: Vector3::new(digit.index() as f64, 180.0, -40.0),
                    direction:    Vector3::new(0.0, -1.0, 0.0),
                    extended:     false,
                })
                .collect(),
        };
        let t = SpatialTransform::identity();
        let observed = HandEncoder::new(&t).encode(&hand);
        let msg = MessageBuilder::new("test").build(7, [observed, HandDescriptor::placeholder(Side::Right)]);
        let v: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();

        let left = &v["payload"]["hands"][0];
        assert_eq!(left["type"], "LEFTISH");
        assert_eq!(left["gripe"], "xxxx>:vx");
        assert_eq!(left["loc"], serde_json::json!([10.0, 200.0, -5.0]));
        assert_eq!(left["back"]["occluded"], false);
        assert_eq!(left["back"]["norm"], serde_json::json!([0.0, 1.0, 0.0]));

        let fingers = left["fingers"].as_array().unwrap();
        assert!(fingers.iter().all(|f| f["occluded"] == false));
        // pinky first: its tip was stamped with index 4
        assert_eq!(fingers[0]["loc"], serde_json::json!([4.0, 180.0, -40.0]));
        assert_eq!(fingers[4]["loc"], serde_json::json!([0.0, 180.0, -40.0]));

        assert_eq!(v["payload"]["hands"][1]["gripe"], "_____:__");
    }

    #[test]
    fn json_line_ends_with_newline() {
        let line = MessageBuilder::new("x").build(0, placeholders()).to_json_line().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
    }
}
