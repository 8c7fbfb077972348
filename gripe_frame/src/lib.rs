//! # gripe_frame
//!
//! Turns raw hand-tracking frames from a motion sensor into calibrated,
//! absolute-space **gripe frames**: a compact gesture code per hand plus
//! the geometry behind it, wrapped in a self-describing message.
//!
//! No I/O, no threads, no logging: just the encoding.  The `leap_splash`
//! crate supplies the sensor, the buffering and the channel.
//!
//! ## The gripe code
//!
//! ```text
//!   x x x | > : v x
//!   │ │ │ │ │   │ └─ aim compass
//!   │ │ │ │ │   └─── palm-normal compass
//!   │ │ │ │ └─────── thumb
//!   │ │ │ └───────── index
//!   │ │ └─────────── middle
//!   │ └───────────── ring
//!   └─────────────── pinky
//! ```
//!
//! | Glyph | Finger meaning | Compass meaning |
//! |---|---|---|
//! | `\|` | extended | |
//! | `-` | thumb extended along the back of the hand | lateral |
//! | `>` | thumb curled | |
//! | `x` | curled into the palm | anterior |
//! | `^` | curled, not into the palm | cranial |
//! | `+` | | medial |
//! | `v` | | caudal |
//! | `.` | | posterior |
//! | `_` | not observed | undefined |
//!
//! ## Quick start
//!
//! ```rust
//! use gripe_frame::{Frame, FrameEncoder, MessageBuilder, SpatialTransform, Vector3};
//!
//! let transform = SpatialTransform::new(
//!     Vector3::new(0.0, -200.0, -500.0), // where the sensor sits
//!     Vector3::new(0.0, 1.0, 0.0),       // the way it looks
//!     Vector3::new(1.0, 0.0, 0.0),       // its long edge
//! );
//! let encoder = FrameEncoder::new(transform);
//! let builder = MessageBuilder::new("leap-reader-v0.7.9");
//!
//! let frame = Frame::empty(1_000);
//! let msg   = builder.build(frame.timestamp, encoder.encode(&frame));
//! assert_eq!(msg.hands()[0].gripe, "_____:__");
//! ```

pub mod vector;
pub mod transform;
pub mod sample;
pub mod compass;
pub mod gesture;
pub mod hand;
pub mod frame;
pub mod message;

pub use compass::{compass_glyph, Compass};
pub use frame::FrameEncoder;
pub use gesture::{encode_fingers, FingerCode, FingerDescriptor, FingerSample};
pub use hand::{BackPlane, HandDescriptor, HandEncoder, MIN_CONFIDENCE, PLACEHOLDER_GRIPE};
pub use message::{FrameMessage, GripePayload, MessageBuilder, Origins, GRIPEFRAME_TAG};
pub use sample::{Digit, Finger, Frame, Hand, Side};
pub use transform::SpatialTransform;
pub use vector::Vector3;
