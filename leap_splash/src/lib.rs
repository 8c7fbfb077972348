//! # leap_splash
//!
//! Reads hand frames from a LeapMotion controller (or a simulation or a
//! recording), encodes each one as a calibrated gripe frame with
//! [`gripe_frame`], and deposits the result onto a named pool every 1/100 s.
//!
//! ## Threads
//!
//! | Thread | Owns | Does |
//! |---|---|---|
//! | `splash-source` | the [`FrameSource`](source::FrameSource) | encode + enqueue, never blocks on I/O |
//! | `splash-publish` | the [`Publisher`](publisher::Publisher) | drain the buffer, deposit in order |
//! | caller | the `running` flag | wait, then shut down in order |
//!
//! ## Feature flags
//!
//! * (default) — simulation and replay sources only.
//! * `leap` — real LeapMotion hardware via LeapC.
//!
//! ## Calibration
//!
//! The transform from sensor space to room space comes from a TOML file;
//! see [`calibrate`].  With no usable file the pipeline refuses to start.

pub mod error;
pub mod buffer;
pub mod publisher;
pub mod scheduler;
pub mod calibrate;
pub mod config;
pub mod logging;
pub mod source;
pub mod app;

pub use app::{run, Splash, SplashReport};
pub use config::{SinkKind, SourceKind, SplashConfig};
pub use error::{PublishError, SplashError, SplashResult};
