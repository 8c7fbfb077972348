//! Frame sources — LeapMotion hardware, simulation, replay, and scripts.
//!
//! Every source runs on its own thread and pushes [`Frame`]s into a
//! [`FrameSink`].  The sink encodes each frame on that same thread and
//! queues the resulting message; it never blocks beyond the queue push.
//! Sources stop as soon as [`FrameSink::deliver`] returns `false` or
//! [`FrameSink::is_open`] turns false.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gripe_frame::{
    Digit, Finger, Frame, FrameEncoder, FrameMessage, Hand, MessageBuilder, Side, Vector3,
};

use crate::buffer::DepositBuffer;
use crate::error::{SplashError, SplashResult};

// ════════════════════════════════════════════════════════════════════════════
// FrameSink — the producer side of the pipeline
// ════════════════════════════════════════════════════════════════════════════

/// Encodes frames and queues them for publishing.  Cheap to clone.
#[derive(Clone)]
pub struct FrameSink {
    encoder: Arc<FrameEncoder>,
    builder: Arc<MessageBuilder>,
    buffer:  Arc<DepositBuffer<FrameMessage>>,
}

impl FrameSink {
    pub fn new(
        encoder: FrameEncoder,
        builder: MessageBuilder,
        buffer:  Arc<DepositBuffer<FrameMessage>>,
    ) -> Self {
        FrameSink {
            encoder: Arc::new(encoder),
            builder: Arc::new(builder),
            buffer,
        }
    }

    /// False once the pipeline has begun shutting down.
    pub fn is_open(&self) -> bool {
        self.buffer.is_accepting()
    }

    /// Encode `frame` and queue it.  Returns `false` if the pipeline is
    /// shutting down, in which case the frame is dropped.
    pub fn deliver(&self, frame: &Frame) -> bool {
        if !self.is_open() {
            return false;
        }
        if frame.hands.len() > 2 {
            tracing::debug!(hands = frame.hands.len(), time = frame.timestamp, "extra hands dropped");
        }
        let hands   = self.encoder.encode(frame);
        let message = self.builder.build(frame.timestamp, hands);
        self.buffer.enqueue(message)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can push [`Frame`]s into a [`FrameSink`].
///
/// `run` returns `Ok(())` when the source is exhausted or the sink closed,
/// and `Err(SourceDisconnected)` when the underlying device went away.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, sink: FrameSink) -> SplashResult<()>;
}

impl FrameSource for Box<dyn FrameSource> {
    fn run(self: Box<Self>, sink: FrameSink) -> SplashResult<()> {
        <dyn FrameSource as FrameSource>::run(*self, sink)
    }
}

/// Spawn a frame source on its own thread.
pub fn spawn_frame_source<S: FrameSource>(
    source: S,
    sink:   FrameSink,
) -> SplashResult<JoinHandle<SplashResult<()>>> {
    thread::Builder::new()
        .name("splash-source".to_string())
        .spawn(move || Box::new(source).run(sink))
        .map_err(|source| SplashError::Thread { name: "frame source", source })
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedFrameSource — fixed list of frames
// ════════════════════════════════════════════════════════════════════════════

/// How a [`ScriptedFrameSource`] finishes after its last frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptEnd {
    #[default]
    Clean,
    /// As if the device was unplugged.
    Disconnected,
    /// As if the device could not be opened.
    Unavailable,
}

/// Delivers a fixed list of frames, then ends.
pub struct ScriptedFrameSource {
    pub frames:   Vec<Frame>,
    /// Pause between frames.
    pub interval: Duration,
    pub end:      ScriptEnd,
}

impl ScriptedFrameSource {
    pub fn new(frames: Vec<Frame>) -> Self {
        ScriptedFrameSource { frames, interval: Duration::ZERO, end: ScriptEnd::Clean }
    }

    pub fn ending(mut self, end: ScriptEnd) -> Self {
        self.end = end;
        self
    }
}

impl FrameSource for ScriptedFrameSource {
    fn run(self: Box<Self>, sink: FrameSink) -> SplashResult<()> {
        for frame in &self.frames {
            if !sink.deliver(frame) {
                return Ok(());
            }
            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }
        match self.end {
            ScriptEnd::Clean        => Ok(()),
            ScriptEnd::Disconnected => Err(SplashError::SourceDisconnected("script ended".to_string())),
            ScriptEnd::Unavailable  => Err(SplashError::SourceUnavailable("scripted device missing".to_string())),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource — synthetic hand, no hardware needed
// ════════════════════════════════════════════════════════════════════════════

/// Synthetic right hand sweeping side to side above the sensor, cycling
/// once a second through open hand, fist, pointing and thumb-out poses.
pub struct SimFrameSource {
    pub rate_hz: u32,
    /// Stop after this many frames; run until shutdown when `None`.
    pub limit:   Option<u64>,
}

impl Default for SimFrameSource {
    fn default() -> Self {
        SimFrameSource { rate_hz: 60, limit: None }
    }
}

impl FrameSource for SimFrameSource {
    fn run(self: Box<Self>, sink: FrameSink) -> SplashResult<()> {
        let rate     = self.rate_hz.max(1);
        let interval = Duration::from_secs(1) / rate;
        let start    = Instant::now();
        let mut tick = 0u64;

        tracing::info!(rate_hz = rate, "simulated sensor started");
        while sink.is_open() && self.limit.map_or(true, |n| tick < n) {
            let mut frame = sim_frame(tick, rate);
            frame.timestamp = start.elapsed().as_micros() as i64;
            if !sink.deliver(&frame) {
                break;
            }
            tick += 1;
            thread::sleep(interval);
        }
        tracing::info!(frames = tick, "simulated sensor stopped");
        Ok(())
    }
}

/// Frame number `tick` of the simulation at `rate_hz`.
///
/// The timestamp is the nominal one for that tick; the running source
/// stamps frames with the real elapsed time instead.
pub fn sim_frame(tick: u64, rate_hz: u32) -> Frame {
    let rate  = rate_hz.max(1) as u64;
    let t     = tick as f64 / rate as f64;
    let sweep = (t * std::f64::consts::PI * 0.5).sin() * 120.0;

    // pose index → extended per digit, thumb first
    let poses: [[bool; 5]; 4] = [
        [true,  true,  true,  true,  true ],
        [false, false, false, false, false],
        [false, true,  false, false, false],
        [true,  false, false, false, false],
    ];
    let pose = poses[((tick / rate) % 4) as usize];

    let palm    = Vector3::new(sweep, 200.0, 0.0);
    let forward = Vector3::new(0.0, 0.0, -1.0);
    let down    = Vector3::new(0.0, -1.0, 0.0);

    let fingers = Digit::ALL
        .iter()
        .zip(pose)
        .map(|(&digit, extended)| {
            let spread = (digit.index() as f64 - 2.0) * 20.0;
            let (direction, reach) = match (digit, extended) {
                (Digit::Thumb, true) => (Vector3::new(-1.0, 0.0, -0.3), 60.0),
                (_, true)            => (forward, 90.0),
                (_, false)           => (down, 30.0),
            };
            Finger {
                digit,
                tip_position: palm + Vector3::new(spread, 0.0, 0.0) + direction.norm() * reach,
                direction,
                extended,
            }
        })
        .collect();

    Frame {
        timestamp: (tick * 1_000_000 / rate) as i64,
        hands: vec![Hand {
            side:          Side::Right,
            confidence:    0.9,
            palm_position: palm,
            direction:     forward,
            palm_normal:   down,
            fingers,
        }],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplayFrameSource — JSON-lines recording
// ════════════════════════════════════════════════════════════════════════════

/// Replays a file of JSON [`Frame`]s, one per line.
///
/// With `paced`, frames are spaced by their recorded timestamps (gaps are
/// capped at one second).  Lines that do not parse are logged and skipped.
pub struct ReplayFrameSource {
    pub path:  PathBuf,
    pub paced: bool,
}

/// Longest pause a replay will take between two frames.
const MAX_REPLAY_GAP: Duration = Duration::from_secs(1);

impl FrameSource for ReplayFrameSource {
    fn run(self: Box<Self>, sink: FrameSink) -> SplashResult<()> {
        let file   = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut last_ts: Option<i64> = None;
        let mut count = 0u64;

        tracing::info!(path = %self.path.display(), paced = self.paced, "replay started");
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: Frame = match serde_json::from_str(&line) {
                Ok(f) => f,
                Err(e) => {
                    tracing::warn!(line = lineno + 1, error = %e, "unreadable frame skipped");
                    continue;
                }
            };

            if self.paced {
                if let Some(prev) = last_ts {
                    let gap = Duration::from_micros(frame.timestamp.saturating_sub(prev).max(0) as u64);
                    thread::sleep(gap.min(MAX_REPLAY_GAP));
                }
                last_ts = Some(frame.timestamp);
            }

            if !sink.deliver(&frame) {
                break;
            }
            count += 1;
        }
        tracing::info!(frames = count, "replay finished");
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Every tracking event becomes one [`Frame`]; digits are numbered the way
/// LeapC numbers them (thumb first).
#[cfg(feature = "leap")]
pub struct LeapFrameSource;

/// Backs off a source that keeps failing to poll, doubling from
/// `POLL_BACKOFF_MIN` up to `POLL_BACKOFF_MAX`.  Any success resets it.
#[derive(Debug, Default)]
pub struct PollBackoff {
    failures: u32,
}

pub const POLL_BACKOFF_MIN: Duration = Duration::from_millis(10);
pub const POLL_BACKOFF_MAX: Duration = Duration::from_millis(500);

impl PollBackoff {
    /// Record a failure; returns how long to wait before polling again.
    pub fn failed(&mut self) -> Duration {
        let delay = POLL_BACKOFF_MIN.saturating_mul(1 << self.failures.min(6));
        self.failures = self.failures.saturating_add(1);
        delay.min(POLL_BACKOFF_MAX)
    }

    pub fn succeeded(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn run(self: Box<Self>, sink: FrameSink) -> SplashResult<()> {
        use leaprs::{Connection, ConnectionConfig, Event, HandType, PolicyFlags};

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| SplashError::SourceUnavailable(format!("LeapC connection: {:?}", e)))?;
        connection
            .open()
            .map_err(|e| SplashError::SourceUnavailable(format!("LeapMotion service: {:?}", e)))?;
        tracing::info!("LeapMotion connection open");

        // headless: without this the service only feeds the focused app
        if let Err(e) = connection.set_policy_flags(PolicyFlags::BACKGROUND_FRAMES, PolicyFlags::empty()) {
            tracing::warn!(error = ?e, "could not request background frames");
        }

        let mut backoff = PollBackoff::default();
        while sink.is_open() {
            let msg = match connection.poll(100) {
                Ok(m) => {
                    backoff.succeeded();
                    m
                }
                Err(e) => {
                    let wait = backoff.failed();
                    tracing::debug!(error = ?e, failures = backoff.failures(), "LeapC poll failed");
                    thread::sleep(wait);
                    continue;
                }
            };

            match msg.event() {
                Event::ConnectionLost(_) => {
                    return Err(SplashError::SourceDisconnected("LeapC service connection lost".to_string()));
                }
                Event::DeviceLost(_) => {
                    return Err(SplashError::SourceDisconnected("LeapMotion device unplugged".to_string()));
                }
                Event::Tracking(e) => {
                    let hands = e
                        .hands()
                        .map(|h| {
                            let palm = h.palm();
                            let fingers = h
                                .digits()
                                .enumerate()
                                .filter_map(|(i, d)| {
                                    let digit = Digit::from_index(i)?;
                                    let tip   = d.distal().next_joint();
                                    let base  = d.distal().prev_joint();
                                    Some(Finger {
                                        digit,
                                        tip_position: lv(tip.x, tip.y, tip.z),
                                        direction:    lv(tip.x - base.x, tip.y - base.y, tip.z - base.z),
                                        extended:     d.is_extended != 0,
                                    })
                                })
                                .collect();
                            let pos = palm.stabilized_position();
                            let dir = palm.direction();
                            let nrm = palm.normal();
                            Hand {
                                side: if h.hand_type() == HandType::Left { Side::Left } else { Side::Right },
                                confidence:    h.confidence as f64,
                                palm_position: lv(pos.x, pos.y, pos.z),
                                direction:     lv(dir.x, dir.y, dir.z),
                                palm_normal:   lv(nrm.x, nrm.y, nrm.z),
                                fingers,
                            }
                        })
                        .collect();

                    let frame = Frame { timestamp: e.info().timestamp, hands };
                    if !sink.deliver(&frame) {
                        break;
                    }
                }
                _ => {}
            }
        }
        tracing::info!("LeapMotion source detached");
        Ok(())
    }
}

#[cfg(feature = "leap")]
fn lv(x: f32, y: f32, z: f32) -> Vector3 {
    Vector3::new(x as f64, y as f64, z as f64)
}
