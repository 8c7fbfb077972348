//! Top-level pipeline: source thread → deposit buffer → publish thread.
//!
//! ```text
//!   FrameSource ──deliver()──▶ DepositBuffer ──drain every period──▶ Publisher
//!   (own thread)               (one mutex)                           (own thread)
//! ```
//!
//! [`Splash::run`] blocks the caller until the source ends or the
//! `running` flag is cleared, then shuts down in order: close the buffer,
//! join the source, final drain, join the publisher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gripe_frame::{FrameEncoder, MessageBuilder, SpatialTransform};

use crate::buffer::DepositBuffer;
use crate::calibrate::calibrate_from_paths;
use crate::config::{SinkKind, SourceKind, SplashConfig};
use crate::error::{SplashError, SplashResult};
use crate::publisher::{check_pool_name, PoolFilePublisher, Publisher, StdoutPublisher};
use crate::scheduler::{PublishScheduler, PublishStats};
use crate::source::{spawn_frame_source, FrameSink, FrameSource, ReplayFrameSource, SimFrameSource};

/// How often the supervising thread checks for shutdown.
const SUPERVISE_INTERVAL: Duration = Duration::from_millis(20);

// ════════════════════════════════════════════════════════════════════════════
// SplashReport
// ════════════════════════════════════════════════════════════════════════════

/// What happened during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplashReport {
    pub publish:      PublishStats,
    /// Frames that arrived after shutdown began.
    pub discarded:    u64,
    /// The source ended by losing its device rather than cleanly.
    pub disconnected: bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Splash
// ════════════════════════════════════════════════════════════════════════════

/// A calibrated pipeline, ready to run against any source and publisher.
#[derive(Debug, Clone)]
pub struct Splash {
    transform:   SpatialTransform,
    origin_name: String,
    pool:        String,
    period:      Duration,
}

impl Splash {
    pub fn new(
        transform:   SpatialTransform,
        origin_name: impl Into<String>,
        pool:        impl Into<String>,
        period:      Duration,
    ) -> Self {
        Splash {
            transform,
            origin_name: origin_name.into(),
            pool:        pool.into(),
            period,
        }
    }

    /// Calibrate from the configured files.  Fails with
    /// `ConfigurationMissing` when neither yields a placement.
    pub fn from_config(cfg: &SplashConfig) -> SplashResult<Self> {
        let (transform, used) = calibrate_from_paths(cfg.calibration.as_deref(), &cfg.screen)?;
        tracing::info!(path = %used.display(), "calibration loaded");
        Ok(Splash::new(transform, cfg.origin_name.clone(), cfg.pool.clone(), cfg.period))
    }

    pub fn transform(&self) -> &SpatialTransform {
        &self.transform
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    /// Run until `source` ends or `running` goes false.
    ///
    /// A source that reports `SourceDisconnected` is not an error: the run
    /// winds down normally and everything already queued is published.
    /// Any other source error is returned after the final drain.
    pub fn run<S, P>(&self, source: S, publisher: P, running: &AtomicBool) -> SplashResult<SplashReport>
    where
        S: FrameSource,
        P: Publisher + 'static,
    {
        let buffer    = Arc::new(DepositBuffer::new());
        let scheduler = PublishScheduler::spawn(Arc::clone(&buffer), publisher, self.pool.clone(), self.period)?;

        let sink = FrameSink::new(
            FrameEncoder::new(self.transform),
            MessageBuilder::new(self.origin_name.clone()),
            Arc::clone(&buffer),
        );
        let handle = spawn_frame_source(source, sink)?;
        tracing::info!(pool = %self.pool, origin = %self.origin_name, "splash running");

        while running.load(Ordering::Acquire) && !handle.is_finished() {
            thread::sleep(SUPERVISE_INTERVAL);
        }

        // ── orderly shutdown ─────────────────────────────────────────────
        buffer.begin_shutdown();
        let outcome = match handle.join() {
            Ok(result) => result,
            Err(_) => Err(SplashError::SourceDisconnected("frame source panicked".to_string())),
        };
        let publish = scheduler.stop();

        let mut report = SplashReport { publish, discarded: buffer.discarded(), disconnected: false };
        match outcome {
            Ok(()) => {}
            Err(SplashError::SourceDisconnected(reason)) => {
                tracing::warn!(reason = %reason, "frame source lost");
                report.disconnected = true;
            }
            Err(e) => return Err(e),
        }

        tracing::info!(
            published = report.publish.published,
            failed    = report.publish.failed,
            discarded = report.discarded,
            "splash stopped"
        );
        Ok(report)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run: configuration to running pipeline
// ════════════════════════════════════════════════════════════════════════════

/// Build the publisher and source `cfg` asks for and run until done.
pub fn run(cfg: &SplashConfig, running: &AtomicBool) -> SplashResult<SplashReport> {
    let splash    = Splash::from_config(cfg)?;
    let publisher = build_publisher(cfg)?;
    let source    = build_source(&cfg.source)?;
    splash.run(source, publisher, running)
}

fn build_publisher(cfg: &SplashConfig) -> SplashResult<Box<dyn Publisher>> {
    let publisher: Box<dyn Publisher> = match cfg.sink {
        SinkKind::PoolFile => {
            check_pool_name(&cfg.pool)?;
            Box::new(PoolFilePublisher::new(&cfg.pool_dir)?)
        }
        SinkKind::Stdout   => Box::new(StdoutPublisher),
    };
    Ok(publisher)
}

fn build_source(kind: &SourceKind) -> SplashResult<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match kind {
        SourceKind::Sim          => Box::new(SimFrameSource::default()),
        SourceKind::Replay(path) => Box::new(ReplayFrameSource { path: path.clone(), paced: true }),
        SourceKind::Leap         => leap_source()?,
    };
    Ok(source)
}

#[cfg(feature = "leap")]
fn leap_source() -> SplashResult<Box<dyn FrameSource>> {
    Ok(Box::new(crate::source::LeapFrameSource))
}

#[cfg(not(feature = "leap"))]
fn leap_source() -> SplashResult<Box<dyn FrameSource>> {
    Err(SplashError::SourceUnavailable(
        "built without LeapMotion support; rebuild with --features leap".to_string(),
    ))
}
