//! splash — LeapMotion hands to gripe frames on a pool.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use leap_splash::logging::init_logging;
use leap_splash::{run, SinkKind, SourceKind, SplashConfig, SplashError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    Sim,
    Replay,
    Leap,
}

/// Publish calibrated hand-tracking frames onto a pool at 100 Hz
#[derive(Parser, Debug)]
#[command(name = "splash", version, long_about = None)]
struct Args {
    /// Calibration file with a [leap] or [screens.main] section
    calibration: Option<PathBuf>,

    /// Screen description tried when no calibration file works
    #[arg(long)]
    screen: Option<PathBuf>,

    /// Pool to deposit onto (overrides LEAP_POOL)
    #[arg(long)]
    pool: Option<String>,

    /// Directory pool files are written to
    #[arg(long)]
    pool_dir: Option<PathBuf>,

    /// Write JSON lines to stdout instead of a pool file
    #[arg(long, default_value_t = false)]
    stdout: bool,

    /// Publish period in milliseconds
    #[arg(long)]
    period_ms: Option<u64>,

    /// Frame source (default: leap with the `leap` feature, sim otherwise)
    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    /// Recording to play back (implies --source replay)
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Origin name stamped on every message
    #[arg(long)]
    origin: Option<String>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    /// Defaults, then environment, then these flags.
    fn into_config(self) -> Result<SplashConfig, SplashError> {
        let mut cfg = SplashConfig::default();
        cfg.apply_environment_overrides();

        if let Some(path) = self.calibration { cfg.calibration = Some(path); }
        if let Some(path) = self.screen      { cfg.screen = path; }
        if let Some(pool) = self.pool        { cfg.pool = pool; }
        if let Some(dir)  = self.pool_dir    { cfg.pool_dir = dir; }
        if let Some(name) = self.origin      { cfg.origin_name = name; }
        if let Some(ms)   = self.period_ms.filter(|ms| *ms > 0) {
            cfg.period = Duration::from_millis(ms);
        }
        if self.stdout {
            cfg.sink = SinkKind::Stdout;
        }

        cfg.source = match (self.source, self.replay) {
            (None | Some(SourceArg::Replay), Some(path)) => SourceKind::Replay(path),
            (Some(SourceArg::Replay), None) => {
                return Err(SplashError::SourceUnavailable("--source replay needs --replay <file>".into()));
            }
            (Some(SourceArg::Sim), _)  => SourceKind::Sim,
            (Some(SourceArg::Leap), _) => SourceKind::Leap,
            (None, None)               => cfg.source,
        };
        Ok(cfg)
    }
}

fn main() {
    let args    = Args::parse();
    let verbose = args.verbose;

    if let Err(e) = init_logging(verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let cfg = match args.into_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "bad arguments");
            std::process::exit(1);
        }
    };

    #[cfg(feature = "leap")]
    tracing::info!("LeapMotion hardware support enabled");
    tracing::info!(pool = %cfg.pool, source = ?cfg.source, sink = ?cfg.sink, "splash starting");

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("shutdown signal received");
        r.store(false, Ordering::Release);
    }) {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
    }

    match run(&cfg, &running) {
        Ok(report) => {
            if report.disconnected {
                tracing::warn!("sensor disconnected; exiting");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "splash failed");
            std::process::exit(1);
        }
    }
}
