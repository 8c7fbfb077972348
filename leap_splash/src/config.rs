//! Runtime settings for the splash pipeline.
//!
//! Resolution order: built-in defaults, then environment variables, then
//! command-line flags (applied by the binary).
//!
//! | Variable | Field |
//! |---|---|
//! | `LEAP_POOL` | `pool` |
//! | `SPLASH_POOL_DIR` | `pool_dir` |
//! | `SPLASH_PERIOD_MS` | `period` |
//! | `SPLASH_SCREEN` | `screen` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::DEFAULT_PERIOD;

/// Pool written to when nothing else is configured.
pub const DEFAULT_POOL: &str = "leap";

/// LeapC release the origin name advertises.
pub const LEAP_VERSION: &str = "0.7.9";

/// System-wide screen description used when no calibration file is given.
pub const DEFAULT_SCREEN_FILE: &str = "/etc/oblong/screen.toml";

/// Directory pool files live in when nothing else is configured.
pub const DEFAULT_POOL_DIR: &str = "./pools";

/// Where published messages go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Append to `<pool_dir>/<pool>.pool`.
    PoolFile,
    /// JSON lines on stdout.
    Stdout,
}

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Synthetic hand, no hardware.
    Sim,
    /// JSON-lines recording, played back at its recorded pace.
    Replay(PathBuf),
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
}

/// Configuration for the whole pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct SplashConfig {
    pub pool:        String,
    pub pool_dir:    PathBuf,
    pub sink:        SinkKind,
    pub period:      Duration,
    pub origin_name: String,
    /// Explicit calibration file; tried before `screen`.
    pub calibration: Option<PathBuf>,
    pub screen:      PathBuf,
    pub source:      SourceKind,
}

impl Default for SplashConfig {
    fn default() -> Self {
        SplashConfig {
            pool:        DEFAULT_POOL.to_string(),
            pool_dir:    PathBuf::from(DEFAULT_POOL_DIR),
            sink:        SinkKind::PoolFile,
            period:      DEFAULT_PERIOD,
            origin_name: default_origin_name(),
            calibration: None,
            screen:      PathBuf::from(DEFAULT_SCREEN_FILE),
            source:      default_source(),
        }
    }
}

/// `leap-reader-v<version>`.
pub fn default_origin_name() -> String {
    format!("leap-reader-v{}", LEAP_VERSION)
}

#[cfg(feature = "leap")]
fn default_source() -> SourceKind {
    SourceKind::Leap
}

#[cfg(not(feature = "leap"))]
fn default_source() -> SourceKind {
    SourceKind::Sim
}

impl SplashConfig {
    /// Apply overrides from the process environment.
    pub fn apply_environment_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Apply overrides from any key lookup.  Unparsable values are logged
    /// and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("LEAP_POOL").filter(|v| !v.is_empty()) {
            self.pool = value;
        }
        if let Some(value) = lookup("SPLASH_POOL_DIR") {
            self.pool_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("SPLASH_PERIOD_MS") {
            match value.parse::<u64>() {
                Ok(ms) if ms > 0 => self.period = Duration::from_millis(ms),
                _ => tracing::warn!(value = %value, "ignoring SPLASH_PERIOD_MS"),
            }
        }
        if let Some(value) = lookup("SPLASH_SCREEN") {
            self.screen = PathBuf::from(value);
        }
    }
}
