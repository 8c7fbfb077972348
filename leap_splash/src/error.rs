//! Error types for the splash pipeline.

use std::path::PathBuf;

/// Pipeline-level failures.
#[derive(Debug, thiserror::Error)]
pub enum SplashError {
    /// No usable calibration anywhere.  Fatal: the pipeline never runs
    /// with an unset transform.
    #[error("no calibration could be found or inferred for the sensor (tried: {tried})")]
    ConfigurationMissing { tried: String },

    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid calibration file {path}: {source}")]
    ConfigParse {
        path:   PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The frame source went away.  Whatever is already buffered is still
    /// published.
    #[error("frame source disconnected: {0}")]
    SourceDisconnected(String),

    /// The configured source cannot be used in this build or setup.
    #[error("frame source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("failed to spawn {name} thread: {source}")]
    Thread {
        name:   &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A single failed deposit.  Logged and dropped; never retried.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("pool write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("message serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("publisher refused message at t={time}")]
    Rejected { time: i64 },

    #[error("invalid pool name {name:?}: must be non-empty with no path separators or '..'")]
    InvalidPool { name: String },
}

pub type SplashResult<T> = Result<T, SplashError>;
