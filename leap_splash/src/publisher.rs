//! Publishers — where drained messages go.
//!
//! The scheduler only knows the [`Publisher`] trait.  Backends:
//!
//! * [`PoolFilePublisher`] — one append-only JSON-lines file per pool.
//! * [`StdoutPublisher`] — JSON lines on stdout, for piping.
//! * [`MemoryPublisher`] — keeps everything in memory; used by tests.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gripe_frame::FrameMessage;
use parking_lot::Mutex;

use crate::error::PublishError;

/// File extension for pool files.
pub const POOL_EXTENSION: &str = "pool";

// ════════════════════════════════════════════════════════════════════════════
// Publisher trait
// ════════════════════════════════════════════════════════════════════════════

/// Appends messages to a named channel.
///
/// Each call is independent: a failure says nothing about the next call.
pub trait Publisher: Send {
    fn deposit(&mut self, channel: &str, message: &FrameMessage) -> Result<(), PublishError>;
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn deposit(&mut self, channel: &str, message: &FrameMessage) -> Result<(), PublishError> {
        (**self).deposit(channel, message)
    }
}

// ── pool file backend ─────────────────────────────────────────────────────

/// Appends one JSON line per message to `<dir>/<channel>.pool`.
///
/// Files are opened in append mode and each message goes out in a single
/// write, so several writers can share a pool.
pub struct PoolFilePublisher {
    dir:   PathBuf,
    files: HashMap<String, File>,
}

impl PoolFilePublisher {
    /// Create `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(PoolFilePublisher { dir, files: HashMap::new() })
    }

    pub fn pool_path(&self, channel: &str) -> PathBuf {
        pool_path(&self.dir, channel)
    }

    fn file_for(&mut self, channel: &str) -> Result<&mut File, PublishError> {
        if !self.files.contains_key(channel) {
            check_pool_name(channel)?;
            let path = self.pool_path(channel);
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing::info!(pool = channel, path = %path.display(), "pool opened");
            self.files.insert(channel.to_string(), file);
        }
        self.files
            .get_mut(channel)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "pool file vanished").into())
    }
}

/// Where a pool named `channel` lives under `dir`.  The name is not
/// checked; see [`check_pool_name`].
pub fn pool_path(dir: &Path, channel: &str) -> PathBuf {
    dir.join(format!("{}.{}", channel, POOL_EXTENSION))
}

/// Pool names become file names, so they may not leave the pool directory.
pub fn check_pool_name(channel: &str) -> Result<(), PublishError> {
    let bad = channel.is_empty()
        || channel.contains(['/', '\\', '\0'])
        || channel.contains("..");
    if bad {
        return Err(PublishError::InvalidPool { name: channel.to_string() });
    }
    Ok(())
}

impl Publisher for PoolFilePublisher {
    fn deposit(&mut self, channel: &str, message: &FrameMessage) -> Result<(), PublishError> {
        let line = message.to_json_line()?;
        let file = self.file_for(channel)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

// ── stdout backend ────────────────────────────────────────────────────────

/// Writes `{"pool": ..., "protein": ...}` lines to stdout.
#[derive(Default)]
pub struct StdoutPublisher;

impl Publisher for StdoutPublisher {
    fn deposit(&mut self, channel: &str, message: &FrameMessage) -> Result<(), PublishError> {
        let line = format!(
            "{{\"pool\":{},\"protein\":{}}}\n",
            serde_json::to_string(channel)?,
            message.to_json()?,
        );
        io::stdout().lock().write_all(line.as_bytes())?;
        Ok(())
    }
}

// ── in-memory backend ─────────────────────────────────────────────────────

/// Records deposits in memory.  Clones share the same record.
///
/// Messages whose time is listed in `failures` are refused, for exercising
/// the error path.
#[derive(Clone, Default)]
pub struct MemoryPublisher {
    deposited: Arc<Mutex<Vec<(String, FrameMessage)>>>,
    failures:  Arc<HashSet<i64>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        MemoryPublisher::default()
    }

    /// Refuse every message stamped with one of `times`.
    pub fn failing_at(times: impl IntoIterator<Item = i64>) -> Self {
        MemoryPublisher {
            deposited: Arc::default(),
            failures:  Arc::new(times.into_iter().collect()),
        }
    }

    /// Snapshot of everything accepted so far, in deposit order.
    pub fn deposited(&self) -> Vec<(String, FrameMessage)> {
        self.deposited.lock().clone()
    }

    /// Times of accepted messages, in deposit order.
    pub fn times(&self) -> Vec<i64> {
        self.deposited.lock().iter().map(|(_, m)| m.time()).collect()
    }

    pub fn len(&self) -> usize {
        self.deposited.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Publisher for MemoryPublisher {
    fn deposit(&mut self, channel: &str, message: &FrameMessage) -> Result<(), PublishError> {
        if self.failures.contains(&message.time()) {
            return Err(PublishError::Rejected { time: message.time() });
        }
        self.deposited.lock().push((channel.to_string(), message.clone()));
        Ok(())
    }
}
