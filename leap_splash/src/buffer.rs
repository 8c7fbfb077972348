//! The deposit buffer between the sensor thread and the publish thread.
//!
//! The sensor thread pushes one message per frame; the publish thread
//! swaps the whole queue out every cycle and publishes it unlocked.  The
//! lock is held only for a push or a swap, so a slow channel can never
//! stall the sensor callback.
//!
//! ```text
//!   Running ──begin_shutdown()──▶ Stopping ──finish()──▶ Stopped
//!   enqueue ok                    enqueue dropped         enqueue dropped
//! ```

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Lifecycle of a [`DepositBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Running,
    /// Shutdown requested; the final drain has not happened yet.
    Stopping,
    Stopped,
}

struct Inner<T> {
    queue:     VecDeque<T>,
    state:     BufferState,
    discarded: u64,
}

/// FIFO guarded by a single mutex.
pub struct DepositBuffer<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> DepositBuffer<T> {
    pub fn new() -> Self {
        DepositBuffer {
            inner: Mutex::new(Inner {
                queue:     VecDeque::new(),
                state:     BufferState::Running,
                discarded: 0,
            }),
        }
    }

    /// Append `item`.  Once shutdown has begun the item is silently
    /// dropped and `false` is returned.
    pub fn enqueue(&self, item: T) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != BufferState::Running {
            inner.discarded += 1;
            return false;
        }
        inner.queue.push_back(item);
        true
    }

    /// Take everything queued so far, oldest first, leaving the buffer
    /// empty.
    pub fn drain(&self) -> VecDeque<T> {
        std::mem::take(&mut self.inner.lock().queue)
    }

    /// Stop accepting new items.  Returns the state before the call.
    pub fn begin_shutdown(&self) -> BufferState {
        let mut inner = self.inner.lock();
        let prev = inner.state;
        if prev == BufferState::Running {
            inner.state = BufferState::Stopping;
        }
        prev
    }

    /// Mark the final drain as done.
    pub fn finish(&self) {
        self.inner.lock().state = BufferState::Stopped;
    }

    pub fn state(&self) -> BufferState {
        self.inner.lock().state
    }

    pub fn is_accepting(&self) -> bool {
        self.state() == BufferState::Running
    }

    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items dropped because they arrived after shutdown began.
    pub fn discarded(&self) -> u64 {
        self.inner.lock().discarded
    }
}

impl<T> Default for DepositBuffer<T> {
    fn default() -> Self {
        DepositBuffer::new()
    }
}
