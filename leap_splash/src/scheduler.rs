//! Fixed-period publish thread.
//!
//! Every `period` the thread swaps the [`DepositBuffer`] empty and hands
//! each drained message to the publisher, oldest first, with no lock held.
//! A failed deposit is logged and counted; the rest of the batch still
//! goes out.  Between cycles the thread is parked, so `stop` wakes it at
//! once whatever the period.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use gripe_frame::FrameMessage;

use crate::buffer::DepositBuffer;
use crate::error::{SplashError, SplashResult};
use crate::publisher::Publisher;

/// 1/100 s.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(10);

/// Counters returned when the scheduler stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    /// Drain cycles run, including the final one.
    pub cycles:    u64,
    pub published: u64,
    pub failed:    u64,
}

/// Handle to the publish thread.  Dropping it stops the thread.
pub struct PublishScheduler {
    buffer:  Arc<DepositBuffer<FrameMessage>>,
    running: Arc<AtomicBool>,
    handle:  Option<JoinHandle<PublishStats>>,
}

impl PublishScheduler {
    /// Start publishing `buffer` onto `channel` through `publisher`.
    pub fn spawn<P>(
        buffer:    Arc<DepositBuffer<FrameMessage>>,
        publisher: P,
        channel:   impl Into<String>,
        period:    Duration,
    ) -> SplashResult<Self>
    where
        P: Publisher + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let channel = channel.into();

        let handle = {
            let buffer  = Arc::clone(&buffer);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("splash-publish".to_string())
                .spawn(move || publish_loop(&buffer, publisher, &channel, period, &running))
                .map_err(|source| SplashError::Thread { name: "publish", source })?
        };

        Ok(PublishScheduler { buffer, running, handle: Some(handle) })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Close the buffer to new messages, run one last drain, and wait for
    /// the thread.  In-flight deposits are allowed to finish.
    pub fn stop(mut self) -> PublishStats {
        self.shutdown()
    }

    fn shutdown(&mut self) -> PublishStats {
        self.buffer.begin_shutdown();
        self.running.store(false, Ordering::Release);

        let stats = match self.handle.take() {
            Some(handle) => {
                handle.thread().unpark();
                handle.join().unwrap_or_else(|_| {
                    tracing::error!("publish thread panicked");
                    PublishStats::default()
                })
            }
            None => PublishStats::default(),
        };
        self.buffer.finish();
        stats
    }
}

impl Drop for PublishScheduler {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}

fn publish_loop<P: Publisher>(
    buffer:        &DepositBuffer<FrameMessage>,
    mut publisher: P,
    channel:       &str,
    period:        Duration,
    running:       &AtomicBool,
) -> PublishStats {
    tracing::info!(pool = channel, period_ms = period.as_millis() as u64, "publishing started");
    let mut stats = PublishStats::default();

    while running.load(Ordering::Acquire) {
        let deadline = Instant::now() + period;
        drain_cycle(buffer, &mut publisher, channel, &mut stats);
        wait_until(deadline, running);
    }

    // Producers are shut out by now; flush whatever made it in.
    drain_cycle(buffer, &mut publisher, channel, &mut stats);

    tracing::info!(
        pool      = channel,
        published = stats.published,
        failed    = stats.failed,
        "publishing stopped"
    );
    stats
}

/// Park until `deadline` or until shutdown unparks us.
fn wait_until(deadline: Instant, running: &AtomicBool) {
    while running.load(Ordering::Acquire) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::park_timeout(deadline - now);
    }
}

/// One drain-and-publish pass.
pub fn drain_cycle<P: Publisher + ?Sized>(
    buffer:    &DepositBuffer<FrameMessage>,
    publisher: &mut P,
    channel:   &str,
    stats:     &mut PublishStats,
) {
    let batch = buffer.drain();
    stats.cycles += 1;
    if batch.is_empty() {
        return;
    }

    tracing::debug!(pool = channel, count = batch.len(), "draining");
    for message in &batch {
        match publisher.deposit(channel, message) {
            Ok(()) => stats.published += 1,
            Err(e) => {
                stats.failed += 1;
                tracing::warn!(pool = channel, time = message.time(), error = %e, "deposit failed, dropping message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::MemoryPublisher;
    use gripe_frame::{HandDescriptor, MessageBuilder, Side};

    fn msg(time: i64) -> FrameMessage {
        MessageBuilder::new("test").build(
            time,
            [
                HandDescriptor::placeholder(Side::Right),
                HandDescriptor::placeholder(Side::Left),
            ],
        )
    }

    #[test]
    fn drain_cycle_publishes_in_order() {
        let buffer = DepositBuffer::new();
        for t in 0..5 {
            buffer.enqueue(msg(t));
        }
        let mut publisher = MemoryPublisher::new();
        let mut stats = PublishStats::default();
        drain_cycle(&buffer, &mut publisher, "leap", &mut stats);

        assert_eq!(publisher.times(), [0, 1, 2, 3, 4]);
        assert_eq!(stats, PublishStats { cycles: 1, published: 5, failed: 0 });
        assert!(buffer.is_empty());
    }

    #[test]
    fn failed_deposit_does_not_abort_the_batch() {
        let buffer = DepositBuffer::new();
        for t in 0..4 {
            buffer.enqueue(msg(t));
        }
        let mut publisher = MemoryPublisher::failing_at([1]);
        let mut stats = PublishStats::default();
        drain_cycle(&buffer, &mut publisher, "leap", &mut stats);

        assert_eq!(publisher.times(), [0, 2, 3]);
        assert_eq!(stats.published, 3);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn scheduler_publishes_periodically_and_flushes_on_stop() {
        let buffer    = Arc::new(DepositBuffer::new());
        let publisher = MemoryPublisher::new();
        let scheduler = PublishScheduler::spawn(
            Arc::clone(&buffer),
            publisher.clone(),
            "leap",
            Duration::from_millis(1),
        )
        .unwrap();

        for t in 0..50 {
            buffer.enqueue(msg(t));
        }
        let stats = scheduler.stop();

        assert_eq!(publisher.times(), (0..50).collect::<Vec<_>>());
        assert_eq!(stats.published, 50);
        assert!(stats.cycles >= 1);
        assert_eq!(buffer.state(), crate::buffer::BufferState::Stopped);
        assert!(!buffer.enqueue(msg(99)));
    }

    #[test]
    fn stop_does_not_wait_out_a_long_period() {
        let buffer    = Arc::new(DepositBuffer::new());
        let publisher = MemoryPublisher::new();
        let scheduler = PublishScheduler::spawn(
            Arc::clone(&buffer),
            publisher.clone(),
            "leap",
            Duration::from_secs(60),
        )
        .unwrap();

        // let the first cycle run so the thread is parked
        thread::sleep(Duration::from_millis(50));
        buffer.enqueue(msg(3));

        let started = Instant::now();
        let stats = scheduler.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(publisher.times(), [3]);
        assert_eq!(stats.published, 1);
    }

    #[test]
    fn drop_stops_the_thread() {
        let buffer = Arc::new(DepositBuffer::new());
        let publisher = MemoryPublisher::new();
        {
            let _scheduler = PublishScheduler::spawn(
                Arc::clone(&buffer),
                publisher.clone(),
                "leap",
                Duration::from_millis(5),
            )
            .unwrap();
            buffer.enqueue(msg(1));
        }
        assert_eq!(buffer.state(), crate::buffer::BufferState::Stopped);
        assert_eq!(publisher.times(), [1]);
    }
}
