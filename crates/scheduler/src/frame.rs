//! Display-refresh clocks for frame-paced polls

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

/// Default refresh interval of [`TimerFrameSource`] (about 60 Hz)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Source of display-refresh ticks
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Resolve at the next display refresh
    async fn next_frame(&self);
}

/// Refresh ticks driven by a fixed timer
#[derive(Debug, Clone, Copy)]
pub struct TimerFrameSource {
    interval: Duration,
}

impl TimerFrameSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for TimerFrameSource {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

#[async_trait]
impl FrameSource for TimerFrameSource {
    async fn next_frame(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

/// Display refreshes signalled by the host.
///
/// Every refresh wakes each poll waiting at that moment exactly once. A
/// refresh with no waiter is not stored: a poll that starts waiting later
/// sleeps until the next one. For hosts that own their compositor loop, and
/// for tests that need to count ticks exactly.
#[derive(Debug)]
pub struct ManualFrameSource {
    frames: watch::Sender<u64>,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        let (frames, _) = watch::channel(0);
        Self { frames }
    }

    /// Signal one display refresh to every waiting poll
    pub fn advance(&self) {
        self.frames.send_modify(|count| *count += 1);
    }

    /// Refreshes signalled so far
    pub fn frame_count(&self) -> u64 {
        *self.frames.borrow()
    }
}

impl Default for ManualFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameSource for ManualFrameSource {
    async fn next_frame(&self) {
        let mut frames = self.frames.subscribe();
        if frames.changed().await.is_err() {
            // the sender lives as long as the source; treat it as "no more frames"
            std::future::pending::<()>().await;
        }
    }
}
