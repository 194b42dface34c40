//! Poll drivers

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::error::PollError;
use crate::frame::{FrameSource, TimerFrameSource};
use crate::handle::{PollHandle, ResultSlot, Settlement};
use crate::model::{Continuation, Tick};
use crate::progress::{PollState, Progress};

/// What paces the ticks after the first one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Once per display refresh
    Frame,
    /// After a fixed delay
    Interval(Duration),
}

/// Spawns polls on the current tokio runtime.
///
/// A predicate runs synchronously to completion on every tick and either
/// settles the poll (`Tick::Done`), asks for another tick by returning the
/// continuation token it was given, or fails. Ticks of one poll never
/// overlap; ticks of different polls are unordered.
#[derive(Clone)]
pub struct Poller {
    frames: Arc<dyn FrameSource>,
}

impl fmt::Debug for Poller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller").finish_non_exhaustive()
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(Arc::new(TimerFrameSource::default()))
    }
}

impl Poller {
    pub fn new(frames: Arc<dyn FrameSource>) -> Self {
        Self { frames }
    }

    /// Re-evaluate `predicate` once per display refresh
    pub fn poll_by_frame<T, F>(&self, predicate: F) -> PollHandle<T>
    where
        T: Send + 'static,
        F: FnMut(&Progress, &Continuation) -> anyhow::Result<Tick<T>> + Send + 'static,
    {
        self.spawn(Pacing::Frame, predicate)
    }

    /// Re-evaluate `predicate` every `interval`
    pub fn poll_by_interval<T, F>(&self, interval: Duration, predicate: F) -> PollHandle<T>
    where
        T: Send + 'static,
        F: FnMut(&Progress, &Continuation) -> anyhow::Result<Tick<T>> + Send + 'static,
    {
        self.spawn(Pacing::Interval(interval), predicate)
    }

    /// Start a poll. Must be called from within a tokio runtime.
    pub fn spawn<T, F>(&self, pacing: Pacing, predicate: F) -> PollHandle<T>
    where
        T: Send + 'static,
        F: FnMut(&Progress, &Continuation) -> anyhow::Result<Tick<T>> + Send + 'static,
    {
        let state = PollState::new();
        let (tx, rx) = oneshot::channel();
        let slot: ResultSlot<T> = Arc::new(Mutex::new(Some(tx)));
        debug!(poll_id = %state.id, ?pacing, "Starting poll");

        let driver = Driver {
            state: Arc::clone(&state),
            slot: Arc::clone(&slot),
            frames: Arc::clone(&self.frames),
            pacing,
        };
        tokio::spawn(driver.run(predicate));
        PollHandle::new(state, slot, rx)
    }
}

struct Driver<T> {
    state: Arc<PollState>,
    slot: ResultSlot<T>,
    frames: Arc<dyn FrameSource>,
    pacing: Pacing,
}

impl<T: Send + 'static> Driver<T> {
    async fn run<F>(self, mut predicate: F)
    where
        F: FnMut(&Progress, &Continuation) -> anyhow::Result<Tick<T>> + Send + 'static,
    {
        let progress = Progress::new(Arc::clone(&self.state));
        let continuation = Continuation::fresh();
        let mut ticks = 0u64;

        loop {
            if self.state.cancel.is_cancelled() {
                debug!(poll_id = %self.state.id, ticks, "Poll aborted");
                return;
            }

            ticks += 1;
            let outcome = catch_unwind(AssertUnwindSafe(|| predicate(&progress, &continuation)));
            let settlement = match outcome {
                Ok(Ok(Tick::Done(value))) => Ok(value),
                Ok(Ok(Tick::Continue(token))) if token == continuation => {
                    trace!(poll_id = %self.state.id, ticks, "Poll continues");
                    if !self.wait_next_tick().await {
                        debug!(poll_id = %self.state.id, ticks, "Poll aborted");
                        return;
                    }
                    continue;
                }
                Ok(Ok(Tick::Continue(_))) => Err(PollError::ForeignContinuation),
                Ok(Err(err)) => Err(PollError::Predicate(format!("{err:#}"))),
                Err(panic) => Err(PollError::Panicked(panic_message(panic.as_ref()))),
            };

            if let Err(err) = &settlement {
                warn!(poll_id = %self.state.id, ticks, error = %err, "Poll predicate failed");
                progress.log(format!("  {err}"));
            } else {
                debug!(poll_id = %self.state.id, ticks, "Poll settled");
            }
            self.settle(settlement);
            return;
        }
    }

    /// Wait for the next tick; `false` when the poll was aborted meanwhile
    async fn wait_next_tick(&self) -> bool {
        tokio::select! {
            biased;
            _ = self.state.cancel.cancelled() => false,
            _ = self.next_tick() => true,
        }
    }

    async fn next_tick(&self) {
        match self.pacing {
            Pacing::Frame => self.frames.next_frame().await,
            Pacing::Interval(interval) => tokio::time::sleep(interval).await,
        }
    }

    fn settle(&self, settlement: Settlement<T>) {
        if let Some(tx) = self.slot.lock().take() {
            let _ = tx.send(settlement);
        }
        self.state.finish();
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
