//! Driver-side view of a running poll

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

use crate::error::PollError;
use crate::progress::PollState;

pub(crate) type Settlement<T> = Result<T, PollError>;

/// Sender side of the result. Shared by the poll task, the handle and the
/// result future; an aborted poll leaves the sender in place so the result
/// stays pending instead of resolving with an error.
pub(crate) type ResultSlot<T> = Arc<Mutex<Option<oneshot::Sender<Settlement<T>>>>>;

/// Cancels the poll once the handle and every future derived from it are gone
type AbortOnDrop = Arc<DropGuard>;

/// Future of a poll's single result. Keeps the poll alive after the handle
/// is dropped.
#[derive(Debug)]
pub struct PollResult<T> {
    rx: oneshot::Receiver<Settlement<T>>,
    _slot: ResultSlot<T>,
    _guard: AbortOnDrop,
}

impl<T> Future for PollResult<T> {
    type Output = Result<T, PollError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(settlement)) => Poll::Ready(settlement),
            Poll::Ready(Err(_)) => Poll::Ready(Err(PollError::TaskLost)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Handle to one poll invocation.
///
/// Dropping the handle, together with the result future and pending log
/// futures taken from it, cancels the poll.
#[derive(Debug)]
pub struct PollHandle<T> {
    state: Arc<PollState>,
    slot: ResultSlot<T>,
    result: Option<oneshot::Receiver<Settlement<T>>>,
    guard: AbortOnDrop,
}

impl<T> PollHandle<T> {
    pub(crate) fn new(
        state: Arc<PollState>,
        slot: ResultSlot<T>,
        result: oneshot::Receiver<Settlement<T>>,
    ) -> Self {
        let guard = Arc::new(state.cancel.clone().drop_guard());
        Self {
            state,
            slot,
            result: Some(result),
            guard,
        }
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    /// Stop future ticks. Idempotent; a no-op once the result has settled.
    pub fn cancel(&self) {
        self.state.cancel.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.state.cancel.is_cancelled()
    }

    /// Token that aborts this poll when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.state.cancel.clone()
    }

    /// Take the result future. Returns `None` after the first call.
    pub fn take_result(&mut self) -> Option<PollResult<T>> {
        self.result.take().map(|rx| PollResult {
            rx,
            _slot: Arc::clone(&self.slot),
            _guard: Arc::clone(&self.guard),
        })
    }

    /// Await the result in place. Resolves to [`PollError::TaskLost`] when
    /// the result future was already taken.
    pub async fn result(&mut self) -> Result<T, PollError> {
        match self.take_result() {
            Some(result) => result.await,
            None => Err(PollError::TaskLost),
        }
    }

    /// Next batch of log lines: resolves as soon as at least one line is
    /// buffered, or with whatever is left once the poll has settled. A
    /// newer call supersedes a pending one, which then resolves empty.
    pub fn take_next_logs(&self) -> impl Future<Output = Vec<String>> + Send + 'static {
        let rx = self.state.wait_for_logs();
        let guard = Arc::clone(&self.guard);
        async move {
            let logs = rx.await.unwrap_or_default();
            drop(guard);
            logs
        }
    }

    /// Snapshot of the lines not yet delivered by [`take_next_logs`](Self::take_next_logs)
    pub fn take_last_logs(&self) -> Vec<String> {
        self.state.unsent_logs()
    }
}
