//! Per-poll progress state and the log mailbox

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// One-slot mailbox: buffered lines plus at most one waiting consumer
#[derive(Debug, Default)]
pub(crate) struct LogMailbox {
    unsent: Vec<String>,
    last: Option<String>,
    waiter: Option<oneshot::Sender<Vec<String>>>,
    finished: bool,
}

impl LogMailbox {
    fn flush(&mut self) {
        if let Some(waiter) = self.waiter.take() {
            let _ = waiter.send(std::mem::take(&mut self.unsent));
        }
    }
}

#[derive(Debug)]
pub(crate) struct PollState {
    pub(crate) id: Uuid,
    pub(crate) cancel: CancellationToken,
    logs: Mutex<LogMailbox>,
}

impl PollState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
            logs: Mutex::new(LogMailbox::default()),
        })
    }

    pub(crate) fn push_log(&self, message: String) {
        debug!(poll_id = %self.id, "{}", message);
        let mut mailbox = self.logs.lock();
        mailbox.last = Some(message.clone());
        mailbox.unsent.push(message);
        mailbox.flush();
    }

    /// Register the consumer of the next batch. Replaces an earlier waiter,
    /// whose receiver then resolves empty.
    pub(crate) fn wait_for_logs(&self) -> oneshot::Receiver<Vec<String>> {
        let (tx, rx) = oneshot::channel();
        let mut mailbox = self.logs.lock();
        mailbox.waiter = Some(tx);
        if !mailbox.unsent.is_empty() || mailbox.finished {
            mailbox.flush();
        }
        rx
    }

    pub(crate) fn unsent_logs(&self) -> Vec<String> {
        self.logs.lock().unsent.clone()
    }

    /// The result settled: release a waiting consumer even with no lines
    pub(crate) fn finish(&self) {
        let mut mailbox = self.logs.lock();
        mailbox.finished = true;
        mailbox.flush();
    }
}

/// Handle a predicate uses to observe cancellation and report progress
#[derive(Debug, Clone)]
pub struct Progress {
    state: Arc<PollState>,
}

impl Progress {
    pub(crate) fn new(state: Arc<PollState>) -> Self {
        Self { state }
    }

    /// Id of the poll this progress belongs to
    pub fn poll_id(&self) -> Uuid {
        self.state.id
    }

    /// Monotonic: once `true`, stays `true`
    pub fn aborted(&self) -> bool {
        self.state.cancel.is_cancelled()
    }

    pub fn log(&self, message: impl Into<String>) {
        self.state.push_log(message.into());
    }

    /// Like [`log`](Self::log), but drops a line equal to the last one logged
    pub fn log_repeating(&self, message: impl Into<String>) {
        let message = message.into();
        let repeated = self.state.logs.lock().last.as_deref() == Some(message.as_str());
        if !repeated {
            self.state.push_log(message);
        }
    }
}
