//! Abortable cooperative polling
//!
//! Turns "wait until condition C holds" into a one-shot result. A poll
//! evaluates a synchronous predicate on every tick (per display refresh or
//! per fixed interval) until it settles; the driver can cancel it at any
//! time and read its progress log independently of the result.

pub mod error;
pub mod frame;
pub mod handle;
pub mod model;
pub mod progress;
pub mod runtime;

pub use error::PollError;
pub use frame::{FrameSource, ManualFrameSource, TimerFrameSource, DEFAULT_FRAME_INTERVAL};
pub use handle::{PollHandle, PollResult};
pub use model::{Continuation, Tick};
pub use progress::Progress;
pub use runtime::{Pacing, Poller};
