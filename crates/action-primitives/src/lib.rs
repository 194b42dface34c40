//! In-page action primitives
//!
//! The driver-facing surface of the in-page engine:
//! - selector queries through the engine registry
//! - actions as abortable polls: fill, select_text, select_options,
//!   readiness waits, hit-target checks, focus, file inputs, events
//! - synchronous probes: visibility, deep hit-testing, previews, borders
//!
//! Every action settles with a closed outcome enum whose variants serialize
//! to the tag strings drivers match on (`"done"`, `"error:notconnected"`, ...).

pub mod errors;
mod primitives;
pub mod types;

pub use errors::*;
pub use perceiver_structural::HitTargetOutcome;
pub use primitives::*;
pub use types::*;
