//! Geometry and readiness probes over the host document
//!
//! - `judges`: visibility, button targeting, disabled state, border metrics
//! - `stability`: the same-position window used by the "stable" wait
//! - `hit_test`: shadow-piercing hit testing and hit-target checks
//! - `preview`: one-line node descriptions for logs

pub mod judges;
pub mod preview;
pub mod stability;

pub use hit_test::{check_hit_target_at, deep_element_from_point, HitTargetOutcome};
pub use judges::{button_target, element_border_width, is_disabled_for_actions, is_visible};
pub use preview::{one_line, preview_node};
pub use stability::{StabilitySample, StabilityWindow, MIN_FRAME_GAP};
