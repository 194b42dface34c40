//! In-page automation core
//!
//! Assembles the workspace crates into a runtime a driver embeds per page:
//! - `inpage-dom`: the host document model
//! - `query-engines` / `action-locator`: selector engines and resolution
//! - `inpage-scheduler`: abortable frame- and interval-paced polls
//! - `perceiver-structural`: geometry and readiness probes
//! - `action-primitives`: the driver-facing action surface
//!
//! plus configuration loading and logging setup.

pub mod config;
pub mod runtime;
pub mod telemetry;

pub use action_locator::{ParsedSelector, SelectorError, SelectorPart};
pub use action_primitives::*;
pub use config::{load_config, LoadedConfig, RuntimeConfig};
pub use inpage_dom::{Dom, NodeId, Point, Rect, SharedDom};
pub use inpage_scheduler::{FrameSource, ManualFrameSource, PollError, PollHandle};
pub use query_engines::{EngineRegistry, QueryEngine};
pub use runtime::{PageRuntime, PageRuntimeBuilder};
pub use telemetry::{init_logging, init_logging_from_config};
