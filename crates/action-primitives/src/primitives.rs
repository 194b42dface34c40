//! Action primitives implementation
//!
//! Every action runs as a poll on the shared [`Poller`]. Each tick takes the
//! document lock for its whole synchronous run and either settles with an
//! outcome tag or asks for another tick.
//!
//! 1. fill - prepare a control for typing, or assign date-like values
//! 2. select_text - select a control's text and focus it
//! 3. select_options - choose `<option>`s of a `<select>`
//! 4. wait - visibility and stable-position readiness waits
//! 5. hit_target - would a pointer event land on the node
//! 6. focus - move focus to a node
//! 7. files - replace the file list of a file input
//! 8. dispatch - synthesize a DOM event

mod dispatch;
mod files;
mod fill;
mod focus;
mod hit_target;
mod select;
mod select_text;
mod wait;

use std::sync::Arc;

use action_locator::{ParsedSelector, SelectorResolver};
use inpage_dom::{BorderWidth, Dom, EventKind, NodeId, Point, SharedDom};
use inpage_scheduler::{Continuation, PollHandle, Poller, Tick};
use perceiver_structural::HitTargetOutcome;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    errors::ActionError,
    types::{
        FilePayload, FillOutcome, FocusOutcome, NodeStateOutcome, OptionSelector,
        PrimitiveOptions, SelectOptionsOutcome, SelectTextOutcome, SetInputFilesOutcome,
    },
};

const NOT_VISIBLE: &str = "    element is not visible - waiting...";
const MOVING: &str = "    element is moving - waiting...";
const DISABLED: &str = "    element is disabled - waiting...";
const READONLY: &str = "    element is readonly - waiting...";

/// Action primitives trait
///
/// The driver-facing surface. Queries and probes answer synchronously; every
/// action returns the handle of the poll that performs it.
pub trait ActionPrimitives: Send + Sync {
    /// First element matching `selector` under `root`
    fn query_selector(
        &self,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Option<NodeId>, ActionError>;

    /// All elements matching `selector` under `root`
    fn query_selector_all(
        &self,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Vec<NodeId>, ActionError>;

    /// Prepare `node` for typing `value`
    fn fill(&self, node: NodeId, value: &str) -> PollHandle<FillOutcome>;

    /// Select all text of `node` and focus it
    fn select_text(&self, node: NodeId) -> PollHandle<SelectTextOutcome>;

    /// Select the options of a `<select>` matching any of `options`
    fn select_options(
        &self,
        node: NodeId,
        options: Vec<OptionSelector>,
    ) -> PollHandle<SelectOptionsOutcome>;

    /// Wait until `node` is visible
    fn wait_for_node_visible(&self, node: NodeId) -> PollHandle<NodeStateOutcome>;

    /// Wait until `node` is displayed, visible, enabled and has kept the
    /// same position for `raf_count` samples
    fn wait_for_displayed_at_stable_position_and_enabled(
        &self,
        node: NodeId,
        raf_count: u32,
    ) -> PollHandle<NodeStateOutcome>;

    /// Check whether a pointer event at `point` would reach `node`
    fn check_hit_target_at(&self, node: NodeId, point: Point) -> PollHandle<HitTargetOutcome>;

    /// Focus `node`, optionally collapsing an input's selection when it was
    /// not focused before
    fn focus_node(
        &self,
        node: NodeId,
        reset_selection_if_not_focused: bool,
    ) -> PollHandle<FocusOutcome>;

    /// Replace the file list of an `<input type=file>`
    fn set_input_files(
        &self,
        node: NodeId,
        payloads: Vec<FilePayload>,
    ) -> PollHandle<SetInputFilesOutcome>;

    /// Dispatch a synthetic event of the interface `event_type` maps to
    fn dispatch_event(
        &self,
        node: NodeId,
        event_type: &str,
        init: Map<String, Value>,
    ) -> PollHandle<EventKind>;

    fn is_visible(&self, node: NodeId) -> bool;

    fn deep_element_from_point(&self, point: Point) -> Option<NodeId>;

    fn preview_node(&self, node: NodeId) -> String;

    fn element_border_width(&self, node: NodeId) -> BorderWidth;
}

/// Default implementation of action primitives
pub struct DefaultActionPrimitives {
    /// Document every action reads and mutates
    dom: SharedDom,

    /// Resolver for driver selectors
    resolver: Arc<dyn SelectorResolver>,

    /// Spawns the action polls
    poller: Poller,

    options: PrimitiveOptions,
}

impl DefaultActionPrimitives {
    /// Create a new primitives implementation
    pub fn new(dom: SharedDom, resolver: Arc<dyn SelectorResolver>, poller: Poller) -> Self {
        Self {
            dom,
            resolver,
            poller,
            options: PrimitiveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PrimitiveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn dom(&self) -> &SharedDom {
        &self.dom
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn options(&self) -> &PrimitiveOptions {
        &self.options
    }
}

/// The element a node-level action works on: the node itself or its parent
/// element. `None` when the node is detached.
fn connected_element(dom: &Dom, node: NodeId) -> Option<NodeId> {
    if !dom.is_connected(node) {
        return None;
    }
    if dom.is_element(node) {
        Some(node)
    } else {
        dom.parent_element(node)
    }
}

/// Settle with `outcome`, or keep polling on `None`
fn settle<T>(outcome: Option<T>, continuation: &Continuation) -> Tick<T> {
    match outcome {
        Some(value) => Tick::Done(value),
        None => continuation.proceed(),
    }
}

impl ActionPrimitives for DefaultActionPrimitives {
    fn query_selector(
        &self,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Option<NodeId>, ActionError> {
        let dom = self.dom.read();
        let found = self.resolver.query_selector(&dom, selector, root)?;
        debug!(selector = %selector, root = %root, ?found, "query_selector");
        Ok(found)
    }

    fn query_selector_all(
        &self,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Vec<NodeId>, ActionError> {
        let dom = self.dom.read();
        let found = self.resolver.query_selector_all(&dom, selector, root)?;
        debug!(selector = %selector, root = %root, count = found.len(), "query_selector_all");
        Ok(found)
    }

    fn fill(&self, node: NodeId, value: &str) -> PollHandle<FillOutcome> {
        fill::execute_fill(self, node, value)
    }

    fn select_text(&self, node: NodeId) -> PollHandle<SelectTextOutcome> {
        select_text::execute_select_text(self, node)
    }

    fn select_options(
        &self,
        node: NodeId,
        options: Vec<OptionSelector>,
    ) -> PollHandle<SelectOptionsOutcome> {
        select::execute_select_options(self, node, options)
    }

    fn wait_for_node_visible(&self, node: NodeId) -> PollHandle<NodeStateOutcome> {
        wait::execute_wait_for_node_visible(self, node)
    }

    fn wait_for_displayed_at_stable_position_and_enabled(
        &self,
        node: NodeId,
        raf_count: u32,
    ) -> PollHandle<NodeStateOutcome> {
        wait::execute_wait_for_stable(self, node, raf_count)
    }

    fn check_hit_target_at(&self, node: NodeId, point: Point) -> PollHandle<HitTargetOutcome> {
        hit_target::execute_check_hit_target(self, node, point)
    }

    fn focus_node(
        &self,
        node: NodeId,
        reset_selection_if_not_focused: bool,
    ) -> PollHandle<FocusOutcome> {
        focus::execute_focus(self, node, reset_selection_if_not_focused)
    }

    fn set_input_files(
        &self,
        node: NodeId,
        payloads: Vec<FilePayload>,
    ) -> PollHandle<SetInputFilesOutcome> {
        files::execute_set_input_files(self, node, payloads)
    }

    fn dispatch_event(
        &self,
        node: NodeId,
        event_type: &str,
        init: Map<String, Value>,
    ) -> PollHandle<EventKind> {
        dispatch::execute_dispatch_event(self, node, event_type, init)
    }

    fn is_visible(&self, node: NodeId) -> bool {
        perceiver_structural::is_visible(&self.dom.read(), node)
    }

    fn deep_element_from_point(&self, point: Point) -> Option<NodeId> {
        perceiver_structural::deep_element_from_point(&self.dom.read(), point)
    }

    fn preview_node(&self, node: NodeId) -> String {
        perceiver_structural::preview_node(&self.dom.read(), node)
    }

    fn element_border_width(&self, node: NodeId) -> BorderWidth {
        perceiver_structural::element_border_width(&self.dom.read(), node)
    }
}
