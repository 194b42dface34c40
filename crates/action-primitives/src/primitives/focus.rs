//! Focus primitive - Move focus to a node

use std::sync::Arc;

use inpage_dom::{Dom, DomResult, NodeId};
use inpage_scheduler::{PollHandle, Tick};
use tracing::info;

use crate::{primitives::DefaultActionPrimitives, types::FocusOutcome};

pub(super) fn execute_focus(
    primitives: &DefaultActionPrimitives,
    node: NodeId,
    reset_selection_if_not_focused: bool,
) -> PollHandle<FocusOutcome> {
    let dom = Arc::clone(primitives.dom());
    let handle = primitives.poller().poll_by_frame(move |_progress, _continuation| {
        let outcome = focus_tick(&mut dom.write(), node, reset_selection_if_not_focused)?;
        Ok(Tick::Done(outcome))
    });
    info!(
        poll_id = %handle.id(),
        node = %node,
        reset_selection_if_not_focused,
        "Executing focus_node primitive"
    );
    handle
}

fn focus_tick(dom: &mut Dom, node: NodeId, reset_selection: bool) -> DomResult<FocusOutcome> {
    if !dom.is_connected(node) {
        return Ok(FocusOutcome::NotConnected);
    }
    if !dom.is_element(node) {
        return Ok(FocusOutcome::NotElement);
    }
    let was_focused = dom.active_element() == Some(node);
    dom.focus(node);
    if reset_selection && !was_focused && dom.tag_name(node) == Some("input") {
        dom.set_selection_range(node, 0, 0)?;
    }
    Ok(FocusOutcome::Done)
}
