//! Select-text primitive - Select the text of a control and focus it

use std::sync::Arc;

use inpage_dom::{Dom, DomResult, NodeId};
use inpage_scheduler::{PollHandle, Progress};
use perceiver_structural::is_visible;
use tracing::info;

use super::{connected_element, settle, NOT_VISIBLE};
use crate::{primitives::DefaultActionPrimitives, types::SelectTextOutcome};

pub(super) fn execute_select_text(
    primitives: &DefaultActionPrimitives,
    node: NodeId,
) -> PollHandle<SelectTextOutcome> {
    let dom = Arc::clone(primitives.dom());
    let handle = primitives.poller().poll_by_frame(move |progress, continuation| {
        let mut dom = dom.write();
        Ok(settle(select_text_tick(&mut dom, progress, node)?, continuation))
    });
    info!(poll_id = %handle.id(), node = %node, "Executing select_text primitive");
    handle
}

fn select_text_tick(
    dom: &mut Dom,
    progress: &Progress,
    node: NodeId,
) -> DomResult<Option<SelectTextOutcome>> {
    let Some(element) = connected_element(dom, node) else {
        return Ok(Some(SelectTextOutcome::NotConnected));
    };
    if !is_visible(dom, element) {
        progress.log_repeating(NOT_VISIBLE);
        return Ok(None);
    }
    select_all_text(dom, element)?;
    Ok(Some(SelectTextOutcome::Done))
}

/// Select everything the user could replace by typing, then focus
pub(super) fn select_all_text(dom: &mut Dom, element: NodeId) -> DomResult<()> {
    let tag = dom.tag_name(element).map(str::to_owned);
    match tag.as_deref() {
        Some("input") => dom.select(element)?,
        Some("textarea") => {
            let len = dom.value(element).map_or(0, |value| value.chars().count());
            dom.set_selection_range(element, 0, len)?;
        }
        _ => dom.select_node_contents(element),
    }
    dom.focus(element);
    Ok(())
}
