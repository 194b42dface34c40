//! Wait primitives - Readiness waits on a single node

use std::sync::Arc;

use inpage_dom::{Dom, NodeId, Visibility};
use inpage_scheduler::{Pacing, PollHandle, Progress};
use perceiver_structural::{button_target, is_disabled_for_actions, is_visible, StabilityWindow};
use tokio::time::Instant;
use tracing::{info, trace};

use super::{connected_element, settle, DISABLED, MOVING, NOT_VISIBLE};
use crate::{primitives::DefaultActionPrimitives, types::NodeStateOutcome};

pub(super) fn execute_wait_for_node_visible(
    primitives: &DefaultActionPrimitives,
    node: NodeId,
) -> PollHandle<NodeStateOutcome> {
    let dom = Arc::clone(primitives.dom());
    let handle = primitives.poller().poll_by_frame(move |progress, continuation| {
        let dom = dom.read();
        let outcome = match connected_element(&dom, node) {
            None => Some(NodeStateOutcome::NotConnected),
            Some(element) if is_visible(&dom, element) => Some(NodeStateOutcome::Done),
            Some(_) => {
                progress.log_repeating(NOT_VISIBLE);
                None
            }
        };
        Ok(settle(outcome, continuation))
    });
    info!(poll_id = %handle.id(), node = %node, "Executing wait_for_node_visible primitive");
    handle
}

/// Execute the stable-position wait
///
/// Frame-paced when `raf_count > 1`, otherwise paced by the configured
/// stable poll interval.
pub(super) fn execute_wait_for_stable(
    primitives: &DefaultActionPrimitives,
    node: NodeId,
    raf_count: u32,
) -> PollHandle<NodeStateOutcome> {
    let dom = Arc::clone(primitives.dom());
    let options = *primitives.options();
    let mut window = StabilityWindow::new(raf_count).with_min_frame_gap(options.min_frame_gap);
    let pacing = if raf_count > 1 {
        Pacing::Frame
    } else {
        Pacing::Interval(options.stable_poll_interval)
    };
    let handle = primitives.poller().spawn(pacing, move |progress, continuation| {
        let dom = dom.read();
        Ok(settle(stable_tick(&dom, progress, node, &mut window), continuation))
    });
    info!(
        poll_id = %handle.id(),
        node = %node,
        raf_count,
        ?pacing,
        "Executing wait_for_displayed_at_stable_position_and_enabled primitive"
    );
    handle
}

fn stable_tick(
    dom: &Dom,
    progress: &Progress,
    node: NodeId,
    window: &mut StabilityWindow,
) -> Option<NodeStateOutcome> {
    if !window.begin_tick() {
        return None;
    }
    let Some(element) = connected_element(dom, node) else {
        return Some(NodeStateOutcome::NotConnected);
    };
    let rect = dom.bounding_rect(element).unwrap_or_default();
    let Some(sample) = window.observe(Instant::now(), rect) else {
        trace!(node = %node, "frame inside the minimum gap skipped");
        return None;
    };

    let displayed = rect.has_area();
    let visible = dom.computed_visibility(element) != Visibility::Hidden;
    let disabled = is_disabled_for_actions(dom, button_target(dom, element));
    if displayed && visible && sample.stable && !disabled {
        return Some(NodeStateOutcome::Done);
    }

    if !displayed || !visible {
        progress.log_repeating(NOT_VISIBLE);
    } else if !sample.stable_for_logs {
        progress.log_repeating(MOVING);
    } else if disabled {
        progress.log_repeating(DISABLED);
    }
    None
}
