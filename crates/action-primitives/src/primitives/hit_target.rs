//! Hit-target primitive - Would a pointer event land on the node

use std::sync::Arc;

use inpage_dom::{NodeId, Point};
use inpage_scheduler::{PollHandle, Tick};
use perceiver_structural::{check_hit_target_at, HitTargetOutcome};
use tracing::info;

use crate::primitives::DefaultActionPrimitives;

pub(super) fn execute_check_hit_target(
    primitives: &DefaultActionPrimitives,
    node: NodeId,
    point: Point,
) -> PollHandle<HitTargetOutcome> {
    let dom = Arc::clone(primitives.dom());
    let handle = primitives.poller().poll_by_frame(move |_progress, _continuation| {
        Ok(Tick::Done(check_hit_target_at(&dom.read(), node, point)))
    });
    info!(
        poll_id = %handle.id(),
        node = %node,
        x = point.x,
        y = point.y,
        "Executing check_hit_target_at primitive"
    );
    handle
}
