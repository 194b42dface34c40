//! Dispatch primitive - Synthesize a DOM event

use std::sync::Arc;

use inpage_dom::{Dom, EventKind, NodeId};
use inpage_scheduler::{PollHandle, Tick};
use serde_json::{Map, Value};
use tracing::info;

use crate::primitives::DefaultActionPrimitives;

/// Dispatch `event_type` on `node` in a single tick.
///
/// `bubbles`, `cancelable` and `composed` default to `true`; fields of
/// `init` override them. Settles with the event interface used.
pub(super) fn execute_dispatch_event(
    primitives: &DefaultActionPrimitives,
    node: NodeId,
    event_type: &str,
    init: Map<String, Value>,
) -> PollHandle<EventKind> {
    let dom = Arc::clone(primitives.dom());
    let event_type = event_type.to_string();
    let init = with_default_flags(init);
    let logged_type = event_type.clone();
    let handle = primitives.poller().poll_by_frame(move |_progress, _continuation| {
        let kind = dom.write().dispatch_event(node, &event_type, init.clone());
        Ok(Tick::Done(kind))
    });
    info!(
        poll_id = %handle.id(),
        node = %node,
        event_type = %logged_type,
        "Executing dispatch_event primitive"
    );
    handle
}

fn with_default_flags(init: Map<String, Value>) -> Map<String, Value> {
    let mut merged = Map::new();
    for flag in ["bubbles", "cancelable", "composed"] {
        merged.insert(flag.to_string(), Value::Bool(true));
    }
    merged.extend(init);
    merged
}

/// Fire a plain bubbling notification such as `input` or `change`
pub(super) fn notify(dom: &mut Dom, node: NodeId, event_type: &str) {
    let mut init = Map::new();
    init.insert("bubbles".to_string(), Value::Bool(true));
    dom.dispatch_event(node, event_type, init);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn caller_fields_win_over_defaults() {
        let init = json!({ "bubbles": false, "clientX": 10 });
        let merged = with_default_flags(init.as_object().cloned().unwrap());
        assert_eq!(merged["bubbles"], json!(false));
        assert_eq!(merged["cancelable"], json!(true));
        assert_eq!(merged["composed"], json!(true));
        assert_eq!(merged["clientX"], json!(10));
    }
}
