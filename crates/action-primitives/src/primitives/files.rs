//! Files primitive - Replace the file list of a file input

use std::sync::Arc;

use inpage_dom::{Dom, NodeId};
use inpage_scheduler::{PollHandle, Tick};
use tracing::{debug, info};

use super::dispatch::notify;
use crate::{
    errors::ActionError,
    primitives::DefaultActionPrimitives,
    types::{FilePayload, SetInputFilesOutcome},
};

/// Execute set_input_files primitive
///
/// Every payload is decoded before the file list is touched; a payload that
/// is not valid base64 rejects the poll and leaves the input unchanged.
pub(super) fn execute_set_input_files(
    primitives: &DefaultActionPrimitives,
    node: NodeId,
    payloads: Vec<FilePayload>,
) -> PollHandle<SetInputFilesOutcome> {
    let dom = Arc::clone(primitives.dom());
    let count = payloads.len();
    let handle = primitives.poller().poll_by_frame(move |_progress, _continuation| {
        let outcome = set_input_files_tick(&mut dom.write(), node, &payloads)?;
        Ok(Tick::Done(outcome))
    });
    info!(
        poll_id = %handle.id(),
        node = %node,
        files = count,
        "Executing set_input_files primitive"
    );
    handle
}

fn set_input_files_tick(
    dom: &mut Dom,
    node: NodeId,
    payloads: &[FilePayload],
) -> Result<SetInputFilesOutcome, ActionError> {
    if !dom.is_element(node) {
        return Ok(SetInputFilesOutcome::NotElement);
    }
    if dom.tag_name(node) != Some("input") {
        return Ok(SetInputFilesOutcome::NotInput);
    }
    if dom.input_type(node).as_deref() != Some("file") {
        return Ok(SetInputFilesOutcome::NotFileInput);
    }
    if !dom.is_connected(node) {
        return Ok(SetInputFilesOutcome::NotConnected);
    }

    let files = payloads
        .iter()
        .map(FilePayload::decode)
        .collect::<Result<Vec<_>, _>>()?;
    debug!(node = %node, files = files.len(), "replacing file list");
    dom.set_files(node, files)?;
    notify(dom, node, "input");
    notify(dom, node, "change");
    Ok(SetInputFilesOutcome::Done)
}
