//! Fill primitive - Prepare a form control for typing

use std::sync::Arc;

use inpage_dom::{Dom, DomResult, NodeId};
use inpage_scheduler::{PollHandle, Progress};
use perceiver_structural::is_visible;
use tracing::{debug, info};

use super::{dispatch::notify, select_text::select_all_text, settle, DISABLED, NOT_VISIBLE, READONLY};
use crate::{primitives::DefaultActionPrimitives, types::FillOutcome};

const TEXT_INPUT_TYPES: [&str; 8] = ["", "email", "number", "password", "search", "tel", "text", "url"];

const DATE_INPUT_TYPES: [&str; 6] = ["date", "time", "datetime", "datetime-local", "month", "week"];

/// Execute fill primitive
///
/// Text controls and content-editable elements get their text selected and
/// focus, settling with `needsinput` so the driver types `value`. Date-like
/// inputs are assigned `value` directly and settle with `done`.
pub(super) fn execute_fill(
    primitives: &DefaultActionPrimitives,
    node: NodeId,
    value: &str,
) -> PollHandle<FillOutcome> {
    let dom = Arc::clone(primitives.dom());
    let value = value.to_string();
    let handle = primitives.poller().poll_by_frame(move |progress, continuation| {
        let mut dom = dom.write();
        Ok(settle(fill_tick(&mut dom, progress, node, &value)?, continuation))
    });
    info!(poll_id = %handle.id(), node = %node, "Executing fill primitive");
    handle
}

fn fill_tick(
    dom: &mut Dom,
    progress: &Progress,
    node: NodeId,
    value: &str,
) -> DomResult<Option<FillOutcome>> {
    if !dom.is_element(node) {
        return Ok(Some(FillOutcome::NotElement));
    }
    if !dom.is_connected(node) {
        return Ok(Some(FillOutcome::NotConnected));
    }
    if !is_visible(dom, node) {
        progress.log_repeating(NOT_VISIBLE);
        return Ok(None);
    }

    let tag = dom.tag_name(node).map(str::to_owned);
    match tag.as_deref() {
        Some("input") => {
            let input_type = dom.input_type(node).unwrap_or_default();
            let is_date = DATE_INPUT_TYPES.contains(&input_type.as_str());
            if !is_date && !TEXT_INPUT_TYPES.contains(&input_type.as_str()) {
                progress.log(format!("    input of type \"{input_type}\" cannot be filled"));
                return Ok(Some(FillOutcome::NotFillableInputType));
            }
            if input_type == "number" && !is_numeric(value.trim()) {
                return Ok(Some(FillOutcome::NotFillableNumberInput));
            }
            if let Some(waiting) = editable_gap(dom, node) {
                progress.log_repeating(waiting);
                return Ok(None);
            }
            if is_date {
                return fill_date(dom, node, value.trim()).map(Some);
            }
        }
        Some("textarea") => {
            if let Some(waiting) = editable_gap(dom, node) {
                progress.log_repeating(waiting);
                return Ok(None);
            }
        }
        _ if !dom.is_content_editable(node) => {
            return Ok(Some(FillOutcome::NotFillableElement));
        }
        _ => {}
    }

    select_all_text(dom, node)?;
    Ok(Some(FillOutcome::NeedsInput))
}

/// Why a control cannot take input yet
fn editable_gap(dom: &Dom, node: NodeId) -> Option<&'static str> {
    if dom.is_disabled(node) {
        Some(DISABLED)
    } else if dom.is_readonly(node) {
        Some(READONLY)
    } else {
        None
    }
}

/// Assign a date-like value; the control must keep it verbatim
fn fill_date(dom: &mut Dom, node: NodeId, value: &str) -> DomResult<FillOutcome> {
    dom.focus(node);
    dom.set_value(node, value)?;
    if dom.value(node) != Some(value) {
        debug!(node = %node, value, "date value rejected by the control");
        return Ok(FillOutcome::NotValidDate);
    }
    notify(dom, node, "input");
    notify(dom, node, "change");
    Ok(FillOutcome::Done)
}

/// Would the text convert to a number (not NaN)? Empty text converts to zero.
fn is_numeric(text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
        }
    }
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return true;
    }
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') && unsigned.parse::<f64>().is_ok()
}
