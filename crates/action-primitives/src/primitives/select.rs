//! Select primitive - Choose options of a `<select>`

use std::sync::Arc;

use inpage_dom::{Dom, DomResult, NodeId};
use inpage_scheduler::{PollHandle, Progress};
use perceiver_structural::is_visible;
use tracing::{debug, info};

use super::{dispatch::notify, settle, DISABLED, NOT_VISIBLE};
use crate::{
    primitives::DefaultActionPrimitives,
    types::{OptionSelector, SelectOptionsOutcome},
};

/// Execute select primitive
///
/// Clears the current selection, then selects every option matched by any
/// of `options` in option order. A single-select stops at its first match.
pub(super) fn execute_select_options(
    primitives: &DefaultActionPrimitives,
    node: NodeId,
    options: Vec<OptionSelector>,
) -> PollHandle<SelectOptionsOutcome> {
    let dom = Arc::clone(primitives.dom());
    let requested = options.len();
    let handle = primitives.poller().poll_by_frame(move |progress, continuation| {
        let mut dom = dom.write();
        Ok(settle(
            select_options_tick(&mut dom, progress, node, &options)?,
            continuation,
        ))
    });
    info!(
        poll_id = %handle.id(),
        node = %node,
        requested,
        "Executing select_options primitive"
    );
    handle
}

fn select_options_tick(
    dom: &mut Dom,
    progress: &Progress,
    node: NodeId,
    selectors: &[OptionSelector],
) -> DomResult<Option<SelectOptionsOutcome>> {
    if dom.tag_name(node) != Some("select") {
        return Ok(Some(SelectOptionsOutcome::NotSelect));
    }
    if !dom.is_connected(node) {
        return Ok(Some(SelectOptionsOutcome::NotConnected));
    }
    if !is_visible(dom, node) {
        progress.log_repeating(NOT_VISIBLE);
        return Ok(None);
    }
    if dom.is_disabled(node) {
        progress.log_repeating(DISABLED);
        return Ok(None);
    }

    let options = dom.options(node);
    let multiple = dom.is_multiple(node);
    for option in &options {
        dom.set_selected(*option, false)?;
    }
    for (index, option) in options.iter().enumerate() {
        let matched = selectors
            .iter()
            .any(|selector| option_matches(dom, selector, *option, index));
        if matched {
            dom.set_selected(*option, true)?;
            if !multiple {
                break;
            }
        }
    }

    notify(dom, node, "input");
    notify(dom, node, "change");
    let values: Vec<String> = options
        .iter()
        .filter(|option| dom.is_selected(**option))
        .map(|option| dom.option_value(*option))
        .collect();
    debug!(node = %node, ?values, "options selected");
    Ok(Some(SelectOptionsOutcome::Selected(values)))
}

fn option_matches(dom: &Dom, selector: &OptionSelector, option: NodeId, index: usize) -> bool {
    match selector {
        OptionSelector::Node(node) => *node == option,
        OptionSelector::Criteria(criteria) => {
            criteria
                .value
                .as_ref()
                .map_or(true, |value| *value == dom.option_value(option))
                && criteria
                    .label
                    .as_ref()
                    .map_or(true, |label| *label == dom.option_label(option))
                && criteria.index.map_or(true, |wanted| wanted == index)
        }
    }
}
