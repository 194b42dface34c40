use inpage_dom::{BorderWidth, Dom, NodeId, Visibility};

/// Elements an action targets through their nearest button-like ancestor
pub fn button_target(dom: &Dom, element: NodeId) -> NodeId {
    dom.closest(element, |el| {
        el.is("button") || el.attribute("role") == Some("button")
    })
    .unwrap_or(element)
}

/// Rendered and not `visibility: hidden`. Documents without a view have no
/// computed style; every element in them counts as visible.
pub fn is_visible(dom: &Dom, element: NodeId) -> bool {
    if !dom.has_view() {
        return true;
    }
    if dom.computed_visibility(element) == Visibility::Hidden {
        return false;
    }
    dom.bounding_rect(element).is_some_and(|rect| rect.has_area())
}

/// Only native controls honour `disabled` for pointer actions
pub fn is_disabled_for_actions(dom: &Dom, element: NodeId) -> bool {
    let native_control = dom
        .tag_name(element)
        .is_some_and(|tag| matches!(tag, "button" | "input" | "select"));
    native_control && dom.has_attribute(element, "disabled")
}

/// Computed left/top border widths, zero for non-elements
pub fn element_border_width(dom: &Dom, node: NodeId) -> BorderWidth {
    match dom.element(node) {
        Some(element) if dom.has_view() => BorderWidth {
            left: element.style.border_left_width,
            top: element.style.border_top_width,
        },
        _ => BorderWidth::default(),
    }
}
