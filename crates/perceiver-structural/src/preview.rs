//! One-line node previews for progress logs and error messages

use inpage_dom::{Dom, NodeId, NodeKind};

const BOOLEAN_ATTRIBUTES: [&str; 5] = ["checked", "selected", "disabled", "readonly", "multiple"];

const AUTO_CLOSING_TAGS: [&str; 17] = [
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "menuitem", "meta", "param", "source", "track", "wbr",
];

const MAX_CHUNK: usize = 50;

/// Render a short, single-line, HTML-like description of `node`
pub fn preview_node(dom: &Dom, node: NodeId) -> String {
    let element = match dom.kind(node) {
        Some(NodeKind::Text(data)) => return one_line(&format!("#text={data}")),
        Some(NodeKind::Element(element)) => element,
        _ => return one_line(&format!("<{} />", dom.node_name(node).to_lowercase())),
    };

    let mut attrs: Vec<String> = element
        .attrs
        .iter()
        .filter(|(name, _)| name != "style")
        .map(|(name, value)| {
            if value.is_empty() && BOOLEAN_ATTRIBUTES.contains(&name.as_str()) {
                format!(" {name}")
            } else {
                format!(" {name}=\"{value}\"")
            }
        })
        .collect();
    attrs.sort_by_key(|attr| attr.chars().count());
    let attr_text = truncate(attrs.concat());

    let tag = element.tag_name.as_str();
    if AUTO_CLOSING_TAGS.contains(&tag) {
        return one_line(&format!("<{tag}{attr_text}/>"));
    }

    let children = dom.children(node);
    let only_text = children.len() <= 5 && children.iter().all(|child| dom.is_text(*child));
    let text = if only_text {
        dom.text_content(node)
    } else if children.is_empty() {
        String::new()
    } else {
        "\u{2026}".to_string()
    };
    one_line(&format!("<{tag}{attr_text}>{}</{tag}>", truncate(text)))
}

fn truncate(text: String) -> String {
    if text.chars().count() > MAX_CHUNK {
        let mut cut: String = text.chars().take(MAX_CHUNK - 1).collect();
        cut.push('\u{2026}');
        cut
    } else {
        text
    }
}

/// Newlines become `↵`, tabs `⇆`
pub fn one_line(text: &str) -> String {
    text.replace('\n', "\u{21b5}").replace('\t', "\u{21c6}")
}
