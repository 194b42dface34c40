//! Node arena types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Index of a node inside its [`Dom`](crate::Dom) arena.
///
/// Identity comparison of ids is identity comparison of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
    /// Open shadow root attached to `host`. Its `parent` is always `None`.
    ShadowRoot { host: NodeId },
}

/// CSS `visibility`. `None` on an element means "inherit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Visible,
    Hidden,
    Collapse,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    pub visibility: Option<Visibility>,
    pub border_left_width: f64,
    pub border_top_width: f64,
}

/// A file held by an `<input type=file>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileValue {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Element {
    /// Lower-cased tag name
    pub tag_name: String,
    pub attrs: Vec<(String, String)>,
    pub shadow_root: Option<NodeId>,
    /// `None` when the element does not take part in layout
    pub layout: Option<Rect>,
    pub style: ComputedStyle,
    /// Current value of a text control
    pub value: String,
    /// Selection inside a text control, in characters
    pub selection: Option<(usize, usize)>,
    /// Selectedness of an `<option>`
    pub selected: bool,
    pub files: Vec<FileValue>,
}

impl Element {
    pub(crate) fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: Vec::new(),
            shadow_root: None,
            layout: None,
            style: ComputedStyle::default(),
            value: String::new(),
            selection: None,
            selected: false,
            files: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag_name)
    }

    /// Whitespace-separated tokens of the `class` attribute
    pub fn class_list(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }
}
