//! Arena-backed document tree
//!
//! Nodes are never freed: removing a node only detaches it, so a [`NodeId`]
//! handed to a driver stays valid (and reports `is_connected() == false`).

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::trace;

use crate::errors::{DomError, DomResult};
use crate::events::{DomEvent, EventKind};
use crate::geometry::{BorderWidth, Point, Rect};
use crate::node::{Element, Node, NodeId, NodeKind, Visibility};

/// A document shared between the driver and running polls
pub type SharedDom = Arc<RwLock<Dom>>;

#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
    has_view: bool,
    pub(crate) active_element: Option<NodeId>,
    pub(crate) range_selection: Option<NodeId>,
    events: Vec<DomEvent>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
            document: NodeId(0),
            has_view: true,
            active_element: None,
            range_selection: None,
            events: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedDom {
        Arc::new(RwLock::new(self))
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    /// Whether the document is rendered in a window. Documents without a view
    /// have no computed style and every element counts as visible.
    pub fn has_view(&self) -> bool {
        self.has_view
    }

    pub fn set_has_view(&mut self, has_view: bool) {
        self.has_view = has_view;
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn try_node(&self, id: NodeId) -> DomResult<&Node> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn try_node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn try_element_mut(&mut self, id: NodeId) -> DomResult<&mut Element> {
        match &mut self.try_node_mut(id)?.kind {
            NodeKind::Element(element) => Ok(element),
            _ => Err(DomError::NotAnElement(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text(_)))
    }

    /// Character data of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(data)) => Some(data),
            _ => None,
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag_name)))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.push(NodeKind::Text(data.to_string()))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.push(NodeKind::Comment(data.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        match &self.try_node(parent)?.kind {
            NodeKind::Text(_) | NodeKind::Comment(_) => return Err(DomError::NotAContainer(parent)),
            _ => {}
        }
        match &self.try_node(child)?.kind {
            NodeKind::Document | NodeKind::ShadowRoot { .. } => {
                return Err(DomError::InvalidHierarchy { parent, child })
            }
            _ => {}
        }
        if self.is_shadow_including_inclusive_ancestor(child, parent) {
            return Err(DomError::InvalidHierarchy { parent, child });
        }

        self.remove(child)?;
        self.try_node_mut(child)?.parent = Some(parent);
        self.try_node_mut(parent)?.children.push(child);
        Ok(())
    }

    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: &[(&str, &str)],
    ) -> DomResult<NodeId> {
        let id = self.create_element(tag_name);
        for (name, value) in attrs {
            self.set_attribute(id, name, value)?;
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    pub fn append_text(&mut self, parent: NodeId, data: &str) -> DomResult<NodeId> {
        let id = self.create_text(data);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Detach a node from its parent. Detached nodes keep their subtree.
    pub fn remove(&mut self, id: NodeId) -> DomResult<()> {
        let Some(parent) = self.try_node(id)?.parent else {
            return Ok(());
        };
        self.try_node_mut(parent)?.children.retain(|child| *child != id);
        self.try_node_mut(id)?.parent = None;
        if self.active_element.is_some_and(|active| !self.is_connected(active)) {
            self.active_element = None;
        }
        Ok(())
    }

    pub fn attach_shadow(&mut self, host: NodeId) -> DomResult<NodeId> {
        if self.try_element_mut(host)?.shadow_root.is_some() {
            return Err(DomError::ShadowRootExists(host));
        }
        let root = self.push(NodeKind::ShadowRoot { host });
        self.try_element_mut(host)?.shadow_root = Some(root);
        Ok(root)
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.element(host).and_then(|element| element.shadow_root)
    }

    /// Host of a shadow root, `None` for every other node
    pub fn shadow_host(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            Some(NodeKind::ShadowRoot { host }) => Some(*host),
            _ => None,
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> DomResult<()> {
        let element = self.try_element_mut(id)?;
        let name = name.to_ascii_lowercase();
        match element.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element.attrs.push((name.clone(), value.to_string())),
        }
        if name == "value" && element.is("input") {
            element.value = value.to_string();
        }
        if name == "selected" && element.is("option") {
            element.selected = true;
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> DomResult<()> {
        let element = self.try_element_mut(id)?;
        element.attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        Ok(())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Place the element in layout. `None` removes it from layout.
    pub fn set_rect(&mut self, id: NodeId, rect: Option<Rect>) -> DomResult<()> {
        self.try_element_mut(id)?.layout = rect;
        Ok(())
    }

    pub fn bounding_rect(&self, id: NodeId) -> Option<Rect> {
        self.element(id).and_then(|element| element.layout)
    }

    pub fn set_visibility(&mut self, id: NodeId, visibility: Option<Visibility>) -> DomResult<()> {
        self.try_element_mut(id)?.style.visibility = visibility;
        Ok(())
    }

    pub fn set_border_width(&mut self, id: NodeId, border: BorderWidth) -> DomResult<()> {
        let style = &mut self.try_element_mut(id)?.style;
        style.border_left_width = border.left;
        style.border_top_width = border.top;
        Ok(())
    }

    /// Inherited `visibility`, resolved through the composed tree
    pub fn computed_visibility(&self, id: NodeId) -> Visibility {
        let mut current = if self.is_element(id) {
            Some(id)
        } else {
            self.parent_element_or_shadow_host(id)
        };
        while let Some(node) = current {
            if let Some(visibility) = self.element(node).and_then(|el| el.style.visibility) {
                return visibility;
            }
            current = self.parent_element_or_shadow_host(node);
        }
        Visibility::Visible
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or_default()
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.is_element(*parent))
    }

    /// Parent element, or the shadow host when the parent is a shadow root
    pub fn parent_element_or_shadow_host(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        if self.is_element(parent) {
            return Some(parent);
        }
        self.shadow_host(parent)
    }

    /// Root of the tree the node lives in: the document, a shadow root, or
    /// the top of a detached subtree.
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    pub fn is_shadow_including_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id).or_else(|| self.shadow_host(id));
        }
        false
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node(id).is_some() && self.is_shadow_including_inclusive_ancestor(self.document, id)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag_name.as_str())
    }

    /// `Node.nodeName`: upper-cased tag for elements, `#text` style names otherwise
    pub fn node_name(&self, id: NodeId) -> String {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => element.tag_name.to_ascii_uppercase(),
            Some(NodeKind::Text(_)) => "#text".to_string(),
            Some(NodeKind::Comment(_)) => "#comment".to_string(),
            Some(NodeKind::Document) => "#document".to_string(),
            Some(NodeKind::ShadowRoot { .. }) => "#document-fragment".to_string(),
            None => String::new(),
        }
    }

    /// Nearest inclusive ancestor element matching `predicate`. Does not leave
    /// the node's tree.
    pub fn closest(&self, id: NodeId, predicate: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut current = if self.is_element(id) {
            Some(id)
        } else {
            self.parent_element(id)
        };
        while let Some(node) = current {
            if self.element(node).is_some_and(&predicate) {
                return Some(node);
            }
            current = self.parent_element(node);
        }
        None
    }

    /// Concatenated data of all descendant text nodes (light tree only)
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(data)) => out.push_str(data),
            Some(NodeKind::Comment(_)) | None => {}
            Some(_) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Data of the node's direct text children
    pub fn own_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|child| self.text(*child))
            .collect()
    }

    /// Descendant elements of `root` (exclusive) in tree order. With
    /// `pierce_shadow`, an element's shadow tree is visited right after the
    /// element and before its light children.
    pub fn descendant_elements(&self, root: NodeId, pierce_shadow: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(root, pierce_shadow, &mut out);
        out
    }

    fn collect_descendants(&self, node: NodeId, pierce_shadow: bool, out: &mut Vec<NodeId>) {
        if pierce_shadow {
            if let Some(shadow) = self.shadow_root(node) {
                for child in self.children(shadow) {
                    self.collect_inclusive(*child, pierce_shadow, out);
                }
            }
        }
        for child in self.children(node) {
            self.collect_inclusive(*child, pierce_shadow, out);
        }
    }

    fn collect_inclusive(&self, node: NodeId, pierce_shadow: bool, out: &mut Vec<NodeId>) {
        if self.is_element(node) {
            out.push(node);
        }
        self.collect_descendants(node, pierce_shadow, out);
    }

    /// `DocumentOrShadowRoot.elementFromPoint`: the topmost rendered element
    /// under `point`, retargeted into the scope of `container`.
    pub fn element_from_point(&self, container: NodeId, point: Point) -> Option<NodeId> {
        if !self.has_view {
            return None;
        }
        let hit = self
            .descendant_elements(self.document, true)
            .into_iter()
            .filter(|id| self.is_hit_testable(*id, point))
            .last()?;
        Some(self.retarget(hit, container))
    }

    fn is_hit_testable(&self, id: NodeId, point: Point) -> bool {
        let Some(rect) = self.bounding_rect(id) else {
            return false;
        };
        rect.contains(point) && self.computed_visibility(id) == Visibility::Visible
    }

    /// Retarget `node` against `scope`: climb out of every shadow tree that
    /// does not contain `scope`.
    pub fn retarget(&self, node: NodeId, scope: NodeId) -> NodeId {
        let mut current = node;
        loop {
            let root = self.tree_root(current);
            match self.shadow_host(root) {
                Some(host) if !self.is_shadow_including_inclusive_ancestor(root, scope) => {
                    current = host;
                }
                _ => return current,
            }
        }
    }

    /// Record a synthetic event. The caller supplies the complete init dict.
    pub fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: &str,
        init: Map<String, Value>,
    ) -> EventKind {
        let kind = EventKind::classify(event_type);
        trace!(target = %target, event_type, kind = kind.name(), "dispatch event");
        self.events.push(DomEvent {
            target,
            event_type: event_type.to_string(),
            kind,
            init,
        });
        kind
    }

    pub fn events(&self) -> &[DomEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.events)
    }

    /// Event types recorded for `target`, in dispatch order
    pub fn event_types_for(&self, target: NodeId) -> Vec<&str> {
        self.events
            .iter()
            .filter(|event| event.target == target)
            .map(|event| event.event_type.as_str())
            .collect()
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
