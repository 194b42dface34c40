//! The contract every query engine implements

use inpage_dom::{Dom, NodeId, NodeKind};

use crate::errors::EngineResult;

/// A node a selector can be evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorRoot {
    Document(NodeId),
    Element(NodeId),
    ShadowRoot(NodeId),
}

impl SelectorRoot {
    /// Classify a node as a query root. Text, comment and unknown nodes
    /// cannot be queried.
    pub fn from_node(dom: &Dom, id: NodeId) -> Option<Self> {
        match dom.kind(id)? {
            NodeKind::Document => Some(SelectorRoot::Document(id)),
            NodeKind::Element(_) => Some(SelectorRoot::Element(id)),
            NodeKind::ShadowRoot { .. } => Some(SelectorRoot::ShadowRoot(id)),
            NodeKind::Text(_) | NodeKind::Comment(_) => None,
        }
    }

    pub fn node(&self) -> NodeId {
        match self {
            SelectorRoot::Document(id) | SelectorRoot::Element(id) | SelectorRoot::ShadowRoot(id) => {
                *id
            }
        }
    }
}

/// Resolves a selector body against a root.
///
/// Built-in and custom engines share this one contract. Engines see the
/// document read-only and must return matches in document order.
pub trait QueryEngine: Send + Sync {
    /// First match, or `None`
    fn query(&self, dom: &Dom, root: SelectorRoot, body: &str) -> EngineResult<Option<NodeId>> {
        Ok(self.query_all(dom, root, body)?.into_iter().next())
    }

    /// Every match, in document order
    fn query_all(&self, dom: &Dom, root: SelectorRoot, body: &str) -> EngineResult<Vec<NodeId>>;
}

/// Elements under `root` an engine may return, in document order
pub(crate) fn scope_elements(dom: &Dom, root: SelectorRoot, pierce_shadow: bool) -> Vec<NodeId> {
    dom.descendant_elements(root.node(), pierce_shadow)
}

/// Strip one pair of matching single or double quotes
pub(crate) fn unquote(body: &str) -> &str {
    let body = body.trim();
    for quote in ['"', '\''] {
        if body.len() >= 2 && body.starts_with(quote) && body.ends_with(quote) {
            return &body[1..body.len() - 1];
        }
    }
    body
}
