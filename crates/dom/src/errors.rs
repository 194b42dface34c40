//! Error types for the host document model

use thiserror::Error;

use crate::node::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The id does not name a node of this document
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// The operation needs an element
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// Text and comment nodes cannot hold children
    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),

    /// Appending would create a cycle or move the document node
    #[error("Cannot insert {child} under {parent}")]
    InvalidHierarchy { parent: NodeId, child: NodeId },

    /// `attach_shadow` on a host that already has one
    #[error("Element {0} already hosts a shadow root")]
    ShadowRootExists(NodeId),
}

pub type DomResult<T> = Result<T, DomError>;
