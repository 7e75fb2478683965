use super::error::TreeError;
use crate::services::source::ConceptHandle;
use std::fmt;

/// Identifier of a concept in the tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

/// A concept shown in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Unique identifier
    pub id: NodeId,
    /// Text shown for the node
    pub label: String,
    /// Parent node ID (None for roots), used for lookup only
    pub parent: Option<NodeId>,
}

impl TreeNode {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent,
        }
    }

    /// Build a node from a source handle
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::MalformedNode`] if the handle has no identifier.
    pub fn from_handle(handle: ConceptHandle, parent: Option<NodeId>) -> Result<Self, TreeError> {
        if handle.identifier.trim().is_empty() {
            return Err(TreeError::MalformedNode(format!(
                "handle {:?} has no identifier",
                handle.display_label.as_deref().unwrap_or("")
            )));
        }

        let label = handle.ui_label();
        Ok(Self {
            id: NodeId(handle.identifier),
            label,
            parent,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Expansion state of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Collapsed,
    Expanded,
}
