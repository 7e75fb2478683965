use super::error::TreeError;
use super::node::{NodeId, TreeNode};
use crate::config::Preferences;
use crate::services::source::{ConceptHandle, HierarchySource, KnowledgeBaseRef};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Lazily fetches tree nodes from a hierarchy source
///
/// Holds no state besides the source and the knowledge base scope: every
/// call goes to the source, which stays the source of truth.
#[derive(Clone)]
pub struct ConceptTreeProvider {
    source: Arc<dyn HierarchySource>,
    scope: KnowledgeBaseRef,
}

impl fmt::Debug for ConceptTreeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConceptTreeProvider")
            .field("source", &"<dyn HierarchySource>")
            .field("scope", &self.scope)
            .finish()
    }
}

impl ConceptTreeProvider {
    pub fn new(source: Arc<dyn HierarchySource>, scope: KnowledgeBaseRef) -> Self {
        Self { source, scope }
    }

    pub fn scope(&self) -> &KnowledgeBaseRef {
        &self.scope
    }

    /// Top-level nodes visible under `preferences`
    pub fn roots(&self, preferences: &Preferences) -> Result<Vec<TreeNode>, TreeError> {
        let handles = self
            .source
            .list_roots(&self.scope, preferences.show_all_concepts)?;
        tracing::debug!("Fetched {} root concepts of {}", handles.len(), self.scope.id);
        into_nodes(handles, None)
    }

    /// Direct children of `node` visible under `preferences`
    pub fn children(
        &self,
        node: &TreeNode,
        preferences: &Preferences,
    ) -> Result<Vec<TreeNode>, TreeError> {
        let handles = self.source.list_children(
            &self.scope,
            node.id.as_str(),
            preferences.show_all_concepts,
        )?;
        tracing::debug!("Fetched {} children of {}", handles.len(), node.id);
        into_nodes(handles, Some(&node.id))
    }

    /// Whether `node` has at least one child visible under `preferences`
    pub fn has_children(
        &self,
        node: &TreeNode,
        preferences: &Preferences,
    ) -> Result<bool, TreeError> {
        Ok(self.source.has_children(
            &self.scope,
            node.id.as_str(),
            preferences.show_all_concepts,
        )?)
    }
}

fn into_nodes(
    handles: Vec<ConceptHandle>,
    parent: Option<&NodeId>,
) -> Result<Vec<TreeNode>, TreeError> {
    let mut seen = HashSet::with_capacity(handles.len());
    handles
        .into_iter()
        .map(|handle| {
            let node = TreeNode::from_handle(handle, parent.cloned())?;
            if !seen.insert(node.id.clone()) {
                return Err(TreeError::DuplicateNode(node.id));
            }
            Ok(node)
        })
        .collect()
}
