use super::error::TreeError;
use super::events::{NotificationSink, Observers, TreeEvent};
use super::node::{NodeId, NodeState, TreeNode};
use super::provider::ConceptTreeProvider;
use super::selection::SelectionState;
use crate::config::{Preferences, TreeConfig};
use crate::namespace::NamespaceFilter;
use crate::services::source::{HierarchySource, KnowledgeBaseRef};
use std::collections::HashMap;
use std::sync::Arc;

/// Drives a concept tree: expansion, selection and preferences
///
/// The controller owns the selection state and the preferences of one
/// rendered tree. Interactions are handled one at a time through `&mut self`.
/// Source failures never escape as errors: the affected branch is empty and
/// observers receive a [`TreeEvent::Warning`].
#[derive(Debug)]
pub struct ConceptTreeController {
    provider: ConceptTreeProvider,
    selection: SelectionState,
    preferences: Preferences,
    filter: NamespaceFilter,
    /// Every node the provider has returned so far, by ID
    known: HashMap<NodeId, TreeNode>,
    observers: Observers,
}

impl ConceptTreeController {
    pub fn new(
        provider: ConceptTreeProvider,
        preferences: Preferences,
        filter: NamespaceFilter,
    ) -> Self {
        Self {
            provider,
            selection: SelectionState::new(),
            preferences,
            filter,
            known: HashMap::new(),
            observers: Observers::new(),
        }
    }

    /// Create a controller with preferences and namespaces taken from `config`
    pub fn from_config(
        source: Arc<dyn HierarchySource>,
        scope: KnowledgeBaseRef,
        config: &TreeConfig,
    ) -> Self {
        Self::new(
            ConceptTreeProvider::new(source, scope),
            config.preferences,
            config.namespace_filter(),
        )
    }

    pub fn subscribe(&mut self, sink: impl NotificationSink + 'static) {
        self.observers.subscribe(Box::new(sink));
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn scope(&self) -> &KnowledgeBaseRef {
        self.provider.scope()
    }

    /// Look up a node previously returned by the provider
    pub fn node(&self, id: &NodeId) -> Option<&TreeNode> {
        self.known.get(id)
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selection.selected()
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selection.is_selected(id)
    }

    /// Every node can be clicked, whatever its expansion state
    pub fn is_clickable(&self, _id: &NodeId) -> bool {
        true
    }

    pub fn is_expanded(&self, id: &NodeId) -> bool {
        self.selection.is_expanded(id)
    }

    pub fn node_state(&self, id: &NodeId) -> NodeState {
        if self.is_expanded(id) {
            NodeState::Expanded
        } else {
            NodeState::Collapsed
        }
    }

    pub fn label_of(&self, id: &NodeId) -> Option<&str> {
        self.known.get(id).map(|n| n.label.as_str())
    }

    /// Fetch the top-level nodes
    pub fn roots(&mut self) -> Result<Vec<TreeNode>, TreeError> {
        let result = self.provider.roots(&self.preferences);
        let roots = self.recover(result, "Listing root concepts")?;
        self.remember(&roots);
        Ok(roots)
    }

    /// Fetch the children of a known node
    pub fn children(&mut self, id: &NodeId) -> Result<Vec<TreeNode>, TreeError> {
        let node = self.known_node(id)?;
        self.fetch_children(&node)
    }

    /// Check whether a known node has children
    pub fn has_children(&mut self, id: &NodeId) -> Result<bool, TreeError> {
        let node = self.known_node(id)?;
        self.fetch_has_children(&node)
    }

    /// Expand a node and fetch its children
    ///
    /// Expanding an already expanded node keeps it expanded and fetches its
    /// children again. A node whose children cannot be built stays collapsed.
    pub fn expand(&mut self, id: &NodeId) -> Result<Vec<TreeNode>, TreeError> {
        let node = self.known_node(id)?;
        let children = self.fetch_children(&node)?;
        self.selection.set_expanded(id, true);
        tracing::debug!("Expanded {}", id);
        Ok(children)
    }

    /// Collapse a node
    ///
    /// Fetched children stay known and the selection is left alone, even
    /// when the selected node is hidden by the collapse.
    pub fn collapse(&mut self, id: &NodeId) {
        self.selection.set_expanded(id, false);
        tracing::debug!("Collapsed {}", id);
    }

    /// Expand if collapsed, collapse if expanded
    pub fn toggle(&mut self, id: &NodeId) -> Result<NodeState, TreeError> {
        if self.is_expanded(id) {
            self.collapse(id);
        } else {
            self.expand(id)?;
        }
        Ok(self.node_state(id))
    }

    /// Select a node and notify observers
    ///
    /// Emits exactly one [`TreeEvent::SelectionChanged`] carrying the previous
    /// and the new selection.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] if the provider never returned `id`.
    pub fn click(&mut self, id: &NodeId) -> Result<(), TreeError> {
        if !self.known.contains_key(id) {
            return Err(TreeError::UnknownNode(id.clone()));
        }

        let previous = self.selection.selected().cloned();
        self.selection.select(id);
        tracing::debug!("Selection changed from {:?} to {}", previous, id);
        self.observers.publish(&TreeEvent::SelectionChanged {
            previous,
            current: Some(id.clone()),
        });
        Ok(())
    }

    /// Replace the preferences
    ///
    /// If the new preferences hide the selected node (an implicit-namespace
    /// concept while "show all" is off), the selection is cleared and one
    /// [`TreeEvent::SelectionChanged`] to `None` fires. Otherwise no
    /// notification is sent and the tree simply re-renders.
    pub fn change_preferences(&mut self, preferences: Preferences) {
        let hides_selection = !preferences.show_all_concepts
            && self
                .selection
                .selected()
                .is_some_and(|id| self.filter.is_implicit(id.as_str()));

        self.preferences = preferences;

        if hides_selection {
            let previous = self.selection.selected().cloned();
            self.selection.clear();
            tracing::debug!("Preferences hide selected concept {:?}", previous);
            self.observers.publish(&TreeEvent::SelectionChanged {
                previous,
                current: None,
            });
        }
    }

    /// Whether the host may offer to create a new concept
    pub fn can_create_entity(&self) -> bool {
        !self.scope().read_only
    }

    /// Ask the host to create a new concept
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ReadOnly`] for write-protected knowledge bases;
    /// nothing is published in that case.
    pub fn request_new_entity(&mut self) -> Result<(), TreeError> {
        if !self.can_create_entity() {
            return Err(TreeError::ReadOnly);
        }
        self.observers.publish(&TreeEvent::NewEntityRequested);
        Ok(())
    }

    pub(super) fn fetch_children(&mut self, node: &TreeNode) -> Result<Vec<TreeNode>, TreeError> {
        let result = self.provider.children(node, &self.preferences);
        let children = self.recover(result, &format!("Listing children of {}", node.id))?;
        self.remember(&children);
        Ok(children)
    }

    pub(super) fn fetch_has_children(&mut self, node: &TreeNode) -> Result<bool, TreeError> {
        let result = self.provider.has_children(node, &self.preferences);
        self.recover(result, &format!("Checking children of {}", node.id))
    }

    fn known_node(&self, id: &NodeId) -> Result<TreeNode, TreeError> {
        self.known
            .get(id)
            .cloned()
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))
    }

    fn remember(&mut self, nodes: &[TreeNode]) {
        for node in nodes {
            self.known.insert(node.id.clone(), node.clone());
        }
    }

    /// Turn an unavailable source into an empty result plus a warning
    fn recover<T: Default>(
        &mut self,
        result: Result<T, TreeError>,
        action: &str,
    ) -> Result<T, TreeError> {
        match result {
            Err(TreeError::DataSourceUnavailable(msg)) => {
                tracing::warn!("{} failed: {}", action, msg);
                self.observers
                    .publish(&TreeEvent::Warning(format!("{action} failed: {msg}")));
                Ok(T::default())
            }
            other => other,
        }
    }
}
