use std::fmt;

/// A concept as reported by a hierarchical data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptHandle {
    pub identifier: String,
    pub display_label: Option<String>,
}

impl ConceptHandle {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            display_label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = Some(label.into());
        self
    }

    /// Label shown in the tree
    ///
    /// Falls back to the local name of the identifier (the part after the
    /// last `#` or `/`) when the source did not supply a label.
    pub fn ui_label(&self) -> String {
        match &self.display_label {
            Some(label) if !label.is_empty() => label.clone(),
            _ => local_name(&self.identifier).to_string(),
        }
    }
}

fn local_name(identifier: &str) -> &str {
    let trimmed = identifier.trim_end_matches(['#', '/']);
    match trimmed.rfind(['#', '/']) {
        Some(pos) if pos + 1 < trimmed.len() => &trimmed[pos + 1..],
        _ => trimmed,
    }
}

/// The knowledge base a tree is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBaseRef {
    pub id: String,
    pub name: String,
    /// Read-only knowledge bases reject requests to create new concepts
    pub read_only: bool,
}

impl KnowledgeBaseRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            read_only: false,
        }
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// Errors reported by a hierarchical data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source could not be reached or failed to answer
    Unavailable(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable(msg) => write!(f, "data source unavailable: {msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Hierarchical data source trait
///
/// This trait abstracts the knowledge-base service that backs a concept
/// tree. Every call is answered from the source itself; callers must not
/// assume results are stable between calls.
pub trait HierarchySource: Send + Sync {
    /// List the top-level concepts of a knowledge base
    ///
    /// When `show_all` is false, concepts from implicit namespaces are
    /// omitted.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] if the source cannot be queried.
    fn list_roots(
        &self,
        scope: &KnowledgeBaseRef,
        show_all: bool,
    ) -> Result<Vec<ConceptHandle>, SourceError>;

    /// List the direct children of `parent_id`
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unavailable`] if the source cannot be queried.
    fn list_children(
        &self,
        scope: &KnowledgeBaseRef,
        parent_id: &str,
        show_all: bool,
    ) -> Result<Vec<ConceptHandle>, SourceError>;

    /// Check whether `parent_id` has at least one child
    ///
    /// The default lists all children and tests for emptiness. Sources that
    /// can answer an existence query more cheaply should override it.
    fn has_children(
        &self,
        scope: &KnowledgeBaseRef,
        parent_id: &str,
        show_all: bool,
    ) -> Result<bool, SourceError> {
        Ok(!self.list_children(scope, parent_id, show_all)?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_creation() {
        let handle = ConceptHandle::new("http://example.org/onto#Person").with_label("Person");

        assert_eq!(handle.identifier, "http://example.org/onto#Person");
        assert_eq!(handle.ui_label(), "Person");
    }

    #[test]
    fn test_ui_label_falls_back_to_local_name() {
        assert_eq!(
            ConceptHandle::new("http://example.org/onto#Animal").ui_label(),
            "Animal"
        );
        assert_eq!(
            ConceptHandle::new("http://example.org/onto/Plant").ui_label(),
            "Plant"
        );
        assert_eq!(
            ConceptHandle::new("http://example.org/onto/Plant/").ui_label(),
            "Plant"
        );
        assert_eq!(ConceptHandle::new("plain").ui_label(), "plain");
    }

    #[test]
    fn test_empty_label_is_ignored() {
        let handle = ConceptHandle::new("urn:x:Thing").with_label("");
        assert_eq!(handle.ui_label(), "urn:x:Thing");
    }

    #[test]
    fn test_knowledge_base_ref() {
        let kb = KnowledgeBaseRef::new("kb-1", "Wine ontology");
        assert!(!kb.read_only);

        let kb = kb.with_read_only(true);
        assert!(kb.read_only);
        assert_eq!(kb.name, "Wine ontology");
    }

    #[test]
    fn test_source_error_display() {
        let err = SourceError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "data source unavailable: connection refused");
    }
}
