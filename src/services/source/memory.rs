//! In-memory hierarchy source
//!
//! Holds a flat list of concept records and answers tree queries by scanning
//! it. Used by the CLI (loading a JSON hierarchy document) and by tests.

use super::backend::{ConceptHandle, HierarchySource, KnowledgeBaseRef, SourceError};
use crate::namespace::NamespaceFilter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One concept in a hierarchy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Identifier of the parent concept (None for roots)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl ConceptRecord {
    pub fn root(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            label: None,
            parent: None,
        }
    }

    pub fn child(identifier: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            label: None,
            parent: Some(parent.into()),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn to_handle(&self) -> ConceptHandle {
        ConceptHandle {
            identifier: self.identifier.clone(),
            display_label: self.label.clone(),
        }
    }
}

/// A knowledge base serialised as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyDocument {
    #[serde(default = "default_kb_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub concepts: Vec<ConceptRecord>,
}

fn default_kb_id() -> String {
    "default".to_string()
}

impl HierarchyDocument {
    pub fn load_from_file(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    pub fn knowledge_base(&self) -> KnowledgeBaseRef {
        let name = if self.name.is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        };
        KnowledgeBaseRef::new(self.id.clone(), name).with_read_only(self.read_only)
    }
}

/// Hierarchy source backed by a list of records
///
/// The scope argument is ignored: a memory source holds exactly one
/// knowledge base. Records keep their insertion order in listings.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<ConceptRecord>,
    filter: NamespaceFilter,
}

impl MemorySource {
    pub fn new(records: Vec<ConceptRecord>) -> Self {
        Self {
            records,
            filter: NamespaceFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: NamespaceFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn from_document(document: &HierarchyDocument) -> Self {
        Self::new(document.concepts.clone())
    }

    pub fn records(&self) -> &[ConceptRecord] {
        &self.records
    }

    /// Add a record (replacing an existing one with the same identifier)
    pub fn upsert(&mut self, record: ConceptRecord) {
        match self
            .records
            .iter_mut()
            .find(|r| r.identifier == record.identifier)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Remove a record, returning whether it existed
    pub fn remove(&mut self, identifier: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.identifier != identifier);
        self.records.len() != before
    }

    fn visible_children<'a>(
        &'a self,
        parent: Option<&'a str>,
        show_all: bool,
    ) -> impl Iterator<Item = &'a ConceptRecord> + 'a {
        self.records.iter().filter(move |r| {
            r.parent.as_deref() == parent && self.filter.is_visible(&r.identifier, show_all)
        })
    }
}

impl HierarchySource for MemorySource {
    fn list_roots(
        &self,
        _scope: &KnowledgeBaseRef,
        show_all: bool,
    ) -> Result<Vec<ConceptHandle>, SourceError> {
        Ok(self
            .visible_children(None, show_all)
            .map(ConceptRecord::to_handle)
            .collect())
    }

    fn list_children(
        &self,
        _scope: &KnowledgeBaseRef,
        parent_id: &str,
        show_all: bool,
    ) -> Result<Vec<ConceptHandle>, SourceError> {
        Ok(self
            .visible_children(Some(parent_id), show_all)
            .map(ConceptRecord::to_handle)
            .collect())
    }

    fn has_children(
        &self,
        _scope: &KnowledgeBaseRef,
        parent_id: &str,
        show_all: bool,
    ) -> Result<bool, SourceError> {
        Ok(self.visible_children(Some(parent_id), show_all).next().is_some())
    }
}
