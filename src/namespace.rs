//! Namespace classification of concept identifiers
//!
//! Knowledge bases carry concepts from vocabulary namespaces (RDF, RDFS,
//! OWL, XML Schema) alongside their own. Those vocabulary concepts are
//! "implicit" and hidden unless the user asks to see all concepts.

pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
pub const OWL_NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";

/// Namespaces treated as implicit when nothing else is configured
pub const DEFAULT_IMPLICIT_NAMESPACES: [&str; 4] =
    [RDF_NAMESPACE, RDFS_NAMESPACE, XSD_NAMESPACE, OWL_NAMESPACE];

/// Decides whether an identifier belongs to an implicit namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceFilter {
    implicit: Vec<String>,
}

impl NamespaceFilter {
    pub fn new(implicit: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            implicit: implicit.into_iter().map(Into::into).collect(),
        }
    }

    pub fn namespaces(&self) -> &[String] {
        &self.implicit
    }

    pub fn is_implicit(&self, identifier: &str) -> bool {
        self.implicit.iter().any(|ns| identifier.starts_with(ns.as_str()))
    }

    /// Whether a concept is shown under the given "show all" preference
    pub fn is_visible(&self, identifier: &str, show_all: bool) -> bool {
        show_all || !self.is_implicit(identifier)
    }
}

impl Default for NamespaceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_IMPLICIT_NAMESPACES)
    }
}
