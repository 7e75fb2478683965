use super::node::NodeId;
use crate::services::source::SourceError;
use std::fmt;

/// Errors raised by the concept tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The hierarchy source could not answer
    ///
    /// The controller recovers from this locally: the affected branch is
    /// rendered empty and a warning is emitted.
    DataSourceUnavailable(String),
    /// A source handle could not be turned into a node
    MalformedNode(String),
    /// The same identifier was returned twice in one listing
    DuplicateNode(NodeId),
    /// The node was never returned by the source
    UnknownNode(NodeId),
    /// The knowledge base is write protected
    ReadOnly,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::DataSourceUnavailable(msg) => write!(f, "Data source unavailable: {msg}"),
            TreeError::MalformedNode(msg) => write!(f, "Malformed node: {msg}"),
            TreeError::DuplicateNode(id) => write!(f, "Duplicate node: {id}"),
            TreeError::UnknownNode(id) => write!(f, "Unknown node: {id}"),
            TreeError::ReadOnly => write!(f, "Knowledge base is read-only"),
        }
    }
}

impl std::error::Error for TreeError {}

impl From<SourceError> for TreeError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unavailable(msg) => TreeError::DataSourceUnavailable(msg),
        }
    }
}
