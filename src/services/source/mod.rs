// Hierarchy source abstraction for knowledge-base backed trees
//
// The tree never talks to a knowledge base directly. It goes through the
// HierarchySource trait, which external services implement.

pub mod backend;
pub mod flaky;
pub mod memory;

pub use backend::{ConceptHandle, HierarchySource, KnowledgeBaseRef, SourceError};
pub use flaky::{FaultConfig, FlakySource, SourceMetrics};
pub use memory::{ConceptRecord, HierarchyDocument, MemorySource};
