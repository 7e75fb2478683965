//! Failure-injecting hierarchy source for testing
//!
//! This module provides a decorator around any HierarchySource that fails
//! selected calls with `SourceError::Unavailable` and counts every call. It
//! is used to check how the tree degrades when the knowledge base cannot be
//! reached, and how many queries a render pass issues.

use super::backend::{ConceptHandle, HierarchySource, KnowledgeBaseRef, SourceError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Which calls should fail
#[derive(Debug, Clone, Default)]
pub struct FaultConfig {
    /// Fail every call
    pub unavailable: bool,
    /// Fail `list_roots`
    pub fail_roots: bool,
    /// Fail `list_children`/`has_children` for these parent identifiers
    pub fail_children_of: HashSet<String>,
}

impl FaultConfig {
    /// No failures (useful as a baseline)
    pub fn none() -> Self {
        Self::default()
    }

    /// Every call fails
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Child queries for the given parents fail
    pub fn failing_children_of(parents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            fail_children_of: parents.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn fails_children(&self, parent_id: &str) -> bool {
        self.unavailable || self.fail_children_of.contains(parent_id)
    }
}

/// Call counts for a wrapped source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMetrics {
    pub list_roots_calls: usize,
    pub list_children_calls: usize,
    pub has_children_calls: usize,
    /// Number of calls answered with an injected failure
    pub failures: usize,
}

impl SourceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_calls(&self) -> usize {
        self.list_roots_calls + self.list_children_calls + self.has_children_calls
    }
}

/// Hierarchy source wrapper that injects failures and tracks metrics
pub struct FlakySource {
    inner: Arc<dyn HierarchySource>,
    faults: Mutex<FaultConfig>,
    metrics: Mutex<SourceMetrics>,
}

impl FlakySource {
    pub fn new(inner: Arc<dyn HierarchySource>, faults: FaultConfig) -> Self {
        Self {
            inner,
            faults: Mutex::new(faults),
            metrics: Mutex::new(SourceMetrics::new()),
        }
    }

    /// Wrap without injecting failures, only counting calls
    pub fn counting(inner: Arc<dyn HierarchySource>) -> Self {
        Self::new(inner, FaultConfig::none())
    }

    /// Replace the fault configuration
    pub fn set_faults(&self, faults: FaultConfig) {
        if let Ok(mut current) = self.faults.lock() {
            *current = faults;
        }
    }

    /// Get a snapshot of current metrics
    pub fn metrics(&self) -> SourceMetrics {
        self.metrics.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Reset metrics to zero
    pub fn reset_metrics(&self) {
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.reset();
        }
    }

    fn record(&self, update: impl FnOnce(&mut SourceMetrics)) {
        if let Ok(mut metrics) = self.metrics.lock() {
            update(&mut metrics);
        }
    }

    fn check(
        &self,
        fails: impl FnOnce(&FaultConfig) -> bool,
        what: &str,
    ) -> Result<(), SourceError> {
        let failed = self.faults.lock().map(|f| fails(&*f)).unwrap_or(false);
        if failed {
            self.record(|m| m.failures += 1);
            return Err(SourceError::Unavailable(format!("injected failure in {what}")));
        }
        Ok(())
    }
}

impl HierarchySource for FlakySource {
    fn list_roots(
        &self,
        scope: &KnowledgeBaseRef,
        show_all: bool,
    ) -> Result<Vec<ConceptHandle>, SourceError> {
        self.record(|m| m.list_roots_calls += 1);
        self.check(|f| f.unavailable || f.fail_roots, "list_roots")?;
        self.inner.list_roots(scope, show_all)
    }

    fn list_children(
        &self,
        scope: &KnowledgeBaseRef,
        parent_id: &str,
        show_all: bool,
    ) -> Result<Vec<ConceptHandle>, SourceError> {
        self.record(|m| m.list_children_calls += 1);
        self.check(|f| f.fails_children(parent_id), "list_children")?;
        self.inner.list_children(scope, parent_id, show_all)
    }

    fn has_children(
        &self,
        scope: &KnowledgeBaseRef,
        parent_id: &str,
        show_all: bool,
    ) -> Result<bool, SourceError> {
        self.record(|m| m.has_children_calls += 1);
        self.check(|f| f.fails_children(parent_id), "has_children")?;
        self.inner.has_children(scope, parent_id, show_all)
    }
}
