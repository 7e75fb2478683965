use concept_tree::config::TreeConfig;
use concept_tree::namespace::{OWL_NAMESPACE, RDFS_NAMESPACE};
use concept_tree::services::source::{
    ConceptRecord, FaultConfig, FlakySource, HierarchySource, KnowledgeBaseRef, MemorySource,
};
use concept_tree::view::concept_tree::{ConceptTreeController, NodeId, TreeEvent};
use std::sync::{mpsc, Arc};

pub fn owl_thing() -> NodeId {
    NodeId(format!("{OWL_NAMESPACE}Thing"))
}

/// Roots A and B, A has children A1 and A2, plus implicit vocabulary concepts
pub fn records() -> Vec<ConceptRecord> {
    vec![
        ConceptRecord::root("A").with_label("Agent"),
        ConceptRecord::child("A1", "A").with_label("Person"),
        ConceptRecord::child("A2", "A").with_label("Organisation"),
        ConceptRecord::root("B").with_label("Building"),
        ConceptRecord::child("B1", "B").with_label("House"),
        ConceptRecord::root(owl_thing().0),
        ConceptRecord::child(format!("{RDFS_NAMESPACE}Resource"), owl_thing().0),
    ]
}

pub fn kb() -> KnowledgeBaseRef {
    KnowledgeBaseRef::new("kb-test", "Test knowledge base")
}

pub struct Harness {
    pub controller: ConceptTreeController,
    pub events: mpsc::Receiver<TreeEvent>,
}

impl Harness {
    pub fn over(source: Arc<dyn HierarchySource>) -> Self {
        super::tracing::init_tracing_from_env();
        let mut controller = ConceptTreeController::from_config(source, kb(), &TreeConfig::default());
        let (tx, events) = mpsc::channel();
        controller.subscribe(tx);
        Self { controller, events }
    }

    pub fn new() -> Self {
        Self::over(Arc::new(MemorySource::new(records())))
    }

    pub fn flaky(faults: FaultConfig) -> (Self, Arc<FlakySource>) {
        let flaky = Arc::new(FlakySource::new(
            Arc::new(MemorySource::new(records())),
            faults,
        ));
        (Self::over(flaky.clone()), flaky)
    }

    pub fn drain(&self) -> Vec<TreeEvent> {
        self.events.try_iter().collect()
    }

    pub fn selection_changes(&self) -> Vec<TreeEvent> {
        self.drain()
            .into_iter()
            .filter(|e| matches!(e, TreeEvent::SelectionChanged { .. }))
            .collect()
    }

    pub fn visible_ids(&mut self) -> Vec<String> {
        self.controller
            .rows()
            .unwrap()
            .into_iter()
            .map(|row| row.node.id.0)
            .collect()
    }
}

pub fn id(s: &str) -> NodeId {
    NodeId::from(s)
}
