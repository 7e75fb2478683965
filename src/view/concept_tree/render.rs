use super::controller::ConceptTreeController;
use super::error::TreeError;
use super::node::{NodeId, TreeNode};
use std::collections::HashSet;
use std::fmt::Write;

/// One visible line of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub node: TreeNode,
    /// Nesting level (0 for roots)
    pub depth: usize,
    pub expanded: bool,
    pub selected: bool,
    pub has_children: bool,
}

impl ConceptTreeController {
    /// Run a render pass and return the visible rows in tree order
    ///
    /// Roots are fetched, then the children of every expanded node, each at
    /// most once per pass. Collapsed nodes only get an existence check. A
    /// selected node the source no longer returns simply has no row.
    pub fn rows(&mut self) -> Result<Vec<TreeRow>, TreeError> {
        let mut rows = Vec::new();
        let mut fetched = HashSet::new();

        for root in self.roots()? {
            self.collect_rows(root, 0, &mut rows, &mut fetched)?;
        }

        Ok(rows)
    }

    /// Index of the selected row, if the selected node is visible
    pub fn selected_row(rows: &[TreeRow]) -> Option<usize> {
        rows.iter().position(|row| row.selected)
    }

    fn collect_rows(
        &mut self,
        node: TreeNode,
        depth: usize,
        rows: &mut Vec<TreeRow>,
        fetched: &mut HashSet<NodeId>,
    ) -> Result<(), TreeError> {
        let selected = self.is_selected(&node.id);
        let expanded = self.is_expanded(&node.id);

        // A node reachable twice (cyclic data) is only expanded once
        if expanded && fetched.insert(node.id.clone()) {
            let children = self.fetch_children(&node)?;
            rows.push(TreeRow {
                has_children: !children.is_empty(),
                node,
                depth,
                expanded,
                selected,
            });
            for child in children {
                self.collect_rows(child, depth + 1, rows, fetched)?;
            }
        } else {
            let has_children = self.fetch_has_children(&node)?;
            rows.push(TreeRow {
                node,
                depth,
                expanded: false,
                selected,
                has_children,
            });
        }

        Ok(())
    }
}

/// Plain-text rendering of rows, one per line
///
/// `▾` marks expanded nodes, `▸` collapsed nodes with children and a
/// trailing `*` the selected node.
pub fn render_text(rows: &[TreeRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = if row.expanded {
            '▾'
        } else if row.has_children {
            '▸'
        } else {
            ' '
        };
        let indent = "  ".repeat(row.depth);
        let selected = if row.selected { " *" } else { "" };
        let _ = writeln!(out, "{indent}{marker} {}{selected}", row.node.label);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::services::source::{
        ConceptHandle, ConceptRecord, FaultConfig, FlakySource, HierarchySource, KnowledgeBaseRef,
        MemorySource, SourceError,
    };
    use std::sync::{Arc, RwLock};

    fn records() -> Vec<ConceptRecord> {
        vec![
            ConceptRecord::root("A").with_label("Animal"),
            ConceptRecord::child("A1", "A").with_label("Bird"),
            ConceptRecord::child("A2", "A").with_label("Fish"),
            ConceptRecord::child("A1a", "A1").with_label("Owl"),
            ConceptRecord::root("B").with_label("Plant"),
        ]
    }

    fn controller(source: Arc<dyn HierarchySource>) -> ConceptTreeController {
        ConceptTreeController::from_config(
            source,
            KnowledgeBaseRef::new("kb", "Test"),
            &TreeConfig::default(),
        )
    }

    fn labels(rows: &[TreeRow]) -> Vec<(&str, usize)> {
        rows.iter()
            .map(|r| (r.node.label.as_str(), r.depth))
            .collect()
    }

    #[test]
    fn test_initial_rows_are_roots() {
        let mut controller = controller(Arc::new(MemorySource::new(records())));

        let rows = controller.rows().unwrap();
        assert_eq!(labels(&rows), vec![("Animal", 0), ("Plant", 0)]);
        assert!(rows[0].has_children);
        assert!(!rows[1].has_children);
        assert!(rows.iter().all(|r| !r.expanded && !r.selected));
    }

    #[test]
    fn test_expanded_rows_in_tree_order() {
        let mut controller = controller(Arc::new(MemorySource::new(records())));
        controller.roots().unwrap();
        controller.expand(&NodeId::from("A")).unwrap();
        controller.expand(&NodeId::from("A1")).unwrap();

        let rows = controller.rows().unwrap();
        assert_eq!(
            labels(&rows),
            vec![
                ("Animal", 0),
                ("Bird", 1),
                ("Owl", 2),
                ("Fish", 1),
                ("Plant", 0)
            ]
        );
    }

    #[test]
    fn test_collapse_hides_rows_but_keeps_selection() {
        let mut controller = controller(Arc::new(MemorySource::new(records())));
        controller.roots().unwrap();
        controller.expand(&NodeId::from("A")).unwrap();
        controller.click(&NodeId::from("A1")).unwrap();

        let rows = controller.rows().unwrap();
        assert_eq!(ConceptTreeController::selected_row(&rows), Some(1));

        controller.collapse(&NodeId::from("A"));
        let rows = controller.rows().unwrap();
        assert_eq!(labels(&rows), vec![("Animal", 0), ("Plant", 0)]);
        assert_eq!(ConceptTreeController::selected_row(&rows), None);
        assert!(controller.is_selected(&NodeId::from("A1")));
    }

    /// Memory source that can change behind the controller's back
    struct SharedSource(RwLock<MemorySource>);

    impl HierarchySource for SharedSource {
        fn list_roots(
            &self,
            scope: &KnowledgeBaseRef,
            show_all: bool,
        ) -> Result<Vec<ConceptHandle>, SourceError> {
            self.0.read().unwrap().list_roots(scope, show_all)
        }

        fn list_children(
            &self,
            scope: &KnowledgeBaseRef,
            parent_id: &str,
            show_all: bool,
        ) -> Result<Vec<ConceptHandle>, SourceError> {
            self.0.read().unwrap().list_children(scope, parent_id, show_all)
        }
    }

    #[test]
    fn test_stale_selection_shows_no_row_and_no_event() {
        let shared = Arc::new(SharedSource(RwLock::new(MemorySource::new(records()))));
        let mut controller = controller(shared.clone());
        let (tx, rx) = std::sync::mpsc::channel();
        controller.subscribe(tx);
        controller.roots().unwrap();
        controller.click(&NodeId::from("B")).unwrap();
        rx.try_iter().for_each(drop);

        // The concept disappears upstream
        shared.0.write().unwrap().remove("B");

        let rows = controller.rows().unwrap();
        assert_eq!(labels(&rows), vec![("Animal", 0)]);
        assert_eq!(ConceptTreeController::selected_row(&rows), None);
        assert!(controller.is_selected(&NodeId::from("B")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_render_pass_fetches_each_branch_once() {
        let inner = Arc::new(MemorySource::new(records()));
        let counting = Arc::new(FlakySource::counting(inner));
        let mut controller = controller(counting.clone());
        controller.roots().unwrap();
        controller.expand(&NodeId::from("A")).unwrap();
        counting.reset_metrics();

        controller.rows().unwrap();

        let metrics = counting.metrics();
        assert_eq!(metrics.list_roots_calls, 1);
        // Only the expanded node is listed; A1, A2 and B get existence checks
        assert_eq!(metrics.list_children_calls, 1);
        assert_eq!(metrics.has_children_calls, 3);
    }

    #[test]
    fn test_unavailable_branch_renders_empty() {
        let inner = Arc::new(MemorySource::new(records()));
        let flaky = Arc::new(FlakySource::new(inner, FaultConfig::failing_children_of(["A"])));
        let mut controller = controller(flaky);
        controller.roots().unwrap();
        controller.expand(&NodeId::from("A")).unwrap();

        let rows = controller.rows().unwrap();
        assert_eq!(labels(&rows), vec![("Animal", 0), ("Plant", 0)]);
        assert!(rows[0].expanded);
        assert!(!rows[0].has_children);
    }

    #[test]
    fn test_render_text() {
        let mut controller = controller(Arc::new(MemorySource::new(records())));
        controller.roots().unwrap();
        controller.expand(&NodeId::from("A")).unwrap();
        controller.click(&NodeId::from("A2")).unwrap();

        let text = render_text(&controller.rows().unwrap());
        assert_eq!(text, "▾ Animal\n  ▸ Bird\n    Fish *\n  Plant\n");
    }
}
