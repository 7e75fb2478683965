// Concept tree: a lazily loaded, single-selection tree over a knowledge base
//
// Children are only fetched when a node is expanded or rendered, and every
// fetch goes back to the hierarchy source.

pub mod controller;
pub mod error;
pub mod events;
pub mod node;
pub mod provider;
pub mod render;
pub mod selection;

pub use controller::ConceptTreeController;
pub use error::TreeError;
pub use events::{NotificationSink, Observers, TreeEvent};
pub use node::{NodeId, NodeState, TreeNode};
pub use provider::ConceptTreeProvider;
pub use render::{render_text, TreeRow};
pub use selection::SelectionState;
