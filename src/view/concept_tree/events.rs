use super::node::NodeId;
use std::sync::mpsc;

/// Notifications published by a concept tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// The selection moved from `previous` to `current`
    SelectionChanged {
        previous: Option<NodeId>,
        current: Option<NodeId>,
    },
    /// The user asked to create a new concept
    NewEntityRequested,
    /// A non-fatal problem the host should show to the user
    Warning(String),
}

/// Receiver of tree notifications
///
/// Delivery is fire-and-forget: the tree neither waits for nor expects an
/// acknowledgment.
pub trait NotificationSink: Send {
    fn notify(&mut self, event: &TreeEvent);
}

impl NotificationSink for mpsc::Sender<TreeEvent> {
    fn notify(&mut self, event: &TreeEvent) {
        // A dropped receiver just means nobody is listening any more
        let _ = self.send(event.clone());
    }
}

/// Ordered list of registered sinks
#[derive(Default)]
pub struct Observers {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver `event` to every sink in subscription order
    pub fn publish(&mut self, event: &TreeEvent) {
        for sink in &mut self.sinks {
            sink.notify(event);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
