// crates/tessera-runtime/src/event_system.rs

/// Notifications raised while applying intents, drained by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LayoutChanged,
    GroupTargetChanged { target: Option<String> },
    GroupDroppable { target: String },
    GroupMerged { group: String },
}

#[derive(Debug, Default)]
pub struct EventSystem {
    event_queue: Vec<SessionEvent>,
}

impl EventSystem {
    pub fn new() -> Self {
        Self {
            event_queue: Vec::new(),
        }
    }

    pub fn queue_event(&mut self, event: SessionEvent) {
        tracing::trace!("Queued event {:?}", event);
        self.event_queue.push(event);
    }

    pub fn drain(&mut self) -> Vec<SessionEvent> {
        self.event_queue.drain(..).collect()
    }
}
