// crates/tessera-runtime/src/grouping.rs
use std::time::Duration;

use tracing::debug;

/// Where a drag stands with respect to merging into another item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupingState {
    #[default]
    Idle,
    /// Hovering over `target`; becomes droppable at `fires_at`.
    Targeting { target: String, fires_at: Duration },
    /// Releasing now merges into `target`.
    Droppable { target: String },
}

impl GroupingState {
    pub fn target(&self) -> Option<&str> {
        match self {
            GroupingState::Idle => None,
            GroupingState::Targeting { target, .. } | GroupingState::Droppable { target } => Some(target),
        }
    }

    pub fn is_droppable(&self) -> bool {
        matches!(self, GroupingState::Droppable { .. })
    }
}

/// Single-shot merge timer for one drag gesture. At most one deadline is
/// pending; retargeting replaces it.
#[derive(Debug, Clone)]
pub struct GroupingTracker {
    state: GroupingState,
    delay: Duration,
}

impl GroupingTracker {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: GroupingState::Idle,
            delay,
        }
    }

    pub fn state(&self) -> &GroupingState {
        &self.state
    }

    /// Feeds the item currently under the drag. Returns true if the target changed.
    pub fn update(&mut self, candidate: Option<&str>, now: Duration) -> bool {
        if candidate == self.state.target() {
            self.poll(now);
            return false;
        }

        self.state = match candidate {
            Some(target) => {
                debug!("Grouping target {}, droppable in {:?}", target, self.delay);
                GroupingState::Targeting {
                    target: target.to_string(),
                    fires_at: now + self.delay,
                }
            }
            None => {
                debug!("Grouping target cleared");
                GroupingState::Idle
            }
        };
        self.poll(now);
        true
    }

    /// Fires the pending deadline if it has passed. Returns true on the transition.
    pub fn poll(&mut self, now: Duration) -> bool {
        let GroupingState::Targeting { target, fires_at } = &self.state else {
            return false;
        };
        if now < *fires_at {
            return false;
        }
        debug!("Grouping target {} is droppable", target);
        self.state = GroupingState::Droppable { target: target.clone() };
        true
    }

    /// Ends the gesture, yielding the merge target if droppable.
    pub fn release(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            GroupingState::Droppable { target } => Some(target),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = GroupingState::Idle;
    }
}
