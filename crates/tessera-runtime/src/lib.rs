// crates/tessera-runtime/src/lib.rs
//! Interactive grid session: turns drag, resize and drop intents into layout
//! updates and drives the grouping timer.

use std::time::Duration;

use serde::Deserialize;
use tessera_core::{
    bottom, check_layout, get_layout_item, index_of, layouts_equal, validate_item, GridConfig, Layout, LayoutError,
    LayoutItem, RawItem, ResizeHandle, Result, MAX_CELL,
};
use tessera_layout::{
    compact, correct_bounds, detach_child, merge_candidate, merge_items, move_child, move_element, resize_child,
    resize_element, settle_group, synchronize, GridRect, GroupPolicy, ItemDescriptor, LayoutOptions,
};
use tracing::{debug, info};

pub mod clock;
pub mod event_system;
pub mod grouping;

pub use clock::*;
pub use event_system::*;
pub use grouping::*;

/// A caller request against the session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    StartDrag { key: String },
    DragTo { key: String, x: i32, y: i32 },
    EndDrag { key: String, x: i32, y: i32 },
    StartResize { key: String },
    ResizeTo {
        key: String,
        w: i32,
        h: i32,
        #[serde(default)]
        handle: ResizeHandle,
    },
    EndResize { key: String },
    DropExternalItem { item: RawItem, x: i32, y: i32 },
    RemoveItem { key: String },
    DetachChild { group: String, child: String },
    MoveChild { group: String, child: String, x: i32, y: i32 },
    ResizeChild {
        group: String,
        child: String,
        w: i32,
        h: i32,
        #[serde(default)]
        handle: ResizeHandle,
    },
    CancelGesture,
    Synchronize { items: Vec<ItemDescriptor> },
}

/// The layout after an intent, and whether it differs from before.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentOutcome {
    pub layout: Layout,
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureKind {
    Drag,
    Resize,
}

#[derive(Debug, Clone)]
struct Gesture {
    kind: GestureKind,
    key: String,
    start: Layout,
}

pub struct GridSession<C: Clock = SystemClock> {
    config: GridConfig,
    options: LayoutOptions,
    policy: GroupPolicy,

    // State
    layout: Layout,
    gesture: Option<Gesture>,
    tracker: GroupingTracker,

    // Systems
    clock: C,
    event_system: EventSystem,
}

impl GridSession<SystemClock> {
    pub fn new(config: GridConfig, layout: Layout) -> Result<Self> {
        Self::with_clock(config, layout, SystemClock::new())
    }
}

impl<C: Clock> GridSession<C> {
    /// Validates the config and layout, then brings the layout into bounds and compacts it.
    pub fn with_clock(config: GridConfig, mut layout: Layout, clock: C) -> Result<Self> {
        config.validate()?;
        check_layout(&layout)?;

        let options = LayoutOptions::from(&config);
        correct_bounds(&mut layout, options.cols);
        let layout = if options.allow_overlap {
            layout
        } else {
            compact(&layout, options.axis, options.cols, false)
        };
        info!("Grid session started with {} items in {} columns", layout.len(), options.cols);

        Ok(Self {
            policy: GroupPolicy::from(&config),
            tracker: GroupingTracker::new(Duration::from_millis(config.group_merge_delay_ms)),
            config,
            options,
            layout,
            gesture: None,
            clock,
            event_system: EventSystem::new(),
        })
    }

    pub fn layout(&self) -> &[LayoutItem] {
        &self.layout
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn grouping_state(&self) -> &GroupingState {
        self.tracker.state()
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        self.event_system.drain()
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<IntentOutcome> {
        debug!("Dispatching {:?}", intent);
        let outcome = match intent {
            Intent::StartDrag { key } => self.start_drag(&key),
            Intent::DragTo { key, x, y } => self.drag_to(&key, x, y),
            Intent::EndDrag { key, x, y } => self.end_drag(&key, x, y),
            Intent::StartResize { key } => self.start_resize(&key),
            Intent::ResizeTo { key, w, h, handle } => self.resize_to(&key, w, h, handle),
            Intent::EndResize { key } => self.end_resize(&key),
            Intent::DropExternalItem { item, x, y } => self.drop_external_item(item, x, y)?,
            Intent::RemoveItem { key } => self.remove_item(&key),
            Intent::DetachChild { group, child } => self.detach_child(&group, &child),
            Intent::MoveChild { group, child, x, y } => self.move_child(&group, &child, x, y),
            Intent::ResizeChild { group, child, w, h, handle } => self.resize_child(&group, &child, w, h, handle),
            Intent::CancelGesture => self.cancel_gesture(),
            Intent::Synchronize { items } => self.synchronize(&items)?,
        };
        Ok(outcome)
    }

    pub fn start_drag(&mut self, key: &str) -> IntentOutcome {
        self.begin(GestureKind::Drag, key);
        self.unchanged()
    }

    /// Follows the pointer. While the dragged item hovers over a merge
    /// candidate the layout holds still and the grouping timer runs.
    pub fn drag_to(&mut self, key: &str, x: i32, y: i32) -> IntentOutcome {
        if !self.in_gesture(GestureKind::Drag, key) && !self.begin(GestureKind::Drag, key) {
            return self.unchanged();
        }
        let Some(item) = get_layout_item(&self.layout, key) else {
            return self.unchanged();
        };
        let (x, y) = self.clamp_position(item, x, y);
        let rect = GridRect::new(x, y, item.w, item.h);

        let candidate = if self.config.grouping && !item.is_group {
            merge_candidate(&self.layout, key, &rect).map(|target| target.key.clone())
        } else {
            None
        };
        let before = self.tracker.state().clone();
        let now = self.clock.now();
        if self.tracker.update(candidate.as_deref(), now) {
            self.event_system.queue_event(SessionEvent::GroupTargetChanged {
                target: candidate.clone(),
            });
        }
        if self.tracker.state().is_droppable() && self.tracker.state() != &before {
            self.queue_droppable();
        }
        if candidate.is_some() {
            return self.unchanged();
        }

        let next = self.place(key, x, y);
        self.commit(next)
    }

    /// Releases the drag: merges into a droppable target, otherwise places the item.
    pub fn end_drag(&mut self, key: &str, x: i32, y: i32) -> IntentOutcome {
        let Some(gesture) = self.take_gesture(GestureKind::Drag, key) else {
            return self.unchanged();
        };
        self.tracker.poll(self.clock.now());
        let target = self.tracker.release();

        let merged = target.and_then(|target| {
            match merge_items(&self.layout, key, &target, &self.policy, &self.options) {
                std::borrow::Cow::Owned(merged) => Some(merged),
                std::borrow::Cow::Borrowed(_) => None,
            }
        });

        let next = match merged {
            Some(merged) => {
                if let Some(group) = merged.iter().find(|item| item.children.iter().any(|child| child.key == key)) {
                    info!("Merged {} into group {}", key, group.key);
                    self.event_system.queue_event(SessionEvent::GroupMerged {
                        group: group.key.clone(),
                    });
                }
                merged
            }
            None => match get_layout_item(&self.layout, key) {
                Some(item) => {
                    let (x, y) = self.clamp_position(item, x, y);
                    self.place(key, x, y)
                }
                None => self.layout.clone(),
            },
        };
        self.finish(gesture, next)
    }

    pub fn start_resize(&mut self, key: &str) -> IntentOutcome {
        self.begin(GestureKind::Resize, key);
        self.unchanged()
    }

    pub fn resize_to(&mut self, key: &str, w: i32, h: i32, handle: ResizeHandle) -> IntentOutcome {
        if !self.in_gesture(GestureKind::Resize, key) && !self.begin(GestureKind::Resize, key) {
            return self.unchanged();
        }
        let Some(item) = get_layout_item(&self.layout, key) else {
            return self.unchanged();
        };
        let h = match self.config.max_rows {
            Some(max_rows) if !handle.moves_y() => h.min(max_rows - item.y),
            _ => h,
        }
        .min(MAX_CELL);

        let next = {
            let resized = resize_element(&self.layout, key, w, h, handle, &self.options);
            self.settle(&resized)
        };
        self.commit(next)
    }

    pub fn end_resize(&mut self, key: &str) -> IntentOutcome {
        let Some(gesture) = self.take_gesture(GestureKind::Resize, key) else {
            return self.unchanged();
        };
        let next = self.settle(&self.layout);
        self.finish(gesture, next)
    }

    /// Adds an item from outside the grid at the drop cell. The drop
    /// position overrides any coordinates in `item`.
    pub fn drop_external_item(&mut self, mut item: RawItem, x: i32, y: i32) -> Result<IntentOutcome> {
        item.x = Some(x.into());
        item.y = Some(y.into());
        let mut dropped = validate_item(&item, self.layout.len())?;
        if self.layout.iter().any(|existing| existing.keys().contains(&dropped.key.as_str())) {
            return Err(LayoutError::DuplicateKey(dropped.key));
        }

        let (x, y) = self.clamp_position(&dropped, x, y);
        let key = dropped.key.clone();
        dropped.x = x;
        dropped.y = bottom(&self.layout);
        info!("Dropping {} at [{},{}]", key, x, y);

        let mut next = self.layout.clone();
        next.push(dropped);
        let placed = move_element(&next, &key, Some(x), Some(y), true, &self.options);
        let settled = self.settle(&placed);
        Ok(self.commit(settled))
    }

    /// Removes a top-level item, or a child from whichever group holds it.
    pub fn remove_item(&mut self, key: &str) -> IntentOutcome {
        let mut next = Vec::with_capacity(self.layout.len());
        let mut found = false;
        for item in &self.layout {
            if item.key == key {
                found = true;
                continue;
            }
            match index_of(&item.children, key) {
                Some(child_index) => {
                    found = true;
                    let mut group = item.clone();
                    group.children.remove(child_index);
                    next.extend(settle_group(group));
                }
                None => next.push(item.clone()),
            }
        }
        if !found {
            debug!("remove_item: no item {}", key);
            return self.unchanged();
        }

        if self.gesture.as_ref().map_or(false, |gesture| gesture.key == key) {
            self.gesture = None;
            self.tracker.cancel();
        }
        let settled = self.settle(&next);
        self.commit(settled)
    }

    pub fn detach_child(&mut self, group: &str, child: &str) -> IntentOutcome {
        let next = detach_child(&self.layout, group, child, &self.options).into_owned();
        self.commit(next)
    }

    pub fn move_child(&mut self, group: &str, child: &str, x: i32, y: i32) -> IntentOutcome {
        let next = move_child(&self.layout, group, child, x, y, &self.options).into_owned();
        self.commit(next)
    }

    pub fn resize_child(&mut self, group: &str, child: &str, w: i32, h: i32, handle: ResizeHandle) -> IntentOutcome {
        let next = resize_child(&self.layout, group, child, w, h, handle, &self.options).into_owned();
        self.commit(next)
    }

    /// Abandons the current gesture, restoring the layout it started from.
    pub fn cancel_gesture(&mut self) -> IntentOutcome {
        self.tracker.cancel();
        match self.gesture.take() {
            Some(gesture) => {
                debug!("Cancelled gesture on {}", gesture.key);
                self.commit(gesture.start)
            }
            None => self.unchanged(),
        }
    }

    pub fn synchronize(&mut self, descriptors: &[ItemDescriptor]) -> Result<IntentOutcome> {
        let next = synchronize(&self.layout, descriptors, &self.options)?;
        Ok(self.commit(next))
    }

    /// Advances the grouping timer. Returns true if the target just became droppable.
    pub fn tick(&mut self) -> bool {
        let fired = self.tracker.poll(self.clock.now());
        if fired {
            self.queue_droppable();
        }
        fired
    }

    fn queue_droppable(&mut self) {
        if let Some(target) = self.tracker.state().target() {
            let event = SessionEvent::GroupDroppable {
                target: target.to_string(),
            };
            self.event_system.queue_event(event);
        }
    }

    fn begin(&mut self, kind: GestureKind, key: &str) -> bool {
        let Some(item) = get_layout_item(&self.layout, key) else {
            debug!("Gesture on unknown item {}", key);
            return false;
        };
        let allowed = match kind {
            GestureKind::Drag => item.can_drag(self.config.is_draggable),
            GestureKind::Resize => item.can_resize(self.config.is_resizable),
        };
        if !allowed {
            debug!("{:?} not allowed on {}", kind, key);
            return false;
        }

        self.tracker.cancel();
        self.gesture = Some(Gesture {
            kind,
            key: key.to_string(),
            start: self.layout.clone(),
        });
        true
    }

    fn in_gesture(&self, kind: GestureKind, key: &str) -> bool {
        self.gesture
            .as_ref()
            .map_or(false, |gesture| gesture.kind == kind && gesture.key == key)
    }

    fn take_gesture(&mut self, kind: GestureKind, key: &str) -> Option<Gesture> {
        if self.in_gesture(kind, key) {
            self.gesture.take()
        } else {
            None
        }
    }

    /// Keeps a target cell inside the columns and under `maxRows`, or under
    /// [`MAX_CELL`] when rows are unbounded.
    fn clamp_position(&self, item: &LayoutItem, x: i32, y: i32) -> (i32, i32) {
        let x = x.clamp(0, (self.options.cols - item.w).max(0));
        let ceiling = self.config.max_rows.unwrap_or(MAX_CELL);
        (x, y.min(ceiling.saturating_sub(item.h)).max(0))
    }

    fn place(&self, key: &str, x: i32, y: i32) -> Layout {
        let moved = move_element(&self.layout, key, Some(x), Some(y), true, &self.options);
        self.settle(&moved)
    }

    fn settle(&self, layout: &[LayoutItem]) -> Layout {
        compact(layout, self.options.axis, self.options.cols, self.options.allow_overlap)
    }

    fn unchanged(&self) -> IntentOutcome {
        IntentOutcome {
            layout: self.layout.clone(),
            changed: false,
        }
    }

    fn commit(&mut self, next: Layout) -> IntentOutcome {
        let changed = !layouts_equal(&self.layout, &next);
        self.layout = next;
        if changed {
            self.event_system.queue_event(SessionEvent::LayoutChanged);
        }
        IntentOutcome {
            layout: self.layout.clone(),
            changed,
        }
    }

    /// Commits the end of a gesture; the change signal covers the whole gesture.
    fn finish(&mut self, gesture: Gesture, next: Layout) -> IntentOutcome {
        self.commit(next);
        let changed = !layouts_equal(&gesture.start, &self.layout);
        IntentOutcome {
            layout: self.layout.clone(),
            changed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::CompactionAxis;

    fn session(layout: Layout, config: GridConfig) -> (GridSession<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let session = GridSession::with_clock(config, layout, clock.clone()).unwrap();
        (session, clock)
    }

    fn position(session: &GridSession<ManualClock>, key: &str) -> Option<(i32, i32)> {
        get_layout_item(session.layout(), key).map(LayoutItem::position)
    }

    #[test]
    fn test_drag_without_target_moves_item() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 4, 0, 2, 2)];
        let (mut session, _) = session(layout, GridConfig::new(12));

        session.start_drag("a");
        let outcome = session.drag_to("a", 8, 0);
        assert!(outcome.changed);
        assert_eq!(position(&session, "a"), Some((8, 0)));

        let outcome = session.end_drag("a", 8, 0);
        assert!(outcome.changed);
        assert_eq!(session.grouping_state(), &GroupingState::Idle);
    }

    #[test]
    fn test_hover_then_release_merges() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 2, 0, 2, 2)];
        let (mut session, clock) = session(layout, GridConfig::new(6));

        session.start_drag("a");
        let outcome = session.drag_to("a", 1, 0);
        assert!(!outcome.changed);
        assert_eq!(session.grouping_state().target(), Some("b"));

        clock.advance_ms(1000);
        assert!(session.tick());
        assert!(session.grouping_state().is_droppable());

        let outcome = session.end_drag("a", 1, 0);
        assert!(outcome.changed);
        assert_eq!(outcome.layout.len(), 1);
        assert!(outcome.layout[0].is_group);
        assert_eq!(outcome.layout[0].position(), (2, 0));
        assert!(session
            .take_events()
            .iter()
            .any(|event| matches!(event, SessionEvent::GroupMerged { .. })));
    }

    #[test]
    fn test_early_release_does_not_merge() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 2, 0, 2, 2)];
        let (mut session, clock) = session(layout, GridConfig::new(6));

        session.start_drag("a");
        session.drag_to("a", 1, 0);
        clock.advance_ms(400);
        let outcome = session.end_drag("a", 0, 0);

        assert_eq!(outcome.layout.len(), 2);
        assert!(!outcome.changed);
    }

    #[test]
    fn test_merge_delay_follows_config() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 2, 0, 2, 2)];
        let (mut session, clock) = session(layout, GridConfig::new(6).with_merge_delay_ms(250));

        session.drag_to("a", 1, 0);
        clock.advance_ms(249);
        assert!(!session.tick());
        clock.advance_ms(1);
        assert!(session.tick());
        assert!(session.grouping_state().is_droppable());
    }

    #[test]
    fn test_huge_drag_target_is_clamped() {
        let layout = vec![LayoutItem::new("a", 0, 0, 1, 1), LayoutItem::new("b", 3, 0, 1, 1)];
        let config = GridConfig::new(12).with_axis(CompactionAxis::None);
        let (mut session, _) = session(layout, config);

        let outcome = session.drag_to("a", 0, i32::MAX);
        assert!(outcome.changed);
        assert_eq!(position(&session, "a"), Some((0, MAX_CELL - 1)));

        session.end_drag("a", 0, i32::MAX);
        assert_eq!(position(&session, "a"), Some((0, MAX_CELL - 1)));
    }

    #[test]
    fn test_huge_drop_target_lands_at_bottom() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2)];
        let (mut session, _) = session(layout, GridConfig::new(12));

        let raw = RawItem::new("far", 0.0, 0.0, 1.0, 1.0);
        session.drop_external_item(raw, 4, i32::MAX).unwrap();
        assert_eq!(position(&session, "far"), Some((4, 0)));

        let raw = RawItem::new("under", 0.0, 0.0, 2.0, 1.0);
        session.drop_external_item(raw, 0, i32::MAX).unwrap();
        assert_eq!(position(&session, "under"), Some((0, 2)));
    }

    #[test]
    fn test_grouping_disabled_moves_instead() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 2, 0, 2, 2)];
        let config = GridConfig::new(6).with_grouping(false);
        let (mut session, _) = session(layout, config);

        session.start_drag("a");
        let outcome = session.drag_to("a", 2, 0);
        assert!(outcome.changed);
        assert_eq!(session.grouping_state(), &GroupingState::Idle);
    }

    #[test]
    fn test_cancel_restores_start() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 4, 0, 2, 2)];
        let (mut session, _) = session(layout.clone(), GridConfig::new(12));

        session.start_drag("a");
        session.drag_to("a", 8, 0);
        let outcome = session.cancel_gesture();
        assert!(outcome.changed);
        assert!(layouts_equal(session.layout(), &layout));
    }

    #[test]
    fn test_static_items_ignore_gestures() {
        let layout = vec![LayoutItem::new("s", 0, 0, 2, 2).with_static(true)];
        let (mut session, _) = session(layout, GridConfig::new(12));

        let outcome = session.drag_to("s", 5, 5);
        assert!(!outcome.changed);
        assert_eq!(position(&session, "s"), Some((0, 0)));
        assert!(!session.resize_to("s", 4, 4, ResizeHandle::Se).changed);
    }

    #[test]
    fn test_max_rows_clamps_drag() {
        let layout = vec![LayoutItem::new("a", 0, 0, 1, 2)];
        let config = GridConfig::new(12).with_axis(CompactionAxis::None).with_max_rows(4);
        let (mut session, _) = session(layout, config);

        session.drag_to("a", 20, 20);
        assert_eq!(position(&session, "a"), Some((11, 2)));
    }

    #[test]
    fn test_drop_external_item() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2)];
        let (mut session, _) = session(layout, GridConfig::new(12));

        let raw = RawItem::new("new", 0.0, 0.0, 2.0, 1.0);
        let outcome = session.drop_external_item(raw.clone(), 0, 0).unwrap();
        assert!(outcome.changed);
        assert_eq!(position(&session, "new"), Some((0, 0)));
        assert_eq!(position(&session, "a"), Some((0, 1)));

        assert_eq!(
            session.drop_external_item(raw, 4, 0).unwrap_err(),
            LayoutError::DuplicateKey("new".into())
        );
    }

    #[test]
    fn test_remove_item_compacts() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2), LayoutItem::new("b", 0, 2, 2, 2)];
        let (mut session, _) = session(layout, GridConfig::new(12));

        let outcome = session.remove_item("a");
        assert!(outcome.changed);
        assert_eq!(position(&session, "b"), Some((0, 0)));
        assert!(!session.remove_item("a").changed);
    }

    #[test]
    fn test_dispatch_parses_intents() {
        let layout = vec![LayoutItem::new("a", 0, 0, 2, 2)];
        let (mut session, _) = session(layout, GridConfig::new(12));

        let intent: Intent =
            serde_json::from_str(r#"{"type": "resize_to", "key": "a", "w": 3, "h": 1}"#).unwrap();
        let outcome = session.dispatch(intent).unwrap();
        assert!(outcome.changed);
        assert_eq!((outcome.layout[0].w, outcome.layout[0].h), (3, 1));

        let end: Intent = serde_json::from_str(r#"{"type": "end_resize", "key": "a"}"#).unwrap();
        assert!(session.dispatch(end).unwrap().changed);
    }
}
