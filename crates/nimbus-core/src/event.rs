//! Event system for editor interaction notifications.
//!
//! ## Learning: Synchronous Observer Pattern, Safely
//!
//! UI-originated events (cursor moves, content edits, saves) must reach
//! subscribers on the same tick they happen, in subscription order. The
//! bus therefore invokes callbacks synchronously, but with two guards
//! borrowed from long-lived GUI codebases:
//!
//! - `emit` iterates a snapshot of the subscriber list taken at
//!   emit-start, so a callback that subscribes or unsubscribes during
//!   delivery never corrupts the iteration; late additions fire on the
//!   *next* emit.
//! - A panicking subscriber is caught and logged; remaining subscribers
//!   still run.
//!
//! Subscriptions are scoped: [`EventBus::subscribe`] returns a guard
//! that removes the callback when dropped, so teardown cannot forget
//! the paired "off" call.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::widget::{Position, Selection};

/// Events that can occur around the mounted editor widget.
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// A widget finished mounting and the handle is live
    Ready,
    /// The buffer content changed
    ContentChanged,
    /// The primary cursor moved
    CursorMoved(Position),
    /// The primary selection changed
    SelectionChanged(Selection),
    /// The widget gained focus
    Focus,
    /// The widget lost focus
    Blur,
    /// The current file was saved; persistence is the file store's job
    Saved { path: String, content: String },
}

impl EditorEvent {
    /// Returns the kind used for subscription routing.
    pub fn kind(&self) -> EventKind {
        match self {
            EditorEvent::Ready => EventKind::Ready,
            EditorEvent::ContentChanged => EventKind::ContentChanged,
            EditorEvent::CursorMoved(_) => EventKind::CursorMoved,
            EditorEvent::SelectionChanged(_) => EventKind::SelectionChanged,
            EditorEvent::Focus => EventKind::Focus,
            EditorEvent::Blur => EventKind::Blur,
            EditorEvent::Saved { .. } => EventKind::Saved,
        }
    }
}

/// Discriminant for [`EditorEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    ContentChanged,
    CursorMoved,
    SelectionChanged,
    Focus,
    Blur,
    Saved,
}

type Callback = Arc<dyn Fn(&EditorEvent) + Send + Sync>;

struct Entry {
    id: u64,
    callback: Callback,
}

struct BusShared {
    subscribers: Mutex<HashMap<EventKind, Vec<Entry>>>,
    next_id: AtomicU64,
}

/// In-process publish/subscribe channel for editor events.
///
/// Cloning is cheap and every clone addresses the same subscriber list.
#[derive(Clone)]
pub struct EventBus {
    shared: Arc<BusShared>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(BusShared {
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Appends a callback for `kind` and returns its subscription guard.
    ///
    /// The same closure value may subscribe to several kinds through
    /// separate calls; each subscription is independent. Dropping the
    /// guard unsubscribes; call [`Subscription::detach`] to keep the
    /// callback for the bus's lifetime instead.
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl Fn(&EditorEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared
            .subscribers
            .lock()
            .entry(kind)
            .or_default()
            .push(Entry {
                id,
                callback: Arc::new(callback),
            });

        Subscription {
            shared: Arc::downgrade(&self.shared),
            kind,
            id,
            detached: false,
        }
    }

    /// Delivers `event` to all current subscribers of its kind.
    ///
    /// Subscribers run synchronously in subscription order over a
    /// snapshot taken now; a subscriber added during delivery fires on
    /// the next emit.
    pub fn emit(&self, event: EditorEvent) {
        let snapshot: Vec<Callback> = {
            let subscribers = self.shared.subscribers.lock();
            match subscribers.get(&event.kind()) {
                Some(entries) => entries.iter().map(|e| e.callback.clone()).collect(),
                None => return,
            }
        };

        for callback in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                tracing::error!(event = ?event.kind(), "event subscriber panicked; continuing");
            }
        }
    }

    /// Returns the number of live subscriptions for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.shared
            .subscribers
            .lock()
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for one subscription; unsubscribes on drop.
pub struct Subscription {
    shared: Weak<BusShared>,
    kind: EventKind,
    id: u64,
    detached: bool,
}

impl Subscription {
    /// Keeps the callback subscribed for the bus's remaining lifetime.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        if let Some(shared) = self.shared.upgrade() {
            if let Some(entries) = shared.subscribers.lock().get_mut(&self.kind) {
                entries.retain(|e| e.id != self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    #[test]
    fn test_emit_in_subscription_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let o1 = order.clone();
        let _a = bus.subscribe(EventKind::Focus, move |_| o1.lock().push("a"));
        let o2 = order.clone();
        let _b = bus.subscribe(EventKind::Focus, move |_| o2.lock().push("b"));

        bus.emit(EditorEvent::Focus);
        assert_eq!(*order.lock(), vec!["a", "b"]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        let sub = bus.subscribe(EventKind::Blur, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(EditorEvent::Blur);
        drop(sub);
        bus.emit(EditorEvent::Blur);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(EventKind::Blur), 0);
    }

    #[test]
    fn test_detach_outlives_guard() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        bus.subscribe(EventKind::Ready, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        })
        .detach();

        bus.emit(EditorEvent::Ready);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscriber_added_during_emit_fires_next_time() {
        let bus = EventBus::new();
        let late_hits = Arc::new(AtomicUsize::new(0));

        let bus2 = bus.clone();
        let late = late_hits.clone();
        let installed = Arc::new(AtomicBool::new(false));
        bus.subscribe(EventKind::ContentChanged, move |_| {
            if !installed.swap(true, Ordering::SeqCst) {
                let late = late.clone();
                bus2.subscribe(EventKind::ContentChanged, move |_| {
                    late.fetch_add(1, Ordering::SeqCst);
                })
                .detach();
            }
        })
        .detach();

        bus.emit(EditorEvent::ContentChanged);
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);

        bus.emit(EditorEvent::ContentChanged);
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_emit_uses_snapshot() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let bus2 = bus.clone();
        let reentered = Arc::new(AtomicBool::new(false));
        let h = hits.clone();
        bus.subscribe(EventKind::Focus, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
            if !reentered.swap(true, Ordering::SeqCst) {
                bus2.emit(EditorEvent::Focus);
            }
        })
        .detach();

        bus.emit(EditorEvent::Focus);
        // Outer emit once, inner emit once.
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        bus.subscribe(EventKind::Saved, |_| panic!("boom")).detach();
        let h = hits.clone();
        bus.subscribe(EventKind::Saved, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        })
        .detach();

        bus.emit(EditorEvent::Saved {
            path: "a.txt".into(),
            content: String::new(),
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_same_callback_on_multiple_kinds() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = hits.clone();
        let callback = move |_: &EditorEvent| {
            h.fetch_add(1, Ordering::SeqCst);
        };
        let _focus = bus.subscribe(EventKind::Focus, callback.clone());
        let _blur = bus.subscribe(EventKind::Blur, callback);

        bus.emit(EditorEvent::Focus);
        bus.emit(EditorEvent::Blur);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
