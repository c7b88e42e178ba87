//! Editor behaviors: opaque units extensions attach to the widget.
//!
//! A behavior is the "editor extension" half of an extension's
//! contribution (the other half being commands). The core never looks
//! inside one; it keeps the ordered list, attaches each entry to the
//! live widget, and removes entries by pointer identity — the same
//! object that registered must unregister.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::handle::HandleRegistry;
use crate::widget::EditorWidget;

/// A pluggable editor behavior contributed by an extension.
///
/// `attach`/`detach` run against every mount while the behavior is
/// registered. Both default to no-ops; a purely declarative behavior
/// only needs a name.
pub trait EditorBehavior: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &str;

    /// Called when a widget becomes available for this behavior.
    fn attach(&self, _widget: &Arc<dyn EditorWidget>) {}

    /// Called when the behavior is removed or the widget goes away.
    fn detach(&self, _widget: &Arc<dyn EditorWidget>) {}
}

/// Ordered list of registered behaviors.
pub struct BehaviorRegistry {
    handles: Arc<HandleRegistry>,
    entries: Mutex<Vec<Arc<dyn EditorBehavior>>>,
}

impl BehaviorRegistry {
    pub fn new(handles: Arc<HandleRegistry>) -> Self {
        Self {
            handles,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Appends a behavior and attaches it to the live widget if any.
    pub fn register(&self, behavior: Arc<dyn EditorBehavior>) {
        self.entries.lock().push(behavior.clone());
        if let Some(widget) = self.handles.acquire() {
            attach_isolated(&behavior, &widget);
        }
    }

    /// Removes a behavior by pointer identity; no-op if absent.
    pub fn unregister(&self, behavior: &Arc<dyn EditorBehavior>) {
        let removed = {
            let mut entries = self.entries.lock();
            match entries.iter().position(|b| Arc::ptr_eq(b, behavior)) {
                Some(index) => Some(entries.remove(index)),
                None => None,
            }
        };
        match removed {
            Some(behavior) => {
                if let Some(widget) = self.handles.acquire() {
                    if catch_unwind(AssertUnwindSafe(|| behavior.detach(&widget))).is_err() {
                        tracing::error!(name = behavior.name(), "behavior detach panicked");
                    }
                }
            }
            None => tracing::debug!("unregister: behavior not present"),
        }
    }

    /// Attaches every registered behavior to a freshly mounted widget.
    pub fn attach_all(&self, widget: &Arc<dyn EditorWidget>) {
        let snapshot: Vec<_> = self.entries.lock().clone();
        for behavior in snapshot {
            attach_isolated(&behavior, widget);
        }
    }

    /// Returns the names of registered behaviors, in order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|b| b.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn attach_isolated(behavior: &Arc<dyn EditorBehavior>, widget: &Arc<dyn EditorWidget>) {
    if catch_unwind(AssertUnwindSafe(|| behavior.attach(widget))).is_err() {
        tracing::error!(name = behavior.name(), "behavior attach panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::EditorHandle;
    use crate::headless::HeadlessWidget;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBehavior {
        attaches: AtomicUsize,
        detaches: AtomicUsize,
    }

    impl CountingBehavior {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                attaches: AtomicUsize::new(0),
                detaches: AtomicUsize::new(0),
            })
        }
    }

    impl EditorBehavior for CountingBehavior {
        fn name(&self) -> &str {
            "counting"
        }

        fn attach(&self, _widget: &Arc<dyn EditorWidget>) {
            self.attaches.fetch_add(1, Ordering::SeqCst);
        }

        fn detach(&self, _widget: &Arc<dyn EditorWidget>) {
            self.detaches.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_register_attaches_on_live_widget() {
        let handles = Arc::new(HandleRegistry::new());
        let registry = BehaviorRegistry::new(handles.clone());
        let widget: Arc<dyn EditorWidget> = Arc::new(HeadlessWidget::new());
        handles.set(EditorHandle::new(&widget));

        let behavior = CountingBehavior::new();
        registry.register(behavior.clone());
        assert_eq!(behavior.attaches.load(Ordering::SeqCst), 1);

        registry.unregister(&(behavior.clone() as Arc<dyn EditorBehavior>));
        assert_eq!(behavior.detaches.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_without_widget_defers_attach() {
        let handles = Arc::new(HandleRegistry::new());
        let registry = BehaviorRegistry::new(handles);
        let behavior = CountingBehavior::new();

        registry.register(behavior.clone());
        assert_eq!(behavior.attaches.load(Ordering::SeqCst), 0);

        let widget: Arc<dyn EditorWidget> = Arc::new(HeadlessWidget::new());
        registry.attach_all(&widget);
        assert_eq!(behavior.attaches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let handles = Arc::new(HandleRegistry::new());
        let registry = BehaviorRegistry::new(handles);
        let behavior = CountingBehavior::new();
        registry.unregister(&(behavior as Arc<dyn EditorBehavior>));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_identity_not_name_decides_removal() {
        let handles = Arc::new(HandleRegistry::new());
        let registry = BehaviorRegistry::new(handles);
        let first = CountingBehavior::new();
        let second = CountingBehavior::new();

        registry.register(first.clone());
        registry.unregister(&(second as Arc<dyn EditorBehavior>));
        assert_eq!(registry.len(), 1);

        registry.unregister(&(first as Arc<dyn EditorBehavior>));
        assert!(registry.is_empty());
    }
}
