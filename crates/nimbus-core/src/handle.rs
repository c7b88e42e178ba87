//! The live editor-widget handle and its registry.
//!
//! ## Learning: Newtypes over Raw IDs
//!
//! `HandleId` is a newtype wrapper around `Uuid`, the same pattern the
//! rest of the workspace uses for identifiers. A new mount always mints
//! a new id, so a handle captured before a remount can be told apart
//! from the current one.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::widget::EditorWidget;

/// Unique identifier for one mount of the editor widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(Uuid);

impl HandleId {
    /// Creates a new unique handle ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque capability for one mounted editor-widget instance.
///
/// A handle is created on mount and becomes stale on unmount or remount;
/// the widget itself stays owned by the UI layer. Holders read the widget
/// through [`EditorHandle::acquire`] at the moment of use and treat a
/// failed upgrade as "no editor".
#[derive(Clone)]
pub struct EditorHandle {
    id: HandleId,
    widget: Weak<dyn EditorWidget>,
}

impl EditorHandle {
    /// Creates a handle for a freshly mounted widget.
    pub fn new(widget: &Arc<dyn EditorWidget>) -> Self {
        Self {
            id: HandleId::new(),
            widget: Arc::downgrade(widget),
        }
    }

    /// Returns the handle's unique id.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Upgrades to the live widget, or `None` if it was disposed.
    pub fn acquire(&self) -> Option<Arc<dyn EditorWidget>> {
        self.widget.upgrade()
    }

    /// Returns true if the underlying widget is still alive.
    pub fn is_live(&self) -> bool {
        self.widget.strong_count() > 0
    }
}

impl std::fmt::Debug for EditorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHandle")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Owns the single current [`EditorHandle`].
///
/// There is no state machine beyond "has handle / has none". Consumers
/// must treat `None` as normal, not exceptional.
pub struct HandleRegistry {
    current: Mutex<Option<EditorHandle>>,
}

impl HandleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Replaces the current handle unconditionally.
    ///
    /// The previous widget is not disposed here; teardown of the wrapped
    /// widget belongs to the UI layer that mounted it.
    pub fn set(&self, handle: EditorHandle) {
        *self.current.lock() = Some(handle);
    }

    /// Returns the current handle, or `None` when no editor is mounted.
    pub fn current(&self) -> Option<EditorHandle> {
        self.current.lock().clone()
    }

    /// Clears the current handle; used on unmount.
    pub fn clear(&self) {
        *self.current.lock() = None;
    }

    /// Clears and returns the current handle.
    pub fn take(&self) -> Option<EditorHandle> {
        self.current.lock().take()
    }

    /// Returns true if `id` identifies the current mount.
    pub fn is_current(&self, id: HandleId) -> bool {
        self.current.lock().as_ref().map(EditorHandle::id) == Some(id)
    }

    /// Upgrades the current handle to the live widget in one step.
    pub fn acquire(&self) -> Option<Arc<dyn EditorWidget>> {
        self.current().and_then(|h| h.acquire())
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessWidget;

    #[test]
    fn test_registry_starts_empty() {
        let registry = HandleRegistry::new();
        assert!(registry.current().is_none());
        assert!(registry.acquire().is_none());
    }

    #[test]
    fn test_set_and_clear() {
        let registry = HandleRegistry::new();
        let widget: Arc<dyn EditorWidget> = Arc::new(HeadlessWidget::new());
        let handle = EditorHandle::new(&widget);
        let id = handle.id();

        registry.set(handle);
        assert!(registry.is_current(id));
        assert!(registry.acquire().is_some());

        registry.clear();
        assert!(registry.current().is_none());
    }

    #[test]
    fn test_acquire_after_widget_disposed() {
        let registry = HandleRegistry::new();
        let widget: Arc<dyn EditorWidget> = Arc::new(HeadlessWidget::new());
        registry.set(EditorHandle::new(&widget));

        drop(widget);
        let handle = registry.current().unwrap();
        assert!(!handle.is_live());
        assert!(handle.acquire().is_none());
        assert!(registry.acquire().is_none());
    }

    #[test]
    fn test_remount_mints_new_id() {
        let widget: Arc<dyn EditorWidget> = Arc::new(HeadlessWidget::new());
        let first = EditorHandle::new(&widget);
        let second = EditorHandle::new(&widget);
        assert_ne!(first.id(), second.id());
    }
}
