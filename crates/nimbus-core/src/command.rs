//! Command system: named, invocable actions dispatched against the
//! current widget handle.
//!
//! ## Learning: Closed Variants plus an Escape Hatch
//!
//! Built-in commands are a small enum (`WidgetAction`) resolved to the
//! widget's own action namespace — exhaustive and allocation-free.
//! Extension commands carry a strongly-typed callback instead of a
//! stringly-typed payload, so extensibility never costs type safety.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::handle::HandleRegistry;
use crate::widget::{actions, EditorWidget};
use crate::{CoreError, CoreResult};

/// One of the widget's built-in editing actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    FormatDocument,
    ToggleComment,
    FoldAll,
    UnfoldAll,
    GoToDefinition,
    FindReferences,
}

impl WidgetAction {
    /// Resolves to the widget's action id.
    pub fn action_id(self) -> &'static str {
        match self {
            WidgetAction::FormatDocument => actions::FORMAT_DOCUMENT,
            WidgetAction::ToggleComment => actions::TOGGLE_COMMENT,
            WidgetAction::FoldAll => actions::FOLD_ALL,
            WidgetAction::UnfoldAll => actions::UNFOLD_ALL,
            WidgetAction::GoToDefinition => actions::GO_TO_DEFINITION,
            WidgetAction::FindReferences => actions::FIND_REFERENCES,
        }
    }
}

/// A strongly-typed command body supplied by an extension or the host.
#[derive(Clone)]
pub struct CommandCallback(Arc<dyn Fn(&Arc<dyn EditorWidget>) + Send + Sync>);

impl CommandCallback {
    pub fn new(f: impl Fn(&Arc<dyn EditorWidget>) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    fn invoke(&self, widget: &Arc<dyn EditorWidget>) {
        (self.0)(widget);
    }
}

impl std::fmt::Debug for CommandCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CommandCallback")
    }
}

/// What a command does when dispatched.
#[derive(Debug, Clone)]
pub enum CommandAction {
    /// Delegate to one of the widget's built-in actions.
    Builtin(WidgetAction),
    /// Run a callback against the live widget.
    Callback(CommandCallback),
}

/// A named, invocable action with an optional keybinding chord.
#[derive(Debug, Clone)]
pub struct Command {
    /// Unique identifier, e.g. `"format.document"`
    pub id: String,
    /// Human-readable label for the command palette
    pub label: String,
    /// Opaque chord string understood by the widget, e.g. `"Ctrl+S"`
    pub keybinding: Option<String>,
    /// The command body
    pub action: CommandAction,
}

impl Command {
    /// Creates a command delegating to a built-in widget action.
    pub fn builtin(id: impl Into<String>, label: impl Into<String>, action: WidgetAction) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            keybinding: None,
            action: CommandAction::Builtin(action),
        }
    }

    /// Creates a command running a callback against the live widget.
    pub fn callback(
        id: impl Into<String>,
        label: impl Into<String>,
        f: impl Fn(&Arc<dyn EditorWidget>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            keybinding: None,
            action: CommandAction::Callback(CommandCallback::new(f)),
        }
    }

    /// Attaches a keybinding chord.
    pub fn with_keybinding(mut self, chord: impl Into<String>) -> Self {
        self.keybinding = Some(chord.into());
        self
    }
}

/// Policy for a `register` call that collides on id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Reject the new command with an error (the default).
    #[default]
    Reject,
    /// Last write wins; the previous command is dropped.
    Replace,
}

/// Registry of commands in registration order.
///
/// The registry reads the current widget through the shared
/// [`HandleRegistry`] at dispatch time; it holds no editor state of its
/// own. Chords of registered commands are bound on the live widget
/// immediately and re-bound by the coordinator on every mount.
pub struct CommandRegistry {
    handles: Arc<HandleRegistry>,
    policy: DuplicatePolicy,
    entries: Mutex<IndexMap<String, Command>>,
}

impl CommandRegistry {
    /// Creates a registry with the default reject-duplicates policy.
    pub fn new(handles: Arc<HandleRegistry>) -> Self {
        Self::with_policy(handles, DuplicatePolicy::default())
    }

    /// Creates a registry with an explicit duplicate policy.
    pub fn with_policy(handles: Arc<HandleRegistry>, policy: DuplicatePolicy) -> Self {
        Self {
            handles,
            policy,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    /// Inserts a command, binding its chord on the live widget if any.
    ///
    /// On an id collision the configured [`DuplicatePolicy`] decides:
    /// `Reject` surfaces a recoverable [`CoreError::DuplicateCommand`],
    /// `Replace` drops the previous command (and its chord binding).
    pub fn register(&self, command: Command) -> CoreResult<()> {
        let replaced = {
            let mut entries = self.entries.lock();
            if entries.contains_key(&command.id) {
                match self.policy {
                    DuplicatePolicy::Reject => {
                        return Err(CoreError::DuplicateCommand(command.id));
                    }
                    DuplicatePolicy::Replace => {
                        tracing::debug!(id = %command.id, "replacing registered command");
                    }
                }
            }
            entries.insert(command.id.clone(), command.clone())
        };

        // Widget calls happen outside the registry lock.
        if let Some(widget) = self.handles.acquire() {
            if let Some(chord) = replaced.as_ref().and_then(|c| c.keybinding.as_deref()) {
                if command.keybinding.as_deref() != Some(chord) {
                    widget.unbind_chord(chord);
                }
            }
            if let Some(chord) = command.keybinding.as_deref() {
                widget.bind_chord(chord, &command.id);
            }
        }
        Ok(())
    }

    /// Removes a command by id; idempotent.
    ///
    /// Deactivation may run after a partial failure, so an absent id is
    /// a logged no-op rather than an error.
    pub fn unregister(&self, id: &str) {
        let removed = self.entries.lock().shift_remove(id);
        match removed {
            Some(command) => {
                if let (Some(chord), Some(widget)) =
                    (command.keybinding.as_deref(), self.handles.acquire())
                {
                    widget.unbind_chord(chord);
                }
            }
            None => tracing::debug!(id, "unregister: command not present"),
        }
    }

    /// Returns a snapshot of all commands in registration order.
    pub fn commands(&self) -> Vec<Command> {
        self.entries.lock().values().cloned().collect()
    }

    /// Returns true if `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Dispatches a command against the current widget.
    ///
    /// An unknown id is a recoverable error. With no live widget the
    /// dispatch short-circuits as a logged no-op — command bodies are
    /// never invoked without an editor.
    pub fn dispatch(&self, id: &str) -> CoreResult<()> {
        let command = self
            .entries
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::CommandNotFound(id.to_string()))?;

        let Some(widget) = self.handles.acquire() else {
            tracing::debug!(id, "dispatch skipped: no active editor");
            return Ok(());
        };

        match &command.action {
            CommandAction::Builtin(action) => {
                if !widget.run_action(action.action_id()) {
                    tracing::warn!(id, action = action.action_id(), "widget rejected action");
                }
            }
            CommandAction::Callback(callback) => {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    callback.invoke(&widget)
                }));
                if result.is_err() {
                    tracing::error!(id, "command callback panicked; isolated");
                }
            }
        }
        Ok(())
    }

    /// Binds every registered chord on a freshly mounted widget.
    pub fn bind_all(&self, widget: &Arc<dyn EditorWidget>) {
        let bindings: Vec<(String, String)> = self
            .entries
            .lock()
            .values()
            .filter_map(|c| c.keybinding.clone().map(|chord| (chord, c.id.clone())))
            .collect();
        for (chord, id) in bindings {
            widget.bind_chord(&chord, &id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessWidget;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn registry() -> (Arc<HandleRegistry>, CommandRegistry) {
        let handles = Arc::new(HandleRegistry::new());
        let commands = CommandRegistry::new(handles.clone());
        (handles, commands)
    }

    fn mount(handles: &HandleRegistry) -> Arc<HeadlessWidget> {
        let widget = Arc::new(HeadlessWidget::new());
        let as_dyn: Arc<dyn EditorWidget> = widget.clone();
        handles.set(crate::handle::EditorHandle::new(&as_dyn));
        widget
    }

    #[test]
    fn test_dispatch_invokes_callback_once_with_widget() {
        let (handles, commands) = registry();
        let widget = mount(&handles);
        widget.set_value("fn main() {}");

        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        commands
            .register(Command::callback("save", "Save", move |w| {
                assert_eq!(w.value(), "fn main() {}");
                h.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        commands.dispatch("save").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_without_widget_is_silent_noop() {
        let (_handles, commands) = registry();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        commands
            .register(Command::callback("noop", "Noop", move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        commands.dispatch("noop").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispatch_unknown_id() {
        let (_handles, commands) = registry();
        assert!(matches!(
            commands.dispatch("missing"),
            Err(CoreError::CommandNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let (_handles, commands) = registry();
        commands
            .register(Command::builtin("cmd-a", "A", WidgetAction::FoldAll))
            .unwrap();
        let second = commands.register(Command::builtin("cmd-a", "A again", WidgetAction::FoldAll));
        assert!(matches!(second, Err(CoreError::DuplicateCommand(_))));
        assert_eq!(commands.len(), 1);
        assert_eq!(commands.commands()[0].label, "A");
    }

    #[test]
    fn test_replace_policy_last_write_wins() {
        let handles = Arc::new(HandleRegistry::new());
        let commands = CommandRegistry::with_policy(handles, DuplicatePolicy::Replace);
        commands
            .register(Command::builtin("cmd-a", "First", WidgetAction::FoldAll))
            .unwrap();
        commands
            .register(Command::builtin("cmd-a", "Second", WidgetAction::UnfoldAll))
            .unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands.commands()[0].label, "Second");
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let (_handles, commands) = registry();
        commands
            .register(Command::builtin("x", "X", WidgetAction::FoldAll))
            .unwrap();
        commands.unregister("x");
        commands.unregister("x");
        assert!(commands.is_empty());
    }

    #[test]
    fn test_builtin_dispatch_runs_widget_action() {
        let (handles, commands) = registry();
        let widget = mount(&handles);
        commands
            .register(Command::builtin(
                "format.document",
                "Format Document",
                WidgetAction::FormatDocument,
            ))
            .unwrap();

        commands.dispatch("format.document").unwrap();
        assert_eq!(widget.ran_actions(), vec![actions::FORMAT_DOCUMENT]);
    }

    #[test]
    fn test_register_binds_chord_on_live_widget() {
        let (handles, commands) = registry();
        let widget = mount(&handles);
        commands
            .register(
                Command::builtin("fold", "Fold All", WidgetAction::FoldAll)
                    .with_keybinding("Ctrl+Shift+["),
            )
            .unwrap();

        assert_eq!(widget.chord_target("Ctrl+Shift+["), Some("fold".into()));
        commands.unregister("fold");
        assert_eq!(widget.chord_target("Ctrl+Shift+["), None);
    }

    #[test]
    fn test_panicking_callback_is_isolated() {
        let (handles, commands) = registry();
        let _widget = mount(&handles);
        commands
            .register(Command::callback("bad", "Bad", |_| panic!("extension bug")))
            .unwrap();
        // Must not propagate.
        commands.dispatch("bad").unwrap();
    }

    proptest! {
        /// After any register/unregister sequence the listing holds
        /// exactly the surviving ids, in original registration order.
        #[test]
        fn prop_listing_matches_survivors(ops in prop::collection::vec((any::<bool>(), 0u8..8), 0..64)) {
            let (_handles, commands) = registry();
            let mut model: Vec<String> = Vec::new();

            for (is_register, n) in ops {
                let id = format!("cmd-{n}");
                if is_register {
                    if commands.register(Command::builtin(&id, &id, WidgetAction::FoldAll)).is_ok() {
                        model.push(id);
                    }
                } else {
                    commands.unregister(&id);
                    model.retain(|m| *m != id);
                }
            }

            let listed: Vec<String> = commands.commands().into_iter().map(|c| c.id).collect();
            prop_assert_eq!(listed, model);
        }
    }
}
