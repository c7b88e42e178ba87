//! The editor coordinator: facade over handle, command, event and
//! behavior registries.
//!
//! ## Learning: The Facade Pattern
//!
//! External code (UI shell, extension layer, demo binary) talks to
//! `EditorCoordinator` and receives shared registry references from it;
//! nothing else constructs registries. Every high-level operation reads
//! the current handle at the moment of use — never cached across an
//! await point — and degrades to a logged no-op when no widget is
//! mounted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::behavior::BehaviorRegistry;
use crate::command::{Command, CommandRegistry, WidgetAction};
use crate::config::ShellConfig;
use crate::event::{EditorEvent, EventBus, EventKind, Subscription};
use crate::handle::{EditorHandle, HandleId, HandleRegistry};
use crate::widget::{actions, EditorWidget, Position, Selection, ViewOptions, WidgetObserver};

/// Dirty-flag and save bookkeeping shared with the autosave task.
struct SaveState {
    pending: AtomicBool,
    current_file: Mutex<Option<String>>,
    last_save: Mutex<Option<Instant>>,
}

impl SaveState {
    fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            current_file: Mutex::new(None),
            last_save: Mutex::new(None),
        }
    }
}

/// Top-level coordination facade for one running editor shell.
pub struct EditorCoordinator {
    handles: Arc<HandleRegistry>,
    commands: Arc<CommandRegistry>,
    behaviors: Arc<BehaviorRegistry>,
    bus: EventBus,
    save: Arc<SaveState>,
    view: Mutex<ViewOptions>,
    subscriptions: Mutex<Vec<Subscription>>,
    autosave: Mutex<Option<tokio::task::JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl EditorCoordinator {
    /// Creates a coordinator with freshly constructed registries.
    ///
    /// Installs the content-changed subscription that drives the dirty
    /// flag, registers the built-in command set, and — when a tokio
    /// runtime is present and autosave is enabled — spawns the periodic
    /// autosave sweep.
    pub fn new(config: &ShellConfig) -> Self {
        let handles = Arc::new(HandleRegistry::new());
        let commands = Arc::new(CommandRegistry::with_policy(
            handles.clone(),
            config.commands.duplicate_policy,
        ));
        let behaviors = Arc::new(BehaviorRegistry::new(handles.clone()));
        let bus = EventBus::new();
        let save = Arc::new(SaveState::new());

        let dirty_sub = {
            let save = save.clone();
            bus.subscribe(EventKind::ContentChanged, move |_| {
                save.pending.store(true, Ordering::SeqCst);
            })
        };

        let coordinator = Self {
            handles,
            commands,
            behaviors,
            bus,
            save,
            view: Mutex::new(config.view.clone()),
            subscriptions: Mutex::new(vec![dirty_sub]),
            autosave: Mutex::new(None),
            disposed: AtomicBool::new(false),
        };

        coordinator.register_builtin_commands(config);
        *coordinator.autosave.lock() = coordinator.spawn_autosave(config);
        coordinator
    }

    // ==================== Registry Access ====================

    pub fn handles(&self) -> &Arc<HandleRegistry> {
        &self.handles
    }

    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    pub fn behaviors(&self) -> &Arc<BehaviorRegistry> {
        &self.behaviors
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    // ==================== Mount Lifecycle ====================

    /// Mounts a widget, making it the current editor.
    ///
    /// The previous widget's observer is released first, so callbacks
    /// never double-register across remounts; the forwarder installed
    /// here additionally checks the handle id, dropping late callbacks
    /// from a superseded mount. Registered chords and behaviors are
    /// re-applied to the new widget.
    pub fn mount<W: EditorWidget + 'static>(&self, widget: &Arc<W>) -> EditorHandle {
        let widget: Arc<dyn EditorWidget> = widget.clone();
        if let Some(previous) = self.handles.current().and_then(|h| h.acquire()) {
            previous.set_observer(None);
        }

        let handle = EditorHandle::new(&widget);
        self.handles.set(handle.clone());

        widget.set_observer(Some(Arc::new(ObserverForwarder {
            handle_id: handle.id(),
            handles: self.handles.clone(),
            bus: self.bus.clone(),
        })));
        self.commands.bind_all(&widget);
        self.behaviors.attach_all(&widget);
        let view = self.view.lock().clone();
        widget.apply_view(&view);

        self.bus.emit(EditorEvent::Ready);
        tracing::debug!(handle = %handle.id(), "editor mounted");
        handle
    }

    /// Unmounts the current widget, if any.
    ///
    /// The widget itself is not disposed; the UI layer owns teardown.
    pub fn unmount(&self) {
        if let Some(handle) = self.handles.take() {
            if let Some(widget) = handle.acquire() {
                widget.set_observer(None);
            }
            tracing::debug!(handle = %handle.id(), "editor unmounted");
        }
    }

    // ==================== Editor Operations ====================

    pub fn format_document(&self) {
        self.run_builtin(WidgetAction::FormatDocument);
    }

    pub fn toggle_comment(&self) {
        self.run_builtin(WidgetAction::ToggleComment);
    }

    pub fn fold_all(&self) {
        self.run_builtin(WidgetAction::FoldAll);
    }

    pub fn unfold_all(&self) {
        self.run_builtin(WidgetAction::UnfoldAll);
    }

    pub fn go_to_definition(&self) {
        self.run_builtin(WidgetAction::GoToDefinition);
    }

    pub fn find_references(&self) {
        self.run_builtin(WidgetAction::FindReferences);
    }

    /// Places an additional cursor at the given position.
    pub fn add_cursor_at(&self, line: usize, column: usize) {
        let Some(widget) = self.handles.acquire() else {
            return;
        };
        widget.set_position(Position::new(line, column));
        widget.run_action(actions::INSERT_CURSOR);
    }

    /// Runs an arbitrary widget action by id against the current widget.
    ///
    /// Returns false when no widget is mounted or the widget rejects
    /// the action.
    pub fn run_action(&self, action_id: &str) -> bool {
        match self.handles.acquire() {
            Some(widget) => widget.run_action(action_id),
            None => {
                tracing::debug!(action_id, "action skipped: no active editor");
                false
            }
        }
    }

    fn run_builtin(&self, action: WidgetAction) {
        self.run_action(action.action_id());
    }

    // ==================== Saving ====================

    /// Sets the file identity used by the save path.
    pub fn set_current_file(&self, path: impl Into<String>) {
        *self.save.current_file.lock() = Some(path.into());
    }

    /// Clears the file identity; subsequent saves become no-ops.
    pub fn clear_current_file(&self) {
        *self.save.current_file.lock() = None;
    }

    /// Returns the current file path, if any.
    pub fn current_file(&self) -> Option<String> {
        self.save.current_file.lock().clone()
    }

    /// Returns true if content changed since the last save.
    pub fn pending_changes(&self) -> bool {
        self.save.pending.load(Ordering::SeqCst)
    }

    /// Returns when the last save happened, if any.
    pub fn last_save_time(&self) -> Option<Instant> {
        *self.save.last_save.lock()
    }

    /// Saves the current file: reads content from the widget, clears
    /// the dirty flag, stamps the save time, and emits
    /// [`EditorEvent::Saved`].
    ///
    /// Persistence is the file-store collaborator's responsibility; a
    /// missing widget or file identity makes this a logged no-op.
    pub fn save(&self) {
        perform_save(&self.handles, &self.save, &self.bus);
    }

    // ==================== View Options ====================

    pub fn view(&self) -> ViewOptions {
        self.view.lock().clone()
    }

    pub fn set_theme(&self, theme: impl Into<String>) {
        self.update_view(|view| view.theme = theme.into());
    }

    pub fn set_font_size(&self, size: f32) {
        self.update_view(|view| view.font_size = size);
    }

    pub fn set_word_wrap(&self, enabled: bool) {
        self.update_view(|view| view.word_wrap = enabled);
    }

    pub fn set_minimap(&self, enabled: bool) {
        self.update_view(|view| view.minimap = enabled);
    }

    pub fn set_line_numbers(&self, enabled: bool) {
        self.update_view(|view| view.line_numbers = enabled);
    }

    fn update_view(&self, apply: impl FnOnce(&mut ViewOptions)) {
        let snapshot = {
            let mut view = self.view.lock();
            apply(&mut view);
            view.clone()
        };
        if let Some(widget) = self.handles.acquire() {
            widget.apply_view(&snapshot);
        }
    }

    // ==================== Lifecycle ====================

    /// Cancels the autosave task and releases every subscription this
    /// coordinator installed. Safe to call more than once.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(task) = self.autosave.lock().take() {
            task.abort();
        }
        self.subscriptions.lock().clear();
        tracing::debug!("coordinator disposed");
    }

    // ==================== Setup ====================

    fn register_builtin_commands(&self, config: &ShellConfig) {
        let defaults = [
            Command::builtin(
                "format.document",
                "Format Document",
                WidgetAction::FormatDocument,
            )
            .with_keybinding("Alt+Shift+F"),
            Command::builtin(
                "editor.toggleComment",
                "Toggle Line Comment",
                WidgetAction::ToggleComment,
            )
            .with_keybinding("Ctrl+/"),
            Command::builtin("editor.foldAll", "Fold All", WidgetAction::FoldAll),
            Command::builtin("editor.unfoldAll", "Unfold All", WidgetAction::UnfoldAll),
            Command::builtin(
                "editor.goToDefinition",
                "Go to Definition",
                WidgetAction::GoToDefinition,
            )
            .with_keybinding("F12"),
            Command::builtin(
                "editor.findReferences",
                "Find References",
                WidgetAction::FindReferences,
            )
            .with_keybinding("Shift+F12"),
            self.save_command(),
        ];

        for mut command in defaults {
            if let Some(chord) = config.keyboard.bindings.get(&command.id) {
                command.keybinding = Some(chord.clone());
            }
            if let Err(error) = self.commands.register(command) {
                tracing::warn!(%error, "builtin command registration failed");
            }
        }
    }

    fn save_command(&self) -> Command {
        let handles = self.handles.clone();
        let save = self.save.clone();
        let bus = self.bus.clone();
        Command::callback("file.save", "Save File", move |_widget| {
            perform_save(&handles, &save, &bus);
        })
        .with_keybinding("Ctrl+S")
    }

    fn spawn_autosave(&self, config: &ShellConfig) -> Option<tokio::task::JoinHandle<()>> {
        let period = config.autosave.interval()?;
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no tokio runtime; autosave sweep disabled");
            return None;
        };

        let handles = self.handles.clone();
        let save = self.save.clone();
        let bus = self.bus.clone();
        Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick of a tokio interval fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if save.pending.load(Ordering::SeqCst) {
                    tracing::debug!("autosave sweep: pending changes");
                    perform_save(&handles, &save, &bus);
                }
            }
        }))
    }
}

impl Drop for EditorCoordinator {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// The shared save path used by manual save, the `file.save` command
/// and the autosave sweep. Re-fetches the handle at call time.
fn perform_save(handles: &HandleRegistry, save: &SaveState, bus: &EventBus) {
    let Some(path) = save.current_file.lock().clone() else {
        tracing::debug!("save skipped: no current file");
        return;
    };
    let Some(widget) = handles.acquire() else {
        tracing::debug!("save skipped: no active editor");
        return;
    };

    let content = widget.value();
    save.pending.store(false, Ordering::SeqCst);
    *save.last_save.lock() = Some(Instant::now());
    bus.emit(EditorEvent::Saved { path, content });
}

/// Forwards widget callbacks for one mount into the event bus.
///
/// Guarded by the handle id: a widget implementation that keeps firing
/// after being superseded cannot leak events from a stale mount.
struct ObserverForwarder {
    handle_id: HandleId,
    handles: Arc<HandleRegistry>,
    bus: EventBus,
}

impl ObserverForwarder {
    fn forward(&self, event: EditorEvent) {
        if self.handles.is_current(self.handle_id) {
            self.bus.emit(event);
        } else {
            tracing::trace!(handle = %self.handle_id, "dropping event from stale mount");
        }
    }
}

impl WidgetObserver for ObserverForwarder {
    fn content_changed(&self) {
        self.forward(EditorEvent::ContentChanged);
    }

    fn cursor_moved(&self, position: Position) {
        self.forward(EditorEvent::CursorMoved(position));
    }

    fn selection_changed(&self, selection: Selection) {
        self.forward(EditorEvent::SelectionChanged(selection));
    }

    fn focus_changed(&self, focused: bool) {
        self.forward(if focused {
            EditorEvent::Focus
        } else {
            EditorEvent::Blur
        });
    }
}
