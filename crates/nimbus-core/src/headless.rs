//! An in-process editor widget with no rendering.
//!
//! `HeadlessWidget` is the reference implementation of the
//! [`EditorWidget`](crate::widget::EditorWidget) collaborator: an
//! in-memory buffer, a chord table, and a log of executed action ids.
//! The demo binary mounts one in place of a real embedded editor, and
//! the test suites drive it to exercise the observer path.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::widget::{EditorWidget, Position, Selection, ViewOptions, WidgetObserver};

#[derive(Default)]
struct WidgetState {
    content: String,
    position: Position,
    selection: Selection,
    chords: HashMap<String, String>,
    view: ViewOptions,
    ran_actions: Vec<String>,
}

type Dispatcher = Arc<dyn Fn(&str) + Send + Sync>;

/// A renderless widget for tests and demos.
pub struct HeadlessWidget {
    state: Mutex<WidgetState>,
    observer: Mutex<Option<Arc<dyn WidgetObserver>>>,
    dispatcher: Mutex<Option<Dispatcher>>,
}

impl HeadlessWidget {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(WidgetState::default()),
            observer: Mutex::new(None),
            dispatcher: Mutex::new(None),
        }
    }

    /// Sets the callback invoked when a bound chord is pressed.
    ///
    /// A real widget dispatches the bound command itself; the headless
    /// one delegates to whatever the host wires in (typically
    /// `CommandRegistry::dispatch`).
    pub fn set_dispatcher(&self, dispatcher: impl Fn(&str) + Send + Sync + 'static) {
        *self.dispatcher.lock() = Some(Arc::new(dispatcher));
    }

    // ==================== Interaction Drivers ====================

    /// Appends text at the end of the buffer, as if typed.
    pub fn type_text(&self, text: &str) {
        self.state.lock().content.push_str(text);
        self.notify(|observer| observer.content_changed());
    }

    /// Moves the cursor, firing the cursor observer.
    pub fn move_cursor(&self, position: Position) {
        self.state.lock().position = position;
        self.notify(|observer| observer.cursor_moved(position));
    }

    /// Changes the selection, firing the selection observer.
    pub fn select(&self, selection: Selection) {
        self.state.lock().selection = selection;
        self.notify(|observer| observer.selection_changed(selection));
    }

    pub fn focus(&self) {
        self.notify(|observer| observer.focus_changed(true));
    }

    pub fn blur(&self) {
        self.notify(|observer| observer.focus_changed(false));
    }

    /// Presses a chord: looks up the binding and hands the command id
    /// to the dispatcher. Returns the command id that was bound.
    pub fn press(&self, chord: &str) -> Option<String> {
        let command_id = self.state.lock().chords.get(chord).cloned()?;
        let dispatcher = self.dispatcher.lock().clone();
        if let Some(dispatch) = dispatcher {
            dispatch(&command_id);
        }
        Some(command_id)
    }

    // ==================== Inspection ====================

    /// Returns the action ids executed so far, in order.
    pub fn ran_actions(&self) -> Vec<String> {
        self.state.lock().ran_actions.clone()
    }

    /// Returns the command id bound to `chord`, if any.
    pub fn chord_target(&self, chord: &str) -> Option<String> {
        self.state.lock().chords.get(chord).cloned()
    }

    /// Returns the currently applied view options.
    pub fn view(&self) -> ViewOptions {
        self.state.lock().view.clone()
    }

    fn notify(&self, fire: impl FnOnce(&Arc<dyn WidgetObserver>)) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            fire(&observer);
        }
    }
}

impl Default for HeadlessWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorWidget for HeadlessWidget {
    fn value(&self) -> String {
        self.state.lock().content.clone()
    }

    fn set_value(&self, text: &str) {
        self.state.lock().content = text.to_string();
        self.notify(|observer| observer.content_changed());
    }

    fn position(&self) -> Position {
        self.state.lock().position
    }

    fn set_position(&self, position: Position) {
        self.state.lock().position = position;
    }

    fn selection(&self) -> Selection {
        self.state.lock().selection
    }

    fn run_action(&self, action_id: &str) -> bool {
        self.state.lock().ran_actions.push(action_id.to_string());
        true
    }

    fn bind_chord(&self, chord: &str, command_id: &str) {
        self.state
            .lock()
            .chords
            .insert(chord.to_string(), command_id.to_string());
    }

    fn unbind_chord(&self, chord: &str) {
        self.state.lock().chords.remove(chord);
    }

    fn set_observer(&self, observer: Option<Arc<dyn WidgetObserver>>) {
        *self.observer.lock() = observer;
    }

    fn apply_view(&self, options: &ViewOptions) {
        self.state.lock().view = options.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingObserver {
        contents: AtomicUsize,
        cursors: Mutex<Vec<Position>>,
    }

    impl WidgetObserver for RecordingObserver {
        fn content_changed(&self) {
            self.contents.fetch_add(1, Ordering::SeqCst);
        }

        fn cursor_moved(&self, position: Position) {
            self.cursors.lock().push(position);
        }

        fn selection_changed(&self, _selection: Selection) {}

        fn focus_changed(&self, _focused: bool) {}
    }

    #[test]
    fn test_typing_fires_observer() {
        let widget = HeadlessWidget::new();
        let observer = Arc::new(RecordingObserver {
            contents: AtomicUsize::new(0),
            cursors: Mutex::new(Vec::new()),
        });
        widget.set_observer(Some(observer.clone()));

        widget.type_text("hello");
        widget.move_cursor(Position::new(1, 6));

        assert_eq!(widget.value(), "hello");
        assert_eq!(observer.contents.load(Ordering::SeqCst), 1);
        assert_eq!(*observer.cursors.lock(), vec![Position::new(1, 6)]);
    }

    #[test]
    fn test_observer_cleared() {
        let widget = HeadlessWidget::new();
        let observer = Arc::new(RecordingObserver {
            contents: AtomicUsize::new(0),
            cursors: Mutex::new(Vec::new()),
        });
        widget.set_observer(Some(observer.clone()));
        widget.set_observer(None);

        widget.type_text("quiet");
        assert_eq!(observer.contents.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_press_routes_through_dispatcher() {
        let widget = HeadlessWidget::new();
        widget.bind_chord("Ctrl+S", "file.save");

        let dispatched = Arc::new(Mutex::new(Vec::new()));
        let d = dispatched.clone();
        widget.set_dispatcher(move |id| d.lock().push(id.to_string()));

        assert_eq!(widget.press("Ctrl+S"), Some("file.save".into()));
        assert_eq!(widget.press("Ctrl+Unbound"), None);
        assert_eq!(*dispatched.lock(), vec!["file.save"]);
    }
}
