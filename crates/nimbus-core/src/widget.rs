//! Collaborator interfaces for the wrapped editor widget.
//!
//! The actual rich-text widget is a black box owned by the UI layer.
//! This module pins down the narrow surface the core relies on: content
//! and cursor access, an addressable action namespace, chord binding
//! keyed by opaque platform-style strings, and observer callbacks for
//! interaction events.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Well-known action ids understood by conforming widgets.
///
/// The core never parses these; they are opaque identifiers passed to
/// [`EditorWidget::run_action`].
pub mod actions {
    pub const FORMAT_DOCUMENT: &str = "editor.formatDocument";
    pub const TOGGLE_COMMENT: &str = "editor.toggleComment";
    pub const FOLD_ALL: &str = "editor.foldAll";
    pub const UNFOLD_ALL: &str = "editor.unfoldAll";
    pub const GO_TO_DEFINITION: &str = "editor.goToDefinition";
    pub const FIND_REFERENCES: &str = "editor.findReferences";
    pub const INSERT_CURSOR: &str = "editor.insertCursor";
}

/// A cursor position inside the widget, 1-based like the status bar
/// presents it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ln {}, Col {}", self.line, self.column)
    }
}

/// A selection range; empty when start and end coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn caret(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Presentation options forwarded to the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Color theme name
    pub theme: String,

    /// Font size in points
    pub font_size: f32,

    /// Soft-wrap long lines
    pub word_wrap: bool,

    /// Show the minimap strip
    pub minimap: bool,

    /// Show line numbers in the gutter
    pub line_numbers: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            font_size: 14.0,
            word_wrap: true,
            minimap: true,
            line_numbers: true,
        }
    }
}

/// The black-box editing widget, as seen from the core.
///
/// ## Learning: Trait Objects at the Seam
///
/// The core stores the widget as `Arc<dyn EditorWidget>` behind a weak
/// handle. Any implementation will do — the in-process
/// [`HeadlessWidget`](crate::headless::HeadlessWidget) used by tests and
/// the demo binary, or a bridge to a real embedded editor component.
pub trait EditorWidget: Send + Sync {
    /// Returns the full buffer content.
    fn value(&self) -> String;

    /// Replaces the full buffer content.
    fn set_value(&self, text: &str);

    /// Returns the primary cursor position.
    fn position(&self) -> Position;

    /// Moves the primary cursor.
    fn set_position(&self, position: Position);

    /// Returns the primary selection.
    fn selection(&self) -> Selection;

    /// Runs one of the widget's built-in actions by id.
    ///
    /// Returns false if the widget does not know the action.
    fn run_action(&self, action_id: &str) -> bool;

    /// Binds a chord string (e.g. `"Ctrl+S"`) to a command id.
    ///
    /// The widget owns chord parsing; the core treats chords as opaque
    /// and only guarantees string identity.
    fn bind_chord(&self, chord: &str, command_id: &str);

    /// Removes a chord binding; no-op if the chord is unbound.
    fn unbind_chord(&self, chord: &str);

    /// Installs or clears the interaction observer for this mount.
    ///
    /// At most one observer is active; mounting a new handle replaces it.
    fn set_observer(&self, observer: Option<Arc<dyn WidgetObserver>>);

    /// Applies presentation options.
    fn apply_view(&self, options: &ViewOptions);
}

/// Callbacks the widget fires for user interaction.
///
/// Implementations are installed per mount via
/// [`EditorWidget::set_observer`] and must be released before the next
/// mount installs its own.
pub trait WidgetObserver: Send + Sync {
    fn content_changed(&self);
    fn cursor_moved(&self, position: Position);
    fn selection_changed(&self, selection: Selection);
    fn focus_changed(&self, focused: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_empty() {
        let caret = Selection::caret(Position::new(3, 7));
        assert!(caret.is_empty());

        let range = Selection::new(Position::new(1, 1), Position::new(1, 5));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(12, 4).to_string(), "Ln 12, Col 4");
    }

    #[test]
    fn test_view_options_defaults() {
        let view = ViewOptions::default();
        assert_eq!(view.theme, "dark");
        assert_eq!(view.font_size, 14.0);
        assert!(view.word_wrap);
    }
}
