//! # Nimbus Core
//!
//! Editor-lifecycle coordination: the single live widget handle, the
//! command and event registries, and the coordinator facade that ties
//! them together.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     EditorCoordinator                        │
//! │  ┌──────────────┐ ┌─────────────────┐ ┌───────────────────┐  │
//! │  │HandleRegistry│ │ CommandRegistry │ │     EventBus      │  │
//! │  └──────┬───────┘ └────────┬────────┘ └─────────┬─────────┘  │
//! │         │                  │                    │            │
//! │  ┌──────┴──────────────────┴────────────────────┴─────────┐  │
//! │  │            EditorWidget (external collaborator)        │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Weak References as Capabilities
//!
//! Registries never own the mounted widget. They hold an `EditorHandle`
//! wrapping a `Weak` pointer and upgrade it at the moment of use, so a
//! widget disposed by the UI layer degrades every later operation into
//! a logged no-op instead of a fault.

pub mod behavior;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod event;
pub mod filestore;
pub mod handle;
pub mod headless;
pub mod widget;

pub use behavior::{BehaviorRegistry, EditorBehavior};
pub use command::{
    Command, CommandAction, CommandCallback, CommandRegistry, DuplicatePolicy, WidgetAction,
};
pub use config::{AutosaveConfig, ConfigError, ShellConfig};
pub use coordinator::EditorCoordinator;
pub use event::{EditorEvent, EventBus, EventKind, Subscription};
pub use filestore::{FileStore, MemoryFileStore};
pub use handle::{EditorHandle, HandleId, HandleRegistry};
pub use headless::HeadlessWidget;
pub use widget::{actions, EditorWidget, Position, Selection, ViewOptions, WidgetObserver};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
///
/// "No active editor" is deliberately absent: an unmounted widget is a
/// normal state and every operation that needs one degrades to a no-op.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Command already registered: {0}")]
    DuplicateCommand(String),

    #[error("Command not found: {0}")]
    CommandNotFound(String),
}
