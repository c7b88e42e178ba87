//! # Nimbus Extension System
//!
//! Pluggable extensions contributing commands and editor behaviors,
//! with an explicit enable/disable lifecycle.
//!
//! ## The Encapsulation Boundary
//!
//! Extensions never touch the shared registries directly. Lifecycle
//! hooks receive an [`ExtensionApi`] capability object and every
//! mutation — registering a command, attaching a behavior, reading the
//! current editor handle — funnels through it. The registry, not the
//! extension, owns the cleanup of declared contributions, so a
//! misbehaving `deactivate` cannot leave orphaned commands behind.
//!
//! ## Learning: Fault Isolation at the Boundary
//!
//! Extension-authored code fails in two ways: an `Err` return or a
//! panic. Both are contained where the registry calls into the
//! extension — logged, never propagated — because one broken extension
//! must not block the others, or the host UI.

pub mod api;
pub mod extension;
pub mod loader;
pub mod manifest;
pub mod registry;

pub use api::ExtensionApi;
pub use extension::{Extension, ExtensionHooks, ExtensionInfo};
pub use loader::ExtensionLoader;
pub use manifest::ExtensionManifest;
pub use registry::ExtensionRegistry;

/// Result type for extension operations
pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Extension system errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    #[error("Extension not found: {0}")]
    NotFound(String),

    #[error("Extension already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid manifest: missing field `{0}`")]
    MissingField(&'static str),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
