//! The extension unit and its lifecycle hooks.

use std::sync::Arc;

use nimbus_core::{Command, EditorBehavior};

use crate::api::ExtensionApi;
use crate::manifest::ExtensionManifest;
use crate::ExtensionResult;

/// Lifecycle callbacks an extension may implement.
///
/// ## Learning: Interfaces over Free Closures
///
/// Hooks are an explicit trait rather than captured closures, so the
/// only channel to the shared registries is the [`ExtensionApi`] handed
/// to `activate`. Both methods default to no-ops; purely declarative
/// extensions need no hooks at all.
pub trait ExtensionHooks: Send + Sync {
    /// Called on enable, before the declared contributions register.
    ///
    /// Commands registered here through the API interleave with the
    /// declared command list; the extension is responsible for removing
    /// them again in `deactivate`.
    fn activate(&mut self, _api: &ExtensionApi) -> ExtensionResult<()> {
        Ok(())
    }

    /// Called on disable, before the declared contributions unregister.
    fn deactivate(&mut self) -> ExtensionResult<()> {
        Ok(())
    }
}

/// A pluggable unit contributing commands and editor behaviors.
pub struct Extension {
    /// Validated metadata
    pub manifest: ExtensionManifest,

    /// Commands registered on enable, unregistered on disable
    pub commands: Vec<Command>,

    /// Editor behaviors attached on enable, detached on disable
    pub behaviors: Vec<Arc<dyn EditorBehavior>>,

    /// Optional lifecycle hooks
    pub hooks: Option<Box<dyn ExtensionHooks>>,
}

impl Extension {
    /// Creates an extension from an already-validated manifest.
    pub fn new(manifest: ExtensionManifest) -> Self {
        Self {
            manifest,
            commands: Vec::new(),
            behaviors: Vec::new(),
            hooks: None,
        }
    }

    /// Validates `manifest` and creates the extension.
    pub fn from_manifest(manifest: ExtensionManifest) -> ExtensionResult<Self> {
        manifest.validate()?;
        if let Some(main) = &manifest.main {
            tracing::debug!(id = %manifest.id, main = %main, "entry point recorded, not executed");
        }
        Ok(Self::new(manifest))
    }

    /// Adds a declared command.
    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Adds a declared editor behavior.
    pub fn with_behavior(mut self, behavior: Arc<dyn EditorBehavior>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Installs lifecycle hooks.
    pub fn with_hooks(mut self, hooks: impl ExtensionHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    /// Returns the extension id.
    pub fn id(&self) -> &str {
        &self.manifest.id
    }
}

/// Read-only snapshot of one registry entry.
#[derive(Debug, Clone)]
pub struct ExtensionInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub enabled: bool,
    pub command_count: usize,
    pub behavior_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_contributions() {
        let extension = Extension::new(ExtensionManifest::new(
            "demo",
            "Demo",
            "A demo",
            "1.0.0",
            "Tester",
        ))
        .with_command(Command::callback("demo.run", "Run Demo", |_| {}));

        assert_eq!(extension.id(), "demo");
        assert_eq!(extension.commands.len(), 1);
        assert!(extension.hooks.is_none());
    }

    #[test]
    fn test_from_manifest_validates() {
        let invalid = ExtensionManifest::new("", "n", "d", "v", "a");
        assert!(Extension::from_manifest(invalid).is_err());
    }
}
