//! The capability object handed to extension hooks.

use std::sync::Arc;

use nimbus_core::{
    BehaviorRegistry, Command, CommandRegistry, CoreResult, EditorBehavior, EditorHandle,
    HandleRegistry,
};

/// The only channel through which extension code mutates shared state.
///
/// An API value is freshly bound to the current registries on every
/// activation, so an extension toggled after a coordinator swap talks
/// to the right stores. It is deliberately narrow: no event bus, no
/// extension registry, no direct widget access beyond the handle.
///
/// Hooks that register contributions imperatively may keep a clone for
/// the matching cleanup in `deactivate`.
#[derive(Clone)]
pub struct ExtensionApi {
    handles: Arc<HandleRegistry>,
    commands: Arc<CommandRegistry>,
    behaviors: Arc<BehaviorRegistry>,
}

impl ExtensionApi {
    pub fn new(
        handles: Arc<HandleRegistry>,
        commands: Arc<CommandRegistry>,
        behaviors: Arc<BehaviorRegistry>,
    ) -> Self {
        Self {
            handles,
            commands,
            behaviors,
        }
    }

    /// Registers a command; duplicate ids follow the registry's policy.
    pub fn register_command(&self, command: Command) -> CoreResult<()> {
        self.commands.register(command)
    }

    /// Unregisters a command by id; idempotent.
    pub fn unregister_command(&self, id: &str) {
        self.commands.unregister(id);
    }

    /// Registers an editor behavior.
    pub fn register_behavior(&self, behavior: Arc<dyn EditorBehavior>) {
        self.behaviors.register(behavior);
    }

    /// Unregisters an editor behavior by identity; no-op if absent.
    pub fn unregister_behavior(&self, behavior: &Arc<dyn EditorBehavior>) {
        self.behaviors.unregister(behavior);
    }

    /// Returns the current editor handle, or `None` when unmounted.
    ///
    /// Handles must be re-fetched at each use, never cached across an
    /// async boundary: a remount invalidates earlier handles.
    pub fn editor(&self) -> Option<EditorHandle> {
        self.handles.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_funnels_to_registries() {
        let handles = Arc::new(HandleRegistry::new());
        let commands = Arc::new(CommandRegistry::new(handles.clone()));
        let behaviors = Arc::new(BehaviorRegistry::new(handles.clone()));
        let api = ExtensionApi::new(handles, commands.clone(), behaviors);

        api.register_command(Command::callback("ext.cmd", "Ext", |_| {}))
            .unwrap();
        assert!(commands.contains("ext.cmd"));
        assert!(api.editor().is_none());

        api.unregister_command("ext.cmd");
        assert!(commands.is_empty());
    }
}
