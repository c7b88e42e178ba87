//! The extension registry: enable/disable lifecycle over shared
//! registries.
//!
//! State machine per entry: registered-disabled ⇄ registered-enabled,
//! with removal reachable from either state (an enabled extension is
//! disabled first). Every transition is fault-isolated: a throwing or
//! panicking hook is logged and cleanup still runs.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use nimbus_core::{BehaviorRegistry, CommandRegistry, HandleRegistry};

use crate::api::ExtensionApi;
use crate::extension::{Extension, ExtensionInfo};
use crate::{ExtensionError, ExtensionResult};

struct Entry {
    extension: Extension,
    enabled: bool,
}

/// Registry of extensions keyed by id, in insertion order.
pub struct ExtensionRegistry {
    handles: Arc<HandleRegistry>,
    commands: Arc<CommandRegistry>,
    behaviors: Arc<BehaviorRegistry>,
    entries: Mutex<IndexMap<String, Entry>>,
}

impl ExtensionRegistry {
    /// Creates a registry bound to the given shared stores.
    pub fn new(
        handles: Arc<HandleRegistry>,
        commands: Arc<CommandRegistry>,
        behaviors: Arc<BehaviorRegistry>,
    ) -> Self {
        Self {
            handles,
            commands,
            behaviors,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    /// Inserts an extension, disabled. Does not call `activate`.
    ///
    /// Duplicate ids are rejected — silently replacing an installed
    /// extension would orphan its registered contributions.
    pub fn add(&self, extension: Extension) -> ExtensionResult<()> {
        let mut entries = self.entries.lock();
        if entries.contains_key(extension.id()) {
            return Err(ExtensionError::AlreadyRegistered(extension.id().to_string()));
        }
        tracing::debug!(id = extension.id(), "extension added");
        entries.insert(
            extension.id().to_string(),
            Entry {
                extension,
                enabled: false,
            },
        );
        Ok(())
    }

    /// Removes an extension, disabling it first if enabled.
    ///
    /// Best-effort: a failing `deactivate` is logged and removal
    /// proceeds.
    pub fn remove(&self, id: &str) -> ExtensionResult<()> {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(id) else {
            return Err(ExtensionError::NotFound(id.to_string()));
        };
        if entry.enabled {
            self.disable_entry(entry);
        }
        entries.shift_remove(id);
        tracing::debug!(id, "extension removed");
        Ok(())
    }

    /// Flips an extension between enabled and disabled.
    ///
    /// Returns the new enabled state. Unknown ids are a recoverable
    /// [`ExtensionError::NotFound`].
    pub fn toggle(&self, id: &str) -> ExtensionResult<bool> {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(id) else {
            tracing::debug!(id, "toggle: extension not found");
            return Err(ExtensionError::NotFound(id.to_string()));
        };

        if entry.enabled {
            self.disable_entry(entry);
        } else {
            self.enable_entry(entry);
        }
        Ok(entry.enabled)
    }

    /// Returns a snapshot of one entry, without side effects.
    pub fn get(&self, id: &str) -> Option<ExtensionInfo> {
        self.entries.lock().get(id).map(info)
    }

    /// Returns snapshots of all entries, in insertion order.
    pub fn list(&self) -> Vec<ExtensionInfo> {
        self.entries.lock().values().map(info).collect()
    }

    /// Returns whether `id` is currently enabled.
    pub fn is_enabled(&self, id: &str) -> Option<bool> {
        self.entries.lock().get(id).map(|e| e.enabled)
    }

    /// Enables one entry: `activate` hook first, then the declared
    /// commands, then the declared behaviors.
    ///
    /// An activation fault leaves the entry disabled and skips the
    /// declared contributions; whatever the hook already registered
    /// through the API is reported via the log, per the containment
    /// policy. A duplicate command id is logged and the remaining
    /// commands still register.
    fn enable_entry(&self, entry: &mut Entry) {
        let id = entry.extension.manifest.id.clone();
        let api = ExtensionApi::new(
            self.handles.clone(),
            self.commands.clone(),
            self.behaviors.clone(),
        );

        if let Some(hooks) = entry.extension.hooks.as_mut() {
            match catch_unwind(AssertUnwindSafe(|| hooks.activate(&api))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(id = %id, %error, "activate failed; extension stays disabled");
                    return;
                }
                Err(_) => {
                    tracing::error!(id = %id, "activate panicked; extension stays disabled");
                    return;
                }
            }
        }

        for command in &entry.extension.commands {
            if let Err(error) = self.commands.register(command.clone()) {
                tracing::warn!(id = %id, %error, "skipping declared command");
            }
        }
        for behavior in &entry.extension.behaviors {
            self.behaviors.register(behavior.clone());
        }

        entry.enabled = true;
        tracing::info!(id = %id, "extension enabled");
    }

    /// Disables one entry: `deactivate` hook, then unregister the
    /// declared behaviors and commands in reverse registration order.
    ///
    /// Cleanup runs regardless of hook faults — an extension cannot
    /// keep its contributions alive by failing its own teardown.
    fn disable_entry(&self, entry: &mut Entry) {
        let id = entry.extension.manifest.id.clone();

        if let Some(hooks) = entry.extension.hooks.as_mut() {
            match catch_unwind(AssertUnwindSafe(|| hooks.deactivate())) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    tracing::warn!(id = %id, %error, "deactivate failed; cleanup continues");
                }
                Err(_) => {
                    tracing::error!(id = %id, "deactivate panicked; cleanup continues");
                }
            }
        }

        for behavior in entry.extension.behaviors.iter().rev() {
            self.behaviors.unregister(behavior);
        }
        for command in entry.extension.commands.iter().rev() {
            self.commands.unregister(&command.id);
        }

        entry.enabled = false;
        tracing::info!(id = %id, "extension disabled");
    }
}

fn info(entry: &Entry) -> ExtensionInfo {
    let manifest = &entry.extension.manifest;
    ExtensionInfo {
        id: manifest.id.clone(),
        name: manifest.name.clone(),
        description: manifest.description.clone(),
        version: manifest.version.clone(),
        author: manifest.author.clone(),
        enabled: entry.enabled,
        command_count: entry.extension.commands.len(),
        behavior_count: entry.extension.behaviors.len(),
    }
}
