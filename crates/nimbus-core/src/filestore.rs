//! The file-store collaborator.
//!
//! The core never performs I/O; it emits `Saved` events and expects a
//! file store to persist them. The in-memory implementation here mirrors
//! the shell's workspace model: a flat map from path to content, seeded
//! with a small default project.

use std::collections::BTreeMap;

use parking_lot::Mutex;

/// Read/write access to file contents by path.
pub trait FileStore: Send + Sync {
    /// Returns the content at `path`; missing paths read as empty.
    fn content(&self, path: &str) -> String;

    /// Replaces the content at `path`, creating the entry if needed.
    fn update(&self, path: &str, content: &str);

    /// Returns true if `path` has an entry.
    fn contains(&self, path: &str) -> bool;

    /// Returns all known paths, sorted.
    fn paths(&self) -> Vec<String>;
}

/// In-memory file store.
pub struct MemoryFileStore {
    files: Mutex<BTreeMap<String, String>>,
}

impl MemoryFileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates a store seeded with a small default project.
    pub fn with_defaults() -> Self {
        let store = Self::new();
        store.update(
            "src/App.tsx",
            "import React from 'react';\n// App component code...\n",
        );
        store.update(
            "src/main.tsx",
            "import React from 'react';\n// Main entry point...\n",
        );
        store.update(
            "package.json",
            "{\n  \"name\": \"nimbus-workspace\",\n  \"version\": \"1.0.0\"\n}\n",
        );
        store.update(
            "tsconfig.json",
            "{\n  \"compilerOptions\": {\n    \"target\": \"ES2020\"\n  }\n}\n",
        );
        store
    }
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore for MemoryFileStore {
    fn content(&self, path: &str) -> String {
        self.files.lock().get(path).cloned().unwrap_or_default()
    }

    fn update(&self, path: &str, content: &str) {
        self.files
            .lock()
            .insert(path.to_string(), content.to_string());
    }

    fn contains(&self, path: &str) -> bool {
        self.files.lock().contains_key(path)
    }

    fn paths(&self) -> Vec<String> {
        self.files.lock().keys().cloned().collect()
    }
}
