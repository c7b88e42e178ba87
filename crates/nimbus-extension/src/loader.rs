//! Loading extensions from manifests on disk.
//!
//! Layout follows the usual one-directory-per-extension convention:
//!
//! ```text
//! extensions/
//! ├── word-count/
//! │   └── extension.toml
//! └── theme-pack/
//!     └── extension.toml
//! ```

use std::path::{Path, PathBuf};

use crate::extension::Extension;
use crate::manifest::ExtensionManifest;
use crate::{ExtensionError, ExtensionResult};

/// Manifest file name inside each extension directory.
pub const MANIFEST_FILE: &str = "extension.toml";

/// Discovers and loads extensions from a directory.
pub struct ExtensionLoader {
    root: PathBuf,
}

impl ExtensionLoader {
    /// Creates a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads one manifest file.
    pub fn load_manifest(path: &Path) -> ExtensionResult<ExtensionManifest> {
        let content = std::fs::read_to_string(path)?;
        ExtensionManifest::from_toml(&content)
    }

    /// Scans the root directory and loads every valid extension.
    ///
    /// Invalid manifests are logged and skipped; one broken extension
    /// directory never blocks the rest. A missing root yields an empty
    /// list.
    pub fn discover(&self) -> ExtensionResult<Vec<Extension>> {
        let mut discovered = Vec::new();

        if !self.root.exists() {
            tracing::debug!(root = %self.root.display(), "extension directory missing");
            return Ok(discovered);
        }

        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let manifest_path = path.join(MANIFEST_FILE);
            if !manifest_path.exists() {
                continue;
            }

            match Self::load_manifest(&manifest_path).and_then(Extension::from_manifest) {
                Ok(extension) => {
                    tracing::debug!(id = extension.id(), "discovered extension");
                    discovered.push(extension);
                }
                Err(error) => {
                    tracing::warn!(
                        path = %manifest_path.display(),
                        %error,
                        "skipping invalid extension"
                    );
                }
            }
        }

        Ok(discovered)
    }

    /// Loads a single extension directory by name.
    pub fn load(&self, name: &str) -> ExtensionResult<Extension> {
        let manifest_path = self.root.join(name).join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(ExtensionError::NotFound(name.to_string()));
        }
        Self::load_manifest(&manifest_path).and_then(Extension::from_manifest)
    }
}
