//! Extension manifests (`extension.toml`).

use serde::{Deserialize, Serialize};

use crate::{ExtensionError, ExtensionResult};

/// Metadata describing an extension.
///
/// The five required fields must all be non-empty; a manifest failing
/// validation is rejected before any registry entry exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionManifest {
    /// Unique extension identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Short description
    pub description: String,

    /// Version string
    pub version: String,

    /// Author information
    pub author: String,

    /// Icon identifier
    #[serde(default)]
    pub icon: Option<String>,

    /// Entry point. Recorded but never executed: there is no dynamic
    /// code loading and no sandbox.
    #[serde(default)]
    pub main: Option<String>,
}

impl ExtensionManifest {
    /// Creates a manifest with the required fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            version: version.into(),
            author: author.into(),
            icon: None,
            main: None,
        }
    }

    /// Parses and validates a manifest from TOML.
    pub fn from_toml(content: &str) -> ExtensionResult<Self> {
        let manifest: Self = toml::from_str(content)
            .map_err(|e| ExtensionError::InvalidManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Checks that every required field is present and non-empty.
    pub fn validate(&self) -> ExtensionResult<()> {
        let required = [
            ("id", &self.id),
            ("name", &self.name),
            ("description", &self.description),
            ("version", &self.version),
            ("author", &self.author),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ExtensionError::MissingField(field));
            }
        }
        Ok(())
    }
}
