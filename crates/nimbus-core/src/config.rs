//! Shell configuration.
//!
//! ## Learning: Serde Defaults for Forward Compatibility
//!
//! Every section derives `#[serde(default)]`, so a config file may name
//! only the keys it overrides and older files keep parsing as fields
//! are added.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::DuplicatePolicy;
use crate::widget::ViewOptions;

/// Top-level configuration for the editor shell core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Autosave sweep settings
    pub autosave: AutosaveConfig,

    /// Command registry settings
    pub commands: CommandConfig,

    /// Initial presentation options
    pub view: ViewOptions,

    /// Keyboard settings
    pub keyboard: KeyboardConfig,
}

impl ShellConfig {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from_default_path().unwrap_or_default()
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("nimbus").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

/// Autosave sweep settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Run the periodic sweep at all
    pub enabled: bool,

    /// Sweep period in seconds (0 disables)
    pub interval_secs: u64,
}

impl AutosaveConfig {
    /// Returns the sweep period, or `None` when autosave is off.
    pub fn interval(&self) -> Option<Duration> {
        if self.enabled && self.interval_secs > 0 {
            Some(Duration::from_secs(self.interval_secs))
        } else {
            None
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
        }
    }
}

/// Command registry settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// How `register` treats an id collision
    pub duplicate_policy: DuplicatePolicy,
}

/// Keyboard settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Chord overrides by command id, e.g. `"file.save" = "Ctrl+Alt+S"`
    pub bindings: HashMap<String, String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShellConfig::default();
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.interval_secs, 30);
        assert_eq!(config.commands.duplicate_policy, DuplicatePolicy::Reject);
        assert_eq!(config.view.theme, "dark");
    }

    #[test]
    fn test_config_round_trip() {
        let config = ShellConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: ShellConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.autosave.interval_secs, config.autosave.interval_secs);
        assert_eq!(parsed.view.font_size, config.view.font_size);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: ShellConfig = toml::from_str(
            r#"
            [autosave]
            interval_secs = 5

            [commands]
            duplicate_policy = "replace"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.autosave.interval_secs, 5);
        assert!(parsed.autosave.enabled);
        assert_eq!(parsed.commands.duplicate_policy, DuplicatePolicy::Replace);
        assert!(parsed.view.minimap);
    }

    #[test]
    fn test_autosave_interval_disabled() {
        let off = AutosaveConfig {
            enabled: false,
            interval_secs: 30,
        };
        assert!(off.interval().is_none());

        let zero = AutosaveConfig {
            enabled: true,
            interval_secs: 0,
        };
        assert!(zero.interval().is_none());
    }
}
