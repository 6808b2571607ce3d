//! Configuration System
//!
//! Layered configuration: built-in defaults, the user's global config file, an
//! optional explicit file, and `CLICK_CENSOR__*` environment overrides.

use crate::error::ExtensionError;
use crate::logging::LoggingConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Extension id; runtime messages from any other sender are ignored
    #[serde(default = "default_extension_id")]
    pub extension_id: String,

    /// Menu item titles
    #[serde(default)]
    pub menu: MenuConfig,

    /// Concealment colors applied to censored spans
    #[serde(default)]
    pub style: StyleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_extension_id() -> String {
    "click-censor".to_string()
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            extension_id: default_extension_id(),
            menu: MenuConfig::default(),
            style: StyleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(default = "default_censor_title")]
    pub censor_title: String,
    #[serde(default = "default_uncensor_title")]
    pub uncensor_title: String,
}

fn default_censor_title() -> String {
    "Hide Selected Text".to_string()
}

fn default_uncensor_title() -> String {
    "Unhide Selected Text".to_string()
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            censor_title: default_censor_title(),
            uncensor_title: default_uncensor_title(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_conceal_color")]
    pub background: String,
    #[serde(default = "default_conceal_color")]
    pub color: String,
}

fn default_conceal_color() -> String {
    "black".to_string()
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: default_conceal_color(),
            color: default_conceal_color(),
        }
    }
}

impl ExtensionConfig {
    /// Validate the configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.extension_id.trim().is_empty() {
            errors.push("extension_id cannot be empty".to_string());
        }
        if self.menu.censor_title.trim().is_empty() {
            errors.push("menu.censor_title cannot be empty".to_string());
        }
        if self.menu.uncensor_title.trim().is_empty() {
            errors.push("menu.uncensor_title cannot be empty".to_string());
        }
        if self.style.background.trim().is_empty() || self.style.color.trim().is_empty() {
            errors.push("style colors cannot be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`ExtensionConfig`] from all configured sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Path of the user's global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "click-censor")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load defaults, the global config file, and environment overrides.
    pub fn load() -> Result<ExtensionConfig, ExtensionError> {
        Self::load_with(None)
    }

    /// Like [`ConfigLoader::load`], plus a required explicit file layered over the global one.
    pub fn load_from_file(path: &Path) -> Result<ExtensionConfig, ExtensionError> {
        Self::load_with(Some(path))
    }

    fn load_with(explicit: Option<&Path>) -> Result<ExtensionConfig, ExtensionError> {
        let mut builder = Config::builder().add_source(Config::try_from(&ExtensionConfig::default())?);

        if let Some(global) = Self::global_config_path() {
            debug!(config_path = %global.display(), "Adding global config source");
            builder = builder.add_source(File::from(global).required(false));
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ExtensionError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("CLICK_CENSOR").separator("__"));

        let config: ExtensionConfig = builder.build()?.try_deserialize()?;
        config.validate().map_err(|errors| {
            ExtensionError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            ))
        })?;
        Ok(config)
    }
}
