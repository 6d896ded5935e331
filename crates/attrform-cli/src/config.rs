//! Configuration management for the CLI
//!
//! Configuration is read from, in order of precedence:
//! - The file given with `--config` or `ATTRFORM_CONFIG`
//! - `.attrform.toml`, `.attrform.yaml` or `.attrform.json` in the working directory
//! - `config.toml` in the user configuration directory
//!
//! The first file found wins; with none, defaults apply.

use crate::error::{Error, Result};
use attrform_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reducer engine settings, including relation definitions
    pub engine: EngineConfig,

    pub output: OutputConfig,

    pub logging: LogSettings,

    pub paths: PathConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log level used when no `-v` flag or `RUST_LOG` is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory of schema descriptors resolvable by name
    pub schemas_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: None,
            format: None,
        }
    }
}

impl Config {
    /// Load configuration from a file, choosing the format by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let mut config: Config = match extension(path).as_deref() {
            Some("toml") => toml::from_str(&content)?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(Error::config(format!(
                    "Unsupported configuration format for {}; expected .toml, .yaml or .json",
                    path.display()
                )))
            }
        };

        // relative schema directories are resolved against the config file
        if let (Some(dir), Some(base)) = (config.paths.schemas_dir.as_mut(), path.parent()) {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Configuration file in the user configuration directory
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("attrform").join("config.toml"))
    }

    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".attrform.toml"),
            PathBuf::from(".attrform.yaml"),
            PathBuf::from(".attrform.json"),
        ];
        paths.extend(Self::user_config_path());
        paths
    }

    /// Serialize in the format matching the file extension
    pub fn to_string_for(&self, path: &Path) -> Result<String> {
        Ok(match extension(path).as_deref() {
            Some("yaml" | "yml") => serde_yaml::to_string(self)?,
            Some("json") => serde_json::to_string_pretty(self)?,
            _ => toml::to_string_pretty(self)?,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_string_for(path)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}
