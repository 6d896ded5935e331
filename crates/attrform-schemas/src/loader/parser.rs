//! Descriptor parsing for YAML and JSON formats
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yaml", "yml"],
            Format::Json => &["json"],
        }
    }

    /// True when `path` has an extension this parser understands
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct SchemaParser;

impl SchemaParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a file, detecting format from extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<Value> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;

        self.parse_content(&content, format, path)
    }

    /// Parse content with explicit format
    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
        match format {
            Format::Yaml => self.parse_yaml(content, path),
            Format::Json => self.parse_json(content, path),
        }
    }

    pub fn parse_yaml(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        // Parse as YAML first so YAML errors keep their line information
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;

        serde_json::to_value(yaml_value)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    pub fn parse_json(&self, content: &str, path: &Path) -> LoaderResult<Value> {
        serde_json::from_str(content)
            .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
    }

    /// A schema descriptor must be an object whose `type`, when present, is a string or list
    pub fn validate_descriptor(&self, value: &Value, path: &Path) -> LoaderResult<()> {
        let Some(descriptor) = value.as_object() else {
            return Err(LoaderError::invalid_descriptor(
                path.to_path_buf(),
                "descriptor must be an object at the root level",
            ));
        };

        match descriptor.get("type") {
            None | Some(Value::String(_)) | Some(Value::Array(_)) => {}
            Some(other) => {
                return Err(LoaderError::invalid_descriptor(
                    path.to_path_buf(),
                    format!("'type' must be a string or a list, found {other}"),
                ))
            }
        }

        if let Some(name) = descriptor.get("name").filter(|name| !name.is_string()) {
            return Err(LoaderError::invalid_descriptor(
                path.to_path_buf(),
                format!("'name' must be a string, found {name}"),
            ));
        }
        Ok(())
    }
}
