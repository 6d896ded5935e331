//! Error types for schema loading operations
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse YAML file '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON file '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// The file parsed but is not a schema descriptor
    #[error("Invalid schema descriptor in '{path}': {reason}")]
    InvalidDescriptor { path: PathBuf, reason: String },

    /// The descriptor could not be turned into a schema
    #[error("Failed to build schema from '{path}': {source}")]
    SchemaError {
        path: PathBuf,
        source: attrform_core::Error,
    },

    /// Descriptors in a directory refer to schemas that never get registered
    #[error("Unresolved schema references in {}: {}", files.join(", "), names.join(", "))]
    UnresolvedReferences { files: Vec<String>, names: Vec<String> },
}

impl LoaderError {
    /// Create an I/O error with path context
    pub fn io_error(path: PathBuf, error: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: error,
        }
    }

    pub fn yaml_parse_error(path: PathBuf, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            path,
            source: error,
        }
    }

    pub fn json_parse_error(path: PathBuf, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            path,
            source: error,
        }
    }

    pub fn unsupported_format(path: PathBuf) -> Self {
        Self::UnsupportedFormat { path }
    }

    pub fn invalid_descriptor(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            path,
            reason: reason.into(),
        }
    }

    pub fn schema_error(path: PathBuf, error: attrform_core::Error) -> Self {
        Self::SchemaError {
            path,
            source: error,
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::IoError { path, .. } => Some(path),
            Self::YamlParseError { path, .. } => Some(path),
            Self::JsonParseError { path, .. } => Some(path),
            Self::UnsupportedFormat { path } => Some(path),
            Self::InvalidDescriptor { path, .. } => Some(path),
            Self::SchemaError { path, .. } => Some(path),
            Self::UnresolvedReferences { .. } => None,
        }
    }

    /// True when the failure is an unknown schema reference that a later registration could satisfy
    pub fn is_unknown_reference(&self) -> bool {
        matches!(
            self,
            Self::SchemaError {
                source: attrform_core::Error::UnknownSchema { .. },
                ..
            }
        )
    }
}
