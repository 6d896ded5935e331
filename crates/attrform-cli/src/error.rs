//! Error types and handling for the CLI
//!
//! Every failure maps to a distinct process exit code so scripts can tell a
//! document that failed validation apart from a broken schema or a missing file.

use attrform_schemas::LoaderError;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the attribute engine
    #[error("{0}")]
    Core(#[from] attrform_core::Error),

    /// Error reading schema descriptors or documents
    #[error("{0}")]
    Loader(#[from] LoaderError),

    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Schema '{name}' not found{}", hint.as_deref().map(|hint| format!(" ({hint})")).unwrap_or_default())]
    SchemaNotFound { name: String, hint: Option<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(attrform_core::Error::Validation(_)) => 2,
            Self::Core(_) => 3,
            Self::Loader(_) => 4,
            Self::FileNotFound { .. } => 5,
            Self::SchemaNotFound { .. } => 6,
            Self::Config(_) => 7,
            Self::InvalidArgs(_) => 8,
            Self::Json(_) => 9,
            Self::Yaml(_) => 10,
            Self::TomlDe(_) | Self::TomlSer(_) => 11,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}
