//! Error types for the Attrform core library
//!
//! Errors fall into three families: validation failures that block
//! persistence, configuration faults in schema or reducer wiring, and
//! failures surfaced by the host's storage layer. A related record that
//! cannot be found is not an error; it is recorded as a diagnostic.

use crate::reducer::Phase;
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Main error type for Attrform operations
#[derive(Error, Debug)]
pub enum Error {
    /// The attribute value does not conform to its schema
    #[error("{0}")]
    Validation(#[from] ValidationFailure),

    /// Schema or reducer wiring is invalid
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A reducer identifier is not present in the registry
    #[error("Unknown reducer '{id}'")]
    UnknownReducer { id: String },

    /// A schema reference is not present in the schema registry
    #[error("Unknown schema '{name}'")]
    UnknownSchema { name: String },

    /// A phase name that is not one of get, set, save or commit
    #[error("Unknown reducer phase '{phase}'")]
    UnknownPhase { phase: String },

    /// An attribute name with no schema declared for it
    #[error("Attribute '{name}' has no schema")]
    UnknownAttribute { name: String },

    /// The host failed while performing a storage operation
    #[error("Host error during {operation}: {source}")]
    Host {
        operation: String,
        #[source]
        source: HostError,
    },

    /// A reducer rejected the state it was given
    #[error("Reducer '{reducer}' failed during {phase}: {message}")]
    Reducer {
        reducer: String,
        phase: Phase,
        message: String,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a host failure with the operation that triggered it
    pub fn host(operation: impl Into<String>, source: HostError) -> Self {
        Error::Host {
            operation: operation.into(),
            source,
        }
    }

    pub fn reducer(reducer: impl Into<String>, phase: Phase, message: impl Into<String>) -> Self {
        Error::Reducer {
            reducer: reducer.into(),
            phase,
            message: message.into(),
        }
    }

    /// The validation failure carried by this error, if any
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            Error::Validation(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Failures reported by a [`Host`](crate::host::Host) implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// No related record exists for the key
    #[error("no related record '{key}' for relation '{relation}'")]
    NotFound { relation: String, key: String },

    /// The relation is not defined on the owning record
    #[error("relation '{relation}' is not defined on this record")]
    UnknownRelation { relation: String },

    /// The backing store rejected the operation
    #[error("storage failure: {0}")]
    Storage(String),
}

impl HostError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, HostError::NotFound { .. })
    }
}

/// Validation messages grouped by dotted path
pub type Messages = IndexMap<String, Vec<String>>;

/// Structured validation failure
///
/// Messages are keyed by the dotted path of the offending value relative to
/// the attribute root. The display form lists one line per message, with the
/// optional prefix (usually the attribute name) prepended to each path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationFailure {
    messages: Messages,
    prefix: Option<String>,
}

impl ValidationFailure {
    pub fn new(messages: Messages) -> Self {
        Self {
            messages,
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: Option<impl Into<String>>) -> Self {
        self.prefix = prefix.map(Into::into);
        self
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn into_messages(self) -> Messages {
        self.messages
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Paths with at least one message, prefixed the same way as the display form
    pub fn paths(&self) -> Vec<String> {
        self.messages.keys().map(|key| self.qualify(key)).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn qualify(&self, key: &str) -> String {
        match (self.prefix.as_deref(), key.is_empty()) {
            (Some(prefix), true) => prefix.to_string(),
            (Some(prefix), false) => format!("{prefix}.{key}"),
            (None, _) => key.to_string(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error(s) while validating the schema:")?;
        for (key, messages) in &self.messages {
            let path = self.qualify(key);
            for message in messages {
                write!(f, "\n[{path}]: {message}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Configuration {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownReducer {
            id: "missing".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown reducer 'missing'");

        let err = Error::reducer("slug", Phase::Set, "boom");
        assert_eq!(err.to_string(), "Reducer 'slug' failed during set: boom");
    }

    #[test]
    fn test_validation_failure_display_with_prefix() {
        let mut messages = Messages::new();
        messages.insert("name".to_string(), vec!["1 is not of type \"string\"".to_string()]);
        messages.insert(String::new(), vec!["root problem".to_string()]);

        let failure = ValidationFailure::new(messages).with_prefix(Some("data"));
        assert_eq!(
            failure.to_string(),
            "Error(s) while validating the schema:\n[data.name]: 1 is not of type \"string\"\n[data]: root problem"
        );
        assert_eq!(failure.paths(), vec!["data.name", "data"]);
        assert_eq!(failure.len(), 2);
    }

    #[test]
    fn test_host_error_not_found() {
        let err = HostError::NotFound {
            relation: "children".to_string(),
            key: "3".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!HostError::Storage("disk".to_string()).is_not_found());
    }
}
