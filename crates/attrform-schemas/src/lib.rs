//! Attrform Schemas - JSON Schema validation and descriptor loading
//!
//! This crate connects Attrform attribute schemas to the outside world:
//! - **Validation**: [`JsonSchemaValidator`] checks attribute values against a
//!   schema's JSON-Schema descriptor with the `jsonschema` crate
//! - **Loading**: [`SchemaLoader`] reads schema descriptors from JSON or YAML
//!   files and registers them by name so descriptors can refer to each other
//!
//! ## Quick Start
//!
//! ```rust
//! use attrform_core::{JsonAttributes, MemoryHost, ReducerPipeline, Schema};
//! use attrform_schemas::JsonSchemaValidator;
//! use serde_json::json;
//!
//! let schema = Schema::object().nullable(false).property("name", Schema::string().nullable(false));
//! let attributes = JsonAttributes::new(ReducerPipeline::default())
//!     .with_validator(JsonSchemaValidator::new())
//!     .attribute("data", schema)
//!     .unwrap();
//!
//! let mut host = MemoryHost::new();
//! attributes.write(&mut host, "data", json!({"name": 1})).unwrap();
//!
//! let err = attributes.save(&mut host).unwrap_err();
//! let failure = err.as_validation().unwrap();
//! assert!(failure.messages().contains_key("name"));
//! ```
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod validator;

// Re-export commonly used types for convenience
pub use loader::{Format, LoaderConfig, LoaderError, LoaderResult, SchemaCache, SchemaLoader, SchemaParser};
pub use validator::{pointer_to_path, JsonSchemaValidator};
