//! Schema descriptor loading from JSON and YAML files
//!
//! Descriptors are parsed into [`attrform_core::Schema`] trees and registered
//! in a [`SchemaRegistry`](attrform_core::SchemaRegistry) under their `name`,
//! or under the file stem when they have none. A descriptor may refer to
//! another registered schema by name wherever a property or item schema is
//! expected.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use attrform_schemas::SchemaLoader;
//! use std::path::Path;
//!
//! let mut loader = SchemaLoader::new();
//! loader.load_dir(Path::new("schemas"))?;
//! let page = loader.registry().resolve("page")?;
//! println!("{}", serde_json::to_string_pretty(&page.to_descriptor())?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

pub mod cache;
pub mod error;
pub mod parser;
pub mod schema_loader;

pub use cache::{CacheConfig, CacheEntry, SchemaCache};
pub use error::{LoaderError, LoaderResult};
pub use parser::{Format, SchemaParser};
pub use schema_loader::{LoaderConfig, SchemaLoader};
