//! Attrform Core - schema-driven JSON attribute transformation
//!
//! This crate lets a record's JSON attribute be described by a declarative
//! schema and transformed on read, on write and around persistence, so stored
//! keys can be exposed to callers as related records and turned back into keys
//! on the way in.
//!
//! # Main Components
//!
//! - **Schema**: Recursive object, array and scalar descriptions with attached reducers
//! - **Nodes**: Pre-order flattening of a schema and wildcard matching against data
//! - **Reducers**: Ordered transformations run at the get, set, save and commit phases
//! - **Relations**: Key/record mapping and attach/detach reconciliation after persistence
//! - **Host**: The storage interface, with an in-memory implementation
//!
//! # Example
//!
//! ```
//! use attrform_core::{
//!     EngineConfig, JsonAttributes, MemoryHost, ReducerPipeline, ReducerRegistry,
//!     RelationConfig, Result, Schema,
//! };
//! use serde_json::json;
//!
//! fn example() -> Result<()> {
//!     let child = Schema::object().named("child").property("id", Schema::string());
//!     let schema = Schema::object().property("children", Schema::array_of(child));
//!
//!     let config = EngineConfig::new()
//!         .with_relation(RelationConfig::has_many("children", "child", "owner_id"));
//!     let pipeline = ReducerPipeline::new(ReducerRegistry::with_builtins(), config)?;
//!     let attributes = JsonAttributes::new(pipeline)
//!         .attribute_with_reducers("data", schema, &["relation:children".into()])?;
//!
//!     let mut host = MemoryHost::new()
//!         .with_records("children", vec![json!({"id": "1"}), json!({"id": "2"})]);
//!     attributes.write(&mut host, "data", json!({"children": [{"id": "1"}, {"id": "2"}]}))?;
//!     let report = attributes.save(&mut host)?;
//!     assert_eq!(report.attached(), vec!["1", "2"]);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod attributes;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod host;
pub mod matcher;
pub mod memory;
pub mod node;
pub mod path;
pub mod reducer;
pub mod relation;
pub mod schema;
pub mod validation;

// Re-export main types for convenience
pub use attributes::{JsonAttributes, SaveReport};
pub use config::{EngineConfig, DEFAULT_METADATA_NAMESPACE};
pub use diagnostics::{Diagnostics, RelationMiss};
pub use error::{Error, HostError, Messages, Result, ValidationFailure};
pub use host::{Host, HostResult};
pub use matcher::PathMatcher;
pub use memory::{LinkOperation, LinkRow, MemoryFixture, MemoryHost, RelatedTable};
pub use node::{Node, NodeSet};
pub use reducer::{
    AttributeSchema, DefaultsReducer, FnReducer, Phase, Reducer, ReducerContext, ReducerPipeline,
    ReducerRef, ReducerRegistry, SlugReducer,
};
pub use relation::{
    LinkageMetadata, QueryPolicy, ReconcileReport, RelationConfig, RelationKind, RelationReducer,
};
pub use schema::{Property, Schema, SchemaKind, SchemaRegistry, SchemaType};
pub use validation::AttributeValidator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
