//! Reducers and the phase pipeline that runs them
//!
//! A reducer transforms an attribute value at one or more lifecycle phases.
//! The pipeline matches the attribute's schema nodes against the value, then
//! folds every applicable reducer over every node in order.
//!
//! # Module Organization
//!
//! - [`types`] - Phase, the `Reducer` trait, closure reducers and references
//! - [`registry`] - Id-based reducer lookup
//! - [`pipeline`] - Attribute composition and phase execution
//! - [`built_in`] - Bundled `slug` and `defaults` reducers
//!
//! # Examples
//!
//! ```
//! use attrform_core::{MemoryHost, Phase, ReducerPipeline, Schema};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let pipeline = ReducerPipeline::default();
//! let schema = Schema::object()
//!     .property("name", Schema::string())
//!     .property("slug", Schema::string())
//!     .with_reducer("slug");
//! let attribute = pipeline.compose("data", Arc::new(schema), &[]).unwrap();
//!
//! let mut host = MemoryHost::new();
//! let value = pipeline
//!     .run_phase(Phase::Set, &attribute, json!({"name": "Foo Bar"}), &mut host, false)
//!     .unwrap();
//! assert_eq!(value["slug"], "foo-bar");
//! ```
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod pipeline;
pub mod registry;
pub mod types;


pub use built_in::{DefaultsReducer, SlugReducer};
pub use pipeline::{AttributeSchema, ReducerPipeline};
pub use registry::ReducerRegistry;
pub use types::{FnReducer, Phase, Reducer, ReducerContext, ReducerFn, ReducerRef};
