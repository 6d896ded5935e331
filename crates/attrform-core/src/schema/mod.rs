//! Declarative description of an attribute's structure
//!
//! A [`Schema`] is a tree of object, array and scalar descriptions. Schemas
//! are shared through `Arc`, so the same item schema can sit under several
//! parents and be recognised by name wherever it appears. Reducers attached to
//! a schema travel with it into the pipeline.
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

pub mod descriptor;
pub mod registry;
pub mod types;

pub use registry::SchemaRegistry;
pub use types::{Items, Property, SchemaKind, SchemaType};

use crate::reducer::ReducerRef;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Structural schema with attached reducers
#[derive(Debug, Clone)]
pub struct Schema {
    name: Option<String>,
    kind: SchemaKind,
    nullable: bool,
    required: Vec<String>,
    default: Option<Value>,
    enumeration: Option<Vec<Value>>,
    extra: Map<String, Value>,
    reducers: Vec<ReducerRef>,
}

impl Schema {
    fn with_kind(kind: SchemaKind) -> Self {
        Self {
            name: None,
            kind,
            nullable: true,
            required: Vec::new(),
            default: None,
            enumeration: None,
            extra: Map::new(),
            reducers: Vec::new(),
        }
    }

    pub fn object() -> Self {
        Self::with_kind(SchemaKind::Object {
            properties: IndexMap::new(),
        })
    }

    /// Array whose every element is described by `items`
    pub fn array_of(items: impl Into<Property>) -> Self {
        Self::with_kind(SchemaKind::ArrayOf(Box::new(items.into())))
    }

    /// Array described positionally; add slots with [`Schema::item`]
    pub fn tuple() -> Self {
        Self::with_kind(SchemaKind::Tuple(IndexMap::new()))
    }

    pub fn scalar(schema_type: SchemaType) -> Self {
        match schema_type {
            SchemaType::Object => Self::object(),
            SchemaType::Array => Self::tuple(),
            other => Self::with_kind(SchemaKind::Scalar(other)),
        }
    }

    pub fn string() -> Self {
        Self::scalar(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::scalar(SchemaType::Integer)
    }

    pub fn number() -> Self {
        Self::scalar(SchemaType::Number)
    }

    pub fn boolean() -> Self {
        Self::scalar(SchemaType::Boolean)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a property; ignored on schemas that are not objects
    pub fn property(mut self, name: impl Into<String>, property: impl Into<Property>) -> Self {
        let name = name.into();
        if let SchemaKind::Object { properties } = &mut self.kind {
            properties.insert(name, property.into());
            return self;
        }
        tracing::debug!(
            property = %name,
            schema = %self.name(),
            "ignoring property on non-object schema"
        );
        self
    }

    pub fn raw_property(self, name: impl Into<String>, descriptor: Value) -> Self {
        self.property(name, Property::Raw(descriptor))
    }

    /// Add a positional item slot; ignored unless the schema is a tuple
    pub fn item(mut self, name: impl Into<String>, property: impl Into<Property>) -> Self {
        if let SchemaKind::Tuple(items) = &mut self.kind {
            items.insert(name.into(), property.into());
        }
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn required<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn enum_values(mut self, values: Vec<Value>) -> Self {
        self.enumeration = Some(values);
        self
    }

    /// Free-form descriptor attribute emitted verbatim
    pub fn attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn with_reducer(mut self, reducer: impl Into<ReducerRef>) -> Self {
        self.add_reducer(reducer);
        self
    }

    pub fn add_reducer(&mut self, reducer: impl Into<ReducerRef>) {
        self.reducers.push(reducer.into());
    }

    pub(crate) fn set_name_if_missing(&mut self, name: &str) {
        if self.name.is_none() {
            self.name = Some(name.to_string());
        }
    }

    /// Explicit name, falling back to the type keyword
    pub fn name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.schema_type().as_str())
    }

    pub fn explicit_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn schema_type(&self) -> SchemaType {
        self.kind.schema_type()
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    pub fn is_structural(&self) -> bool {
        self.schema_type().is_structural()
    }

    pub fn properties(&self) -> Option<&IndexMap<String, Property>> {
        match &self.kind {
            SchemaKind::Object { properties } => Some(properties),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<Items<'_>> {
        match &self.kind {
            SchemaKind::ArrayOf(item) => Some(Items::Single(item)),
            SchemaKind::Tuple(items) => Some(Items::Tuple(items)),
            _ => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn enumeration(&self) -> Option<&[Value]> {
        self.enumeration.as_deref()
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn reducers(&self) -> &[ReducerRef] {
        &self.reducers
    }
}
